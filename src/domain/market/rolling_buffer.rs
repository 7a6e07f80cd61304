use crate::domain::errors::BufferError;
use crate::domain::market::bar::Bar;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// Fixed-capacity per-field history of the most recent bars.
///
/// Every field is a column of exactly `capacity` values ordered oldest to
/// newest. Slots that have not been written yet read as `0.0`; callers must
/// check [`RollingBuffer::inited`] before trusting the leading values.
#[derive(Debug, Clone)]
pub struct RollingBuffer {
    capacity: usize,
    count: usize,
    inited: bool,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
    open_interest: Vec<f64>,
}

#[inline]
fn shift_push(column: &mut [f64], value: Decimal) {
    column.copy_within(1.., 0);
    if let Some(last) = column.last_mut() {
        *last = value.to_f64().unwrap_or(0.0);
    }
}

impl RollingBuffer {
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity { capacity });
        }
        Ok(Self {
            capacity,
            count: 0,
            inited: false,
            open: vec![0.0; capacity],
            high: vec![0.0; capacity],
            low: vec![0.0; capacity],
            close: vec![0.0; capacity],
            volume: vec![0.0; capacity],
            open_interest: vec![0.0; capacity],
        })
    }

    /// Shifts every column one slot toward the oldest end and appends `bar`.
    pub fn update(&mut self, bar: &Bar) {
        self.count += 1;
        if !self.inited && self.count >= self.capacity {
            self.inited = true;
        }

        shift_push(&mut self.open, bar.open);
        shift_push(&mut self.high, bar.high);
        shift_push(&mut self.low, bar.low);
        shift_push(&mut self.close, bar.close);
        shift_push(&mut self.volume, bar.volume);
        shift_push(&mut self.open_interest, bar.open_interest);
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of updates applied so far
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// True once `capacity` updates have occurred; never reverts
    #[inline]
    pub fn inited(&self) -> bool {
        self.inited
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    pub fn open_interest(&self) -> &[f64] {
        &self.open_interest
    }
}

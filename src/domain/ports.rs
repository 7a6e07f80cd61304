use crate::domain::market::bar::Bar;
use crate::domain::market::rolling_buffer::RollingBuffer;
use crate::domain::market::tick::Tick;
use crate::domain::trading::types::{Order, Trade};

/// Callback receiving every bar completed by a generator
pub type BarCallback = Box<dyn FnMut(Bar) + Send>;

/// Hooks a strategy may override.
///
/// Every hook defaults to a no-op so implementors only write the ones they
/// care about. Hooks run synchronously on the thread delivering market data.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn on_tick(&mut self, _tick: &Tick) {}

    /// Called with the bar that was just pushed into `history`
    fn on_bar(&mut self, _bar: &Bar, _history: &RollingBuffer) {}

    fn on_order(&mut self, _order: &Order) {}

    fn on_trade(&mut self, _trade: &Trade) {}
}

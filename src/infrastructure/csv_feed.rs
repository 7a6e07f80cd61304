//! Flat CSV formats for tick input and bar output.
//!
//! Tick files carry one row per quote with a header line. Only `symbol`,
//! `exchange`, `datetime` and `last_price` are required; every other column
//! may be absent or empty. Top-of-book is read from `bid_price_1` ..
//! `ask_volume_1`.

use crate::domain::market::bar::Bar;
use crate::domain::market::symbol::Exchange;
use crate::domain::market::tick::Tick;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct TickRecord {
    symbol: String,
    exchange: String,
    datetime: String,
    last_price: Decimal,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    last_volume: Option<Decimal>,
    #[serde(default)]
    volume: Option<Decimal>,
    #[serde(default)]
    open_interest: Option<Decimal>,
    #[serde(default)]
    open_price: Option<Decimal>,
    #[serde(default)]
    high_price: Option<Decimal>,
    #[serde(default)]
    low_price: Option<Decimal>,
    #[serde(default)]
    pre_close: Option<Decimal>,
    #[serde(default)]
    limit_up: Option<Decimal>,
    #[serde(default)]
    limit_down: Option<Decimal>,
    #[serde(default)]
    bid_price_1: Option<Decimal>,
    #[serde(default)]
    bid_volume_1: Option<Decimal>,
    #[serde(default)]
    ask_price_1: Option<Decimal>,
    #[serde(default)]
    ask_volume_1: Option<Decimal>,
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
        .with_context(|| format!("Unrecognised datetime: {}", value))
}

impl TickRecord {
    fn into_tick(self) -> Result<Tick> {
        let exchange = Exchange::from_str(self.exchange.trim())?;
        let datetime = parse_datetime(&self.datetime)?;

        let mut tick = Tick::new(self.symbol.trim(), exchange, datetime, self.last_price);
        tick.name = self.name.unwrap_or_default();
        tick.last_volume = self.last_volume.unwrap_or_default();
        tick.volume = self.volume.unwrap_or_default();
        tick.open_interest = self.open_interest.unwrap_or_default();
        tick.open_price = self.open_price.unwrap_or_default();
        tick.high_price = self.high_price.unwrap_or_default();
        tick.low_price = self.low_price.unwrap_or_default();
        tick.pre_close = self.pre_close.unwrap_or_default();
        tick.limit_up = self.limit_up.unwrap_or_default();
        tick.limit_down = self.limit_down.unwrap_or_default();

        let top = &mut tick.depth[0];
        top.bid_price = self.bid_price_1.unwrap_or_default();
        top.bid_volume = self.bid_volume_1.unwrap_or_default();
        top.ask_price = self.ask_price_1.unwrap_or_default();
        top.ask_volume = self.ask_volume_1.unwrap_or_default();
        Ok(tick)
    }
}

/// Parses every row of a tick CSV; the first bad row aborts with its line
pub fn read_ticks<R: Read>(reader: R) -> Result<Vec<Tick>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut ticks = Vec::new();

    for (index, result) in rdr.deserialize::<TickRecord>().enumerate() {
        // header is line 1
        let line = index + 2;
        let record = result.context(format!("Malformed tick row at line {}", line))?;
        let tick = record
            .into_tick()
            .context(format!("Invalid tick at line {}", line))?;
        ticks.push(tick);
    }
    Ok(ticks)
}

pub fn read_ticks_from_path(path: &Path) -> Result<Vec<Tick>> {
    let file =
        File::open(path).context(format!("Failed to open tick file {}", path.display()))?;
    read_ticks(BufReader::new(file))
}

/// Writes bars as CSV rows, header first
pub struct BarCsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BarCsvWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, bar: &Bar) -> Result<()> {
        self.writer
            .serialize(bar)
            .context(format!("Failed to write bar {} {}", bar.vt_symbol(), bar.datetime))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush bar CSV")
    }

    /// Flushes and hands back the underlying sink
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush bar CSV: {}", e.error()))
    }
}

/// Writes one JSON object per line
pub fn write_json_line<W: Write>(sink: &mut W, bar: &Bar) -> Result<()> {
    serde_json::to_writer(&mut *sink, bar).context("Failed to encode bar as JSON")?;
    sink.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::interval::Interval;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_read_ticks_minimal_columns() {
        let data = "\
symbol,exchange,datetime,last_price
rb2105,SHFE,2021-03-01 09:00:00.500,4500.5
rb2105,SHFE,2021-03-01T09:00:01,4501
";
        let ticks = read_ticks(data.as_bytes()).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].vt_symbol(), "rb2105.SHFE");
        assert_eq!(ticks[0].last_price, dec!(4500.5));
        assert_eq!(ticks[0].volume, Decimal::ZERO);
        assert_eq!(
            ticks[1].datetime,
            NaiveDate::from_ymd_opt(2021, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 1)
                .unwrap()
        );
    }

    #[test]
    fn test_read_ticks_optional_columns() {
        let data = "\
symbol,exchange,datetime,last_price,volume,open_interest,high_price,low_price,bid_price_1,ask_price_1
cu2105,SHFE,2021-03-01 09:00:00,68000,120,,68100,67900,67990,68010
";
        let ticks = read_ticks(data.as_bytes()).unwrap();
        let tick = &ticks[0];
        assert_eq!(tick.volume, dec!(120));
        assert_eq!(tick.open_interest, Decimal::ZERO);
        assert_eq!(tick.high_price, dec!(68100));
        assert_eq!(tick.depth[0].bid_price, dec!(67990));
        assert_eq!(tick.depth[0].ask_price, dec!(68010));
    }

    #[test]
    fn test_read_ticks_reports_bad_line() {
        let data = "\
symbol,exchange,datetime,last_price
rb2105,SHFE,2021-03-01 09:00:00,4500
rb2105,NYSE,2021-03-01 09:00:01,4500
";
        let err = read_ticks(data.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn test_write_bars() {
        let bar = Bar::seeded(
            "rb2105",
            Exchange::Shfe,
            NaiveDate::from_ymd_opt(2021, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            Interval::Minute,
            dec!(4500),
        );

        let mut writer = BarCsvWriter::new(Vec::new());
        writer.write(&bar).unwrap();
        let csv_text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "symbol,exchange,datetime,interval,open,high,low,close,volume,open_interest"
        );
        assert!(lines.next().unwrap().starts_with("rb2105,SHFE,2021-03-01T09:00:00,1m,4500"));

        let mut json = Vec::new();
        write_json_line(&mut json, &bar).unwrap();
        let text = String::from_utf8(json).unwrap();
        assert!(text.ends_with('\n'));
        let parsed: Bar = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed, bar);
    }
}

//! Static catalog of Chinese futures products and their trading sessions.

use crate::domain::market::symbol::{Exchange, extract_vt_symbol};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Wall-clock window during which a product trades.
///
/// Night sessions may wrap past midnight (`end < start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingSession {
    pub start: (u32, u32, u32),
    pub end: (u32, u32, u32),
}

impl TradingSession {
    const fn new(start: (u32, u32, u32), end: (u32, u32, u32)) -> Self {
        Self { start, end }
    }

    fn bound(hms: (u32, u32, u32)) -> NaiveTime {
        NaiveTime::from_hms_opt(hms.0, hms.1, hms.2).unwrap_or(NaiveTime::MIN)
    }

    pub fn start_time(&self) -> NaiveTime {
        Self::bound(self.start)
    }

    pub fn end_time(&self) -> NaiveTime {
        Self::bound(self.end)
    }

    /// Bounds are exclusive on both sides
    pub fn contains(&self, t: NaiveTime) -> bool {
        let (start, end) = (self.start_time(), self.end_time());
        if end < start {
            t > start || t < end
        } else {
            start < t && t < end
        }
    }
}

// Night sessions
const N2100_2300: TradingSession = TradingSession::new((21, 0, 10), (22, 59, 55));
const N2100_0100: TradingSession = TradingSession::new((21, 0, 10), (0, 59, 55));
const N2100_0230: TradingSession = TradingSession::new((21, 0, 10), (2, 29, 55));
// Morning
const M0900_1015: TradingSession = TradingSession::new((9, 0, 10), (10, 14, 55));
const M1030_1130: TradingSession = TradingSession::new((10, 30, 1), (11, 29, 55));
const M0930_1130: TradingSession = TradingSession::new((9, 30, 10), (11, 29, 55));
// Afternoon
const A1300_1500: TradingSession = TradingSession::new((13, 0, 1), (14, 59, 55));
const A1330_1500: TradingSession = TradingSession::new((13, 30, 1), (14, 59, 55));
const A1300_1515: TradingSession = TradingSession::new((13, 0, 1), (15, 14, 55));

const DAY: &[TradingSession] = &[M0900_1015, M1030_1130, A1330_1500];
const NIGHT_2300: &[TradingSession] = &[N2100_2300, M0900_1015, M1030_1130, A1330_1500];
const NIGHT_0100: &[TradingSession] = &[N2100_0100, M0900_1015, M1030_1130, A1330_1500];
const NIGHT_0230: &[TradingSession] = &[N2100_0230, M0900_1015, M1030_1130, A1330_1500];
const INDEX: &[TradingSession] = &[M0930_1130, A1300_1500];
const BOND: &[TradingSession] = &[M0930_1130, A1300_1515];

/// Contract specification of a futures product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuturesProduct {
    pub code: &'static str,
    pub name: &'static str,
    pub multiplier: Decimal,
    pub price_tick: Decimal,
    pub exchange: Exchange,
    pub sessions: &'static [TradingSession],
}

const fn product(
    code: &'static str,
    name: &'static str,
    multiplier: Decimal,
    price_tick: Decimal,
    exchange: Exchange,
    sessions: &'static [TradingSession],
) -> FuturesProduct {
    FuturesProduct {
        code,
        name,
        multiplier,
        price_tick,
        exchange,
        sessions,
    }
}

use Exchange::{Cffex, Czce, Dce, Ine, Shfe};

pub static FUTURES_PRODUCTS: &[FuturesProduct] = &[
    // SHFE
    product("au", "Gold", dec!(1000), dec!(0.05), Shfe, NIGHT_0230),
    product("ag", "Silver", dec!(15), dec!(1), Shfe, NIGHT_0230),
    product("cu", "Copper", dec!(5), dec!(10), Shfe, NIGHT_0100),
    product("al", "Aluminium", dec!(5), dec!(5), Shfe, NIGHT_0100),
    product("zn", "Zinc", dec!(5), dec!(5), Shfe, NIGHT_0100),
    product("pb", "Lead", dec!(5), dec!(5), Shfe, NIGHT_0100),
    product("ni", "Nickel", dec!(1), dec!(10), Shfe, NIGHT_0100),
    product("sn", "Tin", dec!(1), dec!(10), Shfe, NIGHT_0100),
    product("ss", "Stainless Steel", dec!(5), dec!(5), Shfe, NIGHT_0100),
    product("rb", "Rebar", dec!(10), dec!(1), Shfe, NIGHT_2300),
    product("hc", "Hot-rolled Coil", dec!(10), dec!(1), Shfe, NIGHT_2300),
    product("fu", "Fuel Oil", dec!(10), dec!(1), Shfe, NIGHT_2300),
    product("bu", "Bitumen", dec!(10), dec!(2), Shfe, NIGHT_2300),
    product("ru", "Natural Rubber", dec!(10), dec!(5), Shfe, NIGHT_2300),
    product("sp", "Pulp", dec!(10), dec!(2), Shfe, NIGHT_2300),
    product("wr", "Wire Rod", dec!(10), dec!(1), Shfe, DAY),
    // CZCE
    product("CF", "Cotton", dec!(5), dec!(5), Czce, NIGHT_2300),
    product("CY", "Cotton Yarn", dec!(5), dec!(5), Czce, NIGHT_2300),
    product("SR", "Sugar", dec!(10), dec!(1), Czce, NIGHT_2300),
    product("TA", "PTA", dec!(5), dec!(2), Czce, NIGHT_2300),
    product("PF", "Polyester Staple Fiber", dec!(5), dec!(2), Czce, NIGHT_2300),
    product("OI", "Rapeseed Oil", dec!(10), dec!(2), Czce, NIGHT_2300),
    product("MA", "Methanol", dec!(10), dec!(1), Czce, NIGHT_2300),
    product("RM", "Rapeseed Meal", dec!(10), dec!(1), Czce, NIGHT_2300),
    product("ZC", "Thermal Coal", dec!(100), dec!(0.2), Czce, NIGHT_2300),
    product("FG", "Glass", dec!(20), dec!(1), Czce, NIGHT_2300),
    product("SA", "Soda Ash", dec!(20), dec!(1), Czce, NIGHT_2300),
    product("SF", "Ferrosilicon", dec!(5), dec!(2), Czce, DAY),
    product("SM", "Silicomanganese", dec!(5), dec!(2), Czce, DAY),
    product("AP", "Apple", dec!(10), dec!(1), Czce, DAY),
    product("CJ", "Jujube", dec!(5), dec!(5), Czce, DAY),
    product("UR", "Urea", dec!(20), dec!(1), Czce, DAY),
    product("WH", "Strong Wheat", dec!(20), dec!(1), Czce, DAY),
    product("PM", "Common Wheat", dec!(50), dec!(1), Czce, DAY),
    product("RS", "Rapeseed", dec!(10), dec!(1), Czce, DAY),
    product("RI", "Early Rice", dec!(20), dec!(1), Czce, DAY),
    product("JR", "Japonica Rice", dec!(20), dec!(1), Czce, DAY),
    product("LR", "Late Rice", dec!(20), dec!(1), Czce, DAY),
    // DCE
    product("l", "LLDPE", dec!(5), dec!(5), Dce, NIGHT_2300),
    product("v", "PVC", dec!(5), dec!(5), Dce, NIGHT_2300),
    product("pp", "Polypropylene", dec!(5), dec!(1), Dce, NIGHT_2300),
    product("eb", "Styrene", dec!(5), dec!(1), Dce, NIGHT_2300),
    product("eg", "Ethylene Glycol", dec!(10), dec!(1), Dce, NIGHT_2300),
    product("pg", "LPG", dec!(20), dec!(1), Dce, NIGHT_2300),
    product("i", "Iron Ore", dec!(100), dec!(0.5), Dce, NIGHT_2300),
    product("j", "Coke", dec!(100), dec!(0.5), Dce, NIGHT_2300),
    product("jm", "Coking Coal", dec!(60), dec!(0.5), Dce, NIGHT_2300),
    product("a", "Soybean No.1", dec!(10), dec!(1), Dce, NIGHT_2300),
    product("b", "Soybean No.2", dec!(10), dec!(1), Dce, NIGHT_2300),
    product("c", "Corn", dec!(10), dec!(1), Dce, NIGHT_2300),
    product("cs", "Corn Starch", dec!(10), dec!(1), Dce, NIGHT_2300),
    product("m", "Soybean Meal", dec!(10), dec!(1), Dce, NIGHT_2300),
    product("y", "Soybean Oil", dec!(10), dec!(2), Dce, NIGHT_2300),
    product("p", "Palm Oil", dec!(10), dec!(2), Dce, NIGHT_2300),
    product("rr", "Japonica Rice", dec!(10), dec!(1), Dce, NIGHT_2300),
    product("jd", "Egg", dec!(10), dec!(1), Dce, DAY),
    product("bb", "Blockboard", dec!(500), dec!(0.05), Dce, DAY),
    product("fb", "Fiberboard", dec!(500), dec!(0.05), Dce, DAY),
    // CFFEX
    product("IF", "CSI 300 Index", dec!(300), dec!(0.2), Cffex, INDEX),
    product("IH", "SSE 50 Index", dec!(300), dec!(0.2), Cffex, INDEX),
    product("IC", "CSI 500 Index", dec!(200), dec!(0.2), Cffex, INDEX),
    product("T", "10-Year Treasury Bond", dec!(10000), dec!(0.005), Cffex, BOND),
    product("TF", "5-Year Treasury Bond", dec!(10000), dec!(0.005), Cffex, BOND),
    product("TS", "2-Year Treasury Bond", dec!(20000), dec!(0.005), Cffex, BOND),
    // INE
    product("sc", "Crude Oil", dec!(1000), dec!(0.1), Ine, NIGHT_0230),
    product("nr", "TSR 20 Rubber", dec!(10), dec!(5), Ine, NIGHT_2300),
    product("lu", "Low Sulfur Fuel Oil", dec!(10), dec!(1), Ine, NIGHT_2300),
    product("bc", "International Copper", dec!(5), dec!(10), Ine, NIGHT_0100),
];

/// Strips contract month digits: `rb2105` -> `rb`
pub fn product_code(symbol: &str) -> String {
    symbol.chars().filter(|c| !c.is_ascii_digit()).collect()
}

pub fn find_product(code: &str) -> Option<&'static FuturesProduct> {
    FUTURES_PRODUCTS.iter().find(|p| p.code == code)
}

/// Whether `time` falls inside one of the product's sessions.
///
/// Symbols that are malformed or not in the catalog are always tradable.
pub fn is_trading_time(vt_symbol: &str, time: NaiveTime) -> bool {
    let Ok((symbol, _)) = extract_vt_symbol(vt_symbol) else {
        return true;
    };
    match find_product(&product_code(&symbol)) {
        Some(product) => product.sessions.iter().any(|s| s.contains(time)),
        None => true,
    }
}

/// Trading day a timestamp belongs to.
///
/// Timestamps from 19:00 on count toward the next day; Friday evening
/// counts toward Monday.
pub fn trading_day(dt: NaiveDateTime) -> NaiveDate {
    let date = dt.date();
    if dt.hour() <= 18 {
        return date;
    }
    let skip = if date.weekday() == Weekday::Fri { 3 } else { 1 };
    date.checked_add_days(Days::new(skip)).unwrap_or(date)
}

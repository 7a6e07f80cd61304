// Market data processing
pub mod market_data;

// Per-instrument strategy routing
pub mod engine;

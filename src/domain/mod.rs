// Market data domain
pub mod market;

// Port interfaces
pub mod ports;

// Order and fill records
pub mod trading;

// Domain-specific error types
pub mod errors;

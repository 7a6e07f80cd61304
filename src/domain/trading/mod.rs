// Order and fill records exchanged with strategies
pub mod types;

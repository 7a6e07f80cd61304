// Market data domain
pub mod bar;
pub mod interval;
pub mod price;
pub mod products;
pub mod rolling_buffer;
pub mod symbol;
pub mod tick;

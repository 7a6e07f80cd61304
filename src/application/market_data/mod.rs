// Market data processing modules
pub mod bar_generator;
pub mod indicators;
pub mod pipeline;
pub mod window;

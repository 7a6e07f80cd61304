pub mod csv_feed;
pub mod logging;
pub mod recorder;

pub use logging::{FileLogger, LoggerRegistry, init_tracing};
pub use recorder::BarRecorder;

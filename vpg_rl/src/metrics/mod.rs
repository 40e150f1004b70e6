//! Metrics reporting: loggers and the final return curve.

pub mod logger;
pub mod plot;

pub use logger::{ConsoleLogger, CsvLogger, EpochSnapshot, MetricsLogger, NullLogger};
pub use plot::{render_return_curve, PlotError};

//! Training loggers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

/// Per-epoch training summary produced by the runner.
#[derive(Debug, Clone, Serialize)]
pub struct EpochSnapshot {
    /// Epoch index, starting at 0.
    pub epoch: usize,
    /// Cumulative environment interactions across the whole group.
    pub env_interactions: usize,
    /// Episodes completed during this epoch across the whole group.
    pub episodes: usize,
    /// Mean return of those episodes (0 if none completed).
    pub mean_return: f32,
    /// Standard deviation of those returns.
    pub std_return: f32,
    /// Policy loss before the gradient step.
    pub policy_loss: f32,
    /// Value loss of the last regression iteration.
    pub value_loss: f32,
}

/// Logger trait for different logging backends.
pub trait MetricsLogger: Send {
    /// Log one epoch's summary.
    fn log(&mut self, snapshot: &EpochSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Logger that discards everything; handy for non-root workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl MetricsLogger for NullLogger {
    fn log(&mut self, _snapshot: &EpochSnapshot) {}

    fn flush(&mut self) {}
}

/// Console logger with aligned columns.
pub struct ConsoleLogger {
    start_time: Instant,
    show_header: bool,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            show_header: true,
        }
    }

    fn print_header(&self) {
        println!(
            "{:>6} {:>12} {:>9} {:>11} {:>10} {:>11} {:>11} {:>9}",
            "Epoch", "Interacts", "Episodes", "MeanRet", "StdRet", "PolicyLoss", "ValueLoss", "Elapsed"
        );
        println!("{}", "-".repeat(85));
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &EpochSnapshot) {
        if self.show_header {
            self.print_header();
            self.show_header = false;
        }

        let elapsed = self.start_time.elapsed().as_secs_f32();
        println!(
            "{:>6} {:>12} {:>9} {:>11.2} {:>10.2} {:>11.4} {:>11.4} {:>8.1}s",
            snapshot.epoch,
            snapshot.env_interactions,
            snapshot.episodes,
            snapshot.mean_return,
            snapshot.std_return,
            snapshot.policy_loss,
            snapshot.value_loss,
            elapsed
        );
    }

    fn flush(&mut self) {
        // stdout is line-buffered, nothing to do
    }
}

/// CSV file logger for offline analysis.
pub struct CsvLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CsvLogger {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "epoch,env_interactions,episodes,mean_return,std_return,policy_loss,value_loss,elapsed_secs"
        )?;
        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }
}

impl MetricsLogger for CsvLogger {
    fn log(&mut self, snapshot: &EpochSnapshot) {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let _ = writeln!(
            self.writer,
            "{},{},{},{:.4},{:.4},{:.6},{:.6},{:.2}",
            snapshot.epoch,
            snapshot.env_interactions,
            snapshot.episodes,
            snapshot.mean_return,
            snapshot.std_return,
            snapshot.policy_loss,
            snapshot.value_loss,
            elapsed
        );
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Drop for CsvLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> EpochSnapshot {
        EpochSnapshot {
            epoch: 3,
            env_interactions: 16_000,
            episodes: 42,
            mean_return: 87.5,
            std_return: 12.25,
            policy_loss: -0.0123,
            value_loss: 4.56,
        }
    }

    #[test]
    fn test_console_logger_accepts_snapshots() {
        let mut logger = ConsoleLogger::new();
        logger.log(&snapshot());
        logger.log(&snapshot());
        logger.flush();
    }

    #[test]
    fn test_csv_logger_writes_rows() {
        let dir = std::env::temp_dir();
        let path = dir.join("vpg_rl_csv_logger_test.csv");
        {
            let mut logger = CsvLogger::new(&path).unwrap();
            logger.log(&snapshot());
            logger.flush();
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("epoch,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("3,16000,42,"));
    }
}

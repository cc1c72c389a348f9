//! Conversion log
//!
//! Each run writes a log file describing what the tool did to the
//! input: recognized segments, planned layout, and milestones. The same
//! type doubles as the backend for the log macros; the global instance
//! additionally echoes records to the console, at a level chosen from
//! the command line.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;
use log::{LevelFilter, Log, Metadata, Record};

use crate::segment::Segment;

/// File-backed logger for a conversion run
pub struct Logger {
    /// Log file, behind a mutex so the log macros can write from
    /// anywhere
    file: Mutex<File>,
    /// Whether records are mirrored to the console
    echo: bool,
}

impl Logger {
    /// Creates a logger writing to the given file, without console echo
    pub fn new(log_file: &str) -> io::Result<Self> {
        Ok(Logger {
            file: Mutex::new(File::create(log_file)?),
            echo: false,
        })
    }

    /// Writes one line to the log file
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", message)?;
        file.flush()
    }

    /// Records a segment the way it appears in the layout: offset,
    /// size, kind, and label
    pub fn log_segment(&self, segment: &Segment) -> io::Result<()> {
        self.log(&format!(
            "{:>10}  {:>10}  {:<18} {}",
            segment.offset,
            segment.size,
            segment.kind_name(),
            segment.label.as_deref().unwrap_or("")
        ))
    }

    /// Installs a console-echoing logger behind the log macros
    ///
    /// The level filter decides how much reaches the file and the
    /// console; the CLI passes Debug when verbose output is requested
    /// and Info otherwise.
    pub fn init_global_logger(log_file: &str, level: LevelFilter) -> io::Result<()> {
        let global_logger = Logger {
            file: Mutex::new(File::create(log_file)?),
            echo: true,
        };

        // Ignore the SetLoggerError; this is only called once at startup
        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(level);
        Ok(())
    }
}

// Back the log macros with the same file sink
impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("[{:<5}] {}", record.level(), record.args());
        let _ = self.log(&message);
        if self.echo {
            println!("{}", message);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::ByteOrder;

    #[test]
    fn segment_lines_reach_the_log_file() {
        let path = std::env::temp_dir().join("tiffwrap-logger-test.log");
        let logger = Logger::new(path.to_str().unwrap()).unwrap();

        let segment = Segment::byte_vector(64, ByteOrder::LittleEndian, vec![0u8; 16])
            .with_label("IccProfile");
        logger.log_segment(&segment).unwrap();
        logger.log("done").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("ByteVector"));
        assert!(contents.contains("IccProfile"));
        assert!(contents.lines().any(|line| line == "done"));
    }
}

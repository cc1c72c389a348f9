//! High-level library interface

use log::info;
use std::fs::File;
use std::io::BufReader;

use crate::jpeg::parser::JpegParser;
use crate::segment::SegmentList;
use crate::tiff::errors::{WrapError, WrapResult};
use crate::tiff::planner::TiffPlanner;
use crate::tiff::reader::TiffReader;
use crate::tiff::writer::TiffWriter;
use crate::utils::format_utils::{self, FileType};
use crate::utils::logger::Logger;

/// Reads an input file into a segment list, dispatching on its format
///
/// JPEG input is decomposed by the JPEG parser; TIFF input is read by
/// the TIFF structure reader. Anything else fails with
/// `UnrecognizedFormat`.
pub fn load_segments(input_path: &str, logger: &Logger) -> WrapResult<(FileType, SegmentList)> {
    let file = File::open(input_path)?;
    let mut reader = BufReader::new(file);
    let file_type = format_utils::sniff_file_type(&mut reader)?;
    drop(reader);

    let list = match file_type {
        FileType::Jpeg => JpegParser::new(logger).load(input_path)?,
        FileType::TiffLittleEndian | FileType::TiffBigEndian => {
            TiffReader::new(logger).load(input_path)?
        }
    };
    Ok((file_type, list))
}

/// Main interface to the tiffwrap library
pub struct TiffWrap {
    logger: Logger,
}

impl TiffWrap {
    /// Create a new TiffWrap instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, defaults to "tiffwrap.log"
    ///
    /// # Returns
    /// A TiffWrap instance or an error if initialization fails
    pub fn new(log_file: Option<&str>) -> WrapResult<Self> {
        let log_path = log_file.unwrap_or("tiffwrap.log");
        let logger = Logger::new(log_path)?;
        Ok(TiffWrap { logger })
    }

    /// Rewrap a JPEG file as a TIFF container
    ///
    /// # Arguments
    /// * `input_path` - Path to the JPEG input file
    /// * `output_path` - Optional output path; derived from the input
    ///   when omitted
    ///
    /// # Returns
    /// The path of the written TIFF file
    pub fn convert(&self, input_path: &str, output_path: Option<&str>) -> WrapResult<String> {
        let output = format_utils::resolve_output_name(input_path, output_path);
        info!("Rewrapping {} as {}", input_path, output);

        let (file_type, segments) = load_segments(input_path, &self.logger)?;
        if file_type != FileType::Jpeg {
            return Err(WrapError::GenericError(format!(
                "{} is already a TIFF container; only JPEG input can be rewrapped",
                input_path
            )));
        }

        let planner = TiffPlanner::new(&self.logger);
        let plan = planner.plan(&segments)?;
        TiffWriter::write_file(&plan, &output)?;
        Ok(output)
    }

    /// Analyze an input file and return a structure summary
    ///
    /// # Arguments
    /// * `input_path` - Path to the JPEG or TIFF file to analyze
    ///
    /// # Returns
    /// String describing the recognized segment structure
    pub fn analyze(&self, input_path: &str) -> WrapResult<String> {
        let (file_type, segments) = load_segments(input_path, &self.logger)?;

        let mut result = format!("{}: {} ({} segments)\n",
                                 input_path, file_type.name(), segments.len());
        for segment in segments.iter() {
            result.push_str(&format!(
                "  offset {:>10}, size {:>10}: {}{}\n",
                segment.offset,
                segment.size,
                segment.kind_name(),
                segment.label.as_deref().map(|l| format!(" ({})", l)).unwrap_or_default()
            ));
        }
        Ok(result)
    }
}

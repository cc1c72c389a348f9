//! File structure analysis command
//!
//! Implements the command that displays the recognized segment
//! structure of a JPEG or TIFF input file.

use clap::ArgMatches;
use log::{debug, info};

use crate::api;
use crate::commands::Command;
use crate::segment::{FrameInfo, Segment, SegmentKind};
use crate::tiff::errors::{WrapError, WrapResult};
use crate::utils::logger::Logger;
use crate::utils::tag_utils;

/// Command for analyzing the structure of an input file
pub struct AnalyzeCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Whether to enable verbose output
    verbose: bool,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> AnalyzeCommand<'a> {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new AnalyzeCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> WrapResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| WrapError::GenericError("Missing input file".to_string()))?
            .clone();

        let verbose = args.get_flag("verbose");

        Ok(AnalyzeCommand {
            input_file,
            verbose,
            logger,
        })
    }

    /// Display one segment line
    fn display_segment(&self, segment: &Segment) {
        let label = segment.label.as_deref().unwrap_or("");
        info!("{:>10}  {:>10}  {:<18} {}",
              segment.offset, segment.size, segment.kind_name(), label);

        match &segment.kind {
            SegmentKind::StartOfFrame => self.display_frame(segment),
            SegmentKind::TiffDirectory { entries, next_dir_offset, .. } => {
                for entry in entries {
                    info!("            {}", tag_utils::describe_entry(entry));
                }
                info!("            Next directory: {}", next_dir_offset);
            }
            _ => {}
        }
    }

    /// Display the derived fields of a start-of-frame segment
    fn display_frame(&self, segment: &Segment) {
        if let Ok(frame) = FrameInfo::parse(&segment.data) {
            info!("            {}x{}, precision {}, {} components",
                  frame.width, frame.length, frame.precision, frame.num_components());
            if self.verbose {
                for (i, component) in frame.components.iter().enumerate() {
                    info!("            Component {}: sampling {}x{}, quantization table {}",
                          component.id,
                          frame.horizontal_sampling(i),
                          frame.vertical_sampling(i),
                          component.quant_table);
                }
            }
        }
    }
}

impl<'a> Command for AnalyzeCommand<'a> {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn execute(&self) -> WrapResult<()> {
        info!("Analyzing file: {}", self.input_file);

        let (file_type, segments) = api::load_segments(&self.input_file, self.logger)?;

        info!("Format: {}", file_type.name());
        info!("{:>10}  {:>10}  {:<18}", "Offset", "Size", "Kind");
        for segment in segments.iter() {
            self.display_segment(segment);
            self.logger.log_segment(segment)?;
        }

        debug!("Analysis completed: {} segments", segments.len());
        self.logger.log(&format!("Analyzed {} ({} segments)", self.input_file, segments.len()))?;
        Ok(())
    }
}

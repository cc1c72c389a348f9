//! JPEG to TIFF conversion command
//!
//! Implements the command that rewraps a JPEG input file into a TIFF
//! container without re-encoding the compressed image data.

use clap::ArgMatches;
use log::info;

use crate::api;
use crate::commands::Command;
use crate::tiff::errors::{WrapError, WrapResult};
use crate::tiff::planner::TiffPlanner;
use crate::tiff::writer::TiffWriter;
use crate::utils::format_utils::{self, FileType};
use crate::utils::logger::Logger;

/// Command for rewrapping a JPEG file as TIFF
pub struct ConvertCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the output file
    output_file: String,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> ConvertCommand<'a> {
    /// Create a new convert command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    ///
    /// # Returns
    /// A new ConvertCommand instance or an error
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> WrapResult<Self> {
        let input_file = args.get_one::<String>("input")
            .ok_or_else(|| WrapError::GenericError("Missing input file".to_string()))?
            .clone();

        let output_file = format_utils::resolve_output_name(
            &input_file,
            args.get_one::<String>("output").map(String::as_str),
        );

        Ok(ConvertCommand {
            input_file,
            output_file,
            logger,
        })
    }
}

impl<'a> Command for ConvertCommand<'a> {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn execute(&self) -> WrapResult<()> {
        info!("Converting {} to {}", self.input_file, self.output_file);

        let (file_type, segments) = api::load_segments(&self.input_file, self.logger)?;
        if file_type != FileType::Jpeg {
            return Err(WrapError::GenericError(format!(
                "{} is already a TIFF container; only JPEG input can be rewrapped",
                self.input_file
            )));
        }

        let planner = TiffPlanner::new(self.logger);
        let plan = planner.plan(&segments)?;
        TiffWriter::write_file(&plan, &self.output_file)?;

        info!("Conversion successful: {}", self.output_file);
        self.logger.log(&format!("Wrote {}", self.output_file))?;
        Ok(())
    }
}

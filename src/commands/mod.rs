//! CLI command implementations
//!
//! The conversion and analysis commands, plus the small interfaces that
//! wire them to the argument parser.

pub mod analyze_command;
pub mod convert_command;

pub use analyze_command::AnalyzeCommand;
pub use convert_command::ConvertCommand;

use clap::ArgMatches;
use crate::tiff::errors::WrapResult;
use crate::utils::logger::Logger;

/// An executable operation of the tool
pub trait Command {
    /// Short name used in diagnostics and the run log
    fn name(&self) -> &'static str;

    /// Runs the operation
    fn execute(&self) -> WrapResult<()>;
}

/// Turns parsed CLI arguments into the command they ask for
pub trait CommandFactory<'a> {
    /// Picks and constructs the command for the given arguments
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> WrapResult<Box<dyn Command + 'a>>;
}

/// Factory choosing between conversion and analysis
pub struct TiffwrapCommandFactory;

impl TiffwrapCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        TiffwrapCommandFactory
    }
}

impl Default for TiffwrapCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for TiffwrapCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> WrapResult<Box<dyn Command + 'a>> {
        if args.get_flag("analyze") {
            Ok(Box::new(AnalyzeCommand::new(args, logger)?))
        } else {
            // Default to conversion
            Ok(Box::new(ConvertCommand::new(args, logger)?))
        }
    }
}

use clap::{Arg, ArgAction, Command as ClapCommand};
use log::{error, LevelFilter};
use std::process;

use tiffwrap::commands::{CommandFactory, TiffwrapCommandFactory};
use tiffwrap::utils::logger::Logger;

fn main() {
    let matches = ClapCommand::new("TiffWrap")
        .version("1.0")
        .about("Rewrap JPEG images as TIFF containers without re-encoding")
        .arg(
            Arg::new("input")
                .help("Input JPEG file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Output TIFF file (derived from the input when omitted)")
                .required(false)
                .index(2),
        )
        .arg(
            Arg::new("analyze")
                .short('a')
                .long("analyze")
                .help("Display the input file structure instead of converting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let logger = match Logger::new("tiffwrap.log") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = Logger::init_global_logger("tiffwrap-global.log", level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = TiffwrapCommandFactory::new();

    match factory.create_command(&matches, &logger) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("{} failed: {}", command.name(), e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}

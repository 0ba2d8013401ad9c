use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use tilde::core::config::{self, CliOverrides, LogLevel, ResolvedConfig, TildeConfig};
use tilde::error::AppError;
use tilde::tui;

#[derive(Parser)]
#[command(name = "tilde", about = "Raw-mode terminal viewport; Ctrl-Q quits")]
struct Args {
    /// TOML config file (nothing is read from disk without this)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Print each decoded key instead of drawing the viewport
    #[arg(short, long)]
    keys: bool,

    /// Letter that quits when pressed with Ctrl
    #[arg(short, long)]
    quit_key: Option<char>,

    /// Read timeout in deciseconds (VTIME)
    #[arg(short, long)]
    timeout: Option<u8>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            quit_key: self.quit_key,
            read_timeout_ds: self.timeout,
            log_file: self.log_file.clone(),
            log_level: self.log_level,
            keys: self.keys,
        }
    }
}

fn load(args: &Args) -> Result<ResolvedConfig, AppError> {
    let file_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => TildeConfig::default(),
    };
    Ok(config::resolve(&file_config, &args.overrides())?)
}

fn init_logging(config: &ResolvedConfig) {
    let Some(path) = &config.log_file else {
        return;
    };
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match File::create(path) {
        Ok(log_file) => {
            let _ = WriteLogger::init(config.log_level.filter(), log_config, log_file);
        }
        Err(e) => eprintln!("tilde: cannot open log file {}: {e}", path.display()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tilde: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);
    log::info!("Tilde starting up: {:?}", config);

    // By the time run() returns the terminal is back in cooked mode.
    match tui::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Exiting with error: {}", e);
            eprintln!("tilde: {e}");
            ExitCode::FAILURE
        }
    }
}

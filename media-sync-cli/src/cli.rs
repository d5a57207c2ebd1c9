use clap::Parser;
use core_runtime::logging::{LogFormat, LogLevel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "media-sync",
    version,
    about = "Sync photos and videos from public Yandex.Disk and Mail.ru links into WEEEK tasks"
)]
pub struct Cli {
    /// Public links to sync. Read from --input or stdin when omitted
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one or more links per line (`#` starts a comment)
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Plan only: report what would be created without writing to WEEEK
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub json: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log format: pretty, compact or json
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

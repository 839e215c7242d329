use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gsheet_core::modules::authenticator::DEFAULT_AUTH_TIMEOUT;
use gsheet_core::modules::callback_server::DEFAULT_CALLBACK_PORT;

#[derive(Parser, Debug)]
#[command(
    name = "gsheet",
    about = "Read Google Sheets ranges as JSON lines",
    version = env!("CARGO_PKG_VERSION"),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'd',
        long,
        env = "GSHEET_CONFIG_DIR",
        global = true,
        help = "Config directory [default: ~/.config/gsheet]"
    )]
    pub config_dir: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        env = "GSHEET_CREDENTIALS_FILE",
        global = true,
        help = "OAuth client secret file [default: <config-dir>/credentials.json]"
    )]
    pub credentials_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Discard the cached token and authorize again")]
    pub reauthenticate: bool,

    #[arg(
        long,
        env = "GSHEET_CALLBACK_PORT",
        global = true,
        default_value_t = DEFAULT_CALLBACK_PORT,
        help = "Local port for the OAuth redirect"
    )]
    pub callback_port: u16,

    #[arg(
        long,
        env = "GSHEET_AUTH_TIMEOUT",
        global = true,
        default_value_t = DEFAULT_AUTH_TIMEOUT.as_secs(),
        help = "Seconds to wait for browser authorization"
    )]
    pub auth_timeout: u64,

    #[arg(short, long, env = "RUST_LOG", global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Checks whether your cli is authenticated correctly")]
    Auth,

    #[command(about = "Get data from a spreadsheet")]
    Get {
        #[arg(short, long, help = "Spreadsheet ID")]
        spreadsheet_id: String,

        #[arg(required = true, help = "Ranges in A1 notation, e.g. 'Sheet1!A1:B2'")]
        ranges: Vec<String>,
    },
}

use clap::Parser;
use std::env;

use crate::cli::command::Command;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Serve a recipe and ingredient catalog over a JWT-protected REST API",
    long_about = "A catalog server for recipes and their ingredients, backed by SQLite. Runs as a daemon serving the REST API, or executes one-shot management subcommands.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long = "listen",
        env = "COOKBOOK_API_LISTEN",
        value_name = "ADDR",
        default_value = "127.0.0.1:8080",
        help = "REST API listen address (host:port)"
    )]
    pub listen: std::net::SocketAddr,

    #[arg(
        long,
        default_value = ".cookbook/",
        value_name = "DIR",
        help = "Directory to store persistent data"
    )]
    pub data_dir: String,

    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before starting"
    )]
    pub reset: bool,

    #[arg(
        long = "log-file",
        env = "COOKBOOK_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[arg(
        long = "jwt-secret",
        env = "COOKBOOK_JWT_SECRET",
        value_name = "SECRET",
        help = "Secret used to sign and verify API tokens"
    )]
    pub jwt_secret: String,

    #[arg(
        long = "access-ttl",
        env = "COOKBOOK_ACCESS_TTL_MINUTES",
        default_value_t = 30,
        value_name = "MINUTES",
        help = "Access token lifetime in minutes"
    )]
    pub access_ttl_minutes: i64,

    #[arg(
        long = "refresh-ttl",
        env = "COOKBOOK_REFRESH_TTL_MINUTES",
        default_value_t = 1440,
        value_name = "MINUTES",
        help = "Refresh token lifetime in minutes"
    )]
    pub refresh_ttl_minutes: i64,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}

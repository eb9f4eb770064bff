use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the BagusBlog binary.
#[derive(Debug, Parser)]
#[command(name = "bagusblog", version, about = "BagusBlog server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BAGUSBLOG_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the BagusBlog HTTP server.
    Serve(Box<ServeArgs>),
    /// Check that the hosted backend is reachable with the configured key, then exit.
    #[command(name = "check-backend")]
    CheckBackend(BackendOverrides),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BackendOverrides {
    /// Override the hosted backend base URL.
    #[arg(long = "backend-url", env = "SUPABASE_URL", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Override the backend's public (anon) API key.
    #[arg(
        long = "backend-anon-key",
        env = "SUPABASE_ANON_KEY",
        value_name = "KEY",
        hide_env_values = true
    )]
    pub backend_anon_key: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub backend: BackendOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the maximum request size for uploads in bytes.
    #[arg(long = "uploads-max-request-bytes", value_name = "BYTES")]
    pub uploads_max_request_bytes: Option<u64>,

    /// Override the public base URL used in share links.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,

    /// Mark session cookies `Secure`.
    #[arg(
        long = "session-secure-cookies",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub session_secure_cookies: Option<bool>,
}

impl BackendOverrides {
    /// Values clap would pick up from the environment when no subcommand is given.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|value| !value.trim().is_empty());
        Self {
            backend_url: read("SUPABASE_URL"),
            backend_anon_key: read("SUPABASE_ANON_KEY"),
        }
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the VGWritings binary.
#[derive(Debug, Parser)]
#[command(name = "vgwritings", version, about = "VGWritings blog server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VGWRITINGS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the VGWritings HTTP server.
    Serve(Box<ServeArgs>),
    /// Download every content document into a local dataset file.
    #[command(name = "export")]
    Export(ExportArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the content backend (sanity|file).
    #[arg(long = "content-backend", value_name = "BACKEND")]
    pub backend: Option<String>,

    /// Override the content store project id.
    #[arg(long = "content-project-id", value_name = "ID")]
    pub project_id: Option<String>,

    /// Override the content store dataset.
    #[arg(long = "content-dataset", value_name = "NAME")]
    pub dataset: Option<String>,

    /// Override the content store API version.
    #[arg(long = "content-api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Toggle the content store CDN.
    #[arg(
        long = "content-use-cdn",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub use_cdn: Option<bool>,

    /// Override the content store API host.
    #[arg(long = "content-api-host", value_name = "URL")]
    pub api_host: Option<String>,

    /// Override the local dataset file used by the file backend.
    #[arg(long = "content-dataset-path", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub dataset_path: Option<PathBuf>,

    /// Override the content request timeout.
    #[arg(long = "content-timeout-seconds", value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

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

    /// Override the public site URL used in share links.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,

    /// Override the theme served to first-time visitors (light|dark).
    #[arg(long = "site-default-theme", value_name = "THEME")]
    pub site_default_theme: Option<String>,

    /// Override the bundled travels data file.
    #[arg(long = "travels-data-path", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub travels_data_path: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Path to the dataset file to write.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

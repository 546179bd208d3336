//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::site::{
    CareerEntry, DEFAULT_PUBLIC_URL, DEFAULT_SITE_DESCRIPTION, DEFAULT_SITE_TITLE, SocialLink,
    default_career, default_social_links,
};
use crate::domain::theme::Theme;

pub use cli::{CliArgs, Command, ContentOverrides, ExportArgs, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vgwritings";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2024-01-01";
const DEFAULT_DATASET_PATH: &str = "data/dataset.json";
const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TRAVELS_DATA_PATH: &str = "data/blog-data.json";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub site: SiteSettings,
    pub travels: TravelsSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Where posts and about documents are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentBackend {
    /// The hosted content store query API.
    Sanity,
    /// A local JSON dataset, as written by the `export` command.
    File,
}

impl FromStr for ContentBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sanity" => Ok(ContentBackend::Sanity),
            "file" => Ok(ContentBackend::File),
            other => Err(format!("unknown backend `{other}` (expected sanity|file)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub backend: ContentBackend,
    pub project_id: Option<String>,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    /// Replaces the derived `https://<project>.api[cdn].sanity.io` host.
    pub api_host: Option<Url>,
    pub dataset_path: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    pub public_url: Url,
    pub default_theme: Theme,
    /// Footer profile links; `[[site.social]]` entries replace the defaults.
    pub social: Vec<SocialLink>,
    /// Home page timeline; `[[site.career]]` entries replace the defaults.
    pub career: Vec<CareerEntry>,
}

#[derive(Debug, Clone)]
pub struct TravelsSettings {
    pub data_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VGWRITINGS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Export(args)) => raw.apply_content_overrides(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    site: RawSiteSettings,
    travels: RawTravelsSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.site_public_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }
        if let Some(theme) = overrides.site_default_theme.as_ref() {
            self.site.default_theme = Some(theme.clone());
        }
        if let Some(path) = overrides.travels_data_path.as_ref() {
            self.travels.data_path = Some(path.clone());
        }

        self.apply_content_overrides(&overrides.content);
    }

    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(backend) = overrides.backend.as_ref() {
            self.content.backend = Some(backend.clone());
        }
        if let Some(project_id) = overrides.project_id.as_ref() {
            self.content.project_id = Some(project_id.clone());
        }
        if let Some(dataset) = overrides.dataset.as_ref() {
            self.content.dataset = Some(dataset.clone());
        }
        if let Some(version) = overrides.api_version.as_ref() {
            self.content.api_version = Some(version.clone());
        }
        if let Some(use_cdn) = overrides.use_cdn {
            self.content.use_cdn = Some(use_cdn);
        }
        if let Some(host) = overrides.api_host.as_ref() {
            self.content.api_host = Some(host.clone());
        }
        if let Some(path) = overrides.dataset_path.as_ref() {
            self.content.dataset_path = Some(path.clone());
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.content.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            site,
            travels,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let content = build_content_settings(content)?;
        let site = build_site_settings(site)?;
        let travels = build_travels_settings(travels);

        Ok(Self {
            server,
            logging,
            content,
            site,
            travels,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let backend = match content.backend {
        Some(value) => ContentBackend::from_str(&value)
            .map_err(|reason| LoadError::invalid("content.backend", reason))?,
        None => ContentBackend::File,
    };

    let project_id = non_blank(content.project_id);
    if let Some(project) = project_id.as_deref() {
        let valid = project
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
        if !valid {
            return Err(LoadError::invalid(
                "content.project_id",
                "may only contain letters, digits and dashes",
            ));
        }
    }
    if backend == ContentBackend::Sanity && project_id.is_none() {
        return Err(LoadError::invalid(
            "content.project_id",
            "required when content.backend is `sanity`",
        ));
    }

    let dataset = non_blank(content.dataset).unwrap_or_else(|| DEFAULT_DATASET.to_string());
    let api_version =
        non_blank(content.api_version).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
    let api_version = api_version.trim_start_matches('v').to_string();

    let api_host = match non_blank(content.api_host) {
        Some(raw) => Some(parse_http_url(&raw, "content.api_host")?),
        None => None,
    };

    let timeout_secs = content
        .timeout_seconds
        .unwrap_or(DEFAULT_CONTENT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "content.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ContentSettings {
        backend,
        project_id,
        dataset,
        api_version,
        use_cdn: content.use_cdn.unwrap_or(true),
        token: non_blank(content.token),
        api_host,
        dataset_path: content
            .dataset_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let public_url = non_blank(site.public_url).unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
    let public_url = parse_http_url(&public_url, "site.public_url")?;

    let default_theme = match non_blank(site.default_theme) {
        Some(value) => Theme::from_str(&value)
            .map_err(|err| LoadError::invalid("site.default_theme", err.to_string()))?,
        None => Theme::default(),
    };

    let social = match site.social {
        Some(links) => links
            .into_iter()
            .map(build_social_link)
            .collect::<Result<_, _>>()?,
        None => default_social_links(),
    };

    let career = match site.career {
        Some(entries) => entries
            .into_iter()
            .map(build_career_entry)
            .collect::<Result<_, _>>()?,
        None => default_career(),
    };

    Ok(SiteSettings {
        title: non_blank(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
        description: non_blank(site.description)
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
        public_url,
        default_theme,
        social,
        career,
    })
}

fn build_social_link(link: RawSocialLink) -> Result<SocialLink, LoadError> {
    let label = non_blank(link.label)
        .ok_or_else(|| LoadError::invalid("site.social.label", "label must not be blank"))?;
    let href = non_blank(link.href)
        .ok_or_else(|| LoadError::invalid("site.social.href", "href must not be blank"))?;
    let href = parse_http_url(&href, "site.social.href")?;
    Ok(SocialLink {
        label,
        href: href.to_string(),
    })
}

fn build_career_entry(entry: RawCareerEntry) -> Result<CareerEntry, LoadError> {
    let company = non_blank(entry.company)
        .ok_or_else(|| LoadError::invalid("site.career.company", "company must not be blank"))?;
    Ok(CareerEntry {
        company,
        period: non_blank(entry.period).unwrap_or_default(),
        role: non_blank(entry.role).unwrap_or_default(),
        description: non_blank(entry.description).unwrap_or_default(),
        highlights: entry
            .highlights
            .into_iter()
            .filter_map(|item| non_blank(Some(item)))
            .collect(),
    })
}

fn build_travels_settings(travels: RawTravelsSettings) -> TravelsSettings {
    TravelsSettings {
        data_path: travels
            .data_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAVELS_DATA_PATH)),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    backend: Option<String>,
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    use_cdn: Option<bool>,
    token: Option<String>,
    api_host: Option<String>,
    dataset_path: Option<PathBuf>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    description: Option<String>,
    public_url: Option<String>,
    default_theme: Option<String>,
    social: Option<Vec<RawSocialLink>>,
    career: Option<Vec<RawCareerEntry>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSocialLink {
    label: Option<String>,
    href: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCareerEntry {
    company: Option<String>,
    period: Option<String>,
    role: Option<String>,
    description: Option<String>,
    highlights: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTravelsSettings {
    data_path: Option<PathBuf>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_http_url(raw: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| LoadError::invalid(key, format!("invalid url `{raw}`: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "url must use http or https"));
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

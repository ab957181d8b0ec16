//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    path::PathBuf,
    str::FromStr,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "hottake";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_FEED_PAGE_SIZE: u32 = 10;
const MAX_FEED_PAGE_SIZE: u32 = 100;

/// Command-line arguments for the hottake binary.
#[derive(Debug, Parser)]
#[command(name = "hottake", version, about = "hottake feed server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "HOTTAKE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the hottake HTTP service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
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

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Block requests on the first connection attempt (local/dev) instead
    /// of failing them until the store becomes ready (production).
    #[arg(
        long = "database-await-connection",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub database_await_connection: Option<bool>,

    /// Override the feed page size.
    #[arg(long = "feed-page-size", value_name = "COUNT")]
    pub feed_page_size: Option<u32>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl LoadError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub server: RawServerSettings,
    pub logging: RawLoggingSettings,
    pub database: RawDatabaseSettings,
    pub feed: RawFeedSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawLoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub await_connection: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawFeedSettings {
    pub page_size: Option<u32>,
}

impl RawSettings {
    pub fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = &overrides.server_host {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.format = Some(if json { "json" } else { "compact" }.to_string());
        }
        if let Some(url) = &overrides.database_url {
            self.database.url = Some(url.clone());
        }
        if let Some(count) = overrides.database_max_connections {
            self.database.max_connections = Some(count);
        }
        if let Some(await_connection) = overrides.database_await_connection {
            self.database.await_connection = Some(await_connection);
        }
        if let Some(page_size) = overrides.feed_page_size {
            self.feed.page_size = Some(page_size);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub feed: FeedSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
    /// `true` (local/dev): the first request blocks on the shared
    /// connection attempt. `false` (production): establishment is started
    /// in the background and requests fail with 503 until it is ready.
    pub await_connection: bool,
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: NonZeroU32,
}

impl Settings {
    pub fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let host = raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host
            .parse()
            .map_err(|_| LoadError::invalid(format!("server host `{host}` is not an address")))?;
        let port = raw.server.port.unwrap_or(DEFAULT_PORT);

        let level = match raw.logging.level {
            Some(level) => LevelFilter::from_str(&level)
                .map_err(|_| LoadError::invalid(format!("unknown log level `{level}`")))?,
            None => LevelFilter::INFO,
        };
        let format = match raw.logging.format.as_deref() {
            Some("json") => LogFormat::Json,
            Some("compact") | None => LogFormat::Compact,
            Some(other) => {
                return Err(LoadError::invalid(format!("unknown log format `{other}`")));
            }
        };

        let max_connections = raw
            .database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let max_connections = NonZeroU32::new(max_connections)
            .ok_or_else(|| LoadError::invalid("database max_connections must be positive"))?;

        let page_size = raw.feed.page_size.unwrap_or(DEFAULT_FEED_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_FEED_PAGE_SIZE {
            return Err(LoadError::invalid(format!(
                "feed page_size must be in 1..={MAX_FEED_PAGE_SIZE}"
            )));
        }
        let page_size = NonZeroU32::new(page_size)
            .ok_or_else(|| LoadError::invalid("feed page_size must be positive"))?;

        Ok(Self {
            server: ServerSettings {
                addr: SocketAddr::new(host, port),
            },
            logging: LoggingSettings { level, format },
            database: DatabaseSettings {
                url: raw.database.url,
                max_connections,
                await_connection: raw.database.await_connection.unwrap_or(true),
            },
            feed: FeedSettings { page_size },
        })
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = &cli.config_file {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("HOTTAKE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    if let Some(Command::Serve(args)) = &cli.command {
        raw.apply_serve_overrides(&args.overrides);
    }

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_PORT: u16 = 8823;
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Server,
    Scan,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub memory_bank_path: PathBuf,
    pub static_dir: PathBuf,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub log_level: String,
    pub log_format: String,
    pub mode: Mode,
    pub project: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            memory_bank_path: PathBuf::from("memory-bank-data"),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            allowed_origins: Vec::new(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            mode: Mode::Server,
            project: None,
        }
    }
}

pub fn command() -> Command {
    Command::new("mbkanban")
        .version(env!("CARGO_PKG_VERSION"))
        .about(crate::DESCRIPTION)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .env("PORT")
                .value_name("PORT")
                .help("HTTP port")
                .value_parser(clap::value_parser!(u16))
                .default_value("8823"),
        )
        .arg(
            Arg::new("memory-bank")
                .short('d')
                .long("memory-bank")
                .env("MEMORY_BANK_PATH")
                .value_name("PATH")
                .help("Directory holding one sub-directory per project")
                .default_value("memory-bank-data"),
        )
        .arg(
            Arg::new("static-dir")
                .long("static-dir")
                .env("STATIC_DIR")
                .value_name("PATH")
                .help("Directory with the browser client")
                .default_value(DEFAULT_STATIC_DIR),
        )
        .arg(
            Arg::new("allowed-origins")
                .long("allowed-origins")
                .env("ALLOWED_ORIGINS")
                .value_name("ORIGINS")
                .help("Comma separated CORS origins, any origin when empty")
                .default_value(""),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .default_value("info"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .value_parser(["pretty", "json"])
                .default_value("pretty"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Execution mode: server, scan")
                .value_parser(["server", "scan"])
                .default_value("server"),
        )
        .arg(
            Arg::new("project")
                .long("project")
                .value_name("NAME")
                .help("Project to print in scan mode"),
        )
}

impl ServerConfig {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let mode = match matches.get_one::<String>("mode").map(String::as_str) {
            Some("scan") => Mode::Scan,
            _ => Mode::Server,
        };
        let project = matches.get_one::<String>("project").cloned();
        if mode == Mode::Scan && project.is_none() {
            anyhow::bail!("--project is required in scan mode");
        }

        Ok(Self {
            port: matches.get_one::<u16>("port").copied().unwrap_or(defaults.port),
            memory_bank_path: matches
                .get_one::<String>("memory-bank")
                .map(PathBuf::from)
                .unwrap_or(defaults.memory_bank_path),
            static_dir: matches
                .get_one::<String>("static-dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            allowed_origins: matches
                .get_one::<String>("allowed-origins")
                .map(|raw| parse_origins(raw))
                .unwrap_or_default(),
            log_level: matches
                .get_one::<String>("log-level")
                .cloned()
                .unwrap_or(defaults.log_level),
            log_format: matches
                .get_one::<String>("log-format")
                .cloned()
                .unwrap_or(defaults.log_format),
            mode,
            project,
        })
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(log_level: &str, log_format: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("failed to initialise json logging")?,
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .context("failed to initialise pretty logging")?,
        other => anyhow::bail!("unsupported log format: {other}"),
    }
    Ok(())
}

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Config file picked up from the working directory when none is given.
const CWD_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the knowledge assistant backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", num_args = 0..=1, default_missing_value = "true")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub request_timeout_secs: u64,
    /// Views untouched for this long are evicted.
    pub view_idle_timeout_secs: u64,
    pub view_sweep_interval_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn view_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.view_idle_timeout_secs)
    }

    #[must_use]
    pub fn view_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.view_sweep_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            request_timeout_secs: 200,
            view_idle_timeout_secs: 30 * 60,
            view_sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Model override forwarded with every request.
    #[serde(default)]
    pub model: Option<String>,
}

impl BackendConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 180_000,
            model: None,
        }
    }
}

/// Strings shown by the widget.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub title: String,
    pub placeholder: String,
    pub search_heading: String,
    pub error_prefix: String,
    pub unknown_error: String,
    /// Script URL for HTMX.
    pub htmx_src: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "个人知识助手".to_string(),
            placeholder: "请输入您的问题...".to_string(),
            search_heading: "相关搜索结果：".to_string(),
            error_prefix: "抱歉，发生了错误：".to_string(),
            unknown_error: "未知错误".to_string(),
            htmx_src: "https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let AppConfig {
            server,
            backend,
            ui,
            log,
        } = AppConfig::default();

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.port", i64::from(server.port))?
            .set_default("server.host", server.host)?
            .set_default("server.request_timeout_secs", server.request_timeout_secs)?
            .set_default("server.view_idle_timeout_secs", server.view_idle_timeout_secs)?
            .set_default(
                "server.view_sweep_interval_secs",
                server.view_sweep_interval_secs,
            )?
            .set_default("backend.base_url", backend.base_url)?
            .set_default("backend.timeout_ms", backend.timeout_ms)?
            .set_default("ui.title", ui.title)?
            .set_default("ui.placeholder", ui.placeholder)?
            .set_default("ui.search_heading", ui.search_heading)?
            .set_default("ui.error_prefix", ui.error_prefix)?
            .set_default("ui.unknown_error", ui.unknown_error)?
            .set_default("ui.htmx_src", ui.htmx_src)?
            .set_default("log.json", log.json)?;

        // 2. Config file: explicit path must exist, ./config.yaml is optional
        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::from(Path::new(path)).required(true));
            }
            None if Path::new(CWD_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::from(Path::new(CWD_CONFIG_FILE)));
            }
            None => {}
        }

        // 3. Environment variables (prefixed with KCHAT_), e.g. KCHAT_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("KCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and the env vars clap maps onto them) win
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("log.json", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

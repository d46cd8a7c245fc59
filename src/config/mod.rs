use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend root, e.g. `http://localhost:3333`. Endpoint paths start with `/api/`.
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where `session.json` lives. `None` means `$HOME/.config/personas`.
    pub config_dir: Option<PathBuf>,
    pub monitor_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub persona_page_size: usize,
    pub audit_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PERSONAS_API_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                self.api.base_url = trimmed.to_string();
            }
        }
        if let Ok(v) = env::var("PERSONAS_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }

        if let Ok(v) = env::var("PERSONAS_CONFIG_DIR") {
            if !v.trim().is_empty() {
                self.session.config_dir = Some(PathBuf::from(v));
            }
        }
        if let Ok(v) = env::var("PERSONAS_MONITOR_INTERVAL_SECS") {
            self.session.monitor_interval_secs = v
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .unwrap_or(self.session.monitor_interval_secs);
        }

        if let Ok(v) = env::var("PERSONAS_PAGE_SIZE") {
            self.display.persona_page_size = v
                .parse()
                .ok()
                .filter(|size| *size > 0)
                .unwrap_or(self.display.persona_page_size);
        }
        if let Ok(v) = env::var("PERSONAS_AUDIT_PAGE_SIZE") {
            self.display.audit_page_size = v
                .parse()
                .ok()
                .filter(|size| *size > 0)
                .unwrap_or(self.display.audit_page_size);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:3333".to_string(),
                request_timeout_secs: 10,
            },
            session: SessionConfig {
                config_dir: None,
                monitor_interval_secs: 5,
            },
            display: DisplayConfig {
                persona_page_size: 5,
                audit_page_size: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            session: SessionConfig {
                config_dir: None,
                monitor_interval_secs: 30,
            },
            ..Self::development()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.session.monitor_interval_secs)
    }

    /// Resolve (and create) the directory holding persisted client state.
    pub fn config_dir(&self) -> anyhow::Result<PathBuf> {
        let config_dir = match &self.session.config_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
                PathBuf::from(home).join(".config").join("personas")
            }
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(config_dir)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

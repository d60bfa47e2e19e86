use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use gpui::*;
use gpui_component::{Theme, ThemeMode, ThemeRegistry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use socrates_llm::{
    ClientConfig, DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, DEFAULT_POLL_INTERVAL,
    DEFAULT_READINESS_TIMEOUT, ReadinessGate, resolve_model_id,
};

pub const DEFAULT_PROVIDER_ID: &str = "openai";
pub const SETTINGS_DIRECTORY_NAME: &str = "socrates";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_ENV_PREFIX: &str = "SOCRATES_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_readiness_timeout_ms")]
    pub readiness_timeout_ms: u64,
    #[serde(
        default = "default_theme_mode",
        serialize_with = "serialize_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
    #[serde(default)]
    pub theme_name: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            provider_id: default_provider_id(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            poll_interval_ms: default_poll_interval_ms(),
            readiness_timeout_ms: default_readiness_timeout_ms(),
            theme_mode: default_theme_mode(),
            theme_name: String::new(),
        }
    }
}

impl ChatSettings {
    pub fn to_client_config(&self) -> Option<ClientConfig> {
        if self.api_key.trim().is_empty() {
            return None;
        }

        Some(ClientConfig::new(
            &self.provider_id,
            &self.api_key,
            &self.endpoint,
        ))
    }

    pub fn readiness_gate(&self) -> ReadinessGate {
        ReadinessGate::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.readiness_timeout_ms),
        )
    }

    /// Fills a missing key from the conventional OpenAI variables.
    ///
    /// `OPENAI_BASE_URL` and `OPENAI_MODEL` only apply when the key came from
    /// `OPENAI_API_KEY`, so a configured provider is never half-overridden.
    pub fn with_openai_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if !self.api_key.trim().is_empty() {
            return self;
        }

        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let Some(api_key) = non_blank("OPENAI_API_KEY") else {
            return self;
        };

        tracing::info!("using OPENAI_API_KEY from environment");
        self.api_key = api_key;
        if let Some(endpoint) = non_blank("OPENAI_BASE_URL") {
            self.endpoint = endpoint;
        }
        if let Some(model) = non_blank("OPENAI_MODEL") {
            self.model = model;
        }
        self
    }

    pub fn normalized(mut self) -> Self {
        self.provider_id = if self.provider_id.trim().is_empty() {
            default_provider_id()
        } else {
            self.provider_id.trim().to_string()
        };
        self.api_key = self.api_key.trim().to_string();
        self.endpoint = if self.endpoint.trim().is_empty() {
            default_endpoint()
        } else {
            self.endpoint.trim().to_string()
        };
        self.model = resolve_model_id(&self.model);
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = default_poll_interval_ms();
        }
        if self.readiness_timeout_ms == 0 {
            self.readiness_timeout_ms = default_readiness_timeout_ms();
        }
        self.theme_name = self.theme_name.trim().to_string();
        self
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        if let Some(theme_config) = ThemeRegistry::global(cx)
            .themes()
            .get(&SharedString::from(self.theme_name.clone()))
            .cloned()
        {
            let mode = theme_config.mode;
            let theme = Theme::global_mut(cx);
            if mode.is_dark() {
                theme.dark_theme = theme_config;
            } else {
                theme.light_theme = theme_config;
            }
            Theme::change(mode, window, cx);
            return;
        }

        Theme::change(self.theme_mode, window, cx);
    }
}

/// Layered settings: defaults, then the JSON file, then `SOCRATES_*` variables.
pub struct SettingsStore {
    settings: ArcSwap<ChatSettings>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".socrates"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: ArcSwap::from_pointee(settings),
            config_path,
        }
    }

    pub fn load() -> Arc<Self> {
        Arc::new(Self::new(Self::default_config_path()))
    }

    pub fn settings(&self) -> Arc<ChatSettings> {
        self.settings.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Re-reads every layer and swaps the result in.
    pub fn reload(&self) -> Arc<ChatSettings> {
        let settings = Arc::new(Self::load_from_disk(&self.config_path));
        self.settings.store(settings.clone());
        settings
    }

    fn load_from_disk(path: &Path) -> ChatSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }

        let figment = Figment::from(Serialized::defaults(ChatSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX));

        extract_settings(figment).with_openai_fallback(|name| std::env::var(name).ok())
    }
}

fn extract_settings(figment: Figment) -> ChatSettings {
    match figment.extract::<ChatSettings>() {
        Ok(settings) => settings.normalized(),
        Err(error) => {
            tracing::warn!("failed to parse settings: {}. using defaults", error);
            ChatSettings::default()
        }
    }
}

fn default_provider_id() -> String {
    DEFAULT_PROVIDER_ID.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_OPENAI_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_readiness_timeout_ms() -> u64 {
    DEFAULT_READINESS_TIMEOUT.as_millis() as u64
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Dark
}

fn serialize_theme_mode<S>(value: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.name())
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(parse_theme_mode(&value))
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("light") {
        ThemeMode::Light
    } else {
        ThemeMode::Dark
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for the quote lookup timeout. Meta retries webhook deliveries
/// that are not acknowledged in time, so the lookup must finish well before that.
pub const MAX_QUOTE_TIMEOUT_SECS: u64 = 10;

/// Upper bound for the quote lookup and the reply send together. Both run
/// before the webhook is acknowledged, one after the other.
pub const MAX_ACK_BUDGET_SECS: u64 = 20;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub whatsapp: WhatsAppConfig,
    pub quotes: QuotesConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    pub access_token: SecretString,
    pub phone_number_id: String,
    pub verify_token: SecretString,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct QuotesConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub whatsapp_access_token: Option<String>,
    pub whatsapp_phone_number_id: Option<String>,
    pub whatsapp_verify_token: Option<String>,
    pub whatsapp_api_base_url: Option<String>,
    pub quotes_api_key: Option<String>,
    pub quotes_base_url: Option<String>,
    pub quotes_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            whatsapp: WhatsAppConfig {
                access_token: String::new().into(),
                phone_number_id: String::new(),
                verify_token: String::new().into(),
                api_base_url: "https://graph.facebook.com/v22.0".to_string(),
                timeout_secs: 10,
            },
            quotes: QuotesConfig {
                api_key: String::new().into(),
                base_url: "https://api.twelvedata.com".to_string(),
                timeout_secs: 5,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("pricewire.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(whatsapp) = patch.whatsapp {
            if let Some(access_token_value) = whatsapp.access_token {
                self.whatsapp.access_token = secret_value(access_token_value);
            }
            if let Some(phone_number_id) = whatsapp.phone_number_id {
                self.whatsapp.phone_number_id = phone_number_id;
            }
            if let Some(verify_token_value) = whatsapp.verify_token {
                self.whatsapp.verify_token = secret_value(verify_token_value);
            }
            if let Some(api_base_url) = whatsapp.api_base_url {
                self.whatsapp.api_base_url = api_base_url;
            }
            if let Some(timeout_secs) = whatsapp.timeout_secs {
                self.whatsapp.timeout_secs = timeout_secs;
            }
        }

        if let Some(quotes) = patch.quotes {
            if let Some(api_key_value) = quotes.api_key {
                self.quotes.api_key = secret_value(api_key_value);
            }
            if let Some(base_url) = quotes.base_url {
                self.quotes.base_url = base_url;
            }
            if let Some(timeout_secs) = quotes.timeout_secs {
                self.quotes.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PRICEWIRE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PRICEWIRE_SERVER_PORT") {
            self.server.port = parse_u16("PRICEWIRE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("PRICEWIRE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("PRICEWIRE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        // The unprefixed names are the ones the Meta and Twelve Data quick-start
        // guides put in `.env`; the prefixed names win when both are set.
        let access_token =
            read_env("PRICEWIRE_WHATSAPP_ACCESS_TOKEN").or_else(|| read_env("WHATSAPP_TOKEN"));
        if let Some(value) = access_token {
            self.whatsapp.access_token = secret_value(value);
        }
        let phone_number_id = read_env("PRICEWIRE_WHATSAPP_PHONE_NUMBER_ID")
            .or_else(|| read_env("WHATSAPP_PHONE_NUMBER_ID"));
        if let Some(value) = phone_number_id {
            self.whatsapp.phone_number_id = value;
        }
        let verify_token =
            read_env("PRICEWIRE_WHATSAPP_VERIFY_TOKEN").or_else(|| read_env("VERIFY_TOKEN"));
        if let Some(value) = verify_token {
            self.whatsapp.verify_token = secret_value(value);
        }
        if let Some(value) = read_env("PRICEWIRE_WHATSAPP_API_BASE_URL") {
            self.whatsapp.api_base_url = value;
        }
        if let Some(value) = read_env("PRICEWIRE_WHATSAPP_TIMEOUT_SECS") {
            self.whatsapp.timeout_secs = parse_u64("PRICEWIRE_WHATSAPP_TIMEOUT_SECS", &value)?;
        }

        let api_key = read_env("PRICEWIRE_QUOTES_API_KEY").or_else(|| read_env("API_KEY"));
        if let Some(value) = api_key {
            self.quotes.api_key = secret_value(value);
        }
        if let Some(value) = read_env("PRICEWIRE_QUOTES_BASE_URL") {
            self.quotes.base_url = value;
        }
        if let Some(value) = read_env("PRICEWIRE_QUOTES_TIMEOUT_SECS") {
            self.quotes.timeout_secs = parse_u64("PRICEWIRE_QUOTES_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("PRICEWIRE_LOGGING_LEVEL").or_else(|| read_env("PRICEWIRE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PRICEWIRE_LOGGING_FORMAT").or_else(|| read_env("PRICEWIRE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(access_token) = overrides.whatsapp_access_token {
            self.whatsapp.access_token = secret_value(access_token);
        }
        if let Some(phone_number_id) = overrides.whatsapp_phone_number_id {
            self.whatsapp.phone_number_id = phone_number_id;
        }
        if let Some(verify_token) = overrides.whatsapp_verify_token {
            self.whatsapp.verify_token = secret_value(verify_token);
        }
        if let Some(api_base_url) = overrides.whatsapp_api_base_url {
            self.whatsapp.api_base_url = api_base_url;
        }
        if let Some(api_key) = overrides.quotes_api_key {
            self.quotes.api_key = secret_value(api_key);
        }
        if let Some(base_url) = overrides.quotes_base_url {
            self.quotes.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.quotes_timeout_secs {
            self.quotes.timeout_secs = timeout_secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_whatsapp(&self.whatsapp)?;
        validate_quotes(&self.quotes)?;
        validate_ack_budget(&self.whatsapp, &self.quotes)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("pricewire.toml"), PathBuf::from("config/pricewire.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_whatsapp(whatsapp: &WhatsAppConfig) -> Result<(), ConfigError> {
    if whatsapp.access_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "whatsapp.access_token is required. Get it from https://developers.facebook.com/apps > Your App > WhatsApp > API Setup".to_string(),
        ));
    }

    if whatsapp.phone_number_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "whatsapp.phone_number_id is required. It is listed next to the sender number under WhatsApp > API Setup".to_string(),
        ));
    }

    if whatsapp.verify_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "whatsapp.verify_token is required and must match the token entered in the Meta webhook configuration".to_string(),
        ));
    }

    validate_http_url("whatsapp.api_base_url", &whatsapp.api_base_url)?;

    if whatsapp.timeout_secs == 0 || whatsapp.timeout_secs > MAX_ACK_BUDGET_SECS {
        return Err(ConfigError::Validation(format!(
            "whatsapp.timeout_secs must be in range 1..={MAX_ACK_BUDGET_SECS}"
        )));
    }

    Ok(())
}

fn validate_quotes(quotes: &QuotesConfig) -> Result<(), ConfigError> {
    if quotes.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "quotes.api_key is required. Get it from https://twelvedata.com/account/api-keys"
                .to_string(),
        ));
    }

    validate_http_url("quotes.base_url", &quotes.base_url)?;

    if quotes.timeout_secs == 0 || quotes.timeout_secs > MAX_QUOTE_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "quotes.timeout_secs must be in range 1..={MAX_QUOTE_TIMEOUT_SECS}"
        )));
    }

    Ok(())
}

fn validate_ack_budget(whatsapp: &WhatsAppConfig, quotes: &QuotesConfig) -> Result<(), ConfigError> {
    let total = quotes.timeout_secs.saturating_add(whatsapp.timeout_secs);
    if total > MAX_ACK_BUDGET_SECS {
        return Err(ConfigError::Validation(format!(
            "quotes.timeout_secs + whatsapp.timeout_secs is {total}s; it must not exceed {MAX_ACK_BUDGET_SECS}s"
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{key} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    whatsapp: Option<WhatsAppPatch>,
    quotes: Option<QuotesPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WhatsAppPatch {
    access_token: Option<String>,
    phone_number_id: Option<String>,
    verify_token: Option<String>,
    api_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct QuotesPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

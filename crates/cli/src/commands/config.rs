use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pricewire_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    let mut push = |key: &str, value: &str, env_keys: &[&str]| {
        lines.push(render_line(
            key,
            value,
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    };

    push("server.bind_address", &config.server.bind_address, &["PRICEWIRE_SERVER_BIND_ADDRESS"]);
    push("server.port", &config.server.port.to_string(), &["PRICEWIRE_SERVER_PORT"]);
    push(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        &["PRICEWIRE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
    );

    push(
        "whatsapp.access_token",
        &redact_secret(config.whatsapp.access_token.expose_secret()),
        &["PRICEWIRE_WHATSAPP_ACCESS_TOKEN", "WHATSAPP_TOKEN"],
    );
    push(
        "whatsapp.phone_number_id",
        &config.whatsapp.phone_number_id,
        &["PRICEWIRE_WHATSAPP_PHONE_NUMBER_ID", "WHATSAPP_PHONE_NUMBER_ID"],
    );
    push(
        "whatsapp.verify_token",
        &redact_secret(config.whatsapp.verify_token.expose_secret()),
        &["PRICEWIRE_WHATSAPP_VERIFY_TOKEN", "VERIFY_TOKEN"],
    );
    push(
        "whatsapp.api_base_url",
        &config.whatsapp.api_base_url,
        &["PRICEWIRE_WHATSAPP_API_BASE_URL"],
    );
    push(
        "whatsapp.timeout_secs",
        &config.whatsapp.timeout_secs.to_string(),
        &["PRICEWIRE_WHATSAPP_TIMEOUT_SECS"],
    );

    push(
        "quotes.api_key",
        &redact_secret(config.quotes.api_key.expose_secret()),
        &["PRICEWIRE_QUOTES_API_KEY", "API_KEY"],
    );
    push("quotes.base_url", &config.quotes.base_url, &["PRICEWIRE_QUOTES_BASE_URL"]);
    push(
        "quotes.timeout_secs",
        &config.quotes.timeout_secs.to_string(),
        &["PRICEWIRE_QUOTES_TIMEOUT_SECS"],
    );

    push(
        "logging.level",
        &config.logging.level,
        &["PRICEWIRE_LOGGING_LEVEL", "PRICEWIRE_LOG_LEVEL"],
    );
    push(
        "logging.format",
        &format!("{:?}", config.logging.format),
        &["PRICEWIRE_LOGGING_FORMAT", "PRICEWIRE_LOG_FORMAT"],
    );

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("pricewire.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/pricewire.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let set_env_key = env_keys.iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    });
    if let Some(env_key) = set_env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    // Meta access tokens start with a stable `EAA` app marker.
    let prefix: String = trimmed.chars().take(3).collect();
    if trimmed.chars().count() > 12 && prefix == "EAA" {
        return format!("{prefix}***");
    }

    "<redacted>".to_string()
}

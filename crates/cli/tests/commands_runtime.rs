use std::env;
use std::net::TcpListener;
use std::sync::{Mutex, OnceLock};

use pricewire_cli::commands::{config, doctor, quote};
use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALID_ENV: [(&str, &str); 4] = [
    ("PRICEWIRE_WHATSAPP_ACCESS_TOKEN", "EAAGm0PX4ZCpsBAKZAexampletoken"),
    ("PRICEWIRE_WHATSAPP_PHONE_NUMBER_ID", "106540352242922"),
    ("PRICEWIRE_WHATSAPP_VERIFY_TOKEN", "verify-me"),
    ("PRICEWIRE_QUOTES_API_KEY", "td-secret-key"),
];

#[test]
fn config_redacts_secrets_and_attributes_sources() {
    let mut vars = VALID_ENV.to_vec();
    vars.push(("PRICEWIRE_SERVER_PORT", "8088"));

    with_env(&vars, || {
        let output = config::run();

        assert!(output.contains("- server.port = 8088 (source: env (PRICEWIRE_SERVER_PORT))"));
        assert!(output.contains("- server.bind_address = 0.0.0.0 (source: default)"));
        assert!(output.contains("- whatsapp.access_token = EAA*** (source: env"));
        assert!(output.contains(
            "- quotes.base_url = https://api.twelvedata.com (source: default)"
        ));
        assert!(!output.contains("td-secret-key"));
        assert!(!output.contains("verify-me"));
        assert!(!output.contains("EAAGm0PX4ZCpsBAKZAexampletoken"));
    });
}

#[test]
fn config_attributes_legacy_env_names() {
    with_env(
        &[
            ("WHATSAPP_TOKEN", "EAAGm0PX4ZCpsBAKZAexampletoken"),
            ("WHATSAPP_PHONE_NUMBER_ID", "106540352242922"),
            ("VERIFY_TOKEN", "verify-me"),
            ("API_KEY", "td-secret-key"),
        ],
        || {
            let output = config::run();

            assert!(output.contains("- quotes.api_key = <redacted> (source: env (API_KEY))"));
            assert!(output.contains("(source: env (WHATSAPP_PHONE_NUMBER_ID))"));
        },
    );
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed:"));
    });
}

#[test]
fn doctor_passes_with_valid_env_and_free_port() {
    let port = free_port();
    let port_value = port.to_string();
    let mut vars = VALID_ENV.to_vec();
    vars.push(("PRICEWIRE_SERVER_BIND_ADDRESS", "127.0.0.1"));
    vars.push(("PRICEWIRE_SERVER_PORT", port_value.as_str()));

    with_env(&vars, || {
        let payload = parse_payload(&doctor::run(true));

        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(check_status(&payload, "config_validation"), "pass");
        assert_eq!(check_status(&payload, "credential_readiness"), "pass");
        assert_eq!(check_status(&payload, "listener_bind"), "pass");
    });
}

#[test]
fn doctor_skips_later_checks_when_config_fails() {
    with_env(&[], || {
        let payload = parse_payload(&doctor::run(true));

        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(check_status(&payload, "config_validation"), "fail");
        assert_eq!(check_status(&payload, "credential_readiness"), "skipped");
        assert_eq!(check_status(&payload, "listener_bind"), "skipped");
    });
}

#[test]
fn doctor_flags_malformed_credentials() {
    let port = free_port();
    let port_value = port.to_string();
    let vars = [
        ("PRICEWIRE_WHATSAPP_ACCESS_TOKEN", "EAAG token with spaces"),
        ("PRICEWIRE_WHATSAPP_PHONE_NUMBER_ID", "+1 650 555 1234"),
        ("PRICEWIRE_WHATSAPP_VERIFY_TOKEN", "verify-me"),
        ("PRICEWIRE_QUOTES_API_KEY", "td-secret-key"),
        ("PRICEWIRE_SERVER_BIND_ADDRESS", "127.0.0.1"),
        ("PRICEWIRE_SERVER_PORT", port_value.as_str()),
    ];

    with_env(&vars, || {
        let payload = parse_payload(&doctor::run(true));

        assert_eq!(payload["overall_status"], "fail");
        let check = find_check(&payload, "credential_readiness");
        assert_eq!(check["status"], "fail");
        let details = check["details"].as_str().unwrap_or("");
        assert!(details.contains("phone_number_id"));
        assert!(details.contains("whatsapp.access_token contains whitespace"));
        assert!(!details.contains("EAAG token"));
    });
}

#[test]
fn doctor_flags_occupied_port() {
    let occupied = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let port_value = occupied.local_addr().expect("local addr").port().to_string();
    let mut vars = VALID_ENV.to_vec();
    vars.push(("PRICEWIRE_SERVER_BIND_ADDRESS", "127.0.0.1"));
    vars.push(("PRICEWIRE_SERVER_PORT", port_value.as_str()));

    with_env(&vars, || {
        let output = doctor::run(false);

        assert!(output.starts_with("doctor: one or more readiness checks failed"));
        assert!(output.contains("- [fail] listener_bind: cannot bind"));
        assert!(output.contains("- [ok] credential_readiness"));
    });
}

#[test]
fn quote_prints_reply_for_known_symbol() {
    let runtime = tokio::runtime::Runtime::new().expect("test runtime");
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/price"))
            .and(query_param("symbol", "BTC/USD"))
            .and(query_param("apikey", "td-secret-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "price": "64250.5" })),
            )
            .mount(&server)
            .await;
        server
    });
    let base_url = server.uri();
    let mut vars = VALID_ENV.to_vec();
    vars.push(("PRICEWIRE_QUOTES_BASE_URL", base_url.as_str()));

    with_env(&vars, || {
        let result = quote::run("btc/usd");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "Latest price for BTC/USD: 64250.5");
    });
}

#[test]
fn quote_reports_provider_error() {
    let runtime = tokio::runtime::Runtime::new().expect("test runtime");
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 400,
                "message": "**symbol** not found: NOTASYMBOL",
                "status": "error"
            })))
            .mount(&server)
            .await;
        server
    });
    let base_url = server.uri();
    let mut vars = VALID_ENV.to_vec();
    vars.push(("PRICEWIRE_QUOTES_BASE_URL", base_url.as_str()));

    with_env(&vars, || {
        let result = quote::run("notasymbol");
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "quote_provider");
        assert!(payload["message"].as_str().unwrap_or("").contains("not found: NOTASYMBOL"));
        assert!(!result.output.contains("td-secret-key"));
    });
}

#[test]
fn quote_returns_help_for_blank_symbol() {
    with_env(&VALID_ENV, || {
        let result = quote::run("   ");
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "no_price");
        assert_eq!(payload["message"], pricewire_core::HELP_TEXT);
    });
}

#[test]
fn quote_returns_config_failure_without_credentials() {
    with_env(&[], || {
        let result = quote::run("AAPL");
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "quote");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("output should be valid json")
}

fn find_check<'a>(payload: &'a Value, name: &str) -> &'a Value {
    payload["checks"]
        .as_array()
        .and_then(|checks| checks.iter().find(|check| check["name"] == name))
        .unwrap_or_else(|| panic!("missing doctor check `{name}`"))
}

fn check_status<'a>(payload: &'a Value, name: &str) -> &'a str {
    find_check(payload, name)["status"].as_str().unwrap_or("")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "PRICEWIRE_SERVER_BIND_ADDRESS",
        "PRICEWIRE_SERVER_PORT",
        "PRICEWIRE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "PRICEWIRE_WHATSAPP_ACCESS_TOKEN",
        "PRICEWIRE_WHATSAPP_PHONE_NUMBER_ID",
        "PRICEWIRE_WHATSAPP_VERIFY_TOKEN",
        "PRICEWIRE_WHATSAPP_API_BASE_URL",
        "PRICEWIRE_WHATSAPP_TIMEOUT_SECS",
        "PRICEWIRE_QUOTES_API_KEY",
        "PRICEWIRE_QUOTES_BASE_URL",
        "PRICEWIRE_QUOTES_TIMEOUT_SECS",
        "PRICEWIRE_LOGGING_LEVEL",
        "PRICEWIRE_LOGGING_FORMAT",
        "PRICEWIRE_LOG_LEVEL",
        "PRICEWIRE_LOG_FORMAT",
        "WHATSAPP_TOKEN",
        "WHATSAPP_PHONE_NUMBER_ID",
        "VERIFY_TOKEN",
        "API_KEY",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

use std::net::TcpListener;

use pricewire_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_credentials(&config));
            checks.push(check_listener_bind(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "credential_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "listener_bind",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_credentials(config: &AppConfig) -> DoctorCheck {
    let mut problems = Vec::new();

    let phone_number_id = config.whatsapp.phone_number_id.trim();
    if !phone_number_id.chars().all(|ch| ch.is_ascii_digit()) {
        problems.push(format!("whatsapp.phone_number_id `{phone_number_id}` is not numeric"));
    }

    let secrets = [
        ("whatsapp.access_token", config.whatsapp.access_token.expose_secret()),
        ("whatsapp.verify_token", config.whatsapp.verify_token.expose_secret()),
        ("quotes.api_key", config.quotes.api_key.expose_secret()),
    ];
    for (key, value) in secrets {
        if value.trim().chars().any(char::is_whitespace) {
            problems.push(format!("{key} contains whitespace"));
        }
    }

    if problems.is_empty() {
        DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Pass,
            details: "whatsapp and quote provider credentials are well-formed".to_string(),
        }
    } else {
        DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Fail,
            details: problems.join("; "),
        }
    }
}

fn check_listener_bind(config: &AppConfig) -> DoctorCheck {
    let address = config.server.listen_address();
    match TcpListener::bind(&address) {
        Ok(listener) => {
            drop(listener);
            DoctorCheck {
                name: "listener_bind",
                status: CheckStatus::Pass,
                details: format!("able to bind `{address}`"),
            }
        }
        Err(error) => DoctorCheck {
            name: "listener_bind",
            status: CheckStatus::Fail,
            details: format!("cannot bind `{address}`: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

use std::sync::Arc;

use axum::Router;
use pricewire_core::config::{AppConfig, ConfigError};
use pricewire_core::MessageRelay;
use pricewire_quotes::{QuoteProviderError, TwelveDataClient};
use pricewire_whatsapp::GraphApiSender;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{health, webhook};

pub struct Application {
    pub config: AppConfig,
    pub relay: MessageRelay,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("quote client setup failed: {0}")]
    QuoteClient(#[source] QuoteProviderError),
    #[error("whatsapp sender setup failed: {0}")]
    Sender(#[source] reqwest::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    config.validate()?;

    let quotes =
        TwelveDataClient::from_config(&config.quotes).map_err(BootstrapError::QuoteClient)?;
    let sender = GraphApiSender::from_config(&config.whatsapp).map_err(BootstrapError::Sender)?;
    let relay = MessageRelay::new(Arc::new(quotes), Arc::new(sender));

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        quotes_base_url = %config.quotes.base_url,
        whatsapp_api_base_url = %config.whatsapp.api_base_url,
        "application bootstrap complete"
    );

    Ok(Application { config, relay })
}

impl Application {
    pub fn router(&self) -> Router {
        let webhook_state =
            webhook::WebhookState::new(self.relay.clone(), self.config.whatsapp.verify_token.clone());

        Router::new()
            .merge(webhook::router(webhook_state))
            .merge(health::router(health::HealthState::new()))
            .layer(TraceLayer::new_for_http())
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use pricewire_core::config::{AppConfig, ConfigError};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{bootstrap_with_config, Application, BootstrapError};

    fn config_for(quotes_url: &str, graph_url: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.whatsapp.access_token = "EAAG-test-token".to_string().into();
        config.whatsapp.phone_number_id = "106540352242922".to_string();
        config.whatsapp.verify_token = "verify-me".to_string().into();
        config.whatsapp.api_base_url = graph_url.to_string();
        config.whatsapp.timeout_secs = 2;
        config.quotes.api_key = "td-test-key".to_string().into();
        config.quotes.base_url = quotes_url.to_string();
        config.quotes.timeout_secs = 2;
        config
    }

    fn delivery(body: &str) -> String {
        json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "16505551234",
                            "id": "wamid.inbound",
                            "text": { "body": body }
                        }]
                    }
                }]
            }]
        })
        .to_string()
    }

    async fn post_webhook(app: &Application, body: String) -> (StatusCode, Value) {
        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[tokio::test]
    async fn bootstrap_rejects_missing_verify_token() {
        let mut config = config_for("http://127.0.0.1:9", "http://127.0.0.1:9");
        config.whatsapp.verify_token = String::new().into();

        let error = bootstrap_with_config(config).await.err().expect("bootstrap should fail");

        assert!(matches!(
            error,
            BootstrapError::Config(ConfigError::Validation(ref message))
                if message.contains("whatsapp.verify_token")
        ));
    }

    #[tokio::test]
    async fn assembled_router_serves_health_and_verification() {
        let app = bootstrap_with_config(config_for("http://127.0.0.1:9", "http://127.0.0.1:9"))
            .await
            .expect("bootstrap");

        let health = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(health.status(), StatusCode::OK);

        let verify = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(verify.status(), StatusCode::OK);
        let body = to_bytes(verify.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn price_reply_flows_through_real_clients() {
        let quotes = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/price"))
            .and(query_param("symbol", "EUR/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "price": "1.08620" })))
            .expect(1)
            .mount(&quotes)
            .await;
        let graph = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v22.0/106540352242922/messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "messages": [{ "id": "wamid.reply" }] })),
            )
            .expect(1)
            .mount(&graph)
            .await;

        let app = bootstrap_with_config(config_for(
            &quotes.uri(),
            &format!("{}/v22.0", graph.uri()),
        ))
        .await
        .expect("bootstrap");

        let (status, ack) = post_webhook(&app, delivery("eur/usd")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack, json!({ "status": "ok" }));
        let requests = graph.received_requests().await.expect("recorded requests");
        let sent: Value = serde_json::from_slice(&requests[0].body).expect("json body");
        assert_eq!(sent["to"], "16505551234");
        assert_eq!(sent["text"]["body"], "Latest price for EUR/USD: 1.0862");
    }

    #[tokio::test]
    async fn upstream_failures_still_acknowledge() {
        let quotes = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&quotes)
            .await;
        let graph = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&graph)
            .await;

        let app = bootstrap_with_config(config_for(&quotes.uri(), &graph.uri()))
            .await
            .expect("bootstrap");

        let (status, ack) = post_webhook(&app, delivery("AAPL")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn unreachable_upstreams_still_acknowledge() {
        let app = bootstrap_with_config(config_for("http://127.0.0.1:9", "http://127.0.0.1:9"))
            .await
            .expect("bootstrap");

        let (status, ack) = post_webhook(&app, delivery("AAPL")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack, json!({ "status": "ok" }));
    }
}

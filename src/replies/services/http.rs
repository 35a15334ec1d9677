//! # Reply Transport
//!
//! Issues reply requests to the storefront and parses the JSON envelope
//! every reply endpoint answers with. Network failures and unparsable
//! bodies both surface as [`TransportError`], so callers have a single
//! failure path to handle.

use crate::config::Profile;
use crate::replies::models::{FormData, ReplyId, ReviewId};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, USER_AGENT};
use reqwest::{Method, Url};
use serde::Deserialize;

/// Header carrying the anti-forgery token
pub const TOKEN_HEADER: &str = "X-CSRFToken";

/// Backend endpoints of the reply lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEndpoint {
    Create(ReviewId),
    FetchForEdit(ReplyId),
    Update(ReplyId),
    Delete(ReplyId),
}

impl ReplyEndpoint {
    pub fn method(&self) -> Method {
        match self {
            ReplyEndpoint::FetchForEdit(_) => Method::GET,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> String {
        match self {
            ReplyEndpoint::Create(review) => format!("/review/{review}/reply/"),
            ReplyEndpoint::FetchForEdit(reply) | ReplyEndpoint::Update(reply) => {
                format!("/review-reply/{reply}/edit/")
            }
            ReplyEndpoint::Delete(reply) => format!("/review-reply/{reply}/delete/"),
        }
    }
}

/// A request to one reply endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub endpoint: ReplyEndpoint,
    pub form: FormData,
    pub csrf_token: Option<String>,
}

impl ReplyRequest {
    pub fn new(endpoint: ReplyEndpoint) -> Self {
        Self {
            endpoint,
            form: FormData::new(),
            csrf_token: None,
        }
    }

    pub fn with_form(mut self, form: FormData) -> Self {
        self.form = form;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }
}

/// Response envelope shared by all reply endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplyEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reply_html: Option<String>,
    #[serde(default)]
    pub reply_text: Option<String>,
}

impl ReplyEnvelope {
    pub const SUCCESS: &'static str = "success";

    pub fn success() -> Self {
        Self {
            status: Self::SUCCESS.to_string(),
            message: None,
            reply_html: None,
            reply_text: None,
        }
    }

    pub fn error(message: Option<&str>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.map(str::to_string),
            ..Self::success()
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.reply_html = Some(html.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.reply_text = Some(text.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

/// Failures below the application level
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no server configured for profile")]
    NotConfigured,
    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Sends reply requests; implemented over HTTP and by test doubles
#[async_trait]
pub trait ReplyTransport: Send + Sync {
    async fn send(&self, request: ReplyRequest) -> Result<ReplyEnvelope, TransportError>;
}

/// [`ReplyTransport`] talking to a live storefront
pub struct HttpTransport {
    client: reqwest::Client,
    server: Option<String>,
    default_token: Option<String>,
    cookie: Option<String>,
}

impl HttpTransport {
    /// Create a transport from a connection profile
    pub fn new(profile: &Profile) -> Result<Self> {
        tracing::debug!("Creating HttpTransport for profile '{}'", profile.name);

        let mut builder = reqwest::Client::builder().timeout(profile.timeout);
        if let Some(agent) = &profile.user_agent {
            builder = builder.default_headers(
                [(USER_AGENT, agent.parse()?)].into_iter().collect(),
            );
        }
        let client = builder.build()?;

        let server = profile
            .server
            .as_deref()
            .map(|server| server.trim_end_matches('/').to_string());
        if let Some(server) = &server {
            Url::parse(server).map_err(|e| anyhow::anyhow!("Invalid server '{server}': {e}"))?;
        }

        Ok(Self {
            client,
            server,
            default_token: profile.csrf_token.clone(),
            cookie: profile.cookie.clone(),
        })
    }

    /// Whether a server is configured
    pub fn is_available(&self) -> bool {
        self.server.is_some()
    }

    fn url_for(&self, endpoint: &ReplyEndpoint) -> Result<Url, TransportError> {
        let server = self.server.as_ref().ok_or(TransportError::NotConfigured)?;
        let url = format!("{server}{}", endpoint.path());
        Url::parse(&url).map_err(|e| TransportError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ReplyTransport for HttpTransport {
    async fn send(&self, request: ReplyRequest) -> Result<ReplyEnvelope, TransportError> {
        let method = request.endpoint.method();
        let url = self.url_for(&request.endpoint)?;
        tracing::debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method.clone(), url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(ACCEPT, "application/json");

        if let Some(token) = request.csrf_token.or_else(|| self.default_token.clone()) {
            builder = builder.header(TOKEN_HEADER, token);
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        if method == Method::POST {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                TransportError::Connection(e.to_string())
            } else {
                TransportError::Request(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Response {} ({} bytes)", status, body.len());

        serde_json::from_str(&body)
            .map_err(|e| TransportError::Malformed(format!("HTTP {}: {e}", status.as_u16())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_should_map_to_storefront_paths() {
        let review = ReviewId::new("42");
        let reply = ReplyId::new("7");

        assert_eq!(ReplyEndpoint::Create(review).path(), "/review/42/reply/");
        assert_eq!(
            ReplyEndpoint::FetchForEdit(reply.clone()).path(),
            "/review-reply/7/edit/"
        );
        assert_eq!(
            ReplyEndpoint::Update(reply.clone()).path(),
            "/review-reply/7/edit/"
        );
        assert_eq!(
            ReplyEndpoint::Delete(reply.clone()).path(),
            "/review-reply/7/delete/"
        );
        assert_eq!(ReplyEndpoint::FetchForEdit(reply.clone()).method(), Method::GET);
        assert_eq!(ReplyEndpoint::Update(reply).method(), Method::POST);
    }

    #[test]
    fn envelope_should_parse_optional_fields() {
        let envelope: ReplyEnvelope = serde_json::from_str(
            r#"{"status":"success","reply_html":"<div>hi</div>","message":"Reply posted","extra":1}"#,
        )
        .unwrap();

        assert!(envelope.is_success());
        assert_eq!(envelope.reply_html.as_deref(), Some("<div>hi</div>"));
        assert_eq!(envelope.message.as_deref(), Some("Reply posted"));
        assert_eq!(envelope.reply_text, None);
    }

    #[test]
    fn envelope_without_success_status_should_be_a_failure() {
        let envelope: ReplyEnvelope = serde_json::from_str(r#"{"status":"error"}"#).unwrap();

        assert!(!envelope.is_success());
        assert_eq!(envelope.message, None);
    }

    #[test]
    fn transport_without_server_should_fail_as_not_configured() {
        let transport = HttpTransport::new(&Profile::blank("default")).unwrap();

        assert!(!transport.is_available());
        assert!(matches!(
            transport.url_for(&ReplyEndpoint::Delete(ReplyId::new("1"))),
            Err(TransportError::NotConfigured)
        ));
    }

    #[test]
    fn transport_should_reject_invalid_server() {
        let mut profile = Profile::blank("default");
        profile.server = Some("not a url".to_string());

        assert!(HttpTransport::new(&profile).is_err());
    }

    #[test]
    fn url_for_should_join_server_and_path() {
        let mut profile = Profile::blank("default");
        profile.server = Some("https://shop.example.com/".to_string());
        let transport = HttpTransport::new(&profile).unwrap();

        let url = transport
            .url_for(&ReplyEndpoint::Create(ReviewId::new("42")))
            .unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/review/42/reply/");
    }
}

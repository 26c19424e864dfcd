//! Content store client.
//!
//! Sends one GROQ query with its parameters to the store's HTTP query endpoint
//! and hands back the `result` payload. There is exactly one attempt per call:
//! a failure is returned to the caller immediately and the caller decides how
//! to present it.
//!
//! [`ContentStore`] is the seam between the bridge and the network. The cache
//! layer wraps any store, and tests substitute a canned one.

use crate::config::{StoreConfig, StoreIdentity};
use crate::links::encode_component;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Query parameters, serialized as the `params` object of the request body.
pub type Params = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum QueryError {
    /// Store identity is incomplete; no request was sent.
    #[error("content store not configured: {0}")]
    Config(String),
    /// Network, DNS, TLS or timeout failure, or an unreadable response.
    #[error("content store unreachable: {message}")]
    Transport { message: String },
    /// The store answered with a non-2xx status.
    #[error("content store HTTP {code}")]
    Http { code: u16, detail: Value },
}

/// Anything that can answer a parametrized query.
pub trait ContentStore {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError>;
}

impl<T: ContentStore + ?Sized> ContentStore for &T {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError> {
        (**self).query(query, params)
    }
}

impl<T: ContentStore + ?Sized> ContentStore for Box<T> {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError> {
        (**self).query(query, params)
    }
}

/// Store client talking to the hosted query API over HTTPS.
pub struct HttpStore {
    config: StoreConfig,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    pub fn new(config: StoreConfig) -> Result<Self, QueryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QueryError::Transport {
                message: e.to_string(),
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Query endpoint URL for the given identity.
    pub fn endpoint(&self, identity: &StoreIdentity) -> String {
        endpoint_url(&self.config.api_host, identity)
    }
}

/// `https://{project}.api.{host}/v{version}/data/query/{dataset}`
pub fn endpoint_url(api_host: &str, identity: &StoreIdentity) -> String {
    format!(
        "https://{}.api.{}/v{}/data/query/{}",
        encode_component(&identity.project_id),
        api_host,
        encode_component(&identity.api_version),
        encode_component(&identity.dataset)
    )
}

impl ContentStore for HttpStore {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError> {
        let identity = self
            .config
            .identity()
            .map_err(|e| QueryError::Config(e.to_string()))?;
        let url = self.endpoint(&identity);
        let body = serde_json::json!({ "query": query, "params": params });

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=utf-8",
            )
            .json(&body);
        if let Some(token) = self.config.bearer_token() {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let response = request.send().map_err(|e| {
            tracing::warn!(error = %e, "content store request failed");
            QueryError::Transport {
                message: e.to_string(),
            }
        })?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|e| QueryError::Transport {
            message: e.to_string(),
        })?;
        tracing::debug!(
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "content store responded"
        );

        interpret_response(status, &text).inspect_err(|e| {
            if let QueryError::Http { code, detail } = e {
                let params = Value::Object(params.clone());
                tracing::warn!(
                    code,
                    query = %truncate(query, 200),
                    params = %params,
                    detail = %detail,
                    "content store HTTP error"
                );
            }
        })
    }
}

/// Turn a raw status and body into the query outcome.
///
/// Non-2xx keeps the parsed JSON body as detail when it parses, otherwise the
/// raw text. A 2xx answer yields its `result` field, `null` when absent.
pub fn interpret_response(status: u16, body: &str) -> Result<Value, QueryError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if !(200..300).contains(&status) {
        let detail = parsed.unwrap_or_else(|| Value::String(body.to_string()));
        return Err(QueryError::Http {
            code: status,
            detail,
        });
    }
    match parsed {
        Some(mut json) => Ok(json
            .get_mut("result")
            .map(Value::take)
            .unwrap_or(Value::Null)),
        None => Err(QueryError::Transport {
            message: "response body is not valid JSON".to_string(),
        }),
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

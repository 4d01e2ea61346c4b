use anyhow::{anyhow, Context};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Thin HTTP client for a running Discover API
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    pub fn new(server: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base_url = server.trim_end_matches('/').to_string();
        url::Url::parse(&base_url).with_context(|| format!("invalid server URL '{}'", server))?;

        let http = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { base_url, token, http })
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::GET, path).await
    }

    pub async fn post(&self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::POST, path).await
    }

    /// Send a request and unwrap the `{"success": true, "data": ..}` envelope
    async fn send(&self, method: Method, path: &str) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.with_context(|| format!("request to {} failed", url))?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body: Value = response.json().await.context("server returned a non-JSON body")?;
        unwrap_envelope(status, body)
    }
}

fn unwrap_envelope(status: StatusCode, body: Value) -> anyhow::Result<Value> {
    if status.is_success() {
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    match body.get("code").and_then(Value::as_str) {
        Some(code) => Err(anyhow!("{} ({}, HTTP {})", message, code, status.as_u16())),
        None => Err(anyhow!("{} (HTTP {})", message, status.as_u16())),
    }
}

//! # API Client
//!
//! Thin blocking HTTP client for the remote subcommands, plus the shared
//! connection arguments they flatten into their own argument structs.

use anyhow::{bail, Context, Result};
use clap::Args;

/// Connection arguments shared by every remote subcommand.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Base URL of the radicar-api service.
    #[arg(long, default_value = "http://localhost:8080", env = "RADICAR_API_URL")]
    pub api_url: String,

    /// Bearer token, when the service has authentication enabled.
    #[arg(long, env = "RADICAR_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Blocking JSON client over the radicar-api surface.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    /// Build a client from connection arguments.
    pub fn new(conn: &ConnectionArgs) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: conn.api_url.trim_end_matches('/').to_string(),
            token: conn.token.clone(),
            http,
        })
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn handle(&self, response: reqwest::blocking::Response) -> Result<serde_json::Value> {
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .context("response body was not valid JSON")?;
        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            bail!("API returned {status}: {message}");
        }
        Ok(body)
    }

    /// GET a path, returning the JSON body.
    pub fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        self.handle(response)
    }

    /// POST a JSON payload to a path, returning the JSON body.
    pub fn post_json(&self, path: &str, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .authorize(self.http.post(&url))
            .json(payload)
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        self.handle(response)
    }
}

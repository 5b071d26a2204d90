//! Blocking REST and GraphQL client for the GitHub API.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

/// Public API root, used when `GITHUB_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Public web root, used when `GITHUB_SERVER_URL` is unset.
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

const USER_AGENT: &str = "repo-starter-kit";
const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// A raw response: status, `Link` header, and body text.
#[derive(Debug)]
struct Reply {
    status: u16,
    link: Option<String>,
    body: String,
}

/// Authenticated GitHub client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
}

impl GitHubClient {
    /// Client for the API root named by `GITHUB_API_URL`, or the public API.
    #[must_use]
    pub fn new(token: &str) -> Self {
        let api_url = std::env::var("GITHUB_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::with_api_url(token, &api_url)
    }

    /// Client for an explicit API root.
    #[must_use]
    pub fn with_api_url(token: &str, api_url: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// API root without a trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{path}", self.api_url)
        }
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Reply, ApiError> {
        let url = self.url(path);
        let auth = format!("Bearer {}", self.token);
        tracing::debug!("{} {url}", method.as_str());

        macro_rules! headers {
            ($builder:expr) => {
                $builder
                    .header("Authorization", &auth)
                    .header("Accept", "application/vnd.github+json")
                    .header("X-GitHub-Api-Version", API_VERSION)
            };
        }

        let empty = Value::Object(serde_json::Map::new());
        let payload = body.unwrap_or(&empty);
        let result = match method {
            Method::Get => headers!(self.agent.get(&url)).call(),
            Method::Delete => headers!(self.agent.delete(&url)).call(),
            Method::Post => headers!(self.agent.post(&url)).send_json(payload),
            Method::Patch => headers!(self.agent.patch(&url)).send_json(payload),
            Method::Put => headers!(self.agent.put(&url)).send_json(payload),
        };

        let transport = |e: ureq::Error| ApiError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        };
        let mut response = result.map_err(transport)?;
        let status = response.status().as_u16();
        let link = response
            .headers()
            .get("link")
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = response.body_mut().read_to_string().map_err(transport)?;

        if !(200..300).contains(&status) {
            return Err(ApiError::Status {
                method: method.as_str().to_string(),
                path: path.to_string(),
                status,
                message: error_message(&body),
            });
        }
        Ok(Reply { status, link, body })
    }

    fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
        let text = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(text).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// `GET path`, decoded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on a failed request or an unexpected body.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let reply = self.send(Method::Get, path, None)?;
        Self::decode(path, &reply.body)
    }

    /// `GET path`, with `404` mapped to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any other failure.
    pub fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        match self.get(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET path` following `Link: rel="next"` until the last page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if any page fails.
    pub fn paginate<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut next = Some(format!("{path}{separator}per_page={PAGE_SIZE}"));
        let mut items = Vec::new();
        while let Some(page) = next {
            let reply = self.send(Method::Get, &page, None)?;
            let batch: Vec<T> = Self::decode(path, &reply.body)?;
            items.extend(batch);
            next = reply.link.as_deref().and_then(next_link);
        }
        Ok(items)
    }

    /// `POST path` with a JSON body, decoded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on a failed request or an unexpected body.
    pub fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        let reply = self.send(Method::Post, path, Some(body))?;
        Self::decode(path, &reply.body)
    }

    /// `PATCH path` with a JSON body; the response is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on a failed request.
    pub fn patch(&self, path: &str, body: &Value) -> Result<(), ApiError> {
        self.send(Method::Patch, path, Some(body)).map(drop)
    }

    /// `PUT path` with a JSON body; the response is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on a failed request.
    pub fn put(&self, path: &str, body: &Value) -> Result<(), ApiError> {
        self.send(Method::Put, path, Some(body)).map(drop)
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on a failed request.
    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        let reply = self.send(Method::Delete, path, None)?;
        tracing::trace!("DELETE {path} -> {}", reply.status);
        Ok(())
    }

    /// Run a GraphQL query or mutation and decode its `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::GraphQl`] when the response carries errors or no
    /// data, or any transport/status error.
    pub fn graphql<T: DeserializeOwned>(&self, query: &str, variables: &Value) -> Result<T, ApiError> {
        let endpoint = graphql_url(&self.api_url);
        let body = serde_json::to_value(GraphQlRequest { query, variables }).map_err(|e| {
            ApiError::Decode {
                path: endpoint.clone(),
                message: e.to_string(),
            }
        })?;
        let reply = self.send(Method::Post, &endpoint, Some(&body))?;
        let response: GraphQlResponse<T> = Self::decode(&endpoint, &reply.body)?;
        if !response.errors.is_empty() {
            let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ApiError::GraphQl(messages.join(", ")));
        }
        response
            .data
            .ok_or_else(|| ApiError::GraphQl("no data in response".to_string()))
    }
}

/// GraphQL endpoint for an API root. Enterprise roots end in `/api/v3` and
/// serve GraphQL at `/api/graphql`.
fn graphql_url(api_url: &str) -> String {
    api_url.strip_suffix("/v3").map_or_else(
        || format!("{api_url}/graphql"),
        |base| format!("{base}/graphql"),
    )
}

/// URL of the `rel="next"` entry of a `Link` header.
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#)
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}

/// Human-readable message from an error body: `message`, plus the codes or
/// messages of any `errors` entries.
fn error_message(body: &str) -> String {
    let Ok(Value::Object(data)) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let details: Vec<String> = data
        .get("errors")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| match entry {
            Value::String(text) => Some(text.clone()),
            Value::Object(fields) => fields
                .get("message")
                .or_else(|| fields.get("code"))
                .and_then(Value::as_str)
                .map(String::from),
            _ => None,
        })
        .collect();
    if details.is_empty() {
        message
    } else {
        format!("{message} ({})", details.join(", "))
    }
}

mod http;

pub use http::HttpTransport;

use crate::errors::MbResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single request against the server on `localhost:<port>`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub port: u16,
    pub body: Option<Value>,
}

/// Status code and parsed body of a response; nothing else is kept.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

impl Response {
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    /// The body as indented JSON, for diagnostics.
    pub fn pretty_body(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.to_string())
    }
}

/// Performs one request/response round trip.
///
/// Implementations must not retry, and must hand back transport failures
/// as errors rather than as responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> MbResult<Response>;
}

use super::{Request, Response, Transport};
use crate::config::HOST;
use crate::errors::MbResult;
use async_trait::async_trait;
use log::trace;
use reqwest::{header::CONTENT_TYPE, Client, ClientBuilder, RequestBuilder};
use serde_json::Value;

/// [`Transport`] over plain HTTP/1.1 with JSON bodies.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> MbResult<Self> {
        let client = ClientBuilder::new().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn assemble_request(&self, request: &Request) -> RequestBuilder {
        let url = format!("http://{}:{}{}", HOST, request.port, request.path);
        let builder = self.client.request(request.method.into(), url);

        match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}

/// Parses JSON bodies; other non-empty bodies are kept as plain text.
async fn read_body(response: reqwest::Response) -> MbResult<Value> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .map(|content_type| content_type.contains("json"))
        .unwrap_or_default();

    let text = response.text().await?;
    if text.is_empty() {
        return Ok(Value::Null);
    }

    if is_json {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(Value::String(text))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> MbResult<Response> {
        trace!(
            "{} http://{}:{}{}",
            request.method,
            HOST,
            request.port,
            request.path
        );
        let response = self.assemble_request(&request).send().await?;

        let status_code = response.status().as_u16();
        let body = read_body(response).await?;
        trace!("{} {} -> {}", request.method, request.path, status_code);

        Ok(Response { status_code, body })
    }
}

//! Test client for an imposter server.
//!
//! [`MbClient`] binds a port once and talks to `http://localhost:<port>`:
//! plain verb helpers return the server's response as is, while
//! [`MbClient::create_imposter`] and [`MbClient::is_out_of_process_imposter`]
//! interpret it.

mod config;
mod errors;
pub mod protocols;
mod transport;

pub use config::{ClientConfig, ClientSettings, DEFAULT_PORT, HOST, MB_PORT};
pub use errors::{MbError, MbResult};
pub use transport::{HttpTransport, Method, Request, Response, Transport};

use log::warn;
use serde_json::Value;

const IMPOSTERS: &str = "/imposters";
const CONFIG: &str = "/config";
const CREATED: u16 = 201;

pub struct MbClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl MbClient<HttpTransport> {
    /// Client over HTTP; the port comes from `port`, `MB_PORT` or [`DEFAULT_PORT`].
    pub fn create(port: Option<u16>) -> MbResult<Self> {
        let config = ClientConfig::from_env(port)?;
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> MbClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn url(&self) -> String {
        self.config.url()
    }

    pub fn port(&self) -> u16 {
        self.config.port()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> MbResult<Response> {
        debug_assert!(path.starts_with('/'), "path must be absolute: {}", path);
        let request = Request {
            method,
            path: path.to_string(),
            port: self.config.port(),
            body,
        };
        self.transport.send(request).await
    }

    pub async fn get(&self, path: &str) -> MbResult<Response> {
        self.send(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> MbResult<Response> {
        self.send(Method::Post, path, body).await
    }

    pub async fn del(&self, path: &str) -> MbResult<Response> {
        self.send(Method::Delete, path, None).await
    }

    pub async fn put(&self, path: &str, body: Option<Value>) -> MbResult<Response> {
        self.send(Method::Put, path, body).await
    }

    /// Creates an imposter, failing the calling test unless the server answers `201`.
    ///
    /// # Panics
    /// On any other status code, with the pretty-printed response body as message.
    pub async fn create_imposter(&self, imposter: Value) -> MbResult<Response> {
        let response = self.post(IMPOSTERS, Some(imposter)).await?;
        assert_eq!(response.status_code, CREATED, "{}", response.pretty_body());
        Ok(response)
    }

    /// Like [`MbClient::create_imposter`], but reports a status mismatch as
    /// [`MbError::UnexpectedStatus`].
    pub async fn try_create_imposter(&self, imposter: Value) -> MbResult<Response> {
        let response = self.post(IMPOSTERS, Some(imposter)).await?;
        if response.status_code != CREATED {
            warn!(
                "Imposter creation answered with status code {}",
                response.status_code
            );
            return Err(MbError::UnexpectedStatus {
                expected: CREATED,
                actual: response.status_code,
                body: response.pretty_body(),
            });
        }
        Ok(response)
    }

    /// Whether `protocol` is served by a helper process registered in the
    /// server's protocol file. Without a protocol file the answer is `false`.
    pub async fn is_out_of_process_imposter(&self, protocol: &str) -> MbResult<bool> {
        let response = self.get(CONFIG).await?;

        match protocols::protofile_path(&response.body) {
            Some(path) => protocols::is_registered(&path, protocol),
            None => {
                warn!("Server configuration does not name a protocol file");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::{collections::VecDeque, fs, sync::Mutex};

    /// Answers with canned responses and records every request.
    struct RecordingTransport {
        responses: Mutex<VecDeque<Response>>,
        requests: Mutex<Vec<Request>>,
    }

    impl RecordingTransport {
        fn answering(responses: Vec<Response>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::default(),
            }
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: Request) -> MbResult<Response> {
            self.requests.lock().unwrap().push(request);
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Response::new(200, Value::Null));
            Ok(response)
        }
    }

    fn client(port: u16, responses: Vec<Response>) -> MbClient<RecordingTransport> {
        MbClient::with_transport(
            ClientConfig::new(port),
            RecordingTransport::answering(responses),
        )
    }

    fn config_body(cwd: &str) -> Value {
        json!({
            "process": { "cwd": cwd },
            "options": { "protofile": "protocols.json" }
        })
    }

    #[test]
    fn test_url_and_port() {
        let client = client(9000, vec![]);
        assert_eq!(client.port(), 9000);
        assert_eq!(client.url(), "http://localhost:9000");
    }

    #[test]
    fn test_create_binds_explicit_port() {
        let client = MbClient::create(Some(9000)).unwrap();
        assert_eq!(client.port(), 9000);
        assert_eq!(client.url(), "http://localhost:9000");
        assert_eq!(client.config(), &ClientConfig::new(9000));
    }

    #[tokio::test]
    async fn test_verbs_forward_path_body_and_port() {
        let client = client(4545, vec![]);
        let body = json!({ "stubs": [{ "responses": [{ "is": { "body": "hi" } }] }] });

        client.get("/imposters?replayable=true").await.unwrap();
        client.post("/imposters", Some(body.clone())).await.unwrap();
        client.put("/imposters", None).await.unwrap();
        client.del("/imposters/3000").await.unwrap();

        let expected = vec![
            Request {
                method: Method::Get,
                path: "/imposters?replayable=true".to_string(),
                port: 4545,
                body: None,
            },
            Request {
                method: Method::Post,
                path: "/imposters".to_string(),
                port: 4545,
                body: Some(body),
            },
            Request {
                method: Method::Put,
                path: "/imposters".to_string(),
                port: 4545,
                body: None,
            },
            Request {
                method: Method::Delete,
                path: "/imposters/3000".to_string(),
                port: 4545,
                body: None,
            },
        ];
        assert_eq!(client.transport.requests(), expected);
    }

    #[tokio::test]
    async fn test_verbs_return_response_unmodified() {
        let response = Response::new(404, json!({ "errors": [] }));
        let client = client(2525, vec![response.clone()]);

        assert_eq!(client.get("/missing").await.unwrap(), response);
    }

    #[tokio::test]
    async fn test_create_imposter_returns_response() {
        let response = Response::new(201, json!({ "protocol": "tcp", "port": 3000 }));
        let client = client(2525, vec![response.clone()]);
        let imposter = json!({ "protocol": "tcp" });

        let created = client.create_imposter(imposter.clone()).await.unwrap();

        assert_eq!(created, response);
        let requests = client.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "/imposters");
        assert_eq!(requests[0].body, Some(imposter));
    }

    #[tokio::test]
    #[should_panic(expected = "invalid protocol")]
    async fn test_create_imposter_fails_on_unexpected_status() {
        let response = Response::new(
            400,
            json!({ "errors": [{ "code": "bad data", "message": "invalid protocol" }] }),
        );
        let client = client(2525, vec![response]);

        let _ = client.create_imposter(json!({ "protocol": "nope" })).await;
    }

    #[tokio::test]
    async fn test_try_create_imposter_reports_unexpected_status() {
        let response = Response::new(400, json!({ "errors": [{ "code": "bad data" }] }));
        let client = client(2525, vec![response]);

        match client.try_create_imposter(json!({})).await {
            Err(MbError::UnexpectedStatus {
                expected,
                actual,
                body,
            }) => {
                assert_eq!(expected, 201);
                assert_eq!(actual, 400);
                assert!(body.contains("\"code\": \"bad data\""));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_out_of_process_protocol() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("protocols.json"),
            r#"{ "smtp": { "createCommand": "node smtp.js" } }"#,
        )
        .unwrap();
        let cwd = dir.path().to_str().unwrap();

        let client = client(
            2525,
            vec![
                Response::new(200, config_body(cwd)),
                Response::new(200, config_body(cwd)),
            ],
        );

        assert!(client.is_out_of_process_imposter("smtp").await.unwrap());
        assert!(!client.is_out_of_process_imposter("http").await.unwrap());

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests
            .iter()
            .all(|request| request.method == Method::Get && request.path == "/config"));
    }

    #[tokio::test]
    async fn test_missing_protocol_file_means_built_in() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        let client = client(2525, vec![Response::new(200, config_body(cwd))]);

        assert!(!client.is_out_of_process_imposter("smtp").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_protocol_file_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("protocols.json"), "not json").unwrap();
        let cwd = dir.path().to_str().unwrap();
        let client = client(2525, vec![Response::new(200, config_body(cwd))]);

        let result = client.is_out_of_process_imposter("smtp").await;
        assert!(matches!(result, Err(MbError::SerDe(_))));
    }
}

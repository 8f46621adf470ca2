//! In-memory transport recording every request it is handed

#![allow(dead_code)]

use async_trait::async_trait;
use sparql_client::{ClientConfig, HttpRequest, HttpResponse, HttpTransport, SparqlClient, SparqlClientResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const ENDPOINT: &str = "http://example.org/sparql";

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the response to the next request
    pub fn respond(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn body(&self) -> String {
        let request = self.last_request();
        String::from_utf8(request.body.map(|b| b.to_vec()).unwrap_or_default()).unwrap()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> SparqlClientResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| HttpResponse::new(204)))
    }
}

/// Route library logs to the test output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn client(config: ClientConfig) -> (SparqlClient, Arc<MockTransport>) {
    let transport = MockTransport::new();
    (SparqlClient::with_transport(config, transport.clone()), transport)
}

pub fn json_response(body: &str) -> HttpResponse {
    HttpResponse::new(200)
        .with_header("content-type", "application/sparql-results+json; charset=utf-8").unwrap()
        .with_body(body.to_string())
}

pub const ASK_TRUE_JSON: &str = r#"{"head": {}, "boolean": true}"#;

pub const SPO_JSON: &str = r#"{
    "head": {"vars": ["s", "p", "o"]},
    "results": {"bindings": [
        {"s": {"type": "uri", "value": "http://example.org/s"},
         "p": {"type": "uri", "value": "http://example.org/p"},
         "o": {"type": "uri", "value": "http://example.org/o"}}
    ]}
}"#;

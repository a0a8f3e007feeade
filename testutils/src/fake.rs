use httpmock::prelude::*;
use httpmock::{
    Mock,
    Then,
    When,
};
use serde_json::json;

// A thin wrapper around an httpmock server that pretends to be a Kubernetes apiserver; mocks are
// mounted as soon as they're registered, and are identified by their registration order.
pub struct MockServerBuilder {
    server: MockServer,
    mock_ids: Vec<usize>,
}

impl MockServerBuilder {
    pub fn new() -> MockServerBuilder {
        MockServerBuilder { server: MockServer::start(), mock_ids: vec![] }
    }

    // Every registered mock must have been hit exactly once
    pub fn assert(&self) {
        for id in &self.mock_ids {
            println!("checking assertions for mock {id}");
            Mock::new(*id, &self.server).assert()
        }
    }

    pub fn hits(&self, idx: usize) -> usize {
        Mock::new(self.mock_ids[idx], &self.server).calls()
    }

    pub fn handle<F: FnOnce(When, Then)>(&mut self, f: F) -> &mut Self {
        let id = self.server.mock(f).id;
        self.mock_ids.push(id);
        self
    }

    pub fn handle_not_found(&mut self, path: String) -> &mut Self {
        self.handle(move |when, then| {
            when.path(&path);
            then.status(404).json_body(status_not_found());
        })
    }

    pub fn handle_server_error(&mut self, path: String) -> &mut Self {
        self.handle(move |when, then| {
            when.path(&path);
            then.status(500).json_body(status_server_error());
        })
    }

    pub fn url(&self) -> http::Uri {
        http::Uri::try_from(self.server.url("/")).unwrap()
    }

    pub fn base_url(&self) -> String {
        self.server.base_url()
    }
}

impl Default for MockServerBuilder {
    fn default() -> Self {
        MockServerBuilder::new()
    }
}

pub fn make_fake_apiserver() -> (MockServerBuilder, kube::Client) {
    let builder = MockServerBuilder::new();
    let config = kube::Config::new(builder.url());
    let client = kube::Client::try_from(config).unwrap();
    (builder, client)
}

pub fn status_not_found() -> serde_json::Value {
    json!({
      "kind": "Status",
      "apiVersion": "v1",
      "metadata": {},
      "status": "Failure",
      "message": "the requested resource was not found",
      "reason": "NotFound",
      "code": 404
    })
}

pub fn status_server_error() -> serde_json::Value {
    json!({
      "kind": "Status",
      "apiVersion": "v1",
      "metadata": {},
      "status": "Failure",
      "message": "etcdserver: request timed out",
      "reason": "InternalError",
      "code": 500
    })
}

pub fn list_of(items: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "metadata": {},
        "items": items,
    })
}

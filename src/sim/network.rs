//! HTTP transport answering from a route table

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::hal::{HttpResponse, NetworkTransport, TransportError};

/// A request the transport received
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: String,
}

/// Shared view of the requests a [`CannedTransport`] received
#[derive(Clone, Debug, Default)]
pub struct RequestLog(Rc<RefCell<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<RecordedRequest> {
        self.0.borrow().clone()
    }

    pub fn gets(&self) -> Vec<RecordedRequest> {
        self.by_method("GET")
    }

    pub fn posts(&self) -> Vec<RecordedRequest> {
        self.by_method("POST")
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn by_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.0
            .borrow()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    fn record(&self, method: &'static str, url: &str, body: &str) {
        self.0.borrow_mut().push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.to_string(),
        });
    }
}

type Canned = Result<HttpResponse, TransportError>;

/// Transport with fixed answers per URL; unknown URLs get 404
#[derive(Debug, Default)]
pub struct CannedTransport {
    get_routes: HashMap<String, Canned>,
    post_routes: HashMap<String, Canned>,
    disconnected: bool,
    log: RequestLog,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link down: every request fails with `NotConnected`
    pub fn disconnected(mut self) -> Self {
        self.disconnected = true;
        self
    }

    pub fn respond_get(&mut self, url: &str, status: u16, body: &str) {
        self.get_routes.insert(url.to_string(), Ok(HttpResponse::new(status, body)));
    }

    pub fn respond_post(&mut self, url: &str, status: u16, body: &str) {
        self.post_routes.insert(url.to_string(), Ok(HttpResponse::new(status, body)));
    }

    pub fn fail_get(&mut self, url: &str, error: TransportError) {
        self.get_routes.insert(url.to_string(), Err(error));
    }

    pub fn fail_post(&mut self, url: &str, error: TransportError) {
        self.post_routes.insert(url.to_string(), Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.all()
    }

    pub fn request_log(&self) -> RequestLog {
        self.log.clone()
    }

    fn answer(&self, routes: &HashMap<String, Canned>, url: &str) -> Canned {
        if self.disconnected {
            return Err(TransportError::NotConnected);
        }
        if url.is_empty() {
            return Err(TransportError::EmptyUrl);
        }
        routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "Not Found")))
    }
}

impl NetworkTransport for CannedTransport {
    fn is_connected(&self) -> bool {
        !self.disconnected
    }

    fn get(&mut self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.log.record("GET", url, "");
        self.answer(&self.get_routes, url)
    }

    fn post(
        &mut self,
        url: &str,
        body: &str,
        _content_type: &str,
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.log.record("POST", url, body);
        self.answer(&self.post_routes, url)
    }
}

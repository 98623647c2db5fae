//! Mock transport for testing.
//!
//! Acts as an in-memory store: records put with [`MockTransport::put_record`]
//! are returned for matching ids. Responses can also be queued verbatim, and
//! every request is captured for verification.

use super::{Transport, TransportError};
use async_trait::async_trait;
use cookie_types::{GetRequest, GetResponse, StoredRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Endpoint as passed by the caller
    pub endpoint: String,
    /// The request body
    pub request: GetRequest,
}

/// Mock transport for testing.
///
/// Clones share state, so a test can keep one handle while the client
/// owns another.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    records: HashMap<String, StoredRecord>,
    queued: VecDeque<GetResponse>,
    requests: Vec<RecordedRequest>,
    fail_next: Option<TransportError>,
}

impl MockTransport {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a record under `id`, replacing any previous one.
    pub fn put_record(&self, id: &str, record: StoredRecord) {
        self.lock().records.insert(id.to_string(), record);
    }

    /// Remove every stored record.
    pub fn clear_records(&self) {
        self.lock().records.clear();
    }

    /// Queue a response to return verbatim from the next `get()`, ahead of
    /// the stored records.
    pub fn queue_response(&self, response: GetResponse) {
        self.lock().queued.push_back(response);
    }

    /// Cause the next `get()` to fail with `error`.
    pub fn fail_next(&self, error: TransportError) {
        self.lock().fail_next = Some(error);
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }

    /// Number of `get()` calls, failed ones included.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Clear all state (records, queue, captured requests).
    pub fn reset(&self) {
        *self.lock() = MockTransportInner::default();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        endpoint: &str,
        request: &GetRequest,
    ) -> Result<GetResponse, TransportError> {
        let mut inner = self.lock();

        inner.requests.push(RecordedRequest {
            endpoint: endpoint.to_string(),
            request: request.clone(),
        });

        // Check for forced failure
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }

        if let Some(response) = inner.queued.pop_front() {
            return Ok(response);
        }

        let found = request
            .id
            .iter()
            .filter_map(|id| {
                inner
                    .records
                    .get(id.as_str())
                    .map(|record| (id.to_string(), record.clone()))
            })
            .collect();
        Ok(GetResponse::ok(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookie_types::RemoteId;

    fn record(data: &str) -> StoredRecord {
        StoredRecord {
            data: data.to_string(),
            update: 1,
        }
    }

    fn request(ids: &[&str]) -> GetRequest {
        GetRequest::new(ids.iter().map(|id| RemoteId::from_hex(*id)).collect())
    }

    // ===========================================
    // MockTransport Basic Tests
    // ===========================================

    #[tokio::test]
    async fn returns_only_requested_records() {
        let transport = MockTransport::new();
        transport.put_record("aa", record("A"));
        transport.put_record("bb", record("B"));

        let response = transport.get("http://store", &request(&["aa", "cc"])).await.unwrap();
        assert!(response.is_success());

        let records = response.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records["aa"].data, "A");
    }

    #[tokio::test]
    async fn captures_requests() {
        let transport = MockTransport::new();
        transport.get("http://one", &request(&["aa"])).await.unwrap();
        transport.get("http://two", &request(&["bb", "cc"])).await.unwrap();

        assert_eq!(transport.request_count(), 2);
        let last = transport.last_request().unwrap();
        assert_eq!(last.endpoint, "http://two");
        assert_eq!(last.request, request(&["bb", "cc"]));
    }

    #[tokio::test]
    async fn queued_response_comes_first() {
        let transport = MockTransport::new();
        transport.put_record("aa", record("A"));
        transport.queue_response(GetResponse::error(500, "busy"));

        let first = transport.get("e", &request(&["aa"])).await.unwrap();
        assert_eq!(first.code, 500);

        let second = transport.get("e", &request(&["aa"])).await.unwrap();
        assert!(second.is_success());
    }

    // ===========================================
    // Error Condition Tests
    // ===========================================

    #[tokio::test]
    async fn forced_failure_applies_once() {
        let transport = MockTransport::new();
        transport.fail_next(TransportError::Timeout);

        let result = transport.get("e", &request(&["aa"])).await;
        assert_eq!(result, Err(TransportError::Timeout));

        // Next call should work
        assert!(transport.get("e", &request(&["aa"])).await.is_ok());
        assert_eq!(transport.request_count(), 2);
    }

    // ===========================================
    // Clone and Shared State Tests
    // ===========================================

    #[tokio::test]
    async fn clone_shares_state() {
        let transport1 = MockTransport::new();
        let transport2 = transport1.clone();

        transport1.put_record("aa", record("A"));
        let response = transport2.get("e", &request(&["aa"])).await.unwrap();
        assert_eq!(response.into_records().len(), 1);
        assert_eq!(transport1.request_count(), 1);
    }

    #[tokio::test]
    async fn reset_clears_all() {
        let transport = MockTransport::new();
        transport.put_record("aa", record("A"));
        transport.get("e", &request(&["aa"])).await.unwrap();

        transport.reset();

        assert_eq!(transport.request_count(), 0);
        let response = transport.get("e", &request(&["aa"])).await.unwrap();
        assert!(response.into_records().is_empty());
    }
}

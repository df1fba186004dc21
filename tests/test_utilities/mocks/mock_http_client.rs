use async_trait::async_trait;
use ci_failure_scan::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock HttpClient serving a simulated CI provider
///
/// Build-list requests (URLs containing `/tree/`) are paged from `builds`
/// using the `offset`/`limit` query parameters. Every other URL is answered
/// from a fixed route table; unknown URLs get a 404.
#[derive(Default)]
pub struct MockHttpClient {
    builds: Vec<Value>,
    routes: HashMap<String, (u16, String)>,
    call_count: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a build to the branch history, newest first
    pub fn with_build(mut self, build_num: u64, revision: &str) -> Self {
        self.builds.push(serde_json::json!({
            "build_num": build_num,
            "vcs_revision": revision,
            "queued_at": "2018-08-01T12:00:00Z",
            "workflows": {"job_name": "pytorch_linux_build"}
        }));
        self
    }

    pub fn with_json(mut self, url: &str, body: Value) -> Self {
        self.routes
            .insert(url.to_string(), (200, body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.routes
            .insert(url.to_string(), (status, "{}".to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == url)
            .count()
    }

    fn page(&self, query: &[(&str, String)]) -> HttpReply {
        let param = |key: &str| -> usize {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0)
        };
        let (offset, limit) = (param("offset"), param("limit"));
        let page: Vec<&Value> = self.builds.iter().skip(offset).take(limit).collect();
        HttpReply::new(200, serde_json::to_string(&page).unwrap())
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<HttpReply, ScanError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(url.to_string());

        if url.contains("/tree/") {
            return Ok(self.page(query));
        }

        Ok(match self.routes.get(url) {
            Some((status, body)) => HttpReply::new(*status, body.clone()),
            None => HttpReply::new(404, r#"{"message": "Not Found"}"#),
        })
    }
}

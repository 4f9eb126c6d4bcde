//! In-memory transport for exercising the crawler without a network

use crate::crawler::transport::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct FakeState {
    responses: HashMap<String, Result<Vec<u8>, TransportError>>,
    calls: Vec<String>,
    cancel_on: Option<(String, CancellationToken)>,
}

/// Serves canned responses and records every URL it was asked for
///
/// Clones share state, so a test can keep a handle after moving the
/// transport into an engine. Unknown URLs answer 404.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, url: &str, html: &str) -> Self {
        self.respond(url, Ok(html.as_bytes().to_vec()))
    }

    pub(crate) fn asset(self, url: &str, bytes: &[u8]) -> Self {
        self.respond(url, Ok(bytes.to_vec()))
    }

    pub(crate) fn failing(self, url: &str) -> Self {
        self.respond(url, Err(TransportError::Status { status: 500 }))
    }

    /// Fires `token` when `url` is requested, as a user interrupt would mid-request
    pub(crate) fn cancel_on(self, url: &str, token: CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_on = Some((url.to_string(), token));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.calls().iter().filter(|called| *called == url).count()
    }

    fn respond(self, url: &str, response: Result<Vec<u8>, TransportError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(url.to_string(), response);
        self
    }

    fn answer(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(url.to_string());

        if let Some((trigger, token)) = &state.cancel_on {
            if trigger == url {
                token.cancel();
            }
        }

        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        state
            .responses
            .get(url)
            .cloned()
            .unwrap_or(Err(TransportError::Status { status: 404 }))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TransportError> {
        self.answer(url, cancel)
    }
}

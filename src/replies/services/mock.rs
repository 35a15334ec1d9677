//! # Mock Transport
//!
//! Scripted [`ReplyTransport`] for tests. Responses are served in order;
//! a gated transport holds every request until the test releases it, which
//! makes in-flight states observable.

use super::http::{ReplyEnvelope, ReplyRequest, ReplyTransport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::sync::Semaphore;

type Scripted = Result<ReplyEnvelope, TransportError>;

pub struct MockTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ReplyRequest>>,
    gate: Option<Semaphore>,
}

impl MockTransport {
    /// Transport answering immediately
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Transport holding each request until [`MockTransport::release`]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Queue an envelope as the next response
    pub fn respond(&self, envelope: ReplyEnvelope) -> &Self {
        self.push(Ok(envelope))
    }

    /// Queue a transport failure as the next response
    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, response: Scripted) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    /// Let `count` held requests complete
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<ReplyRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyTransport for MockTransport {
    async fn send(&self, request: ReplyRequest) -> Result<ReplyEnvelope, TransportError> {
        tracing::debug!("MockTransport received {:?}", request.endpoint);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Malformed("no scripted response".to_string())))
    }
}

//! # Services
//!
//! Network access for the reply lifecycle.

pub mod http;
pub mod mock;

pub use http::{
    HttpTransport, ReplyEndpoint, ReplyEnvelope, ReplyRequest, ReplyTransport, TransportError,
    TOKEN_HEADER,
};
pub use mock::MockTransport;

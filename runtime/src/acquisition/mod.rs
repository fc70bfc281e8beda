//! The two retrieval paths and the HTTP plumbing under the static one.
//!
//! Static retrieval reads raw markup; rendered retrieval drives a browser.
//! Both hand their raw counter text to [`crate::snapshot`].

pub mod http_client;
pub mod rendered_fetch;
pub mod retry;
pub mod static_fetch;

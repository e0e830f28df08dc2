// HTTP transport module.
// Request/response types and the client capability the fetcher talks to.

pub mod client;
pub mod types;

pub use client::{HttpClient, ReqwestClient};
pub use types::*;

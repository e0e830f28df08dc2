// webstash: an expiring key/value cache over browser-style storage, with
// fetches that revalidate cached resources against their server.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod http;
pub mod storage;

pub use cache::{InitOptions, Options, StoreDefaults, Stash, SweepOutcome};
pub use error::{Result, StoreError};
pub use fetch::{FetchOutcome, RequestSpec};
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use storage::{DirStorage, MemoryStorage, Partition, Storage};

// Fetch module.
// Revalidating fetches tied to cache entries, plus the registry of remembered requests.

pub mod extract;
pub mod fetcher;
pub mod outcome;
pub mod registry;

pub use outcome::FetchOutcome;
pub use registry::RequestSpec;

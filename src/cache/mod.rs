// Cache module.
// Entry lifecycle over raw key/value storage: options, keys, expiry, sweeps, versions.

pub mod clock;
pub mod entry;
pub mod keys;
pub(crate) mod lock;
pub mod options;
pub mod path;
pub mod store;
pub mod sweep;
pub mod version;

pub use clock::{Clock, MILLIS_PER_DAY, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use keys::{Namespace, split_attribute_path, wrap};
pub use options::{
    CompletionFn, HashResolverFn, Options, ResolvedOptions, StoreDefaults, TransformFn,
};
pub use store::{InitOptions, Stash};
pub use sweep::SweepOutcome;

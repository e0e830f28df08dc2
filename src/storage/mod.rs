// Storage module.
// Flat string key/value persistence behind the store, split into two partitions.

pub mod dir;
pub mod memory;

pub use dir::DirStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// Raw key/value text storage, modelled on browser local/session storage.
pub trait Storage: Send + Sync {
    /// Read the raw text stored under `key`.
    fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_raw(&self, key: &str) -> Result<()>;

    /// List every key currently held.
    fn list_keys(&self) -> Result<Vec<String>>;
}

/// Which storage an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
    /// Survives restarts.
    #[default]
    Persistent,
    /// Scoped to the current session.
    Session,
}

impl Partition {
    pub fn name(&self) -> &'static str {
        match self {
            Partition::Persistent => "persistent",
            Partition::Session => "session",
        }
    }
}

// pastebin/src/lib.rs
pub mod domain;
pub mod id;
pub mod ports;
pub mod service;
pub mod store;
pub mod sweeper;
pub mod validation;

#[cfg(test)]
mod testing;

pub use domain::{Paste, PasteId};
pub use ports::{KeyEntry, KeyTtl, KeyValueBackend, StorageFactory};
pub use service::PasteService;
pub use store::PasteStore;
pub use sweeper::{ExpirySweeper, SweepReport};

//! `storage` crate — the `FileStore` trait and its implementations.
//!
//! Uploaded rasters, Excel datasets, and map contributions live in three flat
//! folders.  Everything above this crate reaches them through [`FileStore`].

pub mod error;
pub mod folder;
pub mod traits;
pub mod local;
pub mod memory;
pub mod listing;

pub use error::StorageError;
pub use folder::{FolderKind, detect_mime};
pub use traits::{FileStore, StoredFile};
pub use local::LocalFileStore;
pub use memory::MemoryFileStore;
pub use listing::ListingCache;

//! Per-user 2FA state files
//!
//! - `path` - username validation and path derivation
//! - `store` - atomic install, idempotent remove, presence probe
//! - `input` - the inherited descriptor carrying a new config

pub mod input;
pub mod path;
pub mod store;

pub use path::{derive_path, temp_path, validate_username};
pub use store::{Enrollment, StateStore, CHUNK_SIZE, DEFAULT_FILE_MODE};

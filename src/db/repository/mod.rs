//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection`; locking and batching are
//! the caller's concern (see `pipeline::store`).

mod processed_code;
mod uploaded_file;

pub use processed_code::*;
pub use uploaded_file::*;

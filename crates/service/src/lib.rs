//! Service layer for the users and comments collections.
//! - Each collection is read in full from its store before every operation
//!   and written back in full after every mutation.
//! - Validation lives in `validation`, record shaping in `users`/`comments`.
//! - Storage is injected through `storage::CollectionStore`.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod validation;
pub mod users;
pub mod comments;

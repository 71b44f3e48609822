//! Secret separation.
//!
//! This module provides:
//! - `SecretPath` and `SecretEntry` (`entry`)
//! - `separate` / `merge`, the pure split and merge of secret leaves (`separator`)
//! - `LockedDocument` and `UnlockedDocument` (`document`)

pub mod document;
pub mod entry;
pub mod separator;

pub use document::{LockedDocument, UnlockedDocument};
pub use entry::{SecretEntry, SecretPath};
pub use separator::{merge, separate};

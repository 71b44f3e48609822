//! Where configuration files live.
//!
//! This module provides:
//! - `BaseDirectory` and `DirectoryRoots` (`base`)
//! - `PathResolver`, which validates caller-supplied names and builds
//!   the final absolute path (`resolver`)

pub mod base;
pub mod resolver;

pub use base::{BaseDirectory, DirectoryRoots};
pub use resolver::PathResolver;

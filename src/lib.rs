//! infsync - keeps a legacy setup.inf in step with the staged plugin payload.
//!
//! This library provides:
//! - Layout configuration (architectures, plugins, path tokens)
//! - Payload discovery under a build root
//! - Rendering of copy and directory entries
//! - Section-aware, idempotent editing of setup.inf

pub mod cfg;
pub mod entries;
pub mod error;
pub mod manifest;
pub mod scan;
pub mod sync;
pub mod ui;

pub use error::{Error, Result};

//! Core types shared by every lintprof module.

mod error;
pub mod progress;

pub use error::{Error, Result};

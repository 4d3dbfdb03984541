//! Lintprof - Lint performance reports from linter timing statistics.
//!
//! Lintprof reads the JSON a linter writes when run with its stats flag,
//! groups rule timings by rule, file, or file then rule, and renders ranked
//! tables for the terminal, markdown files or JSON.
//!
//! # Example
//!
//! ```no_run
//! use lintprof::output::Theme;
//! use lintprof::report::{render_view, ViewOptions};
//! use lintprof::stats::load_stats;
//!
//! let stats = load_stats("lint-stats.json").unwrap();
//! let table = render_view(&stats.records, &ViewOptions::default(), &Theme::default().plain());
//! println!("{table}");
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod interactive;
pub mod measure;
pub mod output;
pub mod report;
pub mod stats;

pub use core::{Error, Result};

//! ktselect: file selection for Kotlin lint and format runs.
//!
//! Decides which files under a root are handed to a lint/format engine,
//! using an ordered list of include/exclude patterns.

// Core infrastructure - re-exported from ktselect-core
pub use ktselect_core::engine;
pub use ktselect_core::error;
pub use ktselect_core::filter;
pub use ktselect_core::output;
pub use ktselect_core::paths;
pub use ktselect_core::scan;

// Front door
pub mod cli;

//! Context snapshot providers
//!
//! - [`FileContextProvider`] - Reads the snapshot from a file on every request
//!
//! # Usage
//!
//! ```no_run
//! use council_infrastructure::FileContextProvider;
//!
//! let provider = FileContextProvider::new("/var/lib/agent-council/context.md");
//! ```

mod file;

pub use file::FileContextProvider;

//! `flagview` - Browse the feature flags of a codebase
//!
//! This library loads the flag documents produced by the flag extractor,
//! merges records that share a name, groups definitions by project, filters
//! flags by free text, and renders the results as HTML pages.
//!
//! ```no_run
//! use flagview::{group_by_project, filter_flags, FlagStore};
//!
//! let store = FlagStore::new("public/docs/feature-flags");
//! let flags = store.flags()?;
//! for flag in filter_flags(&flags, "checkout") {
//!     let groups = group_by_project(flag);
//!     println!("{}: {} projects", flag.name, groups.len());
//! }
//! # Ok::<(), flagview::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod flag;
pub mod group;
pub mod logging;
pub mod search;
pub mod store;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
pub use flag::{Definition, FlagRecord, Location, MethodInfo, Reference};
pub use group::{group_by_project, ProjectGroup, ProjectGroups};
pub use logging::init_logging;
pub use search::filter_flags;
pub use store::{load_all, merge_flags, FlagStore};

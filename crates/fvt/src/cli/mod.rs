//! # CLI Behavior
//!
//! This is **one possible UI client** for fvt, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, logging
//! setup and output formatting.
//!
//! ## Typical Session
//!
//! ```text
//! fvt layers                      # what is in this directory
//! fvt list cities_1               # ensure the flag field, list features
//! fvt hide cities_1 2 4           # hide two features
//! fvt settings attrs cities_1 name pop
//! fvt settings filter cities_1 pop greater-than 100
//! fvt cleanup                     # remove the flag field everywhere
//! ```
//!
//! ## Module Structure
//!
//! - `commands`: Context setup and dispatch to the API
//! - `render`: Output formatting (tables, checkboxes, messages)
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styling constants

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;

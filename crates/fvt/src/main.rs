//! # fvt CLI
//!
//! `fvt` is a thin command-line client for the `fvtapp` library. This file only
//! invokes `cli::run()` and handles process termination; everything the user
//! sees lives in `src/cli/`.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/fvt/src/cli/)                            │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Logging, config and project wiring (commands.rs)         │
//! │  - Terminal rendering (render.rs, styles.rs)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/fvtapp/src/api.rs)                       │
//! │  - Session context: project, settings, visibility mirror    │
//! │  - Persists settings after every change                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (crates/fvtapp/src/commands/*)               │
//! │  - Listing, toggling, settings editing, cleanup             │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Layer Directories
//!
//! A project is a directory of `*.layer.json` documents, selected with `--dir`
//! (default: the current directory). An optional `fvt.toml` in that directory
//! configures the settings namespace, the settings file and the maximum
//! display limit.
//!
//! ## Testing Approach
//!
//! Command logic is unit tested inside `fvtapp`. This crate carries rendering
//! unit tests and end-to-end tests in `tests/` that drive the real binary
//! against a temporary layer directory.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

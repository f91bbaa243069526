//! # fvtapp Architecture
//!
//! fvtapp lets a user show or hide **individual features** of a vector
//! layer, something hosts usually only offer per layer. It is a UI-agnostic
//! library; the `fvt` binary is one client of it.
//!
//! ## How Visibility Works
//!
//! Visibility is stored as data. Each layer gets a reserved integer field,
//! `_fvt_vis` (1 = visible, 0 = hidden, null = visible), and the layer's row
//! filter is set to `"_fvt_vis" = 1`. Anything that honors the layer filter
//! then skips hidden features. See [`visibility`].
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  UI (the fvt CLI, or a host panel)                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Session context: project, settings, visibility mirror    │
//! │  - Resolves layer ids, persists settings                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - list, toggle, configure, cleanup, layers                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core: visibility.rs, filter.rs, settings/                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host capabilities: VectorLayer (layer/), SettingsStore     │
//! │  - MemLayer / MemSettings (testing)                         │
//! │  - FileLayer / FileSettings (JSON documents)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` inward nothing writes to stdout/stderr or exits the
//! process; errors come back as [`error::FvtError`] and diagnostics go
//! through `tracing`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade and session context
//! - [`commands`]: Interaction logic for each operation
//! - [`visibility`]: Visibility flag manager
//! - [`filter`]: Attribute filter predicates
//! - [`settings`]: Panel settings, their text encoding and stores
//! - [`layer`]: Host layer capability trait and adapters
//! - [`project`]: The set of layers in a session
//! - [`model`]: Fields, features and values
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod layer;
pub mod model;
pub mod project;
pub mod settings;
pub mod visibility;

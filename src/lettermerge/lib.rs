//! # Lettermerge Architecture
//!
//! Lettermerge keeps a directory of contact records, narrows it with
//! category, search and condition filters, and merges the survivors into
//! letters through `{{Field Name}}` templates. It is a library with a CLI
//! client, not the other way round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, parses record selectors       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Store workflows: import, list, filter, generate, ...     │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                              │
//!                  ▼                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Core (filter/, template/,    │ │  Storage Layer (store/)   │
//! │  normalize.rs)                │ │  - DataStore trait        │
//! │  - Pure functions over        │ │  - FileStore, InMemory    │
//! │    Record snapshots           │ │                           │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! ## Records
//!
//! A [`model::Record`] is an ordered map of field name to optional text.
//! There is no schema: field types are inferred from names
//! ([`filter::FieldType`]) and numbers are only parsed while a numeric
//! condition is evaluated. Keys starting with `_` are bookkeeping
//! (`_categoryId`, `_categoryName`) and never reach templates.
//!
//! ## The Merge Workflow
//!
//! 1. Take a snapshot of the store (newest first).
//! 2. Filter it with a [`filter::FilterContext`]. The filter is a pure
//!    function of the snapshot and the context and keeps input order.
//! 3. Review the matches and drop any that should not be sent.
//! 4. Resolve the [`template::Template`] per record and render each letter
//!    as HTML, plain text or a `mailto:` link. One failing record does not
//!    stop the batch.
//!
//! ## No I/O in the Core
//!
//! Everything from `api.rs` inward returns Rust values (`Result<CmdResult>`)
//! and never writes to stdout or exits the process. Diagnostics go through
//! `tracing`; the binary decides where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: facade used by every front end
//! - [`commands`]: one module per operation
//! - [`filter`]: conditions, groups and the filter pipeline
//! - [`template`]: interpolation and document renderers
//! - [`normalize`]: canonical field order
//! - [`category`]: category registry
//! - [`store`]: persistence
//! - [`config`]: `config.json` settings

pub mod api;
pub mod category;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod init;
pub mod model;
pub mod normalize;
pub mod store;
pub mod template;

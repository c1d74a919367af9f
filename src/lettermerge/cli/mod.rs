//! # CLI Behavior
//!
//! One client of the lettermerge library. For the layering, see the crate
//! documentation of the library.
//!
//! ## Naked Execution
//!
//! Running `lettermerge` with no arguments lists every record, newest first.
//!
//! ## Filters on the Command Line
//!
//! `filter`, `export` and `generate` share one set of flags that build a
//! filter context:
//!
//! - `--category ID`, `--categories A,B`, `--uncategorized`
//! - `--search TEXT` (letter columns, or directory columns with `--directory`)
//! - `--when FIELD:OPERATOR:VALUE`, repeatable, joined with AND or with OR
//!   under `--any`
//! - `--filter-file FILE` for a saved JSON filter; flags refine it
//!
//! ## Defaults
//!
//! `generate` takes its format, layout and signature from `config.json`
//! unless the flags override them.
//!
//! ## Module Structure
//!
//! - `commands`: per-command handlers that call the API and print results
//! - `print`: output formatting (lists, tables, colors, messages)
//! - `setup`: argument parsing via clap and logging setup

mod commands;
mod print;
pub mod setup;

pub use commands::run;

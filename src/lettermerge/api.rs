//! # API Facade
//!
//! A thin layer over [`crate::commands`]. It is the single entry point for
//! every lettermerge operation regardless of the front end.
//!
//! The facade parses user-facing selectors into typed values and dispatches
//! to the command functions. It does no I/O of its own beyond what the
//! commands do, and returns [`CmdResult`] values rather than text.
//!
//! `MergeApi<S: DataStore>` is generic over storage: the CLI uses
//! `MergeApi<FileStore>`, tests use `MergeApi<InMemoryStore>`.

use crate::commands;
use crate::error::Result;
use crate::filter::{CategorySelection, FilterContext};
use crate::model::RecordData;
use crate::store::DataStore;
use std::path::Path;

pub use crate::commands::config::ConfigAction;
pub use crate::commands::generate::GenerateRequest;
pub use crate::commands::helpers::RecordSelector;
pub use crate::commands::list::{ListQuery, SortSpec};
pub use crate::commands::{CmdMessage, CmdResult, MergePaths, MessageLevel};

pub struct MergeApi<S: DataStore> {
    store: S,
    paths: MergePaths,
}

impl<S: DataStore> MergeApi<S> {
    pub fn new(store: S, paths: MergePaths) -> Self {
        Self { store, paths }
    }

    pub fn paths(&self) -> &MergePaths {
        &self.paths
    }

    pub fn add_record(&mut self, data: RecordData, category: Option<&str>) -> Result<CmdResult> {
        commands::create::run(&mut self.store, data, category)
    }

    pub fn list_records(&self, query: &ListQuery) -> Result<CmdResult> {
        commands::list::run(&self.store, query)
    }

    pub fn view_records<I: AsRef<str>>(&self, selectors: &[I]) -> Result<CmdResult> {
        let selectors = commands::helpers::parse_selectors(selectors)?;
        commands::view::run(&self.store, &selectors)
    }

    pub fn update_records<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        data: RecordData,
        category: Option<&str>,
    ) -> Result<CmdResult> {
        let selectors = commands::helpers::parse_selectors(selectors)?;
        commands::update::run(&mut self.store, &selectors, data, category)
    }

    pub fn delete_records<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        let selectors = commands::helpers::parse_selectors(selectors)?;
        commands::delete::run(&mut self.store, &selectors)
    }

    pub fn delete_category_records(&mut self, selection: &CategorySelection) -> Result<CmdResult> {
        commands::delete::run_category(&mut self.store, selection)
    }

    pub fn import_records(&mut self, path: &Path, category: Option<&str>) -> Result<CmdResult> {
        commands::import::run(&mut self.store, path, category)
    }

    pub fn export_records(&self, ctx: &FilterContext, path: &Path) -> Result<CmdResult> {
        commands::export::run(&self.store, ctx, path)
    }

    pub fn fields(&self, field: Option<&str>) -> Result<CmdResult> {
        commands::fields::run(&self.store, field)
    }

    pub fn preview_filter(&self, ctx: &FilterContext) -> Result<CmdResult> {
        commands::filter::run(&self.store, ctx)
    }

    pub fn generate(&self, request: &GenerateRequest) -> Result<CmdResult> {
        commands::generate::run(&self.store, request)
    }

    pub fn list_categories(&self) -> Result<CmdResult> {
        commands::categories::list(&self.store)
    }

    pub fn add_category(&mut self, name: &str, kind: Option<&str>) -> Result<CmdResult> {
        commands::categories::add(&mut self.store, name, kind)
    }

    pub fn rename_category(&mut self, id_or_name: &str, new_name: &str) -> Result<CmdResult> {
        commands::categories::rename(&mut self.store, id_or_name, new_name)
    }

    pub fn delete_category(&mut self, id_or_name: &str) -> Result<CmdResult> {
        commands::categories::delete(&mut self.store, id_or_name)
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn init(&mut self) -> Result<CmdResult> {
        commands::init::run(&mut self.store, &self.paths)
    }
}

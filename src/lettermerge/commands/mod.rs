use crate::category::CategoryCounts;
use crate::config::MergeConfig;
use crate::filter::FieldType;
use crate::model::Record;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

pub mod categories;
pub mod config;
pub mod create;
pub mod delete;
pub mod export;
pub mod fields;
pub mod filter;
pub mod generate;
pub mod helpers;
pub mod import;
pub mod init;
pub mod list;
pub mod update;
pub mod view;

#[derive(Debug, Clone)]
pub struct MergePaths {
    pub data_dir: PathBuf,
}

impl MergePaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A record as shown to the user: its position in the newest-first listing
/// plus the flattened record.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRecord {
    pub index: usize,
    pub record: Record,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub field_type: FieldType,
}

/// What happened to one record during batch generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub record_id: String,
    pub result: std::result::Result<String, String>,
}

impl GenerateOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_records: Vec<Record>,
    pub listed_records: Vec<DisplayRecord>,
    pub fields: Vec<FieldInfo>,
    pub values: Vec<String>,
    pub category_counts: Option<CategoryCounts>,
    pub outcomes: Vec<GenerateOutcome>,
    pub output_path: Option<PathBuf>,
    pub config: Option<MergeConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_records(mut self, records: Vec<Record>) -> Self {
        self.affected_records = records;
        self
    }

    pub fn with_listed_records(mut self, records: Vec<DisplayRecord>) -> Self {
        self.listed_records = records;
        self
    }

    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    pub fn with_config(mut self, config: MergeConfig) -> Self {
        self.config = Some(config);
        self
    }
}

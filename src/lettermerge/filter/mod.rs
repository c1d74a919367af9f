//! # Record filtering
//!
//! A filter pass narrows a snapshot of records in three stages:
//!
//! 1. **Category**: a multi-select set of category ids, or a single id, or the
//!    `_uncategorized` sentinel.
//! 2. **Global search**: a case-insensitive substring match over a fixed set
//!    of columns.
//! 3. **Groups**: every [`FilterGroup`] must match; inside a group the
//!    conditions combine with AND or OR.
//!
//! All state lives in a [`FilterContext`] value, so a pass is a pure function
//! of its inputs and keeps the input order.
//!
//! Conditions with no field or no operator match every record. This keeps a
//! half-edited filter row from hiding data while the user is still typing.

mod condition;
mod engine;
mod fields;
mod group;

pub use condition::{parse_number, Condition, OperatorKind};
pub use engine::{
    apply, apply_refs, CategorySelection, FilterContext, SearchColumns, DIRECTORY_SEARCH_COLUMNS,
    LETTER_SEARCH_COLUMNS, UNCATEGORIZED,
};
pub use fields::{field_names, unique_values, FieldType, NUMERIC_FIELDS};
pub use group::{FilterGroup, GroupLogic};

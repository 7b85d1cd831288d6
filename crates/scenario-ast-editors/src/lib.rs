//! Shape-specific editors for scenario expression trees.
//!
//! Each editor projects one node shape into editable fields together with the
//! validation errors that belong to each field, and turns the fields back
//! into a canonical node. [`NodeEditor`] picks the right editor for a node;
//! [`EditorSession`] runs one over a scoped copy of a store's subtree.

pub mod aggregation;
pub mod config;
pub mod duration;
pub mod editor;
pub mod error;
pub mod field_errors;
pub mod fuzzy_match;
pub mod is_multiple_of;
pub mod session;
pub mod string_template;
pub mod time_add;
pub mod timestamp_extract;
pub mod types;
mod util;

pub use aggregation::{AggregationEditor, FilterModel, FilterOperator, FilterValue, OperatorFamily};
pub use config::{EditorConfig, FuzzyLevels, FuzzyMatchConfig};
pub use duration::{Duration, DurationUnit};
pub use editor::{EditorContext, EditorKind, NodeEditor, SubEditor};
pub use error::EditorError;
pub use field_errors::FieldErrors;
pub use fuzzy_match::{FuzzyLevel, FuzzyMatchEditor};
pub use is_multiple_of::IsMultipleOfEditor;
pub use session::EditorSession;
pub use string_template::{StringTemplateEditor, TemplateVariable};
pub use time_add::{Sign, TimeAddEditor};
pub use timestamp_extract::{TimestampExtractEditor, TimestampPart};
pub use types::{FieldTypes, LiteralTypes, TypeResolver};

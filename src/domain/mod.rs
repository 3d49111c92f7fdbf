//! Domain types for notes, tasks and internal records.
//!
//! This module provides:
//! - Row types returned by the repository
//! - Write shapes (`New*`, `*Change`) consumed by the repository
//! - Paging, list filters and input validation

pub mod note;
pub mod page;
pub mod record;
pub mod task;
pub mod validation;

pub use note::{NewNote, Note, NoteChange};
pub use page::{ListFilter, Page};
pub use record::{NewRecord, Record, RecordChange, RecordFilter};
pub use task::{NewTask, Task, TaskChange};
pub use validation::{validate_name, ValidationError};

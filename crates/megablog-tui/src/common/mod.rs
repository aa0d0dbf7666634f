//! Shared building blocks for screens and rendering.

pub mod field;
pub mod task;
pub mod text;
pub mod widgets;

pub use field::TextField;
pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskState, Tasks};
pub use text::truncate_with_ellipsis;

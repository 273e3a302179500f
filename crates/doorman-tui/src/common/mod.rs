//! Shared TUI helpers.

mod task;
mod text;

pub use task::{TaskCompleted, TaskId, TaskSeq, TaskState};
pub use text::{mask_secret, truncate_start_with_ellipsis, truncate_with_ellipsis};

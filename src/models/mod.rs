mod activity;
mod comment;
mod document;
mod folder;
mod user;

pub use activity::{Activity, ActivityAction};
pub use comment::Comment;
pub use document::{Document, WorkflowState, WorkflowStatus};
pub use folder::Folder;
pub use user::{Role, User};

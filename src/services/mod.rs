pub mod activity;
pub mod collab;
pub mod extract;
pub mod hierarchy;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod summarizer;
pub mod threads;

pub use activity::ActivityLog;
pub use collab::CollabHub;
pub use hierarchy::FolderHierarchy;
pub use registry::DocumentRegistry;
pub use storage::{LocalStorage, Storage};
pub use summarizer::{HuggingFaceSummarizer, MockSummarizer, Summarizer};
pub use threads::CommentThreads;

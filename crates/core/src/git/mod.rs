//! Version-control history and its correlation with the call graph

pub mod cache;
pub mod correlation;
pub mod history;

pub use cache::CommitCache;
pub use correlation::{FileIndex, GitAnalysis, GitMetrics, GitSummary, Hotspot, Partner};
pub use history::{
    is_fix_message, Commit, FileChange, Git2History, HistoryError, HistorySource, LineRange,
};

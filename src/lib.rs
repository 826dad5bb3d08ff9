pub mod commands;
pub mod core;
pub mod utils;

pub use self::core::repository::{Repository, RepoError};
pub use self::core::object::Object;
pub use self::core::index::{Index, IndexEntry};
pub use self::core::commit::Commit;
pub use self::core::history::History;
pub use self::core::config::Config;
pub use self::core::refs::Head;
pub use utils::diff::{
    diff_stats, diff_text, show_commit_diff, ChangeKind, CommitDiff, CommitReport, DiffRun,
    DiffStats, FileDiff, FileStatus,
};

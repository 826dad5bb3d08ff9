pub mod repository;
pub mod object;
pub mod index;
pub mod commit;
pub mod history;
pub mod refs;
pub mod config;

pub use repository::{Repository, RepoError};
pub use object::Object;
pub use index::{Index, IndexEntry};
pub use commit::Commit;
pub use history::History;
pub use refs::Head;
pub use config::Config;

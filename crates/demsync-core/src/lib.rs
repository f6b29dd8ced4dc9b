pub mod config;
pub mod logging;

pub mod catalog;
pub mod digest;
pub mod entry;
pub mod error;
pub mod layout;
pub mod outcome;
pub mod storage;
pub mod sync;
pub mod task;

pub use entry::Entry;
pub use error::SyncError;
pub use layout::DataLayout;
pub use outcome::{EntryOutcome, EntryStatus};
pub use sync::{SyncSummary, Syncer};
pub use task::{FetchTask, TaskOptions, TaskState};

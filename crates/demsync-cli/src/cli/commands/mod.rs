//! CLI command handlers, one per file.

mod checksum;
mod status;
mod sync;

pub use checksum::run_checksum;
pub use status::run_status;
pub use sync::run_sync;

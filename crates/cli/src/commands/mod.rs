//! CLI commands for market reports.

pub mod all;
pub mod profiles;
pub mod report;
pub mod snapshot;

pub use all::{run_all, AllArgs};
pub use profiles::run_profiles;
pub use report::{run_report, ReportArgs};
pub use snapshot::{run_snapshot, SnapshotArgs};

pub mod plots;
pub mod report;

pub use report::{json_block, Report, ReportSection};

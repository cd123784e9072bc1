//! Access report: grouping, durations and day buckets.

mod aggregate;
mod bucket;
mod duration;

pub use aggregate::{BucketGroup, ReportTotals, SessionReport, StudentGroup, aggregate};
pub use bucket::{Bucket, TODAY_LABEL, YESTERDAY_LABEL};
pub use duration::{UNAVAILABLE, format_duration};

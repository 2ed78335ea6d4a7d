mod report;
mod review;

pub use report::{Issue, Keyframe, Report};
pub use review::{Region, Review};

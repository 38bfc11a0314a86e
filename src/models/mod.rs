pub mod profile;
pub mod stats;

pub use profile::{Credential, Handle, ModelError, Period, VisitEvent};
pub use stats::{DailyStat, StatsKey, StatsResult};

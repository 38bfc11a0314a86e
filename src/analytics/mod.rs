//! Profile visit analytics
//!
//! Recording side: [`VisitRecorder`] submits a visit per profile mount and
//! never reports failure. Query side: [`StatsView`] reads cached statistics
//! for the selected period and renders the total and a daily bar chart.

pub mod chart;
pub mod recorder;
pub mod view;

pub use chart::{ChartBucket, ChartSeries};
pub use recorder::{VisitRecorder, VisitTracker};
pub use view::{LoadState, StatsView};

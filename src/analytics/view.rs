//! Period-filtered statistics view
//!
//! The view owns the selected period and one load state per period. Fetches
//! run as spawned tasks and report back over a channel, so a slow response
//! for one period can never overwrite what is shown for another. Dropping
//! the view closes the channel and late results are discarded.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::analytics::chart::{ChartSeries, CHART_TITLE};
use crate::backend::{BackendError, CachedStats};
use crate::models::{Handle, Period, StatsResult};
use crate::session::Session;

pub const VIEW_TITLE: &str = "Estadísticas de visitas";
pub const LOADING_MESSAGE: &str = "Cargando estadísticas…";
pub const ERROR_MESSAGE: &str = "No se pudieron cargar las estadísticas";
pub const TOTAL_CAPTION: &str = "visitas totales";

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Success(Arc<StatsResult>),
    Error(Arc<BackendError>),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// Displayed total, 0 unless loaded
    pub fn total_visits(&self) -> u64 {
        match self {
            LoadState::Success(stats) => stats.total_visits,
            _ => 0,
        }
    }

    pub fn series(&self) -> ChartSeries {
        match self {
            LoadState::Success(stats) => ChartSeries::from_stats(stats),
            _ => ChartSeries::default(),
        }
    }
}

struct Completion {
    period: Period,
    result: Result<Arc<StatsResult>, Arc<BackendError>>,
}

pub struct StatsView {
    handle: Handle,
    session: Session,
    stats: Arc<CachedStats>,
    period: Period,
    states: HashMap<Period, LoadState>,
    in_flight: HashSet<Period>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl StatsView {
    /// Mount the view on `handle` with the default period selected
    pub async fn mount(handle: Handle, session: Session, stats: Arc<CachedStats>) -> Self {
        Self::mount_with_period(handle, session, stats, Period::default()).await
    }

    /// Mount with an initial period; only that period is evaluated
    pub async fn mount_with_period(
        handle: Handle,
        session: Session,
        stats: Arc<CachedStats>,
        period: Period,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let mut view = Self {
            handle,
            session,
            stats,
            period,
            states: HashMap::new(),
            in_flight: HashSet::new(),
            completions_tx,
            completions_rx,
        };
        view.evaluate().await;
        view
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// State of the selected period only
    pub fn state(&self) -> &LoadState {
        self.states.get(&self.period).unwrap_or(&LoadState::Loading)
    }

    pub async fn select_period(&mut self, period: Period) {
        self.period = period;
        self.evaluate().await;
    }

    /// Check the cache for the selected key and start a fetch on a miss
    async fn evaluate(&mut self) {
        let period = self.period;

        if let Some(stats) = self.stats.peek(&self.handle, period).await {
            debug!(handle = %self.handle, period = %period, "stats served from cache");
            self.states.insert(period, LoadState::Success(stats));
            return;
        }

        self.states.insert(period, LoadState::Loading);
        if !self.in_flight.insert(period) {
            return;
        }

        let stats = Arc::clone(&self.stats);
        let handle = self.handle.clone();
        let session = self.session.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = stats.get_stats(&handle, period, &session).await;
            // receiver is gone once the view is dropped
            let _ = tx.send(Completion { period, result });
        });
    }

    fn apply(&mut self, completion: Completion) -> Period {
        let Completion { period, result } = completion;
        self.in_flight.remove(&period);

        let state = match result {
            Ok(stats) => LoadState::Success(stats),
            Err(err) => LoadState::Error(err),
        };
        self.states.insert(period, state);
        period
    }

    /// Wait for the next fetch to finish and return the period it belonged to
    pub async fn next_update(&mut self) -> Option<Period> {
        if self.in_flight.is_empty() {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Drive fetches until the selected period is no longer loading
    pub async fn settle(&mut self) -> &LoadState {
        while self.state().is_loading() {
            if self.next_update().await.is_none() {
                break;
            }
        }
        self.state()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let buttons: Vec<String> = Period::ALL
            .into_iter()
            .map(|p| {
                if p == self.period {
                    format!("[{}]", p.label())
                } else {
                    format!(" {} ", p.label())
                }
            })
            .collect();
        let _ = writeln!(out, "{VIEW_TITLE}    {}", buttons.join(" "));
        out.push('\n');

        match self.state() {
            LoadState::Loading => {
                let _ = writeln!(out, "{LOADING_MESSAGE}");
            }
            LoadState::Error(_) => {
                let _ = writeln!(out, "{ERROR_MESSAGE}");
            }
            state @ LoadState::Success(_) => {
                let _ = writeln!(out, "{}", state.total_visits());
                let _ = writeln!(out, "{TOTAL_CAPTION}");
                out.push('\n');
                let _ = writeln!(out, "{CHART_TITLE}");
                out.push_str(&state.series().render());
            }
        }

        out
    }
}

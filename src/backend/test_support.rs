//! In-memory `BackendApi` used by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::watch;

use crate::backend::{BackendApi, BackendError, BackendResult};
use crate::models::{Credential, DailyStat, Handle, Period, StatsResult, VisitEvent};

/// Holds a fetch in flight until released
pub struct Gate(watch::Sender<bool>);

impl Gate {
    pub fn release(&self) {
        self.0.send_replace(true);
    }
}

#[derive(Default)]
pub struct FakeBackend {
    responses: Mutex<HashMap<Period, Option<StatsResult>>>,
    gates: Mutex<HashMap<Period, Arc<Gate>>>,
    stats_calls: Mutex<HashMap<Period, usize>>,
    last_stats_credential: Mutex<Option<String>>,
    visits: Mutex<Vec<VisitEvent>>,
    visit_calls: AtomicUsize,
    fail_visits: Mutex<bool>,
}

pub fn sample_stats() -> StatsResult {
    StatsResult {
        total_visits: 42,
        daily_stats: vec![
            DailyStat {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                visits: 5,
            },
            DailyStat {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                visits: 7,
            },
        ],
    }
}

fn failure() -> BackendError {
    BackendError::Status {
        url: "fake://stats".to_string(),
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, period: Period, stats: StatsResult) {
        self.responses.lock().unwrap().insert(period, Some(stats));
    }

    pub fn fail(&self, period: Period) {
        self.responses.lock().unwrap().insert(period, None);
    }

    pub fn fail_visits(&self) {
        *self.fail_visits.lock().unwrap() = true;
    }

    /// Block fetches for `period` until the returned gate is released
    pub fn hold(&self, period: Period) -> Arc<Gate> {
        let (tx, _rx) = watch::channel(false);
        let gate = Arc::new(Gate(tx));
        self.gates.lock().unwrap().insert(period, Arc::clone(&gate));
        gate
    }

    pub fn stats_calls(&self, period: Period) -> usize {
        self.stats_calls.lock().unwrap().get(&period).copied().unwrap_or(0)
    }

    pub fn last_stats_credential(&self) -> Option<String> {
        self.last_stats_credential.lock().unwrap().clone()
    }

    pub fn visits(&self) -> Vec<VisitEvent> {
        self.visits.lock().unwrap().clone()
    }

    pub fn visit_calls(&self) -> usize {
        self.visit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn record_visit(&self, event: &VisitEvent) -> BackendResult<()> {
        self.visit_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_visits.lock().unwrap() {
            return Err(failure());
        }
        self.visits.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn fetch_stats(
        &self,
        _handle: &Handle,
        period: Period,
        credential: Option<&Credential>,
    ) -> BackendResult<StatsResult> {
        *self.stats_calls.lock().unwrap().entry(period).or_insert(0) += 1;
        *self.last_stats_credential.lock().unwrap() = credential.map(|c| c.token().to_string());

        let gate = self.gates.lock().unwrap().get(&period).cloned();
        if let Some(gate) = gate {
            let mut released = gate.0.subscribe();
            let _ = released.wait_for(|open| *open).await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(&period)
            .cloned()
            .flatten()
            .ok_or_else(failure)
    }
}

//! Fire-and-forget profile visit recording
//!
//! A visit is advisory telemetry: it is submitted once from a detached task
//! and its outcome never reaches the viewer. Failures are logged at debug
//! level and dropped, with no retry.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::BackendApi;
use crate::models::{Handle, VisitEvent};
use crate::session::Session;

#[derive(Clone)]
pub struct VisitRecorder {
    backend: Arc<dyn BackendApi>,
}

impl VisitRecorder {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }

    /// Submit one visit for `handle` in the background.
    ///
    /// The returned handle may be dropped; the submission still runs.
    pub fn record_visit(&self, handle: &Handle, session: &Session) -> JoinHandle<()> {
        let event = VisitEvent::new(handle, session);
        let backend = Arc::clone(&self.backend);

        tokio::spawn(async move {
            match backend.record_visit(&event).await {
                Ok(()) => debug!(handle = %event.handle, "visit recorded"),
                Err(err) => {
                    debug!(handle = %event.handle, error = %err, "visit recording failed, ignoring")
                }
            }
        })
    }
}

/// Binds recording to the lifetime of one mounted profile view.
///
/// Mounting records once; the handle changing records again for the new
/// handle. In-flight submissions for a previous handle are left alone.
pub struct VisitTracker {
    recorder: VisitRecorder,
    session: Session,
    handle: Handle,
    last_submission: JoinHandle<()>,
}

impl VisitTracker {
    pub fn mount(recorder: VisitRecorder, handle: Handle, session: Session) -> Self {
        let last_submission = recorder.record_visit(&handle, &session);
        Self {
            recorder,
            session,
            handle,
            last_submission,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Returns true when a new visit was submitted
    pub fn set_handle(&mut self, handle: Handle) -> bool {
        if handle == self.handle {
            return false;
        }

        self.handle = handle;
        self.last_submission = self.recorder.record_visit(&self.handle, &self.session);
        true
    }

    /// Wait for the most recent submission to finish (used on shutdown)
    pub async fn flush(self) {
        let _ = self.last_submission.await;
    }
}

//! The submission state machine.
//!
//! ```text
//!            submit                 2xx + saved
//!   Idle ─────────────▶ Busy ─────────────────────▶ Succeeded
//!    ▲  ╲                 │                            │
//!    │   ╲ no file /      │ non-2xx, network error,    │
//!    │    ╲ no direction  │ write error, panic         │
//!    │     ▼              ▼                            │
//!    │     Failed ◀───────┘                            │
//!    └───── (submit again from any non-Busy state) ◀───┘
//! ```
//!
//! [`SubmissionController`] owns the whole session: the input slot, the
//! direction group, the UI state, the status message and the trigger
//! control. Each transition mutates the session under a lock, reflects it
//! into a [`View`] and hands that to the [`Presenter`] after the lock is
//! released.
//!
//! Only one attempt can be in flight. The trigger is disabled while `Busy`,
//! and an atomic flag also rejects programmatic re-entry. Both are restored
//! by a drop guard, so they come back even if the attempt panics or its
//! future is dropped.

use crate::config::ClientConfig;
use crate::direction::{DirectionSelector, TranslationDirection};
use crate::download::{DownloadSink, FileDownloadSink};
use crate::error::TranslateError;
use crate::input::{InputCollector, SelectedFile};
use crate::outcome::{RequestOutcome, NO_DIRECTION_MESSAGE, NO_FILE_MESSAGE};
use crate::presentation::{
    reflect, Severity, SharedPresenter, StatusMessage, TriggerControl, View, BUSY_MESSAGE,
};
use crate::service::{HttpTranslationService, TranslationService};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Phase of the submission workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiState {
    #[default]
    Idle,
    Busy,
    Succeeded,
    Failed,
}

impl UiState {
    /// `Succeeded` and `Failed` end an attempt; neither blocks a new one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UiState::Succeeded | UiState::Failed)
    }
}

/// All mutable state of one client session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: UiState,
    message: Option<StatusMessage>,
    trigger: TriggerControl,
    input: InputCollector,
    direction: DirectionSelector,
}

impl Session {
    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn trigger(&self) -> &TriggerControl {
        &self.trigger
    }

    pub fn input(&self) -> &InputCollector {
        &self.input
    }

    pub fn direction(&self) -> &DirectionSelector {
        &self.direction
    }

    #[cfg(test)]
    pub(crate) fn input_mut(&mut self) -> &mut InputCollector {
        &mut self.input
    }
}

/// Drives selection, submission and download for one session.
pub struct SubmissionController {
    session: Mutex<Session>,
    in_flight: AtomicBool,
    service: Arc<dyn TranslationService>,
    sink: Arc<dyn DownloadSink>,
    presenter: SharedPresenter,
    download_filename: String,
}

impl SubmissionController {
    pub fn new(
        service: Arc<dyn TranslationService>,
        sink: Arc<dyn DownloadSink>,
        presenter: SharedPresenter,
        download_filename: impl Into<String>,
    ) -> Self {
        Self {
            session: Mutex::new(Session::default()),
            in_flight: AtomicBool::new(false),
            service,
            sink,
            presenter,
            download_filename: download_filename.into(),
        }
    }

    /// Wire an HTTP service and an on-disk download sink from `config`.
    pub fn from_config(
        config: &ClientConfig,
        presenter: SharedPresenter,
    ) -> Result<Self, TranslateError> {
        let service = HttpTranslationService::new(config)?;
        let sink = FileDownloadSink::new(config.output_dir.clone(), config.overwrite);
        Ok(Self::new(
            Arc::new(service),
            Arc::new(sink),
            presenter,
            config.download_filename.clone(),
        ))
    }

    // ── Input ────────────────────────────────────────────────────────────

    /// Apply the file picker's result. See [`InputCollector::select_via_browse`].
    pub fn select_via_browse(&self, chosen: Vec<SelectedFile>) -> bool {
        self.update_input(|input| input.select_via_browse(chosen))
    }

    /// Apply a drag-and-drop. See [`InputCollector::select_via_drop`].
    pub fn select_via_drop(&self, dropped: Vec<SelectedFile>) -> bool {
        // Rendered even when ignored: the drop clears the highlight.
        let (accepted, view) = {
            let mut session = self.session();
            let accepted = session.input.select_via_drop(dropped);
            (accepted, reflect(&session))
        };
        self.presenter.render(&view);
        accepted
    }

    pub fn drag_over(&self) {
        self.update_input(|input| {
            input.drag_over();
            true
        });
    }

    pub fn drag_leave(&self) {
        self.update_input(|input| {
            input.drag_leave();
            true
        });
    }

    /// Activate one direction option, or none with `None`.
    pub fn set_direction(&self, direction: Option<TranslationDirection>) {
        let view = {
            let mut session = self.session();
            match direction {
                Some(d) => session.direction.select(d),
                None => session.direction.clear(),
            }
            reflect(&session)
        };
        self.presenter.render(&view);
    }

    // ── Observation ──────────────────────────────────────────────────────

    pub fn state(&self) -> UiState {
        self.session().state
    }

    /// Current view, as the presenter would receive it.
    pub fn view(&self) -> View {
        reflect(&self.session())
    }

    /// Copy of the full session.
    pub fn snapshot(&self) -> Session {
        self.session().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Run one submission attempt to completion.
    ///
    /// Returns the attempt's outcome; every failure of the attempt itself is
    /// folded into it. The only error is
    /// [`TranslateError::SubmissionInFlight`], returned without touching any
    /// state when another attempt has not finished yet.
    pub async fn submit(&self) -> Result<RequestOutcome, TranslateError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Submit ignored: a translation is already in progress");
            return Err(TranslateError::SubmissionInFlight);
        }
        let _guard = InFlightGuard { controller: self };

        let (file, direction) = match self.check_preconditions() {
            Ok(ready) => ready,
            Err(e) => {
                let outcome = RequestOutcome::from_error(e);
                self.finish(&outcome);
                return Ok(outcome);
            }
        };

        self.enter_busy(&file, direction);
        let outcome = self.attempt(&file, direction).await;
        self.finish(&outcome);
        Ok(outcome)
    }

    fn check_preconditions(&self) -> Result<(SelectedFile, TranslationDirection), TranslateError> {
        let session = self.session();
        let Some(file) = session.input.selected().cloned() else {
            debug!("Submit without a selected file");
            return Err(TranslateError::Validation(NO_FILE_MESSAGE.to_string()));
        };
        let Some(direction) = session.direction.active() else {
            debug!("Submit without a direction");
            return Err(TranslateError::Validation(NO_DIRECTION_MESSAGE.to_string()));
        };
        Ok((file, direction))
    }

    fn enter_busy(&self, file: &SelectedFile, direction: TranslationDirection) {
        info!("Submitting '{}' for {} translation", file.name(), direction);
        let view = {
            let mut session = self.session();
            session.state = UiState::Busy;
            session.trigger = TriggerControl::busy();
            session.message = Some(StatusMessage::new(BUSY_MESSAGE, Severity::Info));
            reflect(&session)
        };
        self.presenter.render(&view);
    }

    async fn attempt(&self, file: &SelectedFile, direction: TranslationDirection) -> RequestOutcome {
        let run = async {
            let bytes = self.service.translate(file, direction).await?;
            let saved_to = self.sink.deliver(&bytes, &self.download_filename).await?;
            Ok::<_, TranslateError>(RequestOutcome::Success {
                bytes,
                suggested_filename: self.download_filename.clone(),
                saved_to,
            })
        };

        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!("Translation error: {}", e);
                RequestOutcome::from_error(e)
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!("Translation error (panic): {}", reason);
                RequestOutcome::UnexpectedFailure { reason }
            }
        }
    }

    fn finish(&self, outcome: &RequestOutcome) {
        let view = {
            let mut session = self.session();
            session.state = if outcome.is_success() {
                UiState::Succeeded
            } else {
                UiState::Failed
            };
            session.message = Some(StatusMessage::new(outcome.message(), outcome.severity()));
            reflect(&session)
        };
        if let RequestOutcome::Success { saved_to, .. } = outcome {
            info!("Translation complete: {}", saved_to.display());
        }
        self.presenter.render(&view);
    }

    fn restore_trigger(&self) {
        let view = {
            let mut session = self.session();
            if session.trigger.enabled {
                None
            } else {
                session.trigger = TriggerControl::ready();
                Some(reflect(&session))
            }
        };
        self.in_flight.store(false, Ordering::Release);
        if let Some(view) = view {
            self.presenter.render(&view);
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_input(&self, f: impl FnOnce(&mut InputCollector) -> bool) -> bool {
        let (changed, view) = {
            let mut session = self.session();
            let changed = f(&mut session.input);
            (changed, reflect(&session))
        };
        if changed {
            self.presenter.render(&view);
        }
        changed
    }
}

/// Re-enables the trigger and clears the in-flight flag however `submit` exits.
struct InFlightGuard<'a> {
    controller: &'a SubmissionController,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.controller.restore_trigger();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected internal error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PDF_MIME;
    use crate::outcome::{ERROR_PREFIX, SUCCESS_MESSAGE};
    use crate::presentation::{Presenter, READY_LABEL};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    enum Script {
        Respond(Vec<u8>),
        Reject(u16, &'static str),
        Unreachable(&'static str),
        Panic,
    }

    struct ScriptedService {
        script: Script,
        calls: AtomicUsize,
        started: Arc<Notify>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedService {
        fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                started: Arc::new(Notify::new()),
                gate: None,
            }
        }

        fn gated(script: Script) -> (Self, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            let mut service = Self::new(script);
            service.gate = Some(gate.clone());
            (service, gate)
        }
    }

    #[async_trait]
    impl TranslationService for ScriptedService {
        async fn translate(
            &self,
            _file: &SelectedFile,
            _direction: TranslationDirection,
        ) -> Result<Vec<u8>, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.script {
                Script::Respond(bytes) => Ok(bytes.clone()),
                Script::Reject(status, detail) => Err(TranslateError::ServerRejected {
                    status: *status,
                    detail: detail.to_string(),
                }),
                Script::Unreachable(reason) => Err(TranslateError::Network {
                    reason: reason.to_string(),
                }),
                Script::Panic => panic!("decoder exploded"),
            }
        }
    }

    #[derive(Default)]
    struct CountingSink {
        deliveries: Mutex<Vec<(usize, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl DownloadSink for CountingSink {
        async fn deliver(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, TranslateError> {
            if self.fail {
                return Err(TranslateError::OutputWriteFailed {
                    path: PathBuf::from(filename),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.deliveries
                .lock()
                .unwrap()
                .push((bytes.len(), filename.to_string()));
            Ok(PathBuf::from("/downloads").join(filename))
        }
    }

    #[derive(Default)]
    struct RecordingPresenter {
        views: Mutex<Vec<View>>,
    }

    impl RecordingPresenter {
        fn views(&self) -> Vec<View> {
            self.views.lock().unwrap().clone()
        }
    }

    impl Presenter for RecordingPresenter {
        fn render(&self, view: &View) {
            self.views.lock().unwrap().push(view.clone());
        }
    }

    struct Harness {
        controller: SubmissionController,
        service: Arc<ScriptedService>,
        sink: Arc<CountingSink>,
        presenter: Arc<RecordingPresenter>,
    }

    fn harness_with(service: ScriptedService, sink: CountingSink) -> Harness {
        let service = Arc::new(service);
        let sink = Arc::new(sink);
        let presenter = Arc::new(RecordingPresenter::default());
        let controller = SubmissionController::new(
            service.clone(),
            sink.clone(),
            presenter.clone(),
            "translated.docx",
        );
        Harness {
            controller,
            service,
            sink,
            presenter,
        }
    }

    fn harness(script: Script) -> Harness {
        harness_with(ScriptedService::new(script), CountingSink::default())
    }

    fn pdf() -> SelectedFile {
        SelectedFile::new("report.pdf", PDF_MIME, b"%PDF-1.7 test".to_vec())
    }

    #[tokio::test]
    async fn submit_without_file_fails_without_request() {
        let h = harness(Script::Respond(b"doc".to_vec()));

        let outcome = h.controller.submit().await.unwrap();

        assert_eq!(
            outcome,
            RequestOutcome::ValidationFailure {
                reason: "Please select a PDF file".into()
            }
        );
        let view = h.controller.view();
        assert_eq!(view.state, UiState::Failed);
        assert_eq!(view.message.unwrap().text, "Please select a PDF file");
        assert!(view.trigger.enabled);
        assert_eq!(h.service.calls.load(Ordering::SeqCst), 0);
        assert!(h.presenter.views().iter().all(|v| v.trigger.enabled));
        assert!(!h.controller.is_in_flight());
    }

    #[tokio::test]
    async fn submit_without_direction_fails_without_request() {
        let h = harness(Script::Respond(b"doc".to_vec()));
        h.controller.select_via_browse(vec![pdf()]);
        h.controller.set_direction(None);

        let outcome = h.controller.submit().await.unwrap();

        assert_eq!(
            outcome,
            RequestOutcome::ValidationFailure {
                reason: "Please select a translation direction".into()
            }
        );
        assert_eq!(h.controller.state(), UiState::Failed);
        assert_eq!(h.service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn busy_before_response_resolves() {
        let (service, gate) = ScriptedService::gated(Script::Respond(b"doc".to_vec()));
        let started = service.started.clone();
        let h = harness_with(service, CountingSink::default());
        h.controller.select_via_browse(vec![pdf()]);

        let observe = async {
            started.notified().await;
            let view = h.controller.view();
            assert_eq!(view.state, UiState::Busy);
            assert!(!view.trigger.enabled);
            assert_eq!(view.trigger.label, "Processing...");
            let msg = view.message.unwrap();
            assert_eq!(msg.severity, Severity::Info);
            assert_eq!(msg.text, BUSY_MESSAGE);
            gate.notify_one();
        };
        let (outcome, ()) = tokio::join!(h.controller.submit(), observe);

        assert!(outcome.unwrap().is_success());
        assert_eq!(h.controller.state(), UiState::Succeeded);
    }

    #[tokio::test]
    async fn second_submit_while_busy_is_rejected() {
        let (service, gate) = ScriptedService::gated(Script::Respond(b"doc".to_vec()));
        let started = service.started.clone();
        let h = harness_with(service, CountingSink::default());
        h.controller.select_via_browse(vec![pdf()]);

        let second = async {
            started.notified().await;
            let err = h.controller.submit().await.unwrap_err();
            assert!(matches!(err, TranslateError::SubmissionInFlight));
            assert_eq!(h.controller.state(), UiState::Busy);
            gate.notify_one();
        };
        let (first, ()) = tokio::join!(h.controller.submit(), second);

        assert!(first.unwrap().is_success());
        assert_eq!(h.service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.sink.deliveries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn success_downloads_once_and_reenables_trigger() {
        let h = harness(Script::Respond(vec![0x50, 0x4b, 3, 4, 9, 9]));
        h.controller.select_via_browse(vec![pdf()]);

        let outcome = h.controller.submit().await.unwrap();

        match &outcome {
            RequestOutcome::Success {
                bytes,
                suggested_filename,
                saved_to,
            } => {
                assert_eq!(bytes.len(), 6);
                assert_eq!(suggested_filename, "translated.docx");
                assert_eq!(saved_to, &PathBuf::from("/downloads/translated.docx"));
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(
            *h.sink.deliveries.lock().unwrap(),
            vec![(6, "translated.docx".to_string())]
        );

        let view = h.controller.view();
        assert_eq!(view.state, UiState::Succeeded);
        assert_eq!(view.trigger, TriggerControl::ready());
        let msg = view.message.unwrap();
        assert_eq!(msg.text, SUCCESS_MESSAGE);
        assert_eq!(msg.severity, Severity::Success);
    }

    #[tokio::test]
    async fn render_sequence_on_success() {
        let h = harness(Script::Respond(b"doc".to_vec()));
        h.controller.select_via_browse(vec![pdf()]);
        h.controller.submit().await.unwrap();

        let views = h.presenter.views();
        let states: Vec<(UiState, bool)> =
            views.iter().map(|v| (v.state, v.trigger.enabled)).collect();
        assert_eq!(
            states,
            vec![
                (UiState::Idle, true),       // selection
                (UiState::Busy, false),      // submit
                (UiState::Succeeded, false), // outcome
                (UiState::Succeeded, true),  // trigger restored
            ]
        );
        assert_eq!(views.last().unwrap().trigger.label, READY_LABEL);
    }

    #[tokio::test]
    async fn server_rejection_shows_detail() {
        let h = harness(Script::Reject(400, "Bad PDF"));
        h.controller.select_via_browse(vec![pdf()]);

        let outcome = h.controller.submit().await.unwrap();

        assert_eq!(
            outcome,
            RequestOutcome::ServerRejected {
                status: 400,
                detail: "Bad PDF".into()
            }
        );
        let view = h.controller.view();
        assert_eq!(view.state, UiState::Failed);
        assert_eq!(view.message.unwrap().text, "✗ Error: Bad PDF");
        assert!(view.trigger.enabled);
        assert!(h.sink.deliveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn network_failure_reports_reason() {
        let h = harness(Script::Unreachable("tcp connect error: Connection refused"));
        h.controller.select_via_browse(vec![pdf()]);

        let outcome = h.controller.submit().await.unwrap();

        assert!(matches!(outcome, RequestOutcome::NetworkFailure { .. }));
        let view = h.controller.view();
        let msg = view.message.unwrap();
        assert!(msg.text.starts_with(ERROR_PREFIX));
        assert!(msg.text.contains("Connection refused"), "got: {}", msg.text);
        assert!(view.trigger.enabled);
    }

    #[tokio::test]
    async fn write_failure_is_unexpected() {
        let sink = CountingSink {
            fail: true,
            ..Default::default()
        };
        let h = harness_with(ScriptedService::new(Script::Respond(b"doc".to_vec())), sink);
        h.controller.select_via_browse(vec![pdf()]);

        let outcome = h.controller.submit().await.unwrap();

        assert!(matches!(outcome, RequestOutcome::UnexpectedFailure { .. }));
        assert!(outcome.message().contains("disk full"));
        assert!(h.sink.deliveries.lock().unwrap().is_empty());
        assert_eq!(h.controller.state(), UiState::Failed);
        assert!(h.controller.view().trigger.enabled);
    }

    #[tokio::test]
    async fn panic_during_attempt_is_contained() {
        let h = harness(Script::Panic);
        h.controller.select_via_browse(vec![pdf()]);

        let outcome = h.controller.submit().await.unwrap();

        assert_eq!(
            outcome,
            RequestOutcome::UnexpectedFailure {
                reason: "decoder exploded".into()
            }
        );
        assert_eq!(h.controller.state(), UiState::Failed);
        assert!(h.controller.view().trigger.enabled);
        assert!(!h.controller.is_in_flight());
    }

    #[tokio::test]
    async fn dropped_submission_restores_trigger() {
        let (service, _gate) = ScriptedService::gated(Script::Respond(b"doc".to_vec()));
        let started = service.started.clone();
        let h = harness_with(service, CountingSink::default());
        h.controller.select_via_browse(vec![pdf()]);

        let mut pending = Box::pin(h.controller.submit());
        tokio::select! {
            _ = &mut pending => panic!("gate was never opened"),
            _ = started.notified() => {}
        }
        assert!(h.controller.is_in_flight());
        assert!(!h.controller.view().trigger.enabled);

        drop(pending);

        assert!(!h.controller.is_in_flight());
        assert!(h.controller.view().trigger.enabled);
    }

    #[tokio::test]
    async fn resubmit_after_failure() {
        let h = harness(Script::Reject(500, "Internal Server Error"));
        h.controller.select_via_browse(vec![pdf()]);

        h.controller.submit().await.unwrap();
        assert_eq!(h.controller.state(), UiState::Failed);

        // The selection stays in the slot, so a retry needs no new pick.
        h.controller.submit().await.unwrap();
        assert_eq!(h.service.calls.load(Ordering::SeqCst), 2);
        assert!(h
            .presenter
            .views()
            .iter()
            .filter(|v| v.state == UiState::Busy)
            .count()
            == 2);
    }

    #[tokio::test]
    async fn ignored_drop_changes_nothing() {
        let h = harness(Script::Respond(b"doc".to_vec()));
        h.controller.select_via_browse(vec![pdf()]);
        let before = h.controller.view();

        h.controller.drag_over();
        let accepted = h.controller.select_via_drop(vec![SelectedFile::new(
            "photo.png",
            "image/png",
            vec![0x89, b'P', b'N', b'G'],
        )]);

        assert!(!accepted);
        let after = h.controller.view();
        assert_eq!(after.file_name, before.file_name);
        assert_eq!(after.message, None);
        assert!(!after.drop_zone_highlighted);
    }

    #[test]
    fn terminal_states() {
        assert!(UiState::Succeeded.is_terminal());
        assert!(UiState::Failed.is_terminal());
        assert!(!UiState::Busy.is_terminal());
        assert!(!UiState::Idle.is_terminal());
    }

    #[test]
    fn panic_message_variants() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unexpected internal error");
    }
}

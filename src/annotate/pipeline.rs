//! Generate → review → apply state machine
//!
//! The pipeline owns at most one [`AnnotationRequest`]. Each request carries a
//! [`RequestId`]; outbound calls are issued against a ticket holding that id
//! and responses are only accepted while the id is still current. The
//! `begin_*`/`complete_*` pairs are the raw transitions; [`AnnotationPipeline::generate`]
//! and [`AnnotationPipeline::apply`] drive them around the remote call.

use super::error::AnnotateError;
use super::types::{AnnotationRequest, ApplyTicket, FinishedRequest, GenerateTicket, Phase, RequestId};
use crate::remote::{DescriptionService, RemoteError};
use crate::selection::SelectionState;
use parking_lot::Mutex;
use std::sync::Arc;

/// Asks the item cache to refresh after a successful apply
///
/// Implementations must not block on the refresh finishing.
pub trait Invalidator: Send + Sync {
    fn request_refresh(&self);
}

#[derive(Debug, Default)]
struct PipelineState {
    next_id: u64,
    active: Option<AnnotationRequest>,
    last_finished: Option<FinishedRequest>,
}

impl PipelineState {
    fn phase(&self) -> Phase {
        self.active.as_ref().map_or(Phase::Idle, |r| r.phase)
    }

    fn current_id(&self) -> Option<RequestId> {
        self.active.as_ref().map(|r| r.id)
    }

    fn next_id(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }

    /// Active request, if it matches `id` and sits in `phase`
    fn current_mut(&mut self, id: RequestId, phase: Phase) -> Result<&mut AnnotationRequest, AnnotateError> {
        let current = self.current_id();
        match self.active.as_mut() {
            Some(request) if request.id == id && request.phase == phase => Ok(request),
            _ => Err(AnnotateError::Stale { request: id, current }),
        }
    }

    fn fail(&mut self, error: RemoteError) -> Option<RequestId> {
        let request = self.active.take()?;
        let id = request.id;
        self.last_finished = Some(FinishedRequest::failed(request, error));
        Some(id)
    }
}

/// Single-flight description generator
pub struct AnnotationPipeline {
    state: Mutex<PipelineState>,
    service: Arc<dyn DescriptionService>,
    invalidator: Arc<dyn Invalidator>,
}

impl std::fmt::Debug for AnnotationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationPipeline")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AnnotationPipeline {
    pub fn new(service: Arc<dyn DescriptionService>, invalidator: Arc<dyn Invalidator>) -> Self {
        Self {
            state: Mutex::new(PipelineState::default()),
            service,
            invalidator,
        }
    }

    /// Current phase (`Idle` when there is no active request)
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    /// Copy of the active request
    #[must_use]
    pub fn request(&self) -> Option<AnnotationRequest> {
        self.state.lock().active.clone()
    }

    /// Record of the most recently finished request
    #[must_use]
    pub fn last_finished(&self) -> Option<FinishedRequest> {
        self.state.lock().last_finished.clone()
    }

    /// Idle → Generating
    ///
    /// A request sitting in `Ready` is replaced.
    ///
    /// # Errors
    ///
    /// `AnnotateError::Busy` while a call is outstanding, or
    /// `AnnotateError::SelectionCount` unless exactly one item is selected.
    /// Neither changes any state.
    pub fn begin_generate(&self, selection: &SelectionState) -> Result<GenerateTicket, AnnotateError> {
        let mut state = self.state.lock();
        let phase = state.phase();
        if phase.is_busy() {
            tracing::debug!(%phase, "generate ignored, request outstanding");
            return Err(AnnotateError::Busy(phase));
        }
        let Some(target) = selection.single() else {
            return Err(AnnotateError::SelectionCount {
                selected: selection.len(),
            });
        };

        if let Some(replaced) = state.active.take() {
            tracing::info!(request = %replaced.id, phase = %replaced.phase, "replacing request");
        }
        let id = state.next_id();
        state.active = Some(AnnotationRequest::new(id, target));
        tracing::info!(request = %id, item = %target, "generating description");

        Ok(GenerateTicket { id, target })
    }

    /// Generating → Ready, or Generating → Failed → Idle
    ///
    /// Returns the generated text.
    ///
    /// # Errors
    ///
    /// `AnnotateError::Stale` if the ticket is no longer current (nothing is
    /// changed), or `AnnotateError::Remote` after recording the failure.
    pub fn complete_generate(
        &self,
        ticket: &GenerateTicket,
        result: Result<String, RemoteError>,
    ) -> Result<String, AnnotateError> {
        let mut state = self.state.lock();
        let request = match state.current_mut(ticket.id, Phase::Generating) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(request = %ticket.id, "dropping stale generate response");
                return Err(err);
            }
        };

        match result {
            Ok(description) => {
                request.phase = Phase::Ready;
                request.generated_description = Some(description.clone());
                request.draft = Some(description.clone());
                tracing::info!(request = %ticket.id, "description ready for review");
                Ok(description)
            }
            Err(err) => {
                state.fail(err.clone());
                tracing::warn!(request = %ticket.id, error = %err, "generation failed");
                Err(AnnotateError::Remote(err))
            }
        }
    }

    /// Replace the draft of a `Ready` request
    ///
    /// # Errors
    ///
    /// `AnnotateError::NotReady` outside `Ready`.
    pub fn edit_draft(&self, text: impl Into<String>) -> Result<(), AnnotateError> {
        let mut state = self.state.lock();
        match state.active.as_mut() {
            Some(request) if request.phase == Phase::Ready => {
                request.draft = Some(text.into());
                Ok(())
            }
            _ => Err(AnnotateError::NotReady(state.phase())),
        }
    }

    /// Drop a `Ready` request without applying it
    ///
    /// # Errors
    ///
    /// `AnnotateError::NotReady` outside `Ready`.
    pub fn discard(&self) -> Result<(), AnnotateError> {
        let mut state = self.state.lock();
        let phase = state.phase();
        if phase != Phase::Ready {
            return Err(AnnotateError::NotReady(phase));
        }
        if let Some(request) = state.active.take() {
            tracing::info!(request = %request.id, "draft discarded");
        }
        Ok(())
    }

    /// Ready → Applying
    ///
    /// `edited` replaces the draft before it is sent.
    ///
    /// # Errors
    ///
    /// `AnnotateError::Busy` while a call is outstanding, or
    /// `AnnotateError::NotReady` when there is no draft to apply.
    pub fn begin_apply(&self, edited: Option<String>) -> Result<ApplyTicket, AnnotateError> {
        let mut state = self.state.lock();
        let phase = state.phase();
        if phase.is_busy() {
            tracing::debug!(%phase, "apply ignored, request outstanding");
            return Err(AnnotateError::Busy(phase));
        }
        let Some(request) = state.active.as_mut().filter(|r| r.phase == Phase::Ready) else {
            return Err(AnnotateError::NotReady(phase));
        };

        if let Some(text) = edited {
            request.draft = Some(text);
        }
        let description = request.pending_text().unwrap_or_default().to_string();
        request.phase = Phase::Applying;
        tracing::info!(request = %request.id, item = %request.target, "applying description");

        Ok(ApplyTicket {
            id: request.id,
            target: request.target,
            description,
        })
    }

    /// Applying → Done → Idle, or Applying → Failed → Idle
    ///
    /// On success the invalidator is signalled before the pipeline returns to
    /// idle; the refresh itself is not awaited.
    ///
    /// # Errors
    ///
    /// `AnnotateError::Stale` if the ticket is no longer current, or
    /// `AnnotateError::Remote` after recording the failure.
    pub fn complete_apply(&self, ticket: &ApplyTicket, result: Result<(), RemoteError>) -> Result<(), AnnotateError> {
        {
            let mut state = self.state.lock();
            if let Err(err) = state.current_mut(ticket.id, Phase::Applying) {
                tracing::debug!(request = %ticket.id, "dropping stale apply response");
                return Err(err);
            }

            if let Err(err) = result {
                state.fail(err.clone());
                tracing::warn!(request = %ticket.id, error = %err, "apply failed, draft kept for resume");
                return Err(AnnotateError::Remote(err));
            }
            let done = state.active.as_mut().map(|request| {
                request.phase = Phase::Done;
                FinishedRequest::done(request.clone())
            });
            if done.is_some() {
                state.last_finished = done;
            }
        }

        self.invalidator.request_refresh();

        let mut state = self.state.lock();
        if state.current_id() == Some(ticket.id) {
            state.active = None;
        }
        tracing::info!(request = %ticket.id, "description applied");
        Ok(())
    }

    /// Run a full generation call for the single selected item
    ///
    /// Dropping the future before the backend answers fails the request, so
    /// the pipeline never stays busy.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_generate`] and [`Self::complete_generate`].
    pub async fn generate(&self, selection: &SelectionState) -> Result<String, AnnotateError> {
        let ticket = self.begin_generate(selection)?;
        let guard = OutstandingGuard::new(&self.state, ticket.id, Phase::Generating);
        let result = self.service.generate(ticket.target).await;
        guard.disarm();
        self.complete_generate(&ticket, result)
    }

    /// Apply the current draft, optionally replacing it with `edited` first
    ///
    /// A dropped future fails the request the same way a rejected apply does,
    /// so the draft can be picked up with [`Self::resume_failed_apply`].
    ///
    /// # Errors
    ///
    /// See [`Self::begin_apply`] and [`Self::complete_apply`].
    pub async fn apply(&self, edited: Option<String>) -> Result<(), AnnotateError> {
        let ticket = self.begin_apply(edited)?;
        let guard = OutstandingGuard::new(&self.state, ticket.id, Phase::Applying);
        let result = self.service.apply(ticket.target, &ticket.description).await;
        guard.disarm();
        self.complete_apply(&ticket, result)
    }

    /// Reopen the draft of the last failed apply as a new `Ready` request
    ///
    /// # Errors
    ///
    /// `AnnotateError::Busy` if a request is active, or
    /// `AnnotateError::NothingToResume` if the last request did not fail
    /// while applying.
    pub fn resume_failed_apply(&self) -> Result<RequestId, AnnotateError> {
        let mut state = self.state.lock();
        let phase = state.phase();
        if phase != Phase::Idle {
            return Err(AnnotateError::Busy(phase));
        }
        let Some(finished) = state.last_finished.clone().filter(FinishedRequest::is_resumable) else {
            return Err(AnnotateError::NothingToResume);
        };

        let id = state.next_id();
        let mut request = AnnotationRequest::new(id, finished.target);
        request.phase = Phase::Ready;
        request.generated_description.clone_from(&finished.draft);
        request.draft = finished.draft;
        state.active = Some(request);
        tracing::info!(request = %id, resumed = %finished.id, "resuming failed apply");

        Ok(id)
    }
}

/// Message recorded for a call whose future was dropped before it resolved
const ABANDONED_MESSAGE: &str = "Request was cancelled before the backend answered";

/// Fails the request of a `generate`/`apply` future dropped mid-call
struct OutstandingGuard<'a> {
    state: &'a Mutex<PipelineState>,
    id: RequestId,
    phase: Phase,
    armed: bool,
}

impl<'a> OutstandingGuard<'a> {
    fn new(state: &'a Mutex<PipelineState>, id: RequestId, phase: Phase) -> Self {
        Self {
            state,
            id,
            phase,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for OutstandingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if state.current_mut(self.id, self.phase).is_ok() {
            state.fail(RemoteError::new(ABANDONED_MESSAGE));
            tracing::warn!(request = %self.id, phase = %self.phase, "call abandoned, request failed");
        }
    }
}

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use reviewgen_core::{Category, GeneratedItem, ItemId, Preset};
use reviewgen_service::{GenerativeService, ServiceError};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::segment::segment;
use crate::state::{Effect, Event, Outcome, Rejection, SessionState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("a generation is already in progress")]
    Busy,

    #[error("sample text is empty")]
    EmptySampleText,
}

/// Drives a session against a generative service.
///
/// The single `await` on the service is the only suspension point. There
/// is no timeout and no retry.
pub struct Workflow<S> {
    service: S,
}

impl<S: GenerativeService> Workflow<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Generate a batch from the session's current sample text and category.
    pub async fn generate(&self, state: &mut SessionState) -> Result<Outcome, WorkflowError> {
        let effect = state.apply(Event::Generate);
        self.run_effect(state, effect)
            .await
            .map(|outcome| outcome.unwrap_or(Outcome::Failed))
    }

    /// Select a preset. Returns the outcome when the selection started a
    /// generation, `None` when it only replaced the sample text.
    pub async fn select_preset(
        &self,
        state: &mut SessionState,
        preset: Preset,
    ) -> Result<Option<Outcome>, WorkflowError> {
        let effect = state.apply(Event::SelectPreset(preset));
        self.run_effect(state, effect).await
    }

    async fn run_effect(
        &self,
        state: &mut SessionState,
        effect: Effect,
    ) -> Result<Option<Outcome>, WorkflowError> {
        match effect {
            Effect::None => Ok(None),
            Effect::Busy => Err(WorkflowError::Busy),
            Effect::Rejected(Rejection::EmptySampleText) => Err(WorkflowError::EmptySampleText),
            Effect::CallService(request) => {
                info!(
                    service = self.service.name(),
                    model = %request.model,
                    category = %state.generating_category(),
                    "generating reviews"
                );
                let result = self.service.generate(&request).await;
                Ok(Some(finish(state, result, Utc::now())))
            }
        }
    }
}

/// Feed a service result back into the session.
///
/// Errors of every kind collapse into the session's single diagnostic; the
/// precise cause is logged.
pub fn finish(
    state: &mut SessionState,
    result: Result<String, ServiceError>,
    now: DateTime<Utc>,
) -> Outcome {
    match result {
        Ok(raw) => {
            let items = build_batch(&raw, state.generating_category(), now);
            if items.is_empty() {
                warn!(response_len = raw.len(), "response contained no reviews");
                state.apply(Event::ResponseEmpty);
                Outcome::Empty
            } else {
                let count = items.len();
                info!(count, "generated reviews");
                state.apply(Event::BatchReady(items));
                Outcome::Generated(count)
            }
        }
        Err(e) => {
            match &e {
                ServiceError::MissingApiKey => {
                    error!("generation failed: {e} (set GEMINI_API_KEY or --api-key)")
                }
                _ => error!("generation failed: {e}"),
            }
            state.apply(Event::GenerationFailed {
                reason: e.to_string(),
            });
            Outcome::Failed
        }
    }
}

/// Segment a raw answer and stamp each review with metadata.
///
/// Ids are unique within the returned batch. The session list is cleared
/// before a batch is inserted, so that is the only scope that matters.
pub fn build_batch(raw: &str, category: Category, now: DateTime<Utc>) -> Vec<GeneratedItem> {
    let mut taken: HashSet<ItemId> = HashSet::new();
    segment(raw)
        .map(|text| {
            let id = ItemId::random_excluding(|candidate| taken.contains(candidate));
            taken.insert(id.clone());
            GeneratedItem::new(id, &text, category, now)
        })
        .collect()
}

//! Session state and its reducer.
//!
//! Every change to a session goes through [`SessionState::apply`] (or the
//! by-value [`transition`]). The reducer never performs I/O: when a
//! generation has to happen it returns [`Effect::CallService`] and the
//! caller is expected to run the request and feed the result back as
//! [`Event::BatchReady`], [`Event::ResponseEmpty`] or
//! [`Event::GenerationFailed`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reviewgen_core::{Category, GeneratedItem, ItemId, Preset};
use reviewgen_prompts::{assemble_prompt, PromptContext, DEFAULT_REVIEW_COUNT, DEFAULT_SUBJECT};
use reviewgen_service::{ServiceRequest, DEFAULT_MODEL};

/// How long a "copied" acknowledgment stays visible.
pub const DEFAULT_COPY_ACK: Duration = Duration::from_secs(2);

/// Shown to the user for every failed generation, whatever the cause.
pub const FAILURE_MESSAGE: &str = "Error generating review. Please try again.";

/// Shown when the service answered but no review could be extracted.
pub const EMPTY_MESSAGE: &str = "The service returned no reviews. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Who the reviews are about.
    pub subject: String,
    /// Number of reviews asked for in the prompt.
    pub review_count: usize,
    /// Number of items shown as the latest batch and copied by copy-all.
    pub batch_size: usize,
    pub copy_ack: Duration,
    pub model: String,
    /// Selecting a preset immediately starts a generation.
    pub auto_generate_on_preset: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            review_count: DEFAULT_REVIEW_COUNT,
            batch_size: DEFAULT_REVIEW_COUNT,
            copy_ack: DEFAULT_COPY_ACK,
            model: DEFAULT_MODEL.to_string(),
            auto_generate_on_preset: false,
        }
    }
}

/// How the most recent generation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The batch held this many reviews.
    Generated(usize),
    /// The call succeeded but the answer contained no usable review.
    Empty,
    /// The call failed.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptySampleText,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SetCategory(Category),
    SetSampleText(String),
    SelectPreset(Preset),
    Generate,
    BatchReady(Vec<GeneratedItem>),
    ResponseEmpty,
    GenerationFailed { reason: String },
    Copied { id: ItemId, at: Instant },
    Tick { now: Instant },
}

/// What the caller must do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Send this request to the generative service.
    CallService(ServiceRequest),
    /// A generation is already in flight; nothing was started.
    Busy,
    Rejected(Rejection),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub config: SessionConfig,
    category: Category,
    sample_text: String,
    selected_preset: Option<String>,
    /// Newest first.
    items: Vec<GeneratedItem>,
    loading: bool,
    /// Category captured when the in-flight generation started.
    generating_category: Option<Category>,
    diagnostic: Option<String>,
    failure_detail: Option<String>,
    last_outcome: Option<Outcome>,
    /// Copied item ids and when their acknowledgment expires.
    copied: HashMap<ItemId, Instant>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            category: Category::default(),
            sample_text: String::new(),
            selected_preset: None,
            items: Vec::new(),
            loading: false,
            generating_category: None,
            diagnostic: None,
            failure_detail: None,
            last_outcome: None,
            copied: HashMap::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn sample_text(&self) -> &str {
        &self.sample_text
    }

    pub fn selected_preset(&self) -> Option<&str> {
        self.selected_preset.as_deref()
    }

    /// All held items, newest first.
    pub fn items(&self) -> &[GeneratedItem] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&GeneratedItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// The newest items, at most `batch_size` of them.
    pub fn latest_batch(&self) -> &[GeneratedItem] {
        let n = self.config.batch_size.min(self.items.len());
        &self.items[..n]
    }

    /// Items older than the latest batch.
    pub fn previous_items(&self) -> &[GeneratedItem] {
        let n = self.config.batch_size.min(self.items.len());
        &self.items[n..]
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Category the in-flight generation was started with, falling back to
    /// the current selection.
    pub fn generating_category(&self) -> Category {
        self.generating_category.unwrap_or(self.category)
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Internal reason for the last failure, for logs and debugging only.
    pub fn failure_detail(&self) -> Option<&str> {
        self.failure_detail.as_deref()
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Whether a `Generate` event would start a call right now.
    pub fn can_generate(&self) -> bool {
        !self.loading && !self.sample_text.trim().is_empty()
    }

    /// Whether any copy acknowledgment is still waiting to expire.
    pub fn has_copy_acks(&self) -> bool {
        !self.copied.is_empty()
    }

    pub fn is_copied(&self, id: &ItemId, now: Instant) -> bool {
        self.copied.get(id).is_some_and(|expires| *expires > now)
    }

    /// Apply one event in place and report what the caller must do next.
    pub fn apply(&mut self, event: Event) -> Effect {
        match event {
            Event::SetCategory(category) => {
                self.category = category;
                Effect::None
            }
            Event::SetSampleText(text) => {
                self.sample_text = text;
                self.selected_preset = None;
                Effect::None
            }
            Event::SelectPreset(preset) => {
                self.sample_text = preset.text;
                self.selected_preset = Some(preset.name);
                if self.config.auto_generate_on_preset {
                    self.start_generation()
                } else {
                    Effect::None
                }
            }
            Event::Generate => self.start_generation(),
            Event::BatchReady(items) => {
                if !self.loading {
                    return Effect::None;
                }
                if items.is_empty() {
                    return self.apply(Event::ResponseEmpty);
                }
                let count = items.len();
                self.items.clear();
                self.copied.clear();
                // Newest batch goes in front, in document order.
                self.items.splice(0..0, items);
                self.finish_generation(Outcome::Generated(count), None);
                Effect::None
            }
            Event::ResponseEmpty => {
                if self.loading {
                    self.finish_generation(Outcome::Empty, Some(EMPTY_MESSAGE));
                }
                Effect::None
            }
            Event::GenerationFailed { reason } => {
                if self.loading {
                    self.failure_detail = Some(reason);
                    self.finish_generation(Outcome::Failed, Some(FAILURE_MESSAGE));
                }
                Effect::None
            }
            Event::Copied { id, at } => {
                if self.item(&id).is_some() {
                    self.copied.insert(id, at + self.config.copy_ack);
                }
                Effect::None
            }
            Event::Tick { now } => {
                self.copied.retain(|_, expires| *expires > now);
                Effect::None
            }
        }
    }

    fn start_generation(&mut self) -> Effect {
        if self.loading {
            return Effect::Busy;
        }
        if self.sample_text.trim().is_empty() {
            return Effect::Rejected(Rejection::EmptySampleText);
        }

        let ctx = PromptContext::new(&self.sample_text, self.category)
            .with_subject(&self.config.subject)
            .with_count(self.config.review_count);

        self.loading = true;
        self.generating_category = Some(self.category);
        self.diagnostic = None;
        self.failure_detail = None;
        Effect::CallService(ServiceRequest::new(
            assemble_prompt(&ctx),
            self.config.model.clone(),
        ))
    }

    fn finish_generation(&mut self, outcome: Outcome, diagnostic: Option<&str>) {
        self.loading = false;
        self.generating_category = None;
        self.last_outcome = Some(outcome);
        self.diagnostic = diagnostic.map(String::from);
    }
}

/// By-value form of [`SessionState::apply`].
pub fn transition(mut state: SessionState, event: Event) -> (SessionState, Effect) {
    let effect = state.apply(event);
    (state, effect)
}

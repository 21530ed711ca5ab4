use reviewgen_core::Category;
use serde::{Deserialize, Serialize};

/// Number of reviews requested when the caller does not say otherwise.
pub const DEFAULT_REVIEW_COUNT: usize = 3;

/// Who the reviews are written about when no subject is configured.
pub const DEFAULT_SUBJECT: &str = "Shashank";

/// Everything needed to assemble a generation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContext {
    pub subject: String,
    pub sample_text: String,
    pub category: Category,
    pub count: usize,
}

impl PromptContext {
    pub fn new(sample_text: &str, category: Category) -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            sample_text: sample_text.to_string(),
            category,
            count: DEFAULT_REVIEW_COUNT,
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Render the source material line quoting the sample text.
    pub fn append_source(&self, prompt: &mut String) {
        prompt.push_str(&format!(
            "Based on these customer reviews about {}: \"{}\"\n",
            self.subject, self.sample_text
        ));
    }
}

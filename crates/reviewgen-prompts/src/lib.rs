pub mod context;
pub mod review;

pub use context::{PromptContext, DEFAULT_REVIEW_COUNT, DEFAULT_SUBJECT};
use reviewgen_core::Category;

/// Marks the start of one review in the model's answer.
pub const START_MARKER: &str = "###REVIEW###";
/// Marks the end of one review in the model's answer.
pub const END_MARKER: &str = "###END###";

/// Assemble the full prompt for a context.
pub fn assemble_prompt(ctx: &PromptContext) -> String {
    let mut prompt = String::new();
    ctx.append_source(&mut prompt);
    review::append_instructions(&mut prompt, ctx);
    prompt
}

/// Build a prompt with the default subject and review count.
pub fn build_prompt(sample_text: &str, category: Category) -> String {
    assemble_prompt(&PromptContext::new(sample_text, category))
}

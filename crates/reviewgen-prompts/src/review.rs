use crate::{PromptContext, END_MARKER, START_MARKER};

/// Append the generation instructions, including the marker convention.
pub fn append_instructions(prompt: &mut String, ctx: &PromptContext) {
    prompt.push_str(&format!(
        "Generate {} different, authentic {} reviews about {} with 5 star rating sentiment.\n",
        ctx.count,
        ctx.category.display_name(),
        ctx.subject
    ));
    prompt.push_str(&format!(
        "Format each review to start with \"{START_MARKER}\" and end with \"{END_MARKER}\".\n"
    ));
    prompt.push_str("Keep them natural and conversational.\n");
}

//! Prompt envelope around the knowledge bundle and the user question.

/// Wrap `knowledge` and `question` in the fixed agent template.
///
/// Downstream consumers match on this exact text; do not reformat it.
/// Neither input is truncated or sanitized.
pub fn build_prompt(question: &str, knowledge: &str) -> String {
    format!(
        "You are an intelligent agent with access to the following knowledge base:\n\
         -----\n\
         {knowledge}\n\
         -----\n\
         User question: {question}\n\
         Answer using only the information from the knowledge base above."
    )
}

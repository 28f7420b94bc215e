//! Builds the instruction sent to the model.
//!
//! The reply format is requested through three tag pairs that
//! [`crate::sections`] later looks for.

use crate::sections::Section;

/// Format the improvement instruction for `original_code` and the user's
/// `prompt`. Both are inserted verbatim.
pub fn build_prompt(original_code: &str, prompt: &str) -> String {
    let improved = Section::ImprovedCode.as_str();
    let explanation = Section::Explanation.as_str();
    let suggestions = Section::AdditionalSuggestions.as_str();

    format!(
        "You are a game development code assistant. Your task is to improve the following code based on the user's request.

Original Code:
{original_code}

User Request: {prompt}

Please provide:
1. The improved code
2. A clear explanation of the changes made and why they improve the code
3. Any additional suggestions for further improvement

Format your response as follows:
<{improved}>
// Place the improved code here
</{improved}>

<{explanation}>
// Place your explanation here
</{explanation}>

<{suggestions}>
// Place any additional suggestions here
</{suggestions}>
"
    )
}

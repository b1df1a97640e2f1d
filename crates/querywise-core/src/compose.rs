//! Answer composition from a base text and [`GenerationOptions`].
//!
//! # Composition Order
//!
//! 1. Chain-of-thought preamble (`use_detailed_explanation`).
//! 2. Base text from the model.
//! 3. Web-search addendum (`use_web_search`).
//! 4. External-knowledge addendum (`use_external_knowledge`).
//!
//! Each option adds exactly one segment; options never exclude each other.

use crate::models::GenerationOptions;

/// Prepended when `use_detailed_explanation` is set.
pub const DETAILED_PREAMBLE: &str = "## Chain of Thought Analysis\n\nLet me think step by step:\n\n1. First, let me understand what information we have from the documents.\n2. The financial report shows revenue growth and cost reductions.\n3. The product roadmap shows upcoming AI feature releases.\n\nNow let me synthesize this information:\n\n";

/// Appended when `use_web_search` is set.
pub const WEB_SEARCH_ADDENDUM: &str = "\n\n*Additional web search information: Industry analysts predict the AI market will grow by 35% this year, placing the company's roadmap in line with broader market trends.*";

/// Appended last when `use_external_knowledge` is set.
pub const EXTERNAL_KNOWLEDGE_ADDENDUM: &str = "\n\n*Based on my knowledge of similar SaaS companies, a 22% subscription growth rate places this company in the top quartile of performers in this sector.*";

/// Build the final answer text.
pub fn compose_answer(base: &str, options: &GenerationOptions) -> String {
    let mut capacity = base.len();
    if options.use_detailed_explanation {
        capacity += DETAILED_PREAMBLE.len();
    }
    if options.use_web_search {
        capacity += WEB_SEARCH_ADDENDUM.len();
    }
    if options.use_external_knowledge {
        capacity += EXTERNAL_KNOWLEDGE_ADDENDUM.len();
    }

    let mut text = String::with_capacity(capacity);
    if options.use_detailed_explanation {
        text.push_str(DETAILED_PREAMBLE);
    }
    text.push_str(base);
    if options.use_web_search {
        text.push_str(WEB_SEARCH_ADDENDUM);
    }
    if options.use_external_knowledge {
        text.push_str(EXTERNAL_KNOWLEDGE_ADDENDUM);
    }
    text
}

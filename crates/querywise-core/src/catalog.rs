//! Supported answer models.
//!
//! Model identifiers arrive as free-form strings (from the CLI, config, or a
//! remote caller). [`ModelChoice::parse`] maps them onto a closed set of
//! known variants; anything else lands in [`ModelChoice::Other`], which uses
//! the `Auto` response text and echoes its identifier unchanged.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const CHATGPT_TEXT: &str = "Based on the financial report for 2024, the company has shown strong performance with a 15% revenue increase in Q1, primarily driven by the SaaS division (22% growth in subscriptions). Additionally, they've managed to reduce operating expenses by 8% through automation and efficiency improvements.\n\nThe product roadmap indicates new AI features planned for Q3 2024, with beta testing starting in July for select customers.";

const GEMINI_TEXT: &str = "The financial data shows positive trends:\n- 15% overall revenue growth in Q1 2024\n- SaaS division leading with 22% subscription growth\n- 8% reduction in operating expenses through automation\n\nThe product timeline shows AI feature development with:\n- Q3 2024 target release date\n- July beta testing with select customers";

const CLAUDE_TEXT: &str = "I analyzed the provided document chunks and found the following information:\n\n1. Financial Performance (from financial_report_2024.pdf):\n   - 15% revenue increase in Q1 2024\n   - SaaS division performed exceptionally with 22% subscription growth\n   - 8% reduction in operating expenses achieved through automation and customer service efficiencies\n\n2. Product Development (from product_roadmap.pdf):\n   - New AI features scheduled for Q3 2024 release\n   - Beta testing with select customers begins in July 2024";

const AUTO_TEXT: &str = "# Financial & Product Analysis\n\nBased on the document chunks, here's a comprehensive overview:\n\n## Financial Performance (Q1 2024)\n- **Overall Revenue**: ↑ 15%\n- **SaaS Division**: ↑ 22% (subscription growth)\n- **Operating Expenses**: ↓ 8% (through automation & efficiency improvements)\n\n## Product Development\n- **AI Features**: Scheduled for Q3 2024 release\n- **Beta Testing**: July 2024 with select customers\n\nThis suggests the company is experiencing strong growth while successfully controlling costs and has significant product innovations planned for later this year.";

/// Label reported when `Auto` picks a model.
pub const AUTO_SELECTED_LABEL: &str = "Auto (Claude selected)";

/// A model a query can be answered with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelChoice {
    #[default]
    ChatGpt,
    Gemini,
    Claude,
    Auto,
    /// Unrecognized identifier, kept verbatim.
    Other(String),
}

impl ModelChoice {
    /// The known models in the order they are presented to users.
    pub const KNOWN: [ModelChoice; 4] = [
        ModelChoice::ChatGpt,
        ModelChoice::Gemini,
        ModelChoice::Claude,
        ModelChoice::Auto,
    ];

    /// Map an identifier onto a variant. Matching is exact.
    pub fn parse(id: &str) -> Self {
        match id {
            "ChatGPT" => ModelChoice::ChatGpt,
            "Google Gemini" => ModelChoice::Gemini,
            "Claude" => ModelChoice::Claude,
            "Auto" => ModelChoice::Auto,
            other => ModelChoice::Other(other.to_string()),
        }
    }

    /// Identifier sent to the generation collaborator.
    pub fn id(&self) -> &str {
        match self {
            ModelChoice::ChatGpt => "ChatGPT",
            ModelChoice::Gemini => "Google Gemini",
            ModelChoice::Claude => "Claude",
            ModelChoice::Auto => "Auto",
            ModelChoice::Other(id) => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ModelChoice::Auto => "Auto Select",
            other => other.id(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ModelChoice::ChatGpt => "OpenAI GPT model",
            ModelChoice::Gemini => "Google's Gemini model",
            ModelChoice::Claude => "Anthropic's Claude model",
            ModelChoice::Auto => "Automatically select the best model",
            ModelChoice::Other(_) => "Unrecognized model; answers with the Auto response",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ModelChoice::Other(_))
    }

    /// Model label reported alongside a generated answer.
    pub fn reported_name(&self) -> String {
        match self {
            ModelChoice::Auto => AUTO_SELECTED_LABEL.to_string(),
            other => other.id().to_string(),
        }
    }

    /// Canned base answer for this model, before option composition.
    pub fn base_text(&self) -> &'static str {
        match self {
            ModelChoice::ChatGpt => CHATGPT_TEXT,
            ModelChoice::Gemini => GEMINI_TEXT,
            ModelChoice::Claude => CLAUDE_TEXT,
            ModelChoice::Auto | ModelChoice::Other(_) => AUTO_TEXT,
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelChoice {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModelChoice::parse(s))
    }
}

impl From<String> for ModelChoice {
    fn from(id: String) -> Self {
        ModelChoice::parse(&id)
    }
}

impl From<ModelChoice> for String {
    fn from(model: ModelChoice) -> Self {
        model.id().to_string()
    }
}

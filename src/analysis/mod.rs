pub mod gemini;
pub mod parse;
pub mod prompt;
pub mod requester;
pub mod text;

use crate::error::AnalysisError;
use crate::model::AnalysisResult;
use parse::{extract_labels, Label};
use std::future::Future;

pub use gemini::{GeminiClient, GenerationConfig};
pub use prompt::{ProductKind, PromptSettings};
pub use requester::AnalysisRequester;

pub const FALLBACK_FULL_TEXT: &str =
    "Unable to analyze this product right now. Please rescan and try again.";

/// A service that turns one prompt into one completion.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}

impl AnalysisResult {
    /// Result shown when the analysis could not be obtained at all.
    pub fn fallback() -> Self {
        Self {
            environmental_impact: Label::Impact.annotate(Label::Impact.fallback()),
            alternatives: [
                Label::Eco1.annotate(Label::Eco1.fallback()),
                Label::Eco2.annotate(Label::Eco2.fallback()),
            ],
            ingredient_concern: Label::Ingredient.annotate(Label::Ingredient.fallback()),
            full_text: FALLBACK_FULL_TEXT.to_string(),
        }
    }
}

/// Turn a completion into a complete result. Missing labels get their
/// fallback text; currency is normalized everywhere and the full text is
/// additionally annotated with emoji.
pub fn build_result(completion: &str, currency_symbol: &str) -> AnalysisResult {
    let parsed = extract_labels(completion);
    let missing = parsed.missing();
    if !missing.is_empty() {
        tracing::warn!(
            "Completion lacked labels {:?}; using fallback text for them",
            missing.iter().map(|l| l.as_str()).collect::<Vec<_>>()
        );
    }

    let field = |label: Label| {
        let value = text::normalize_currency(parsed.value_or_default(label), currency_symbol);
        label.annotate(&value)
    };

    let tidy = text::tidy_completion(completion);
    let full_text = if tidy.is_empty() {
        FALLBACK_FULL_TEXT.to_string()
    } else {
        text::annotate_emoji(&text::normalize_currency(&tidy, currency_symbol))
    };

    AnalysisResult {
        environmental_impact: field(Label::Impact),
        alternatives: [field(Label::Eco1), field(Label::Eco2)],
        ingredient_concern: field(Label::Ingredient),
        full_text,
    }
}

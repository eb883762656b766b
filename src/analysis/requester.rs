use super::prompt::{build_prompt, ProductKind, PromptSettings};
use super::{build_result, TextGenerator};
use crate::catalog::{ProductSearch, SearchParams};
use crate::model::{AnalysisResult, Product};

/// Asks a text generator for an environmental assessment of a product.
///
/// Never fails: any error along the way is logged and replaced by
/// [`AnalysisResult::fallback`], so callers have a single rendering path.
pub struct AnalysisRequester<G, S> {
    generator: G,
    catalog: S,
    settings: PromptSettings,
}

impl<G: TextGenerator, S: ProductSearch> AnalysisRequester<G, S> {
    pub fn new(generator: G, catalog: S, settings: PromptSettings) -> Self {
        Self {
            generator,
            catalog,
            settings,
        }
    }

    pub async fn request_analysis(&self, product: &Product) -> AnalysisResult {
        self.request_analysis_as(product, ProductKind::infer(product))
            .await
    }

    pub async fn request_analysis_as(&self, product: &Product, kind: ProductKind) -> AnalysisResult {
        let enrichment = self.enrich(product).await;
        let prompt = build_prompt(product, enrichment.as_ref(), kind, &self.settings);
        tracing::debug!("Analysis prompt for {}:\n{}", product.code, prompt);

        match self.generator.generate(&prompt).await {
            Ok(completion) => {
                tracing::debug!("Completion for {}:\n{}", product.code, completion);
                build_result(&completion, &self.settings.currency_symbol)
            }
            Err(e) => {
                tracing::warn!("Analysis of {} failed: {}", product.code, e);
                AnalysisResult::fallback()
            }
        }
    }

    /// Look up extra detail by product name. Best effort only.
    async fn enrich(&self, product: &Product) -> Option<Product> {
        let name = product.name.trim();
        if name.is_empty() || name == crate::model::UNNAMED_PRODUCT {
            return None;
        }

        match self.catalog.search(&SearchParams::text(name, 1)).await {
            Ok(mut products) if !products.is_empty() => {
                let found = products.swap_remove(0);
                tracing::debug!("Enriched {} from catalog entry {}", product.code, found.code);
                Some(found)
            }
            Ok(_) => {
                tracing::debug!("No enrichment found for {}", name);
                None
            }
            Err(e) => {
                tracing::warn!("Enrichment lookup for {} failed: {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::parse::Label;
    use crate::analysis::FALLBACK_FULL_TEXT;
    use crate::catalog::CatalogClient;
    use crate::error::{AnalysisError, LookupError};
    use crate::model::{EcoScore, Grade};
    use std::sync::Mutex;

    pub(crate) struct FakeGenerator {
        pub reply: Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: Err("boom".to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|body| AnalysisError::Status { status: 500, body })
        }
    }

    pub(crate) struct FakeCatalog {
        pub results: Vec<Product>,
        pub fail: bool,
    }

    impl ProductSearch for FakeCatalog {
        async fn search(&self, _params: &SearchParams) -> Result<Vec<Product>, LookupError> {
            if self.fail {
                return Err(LookupError::Status {
                    status: 503,
                    url: "http://catalog".to_string(),
                });
            }
            Ok(self.results.clone())
        }
    }

    pub(crate) fn lentils() -> Product {
        let mut p = Product::placeholder("0041331023061");
        p.name = "Lentils".to_string();
        p.ecoscore_grade = Grade::B;
        p.ecoscore_score = EcoScore::Score(72);
        p.packaging = "Pp-bag".to_string();
        p.image_url = Some("https://images.example/lentils.jpg".to_string());
        p
    }

    pub(crate) const FULL_COMPLETION: &str = "IMPACT: Plastic bag adds landfill waste\n\
        ECO1: Loose organic lentils, $90 - zero packaging\n\
        ECO2: Store brand lentils, 60 USD - cheaper per kilo\n\
        INGREDIENT: Pesticide residue in conventional farming";

    fn empty_catalog() -> FakeCatalog {
        FakeCatalog {
            results: Vec::new(),
            fail: false,
        }
    }

    #[tokio::test]
    async fn complete_completion_has_no_fallback_text() {
        let requester = AnalysisRequester::new(
            FakeGenerator::replying(FULL_COMPLETION),
            empty_catalog(),
            PromptSettings::default(),
        );
        let result = requester.request_analysis(&lentils()).await;

        assert_eq!(result.environmental_impact, "⚠️ Plastic bag adds landfill waste");
        assert_eq!(result.alternatives[0], "🌱 Loose organic lentils, ₹90 - zero packaging");
        assert_eq!(result.alternatives[1], "💰 Store brand lentils, 60 ₹ - cheaper per kilo");
        for label in Label::ALL {
            let fallback = label.fallback();
            assert!(!result.environmental_impact.contains(fallback));
            assert!(!result.ingredient_concern.contains(fallback));
            assert!(result.alternatives.iter().all(|a| !a.contains(fallback)));
        }
        assert_ne!(result.full_text, FALLBACK_FULL_TEXT);
    }

    #[tokio::test]
    async fn generator_failure_returns_fallback() {
        let requester = AnalysisRequester::new(
            FakeGenerator::failing(),
            empty_catalog(),
            PromptSettings::default(),
        );
        assert_eq!(
            requester.request_analysis(&lentils()).await,
            AnalysisResult::fallback()
        );
    }

    #[tokio::test]
    async fn connection_refused_returns_complete_fallback() {
        let generator = crate::analysis::GeminiClient::new(
            Some("key".to_string()),
            crate::analysis::gemini::DEFAULT_MODEL,
            "http://127.0.0.1:1",
            crate::analysis::GenerationConfig::default(),
        )
        .unwrap();
        let catalog = CatalogClient::new("http://127.0.0.1:1", "ecoscan-tests").unwrap();
        let requester = AnalysisRequester::new(generator, catalog, PromptSettings::default());

        let result = requester.request_analysis(&lentils()).await;
        assert_eq!(result, AnalysisResult::fallback());
        assert!(!result.environmental_impact.is_empty());
        assert_eq!(result.alternatives.len(), 2);
    }

    #[tokio::test]
    async fn malformed_completion_returns_complete_result() {
        let requester = AnalysisRequester::new(
            FakeGenerator::replying("Sorry, I cannot comply."),
            empty_catalog(),
            PromptSettings::default(),
        );
        let result = requester.request_analysis(&lentils()).await;
        assert_eq!(
            result.environmental_impact,
            Label::Impact.annotate(Label::Impact.fallback())
        );
        assert!(result.alternatives.iter().all(|a| !a.is_empty()));
        assert_eq!(result.full_text, "Sorry, I cannot comply.");
    }

    #[tokio::test]
    async fn enrichment_failure_does_not_abort() {
        let generator = FakeGenerator::replying(FULL_COMPLETION);
        let catalog = FakeCatalog {
            results: Vec::new(),
            fail: true,
        };
        let requester = AnalysisRequester::new(generator, catalog, PromptSettings::default());
        let result = requester.request_analysis(&lentils()).await;
        assert_eq!(result.environmental_impact, "⚠️ Plastic bag adds landfill waste");
    }

    #[tokio::test]
    async fn enrichment_fields_reach_the_prompt() {
        let mut extra = Product::placeholder("other");
        extra.ingredients = Some("brown lentils".to_string());
        let requester = AnalysisRequester::new(
            FakeGenerator::replying(FULL_COMPLETION),
            FakeCatalog {
                results: vec![extra],
                fail: false,
            },
            PromptSettings::default(),
        );
        requester.request_analysis(&lentils()).await;

        let prompts = requester.generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- Ingredients: brown lentils"));
    }
}

use crate::model::{EcoScore, Grade, Product};
use clap::ValueEnum;

/// Whether alternatives should be framed as food or as household goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProductKind {
    Food,
    NonFood,
}

impl ProductKind {
    /// Catalog entries are food unless a category tag says otherwise.
    pub fn infer(product: &Product) -> Self {
        let non_food = product
            .categories
            .iter()
            .any(|c| c.to_lowercase().contains("non-food"));
        if non_food {
            ProductKind::NonFood
        } else {
            ProductKind::Food
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptSettings {
    pub currency_symbol: String,
    pub price_ceiling: u32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            price_ceiling: 500,
        }
    }
}

/// Build the analysis prompt. Fields missing on `product` are taken from
/// `enrichment` when it has them.
pub fn build_prompt(
    product: &Product,
    enrichment: Option<&Product>,
    kind: ProductKind,
    settings: &PromptSettings,
) -> String {
    let mut facts = Vec::new();
    facts.push(format!("- Name: {}", product.name));

    let brand = product
        .brand
        .as_deref()
        .or_else(|| enrichment.and_then(|e| e.brand.as_deref()));
    if let Some(brand) = brand {
        facts.push(format!("- Brand: {}", brand));
    }

    let eco_grade = pick_grade(product.ecoscore_grade, enrichment.map(|e| e.ecoscore_grade));
    facts.push(format!("- Eco-score grade: {}", eco_grade));
    let eco_score = match (product.ecoscore_score, enrichment.map(|e| e.ecoscore_score)) {
        (EcoScore::Unavailable, Some(other)) => other,
        (own, _) => own,
    };
    facts.push(format!("- Eco-score: {}", eco_score));

    let nutrition = pick_grade(
        product.nutrition_grade,
        enrichment.map(|e| e.nutrition_grade),
    );
    if kind == ProductKind::Food {
        facts.push(format!("- Nutrition grade: {}", nutrition));
    }

    facts.push(format!("- Packaging: {}", product.packaging));

    let optional = [
        ("Quantity", product.quantity.as_deref(), enrichment.and_then(|e| e.quantity.as_deref())),
        (
            "Ingredients",
            product.ingredients.as_deref(),
            enrichment.and_then(|e| e.ingredients.as_deref()),
        ),
    ];
    for (label, own, other) in optional {
        if let Some(value) = own.or(other) {
            facts.push(format!("- {}: {}", label, value));
        }
    }

    let tag_lists = [
        ("Labels", &product.labels, enrichment.map(|e| &e.labels)),
        (
            "Environmental tags",
            &product.environmental_tags,
            enrichment.map(|e| &e.environmental_tags),
        ),
    ];
    for (label, own, other) in tag_lists {
        let tags = if own.is_empty() {
            other.map(Vec::as_slice).unwrap_or_default()
        } else {
            own.as_slice()
        };
        if !tags.is_empty() {
            facts.push(format!("- {}: {}", label, tags.join(", ")));
        }
    }

    let (subject, alternatives) = match kind {
        ProductKind::Food => (
            "food product",
            "healthier, more sustainable food products",
        ),
        ProductKind::NonFood => (
            "household product",
            "more sustainable household products",
        ),
    };

    let symbol = &settings.currency_symbol;
    let ceiling = settings.price_ceiling;

    format!(
        "You are an environmental impact analyst. Analyze this {subject}:\n\
         {facts}\n\
         \n\
         Suggest {alternatives} that are available in local stores. \
         Every price must be in {symbol} and under {symbol}{ceiling}.\n\
         \n\
         Respond with exactly these four lines and nothing else:\n\
         IMPACT: <main environmental concern, 5-7 words>\n\
         ECO1: <eco-friendly alternative name>, {symbol}<price> - <key benefit>\n\
         ECO2: <budget alternative name>, {symbol}<price> - <key benefit>\n\
         INGREDIENT: <main ingredient or material concern, 5-7 words>",
        facts = facts.join("\n"),
    )
}

fn pick_grade(own: Grade, other: Option<Grade>) -> Grade {
    match (own, other) {
        (Grade::Unknown, Some(g)) => g,
        (g, _) => g,
    }
}

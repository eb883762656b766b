use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNNAMED_PRODUCT: &str = "Unnamed Product";
pub const UNSPECIFIED_PACKAGING: &str = "not specified";

/// Letter grade used by both the eco-score and the nutri-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    Unknown,
}

impl Grade {
    /// Parse a catalog grade. Anything outside a..e (including "unknown" and
    /// "not-applicable") maps to `Unknown`.
    pub fn from_catalog(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "a" => Grade::A,
            "b" => Grade::B,
            "c" => Grade::C,
            "d" => Grade::D,
            "e" => Grade::E,
            _ => Grade::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Grade::Unknown
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum EcoScore {
    Score(u8),
    Unavailable,
}

impl EcoScore {
    pub fn from_catalog(value: Option<&serde_json::Value>) -> Self {
        let number = value.and_then(|v| {
            v.as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        });
        match number {
            Some(n) if n.is_finite() => EcoScore::Score(n.round().clamp(0.0, 100.0) as u8),
            _ => EcoScore::Unavailable,
        }
    }
}

impl fmt::Display for EcoScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcoScore::Score(n) => write!(f, "{}/100", n),
            EcoScore::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub ecoscore_grade: Grade,
    pub ecoscore_score: EcoScore,
    pub nutrition_grade: Grade,
    pub packaging: String,
    pub quantity: Option<String>,
    pub ingredients: Option<String>,
    pub categories: Vec<String>,
    pub labels: Vec<String>,
    pub environmental_tags: Vec<String>,
}

impl Product {
    /// A product carrying only its code, with every other field at its default.
    pub fn placeholder(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: UNNAMED_PRODUCT.to_string(),
            brand: None,
            image_url: None,
            ecoscore_grade: Grade::Unknown,
            ecoscore_score: EcoScore::Unavailable,
            nutrition_grade: Grade::Unknown,
            packaging: UNSPECIFIED_PACKAGING.to_string(),
            quantity: None,
            ingredients: None,
            categories: Vec::new(),
            labels: Vec::new(),
            environmental_tags: Vec::new(),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(Product),
    NotFound { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub environmental_impact: String,
    /// Eco-friendly pick first, budget pick second.
    pub alternatives: [String; 2],
    pub ingredient_concern: String,
    pub full_text: String,
}

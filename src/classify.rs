use crate::catalog::SortKey;
use crate::model::{Grade, Product};
use clap::ValueEnum;

/// Which of a product's grades a query tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeKind {
    Eco,
    Nutrition,
}

impl GradeKind {
    fn grade_of(self, product: &Product) -> Grade {
        match self {
            GradeKind::Eco => product.ecoscore_grade,
            GradeKind::Nutrition => product.nutrition_grade,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationQuery {
    pub grade_kind: GradeKind,
    /// `None` places no requirement on the grade at all.
    pub allowed_grades: Option<Vec<Grade>>,
    pub excluded_terms: Vec<String>,
    pub limit: usize,
}

impl ClassificationQuery {
    pub fn green() -> Self {
        Self {
            grade_kind: GradeKind::Eco,
            allowed_grades: Some(vec![Grade::A, Grade::B]),
            excluded_terms: vec!["water".to_string(), "bottle".to_string()],
            limit: 20,
        }
    }

    pub fn top_nutrition() -> Self {
        Self {
            grade_kind: GradeKind::Nutrition,
            allowed_grades: Some(vec![Grade::A, Grade::B]),
            excluded_terms: Vec::new(),
            limit: 20,
        }
    }

    pub fn most_scanned() -> Self {
        Self {
            grade_kind: GradeKind::Eco,
            allowed_grades: None,
            excluded_terms: Vec::new(),
            limit: 10,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn admits(&self, product: &Product) -> bool {
        if !product.has_image() {
            return false;
        }

        if let Some(allowed) = &self.allowed_grades {
            let grade = self.grade_kind.grade_of(product);
            // Unknown never matches, even if someone lists it.
            if !grade.is_known() || !allowed.contains(&grade) {
                return false;
            }
        }

        let name = product.name.to_lowercase();
        let packaging = product.packaging.to_lowercase();
        !self
            .excluded_terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .any(|t| name.contains(&t) || packaging.contains(&t))
    }
}

/// Filter `products` by `query` and keep the first `query.limit` matches in
/// input order.
pub fn classify(products: &[Product], query: &ClassificationQuery) -> Vec<Product> {
    let selected: Vec<Product> = products
        .iter()
        .filter(|p| query.admits(p))
        .take(query.limit)
        .cloned()
        .collect();

    tracing::debug!(
        "Classified {} of {} products (limit {})",
        selected.len(),
        products.len(),
        query.limit
    );
    selected
}

/// The product listings the catalog can be browsed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Listing {
    /// Best eco-score products
    Green,
    /// Best nutrition grade products
    Nutrition,
    /// Most scanned products
    Popular,
}

impl Listing {
    pub fn title(self) -> &'static str {
        match self {
            Listing::Green => "Products with the best Green score",
            Listing::Nutrition => "Products with the best Nutri score",
            Listing::Popular => "Most scanned products",
        }
    }

    pub fn sort_key(self) -> SortKey {
        match self {
            Listing::Green => SortKey::EcoScore,
            Listing::Nutrition => SortKey::Nutrition,
            Listing::Popular => SortKey::Popularity,
        }
    }

    /// How many candidates to request so that filtering still leaves enough.
    pub fn page_size(self) -> u32 {
        match self {
            Listing::Green | Listing::Nutrition => 100,
            Listing::Popular => 10,
        }
    }

    pub fn query(self) -> ClassificationQuery {
        match self {
            Listing::Green => ClassificationQuery::green(),
            Listing::Nutrition => ClassificationQuery::top_nutrition(),
            Listing::Popular => ClassificationQuery::most_scanned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, name: &str, grade: Grade) -> Product {
        let mut p = Product::placeholder(code);
        p.name = name.to_string();
        p.ecoscore_grade = grade;
        p.image_url = Some(format!("https://images.example/{}.jpg", code));
        p
    }

    #[test]
    fn only_allowed_grades_with_images_pass() {
        let mut no_image = product("6", "Beans", Grade::A);
        no_image.image_url = Some("  ".to_string());

        let input = vec![
            product("1", "Lentils", Grade::A),
            product("2", "Rice", Grade::B),
            product("3", "Crisps", Grade::C),
            product("4", "Soda", Grade::E),
            product("5", "Mystery", Grade::Unknown),
            no_image,
        ];
        let output = classify(&input, &ClassificationQuery::green());

        let codes: Vec<_> = output.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "2"]);
        for p in &output {
            assert!(matches!(p.ecoscore_grade, Grade::A | Grade::B));
            assert!(p.has_image());
        }
    }

    #[test]
    fn excluded_terms_match_name_and_packaging_in_any_case() {
        let mut bottled = product("2", "Orange juice", Grade::A);
        bottled.packaging = "Plastic BOTTLE".to_string();
        let input = vec![
            product("1", "Sparkling WATER", Grade::A),
            bottled,
            product("3", "Oats", Grade::A),
        ];
        let output = classify(&input, &ClassificationQuery::green());
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].code, "3");
    }

    #[test]
    fn cap_preserves_input_order() {
        let input: Vec<Product> = (0..200)
            .map(|i| product(&i.to_string(), &format!("Product {}", i), Grade::A))
            .collect();
        let output = classify(&input, &ClassificationQuery::green().with_limit(20));
        assert_eq!(output.len(), 20);
        assert_eq!(output, input[..20].to_vec());
    }

    #[test]
    fn unknown_grade_is_excluded_even_when_listed() {
        let mut query = ClassificationQuery::green();
        query.allowed_grades = Some(vec![Grade::A, Grade::Unknown]);
        let output = classify(&[product("1", "Tea", Grade::Unknown)], &query);
        assert!(output.is_empty());
    }

    #[test]
    fn nutrition_query_tests_nutrition_grade() {
        let mut good = product("1", "Lentils", Grade::E);
        good.nutrition_grade = Grade::A;
        let mut bad = product("2", "Candy", Grade::A);
        bad.nutrition_grade = Grade::E;
        let output = classify(&[good, bad], &ClassificationQuery::top_nutrition());
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].code, "1");
    }

    #[test]
    fn most_scanned_only_requires_an_image() {
        let mut no_image = product("2", "Cola", Grade::A);
        no_image.image_url = None;
        let input = vec![product("1", "Nutella", Grade::Unknown), no_image];
        let output = classify(&input, &ClassificationQuery::most_scanned());
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].code, "1");
    }

    #[test]
    fn classification_is_deterministic() {
        let input: Vec<Product> = ["A", "C", "B", "A"]
            .iter()
            .enumerate()
            .map(|(i, g)| product(&i.to_string(), "Item", Grade::from_catalog(g)))
            .collect();
        let query = ClassificationQuery::green();
        assert_eq!(classify(&input, &query), classify(&input, &query));
    }

    #[test]
    fn listings_pair_queries_with_sort_keys() {
        assert_eq!(Listing::Green.sort_key(), SortKey::EcoScore);
        assert_eq!(Listing::Popular.query(), ClassificationQuery::most_scanned());
        assert_eq!(Listing::Nutrition.query().grade_kind, GradeKind::Nutrition);
    }
}

use crate::error::LookupError;
use crate::model::{AnalysisResult, Product};
use crate::scanner::ScanEvent;

pub fn format_product_list(title: &str, products: &[Product]) -> String {
    let mut out = String::new();
    out.push_str(&format!("## {} (showing {})\n\n", title, products.len()));

    if products.is_empty() {
        out.push_str("No products matched.\n");
        return out;
    }

    for (i, product) in products.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n", i + 1, product.name));
        out.push_str(&format!(
            "- **Brand:** {}\n",
            product.brand.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!(
            "- **Eco-score:** {} ({})\n",
            product.ecoscore_grade, product.ecoscore_score
        ));
        out.push_str(&format!("- **Nutri-score:** {}\n", product.nutrition_grade));
        out.push_str(&format!("- **Code:** {}\n", product.code));
        if let Some(ref url) = product.image_url {
            out.push_str(&format!("- **Image:** {}\n", url));
        }

        if i < products.len() - 1 {
            out.push_str("\n---\n\n");
        }
    }

    out
}

pub fn format_product(product: &Product) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", product.name));

    out.push_str("## Overview\n");
    if let Some(ref brand) = product.brand {
        out.push_str(&format!("- **Brand:** {}\n", brand));
    }
    out.push_str(&format!("- **Barcode:** {}\n", product.code));
    if let Some(ref quantity) = product.quantity {
        out.push_str(&format!("- **Quantity:** {}\n", quantity));
    }
    out.push_str(&format!("- **Packaging:** {}\n", product.packaging));
    out.push('\n');

    out.push_str("## Scores\n");
    out.push_str(&format!("- **Eco-score grade:** {}\n", product.ecoscore_grade));
    out.push_str(&format!("- **Eco-score:** {}\n", product.ecoscore_score));
    out.push_str(&format!("- **Nutri-score:** {}\n", product.nutrition_grade));
    if !product.environmental_tags.is_empty() {
        out.push_str(&format!(
            "- **Environmental tags:** {}\n",
            product.environmental_tags.join(", ")
        ));
    }
    out.push('\n');

    if let Some(ref ingredients) = product.ingredients {
        out.push_str("## Ingredients\n");
        out.push_str(ingredients);
        out.push_str("\n\n");
    }

    if !product.labels.is_empty() {
        out.push_str("## Labels\n");
        out.push_str(&product.labels.join(", "));
        out.push_str("\n\n");
    }

    out
}

pub fn format_not_found(code: &str) -> String {
    format!(
        "# Product Not Found\n\nNo catalog entry for barcode {}. Scan again to try another product.\n\n",
        code
    )
}

pub fn format_lookup_error(code: &str, err: &LookupError) -> String {
    format!(
        "# Lookup Failed\n\nCould not look up barcode {}: {}\nScan again to retry.\n\n",
        code, err
    )
}

pub fn format_scan_event(event: &ScanEvent) -> String {
    format!(
        "## Barcode Found!\n- **Type:** {}\n- **Value:** {}\n\n",
        event.symbol, event.value
    )
}

pub fn format_analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("## Environmental Analysis\n");
    out.push_str(&format!("- **Impact:** {}\n", result.environmental_impact));
    out.push_str(&format!("- **Eco-friendly pick:** {}\n", result.alternatives[0]));
    out.push_str(&format!("- **Budget pick:** {}\n", result.alternatives[1]));
    out.push_str(&format!("- **Ingredients:** {}\n", result.ingredient_concern));
    out.push('\n');
    out.push_str("### Full analysis\n");
    out.push_str(&result.full_text);
    out.push_str("\n\n");
    out
}

use crate::error::LookupError;
use crate::model::{EcoScore, Grade, LookupOutcome, Product, UNNAMED_PRODUCT, UNSPECIFIED_PACKAGING};
use serde_json::Value;

/// Fields requested from the catalog; keeps responses small.
pub const PRODUCT_FIELDS: &str = "code,product_name,brands,image_url,ecoscore_grade,ecoscore_score,\
nutrition_grades,nutriscore_grade,packaging,quantity,ingredients_text,categories_tags,labels_tags,\
ecoscore_tags,environment_impact_level_tags";

/// Decode a raw lookup body. A body that is not JSON is a `LookupError`,
/// which is distinct from the catalog saying it has no such product.
pub fn decode_lookup_body(body: &str, requested_code: &str) -> Result<LookupOutcome, LookupError> {
    let data: Value = serde_json::from_str(body)?;
    Ok(parse_lookup_response(&data, requested_code))
}

pub fn decode_search_body(body: &str) -> Result<Vec<Product>, LookupError> {
    let data: Value = serde_json::from_str(body)?;
    Ok(parse_search_response(&data))
}

/// Interpret a product lookup response body.
///
/// `status == 0` or a missing `product` object means the catalog does not know
/// the code; that is reported as `NotFound` with the code that was requested.
pub fn parse_lookup_response(data: &Value, requested_code: &str) -> LookupOutcome {
    let status = data.get("status").and_then(as_i64_lenient);
    let product = data.get("product").filter(|p| p.is_object());
    // Without a status field the product object alone decides.
    let found = status.map_or(product.is_some(), |s| s != 0);

    match product {
        Some(product) if found => {
            let code = data
                .get("code")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(requested_code);
            LookupOutcome::Found(map_product(product, code))
        }
        _ => {
            tracing::debug!(
                "Catalog reported no product for {} (status {:?}, verbose: {})",
                requested_code,
                status,
                data.get("status_verbose")
                    .and_then(|v| v.as_str())
                    .unwrap_or("-")
            );
            LookupOutcome::NotFound {
                code: requested_code.to_string(),
            }
        }
    }
}

/// Map a search response into products, preserving server order.
/// Entries without a code are skipped since they cannot be looked up again.
pub fn parse_search_response(data: &Value) -> Vec<Product> {
    let Some(items) = data.get("products").and_then(|v| v.as_array()) else {
        tracing::warn!("Search response had no products array");
        return Vec::new();
    };

    let products: Vec<Product> = items
        .iter()
        .filter_map(|item| {
            let code = item.get("code").and_then(code_string)?;
            Some(map_product(item, &code))
        })
        .collect();

    if products.len() < items.len() {
        tracing::debug!(
            "Skipped {} search entries without a code",
            items.len() - products.len()
        );
    }
    products
}

/// Map one catalog product object. Never fails: every absent field gets its default.
pub fn map_product(item: &Value, code: &str) -> Product {
    let name = str_field(item, "product_name").unwrap_or_else(|| UNNAMED_PRODUCT.to_string());
    let brand = str_field(item, "brands");
    let image_url = str_field(item, "image_url");

    let ecoscore_grade = str_field(item, "ecoscore_grade")
        .map(|g| Grade::from_catalog(&g))
        .unwrap_or(Grade::Unknown);
    let ecoscore_score = EcoScore::from_catalog(item.get("ecoscore_score"));

    let nutrition_grade = str_field(item, "nutrition_grades")
        .or_else(|| str_field(item, "nutriscore_grade"))
        .map(|g| Grade::from_catalog(&g))
        .unwrap_or(Grade::Unknown);

    let packaging = str_field(item, "packaging").unwrap_or_else(|| UNSPECIFIED_PACKAGING.to_string());

    let mut environmental_tags = tags_field(item, "ecoscore_tags");
    for tag in tags_field(item, "environment_impact_level_tags") {
        if !environmental_tags.contains(&tag) {
            environmental_tags.push(tag);
        }
    }

    Product {
        name,
        brand,
        image_url,
        ecoscore_grade,
        ecoscore_score,
        nutrition_grade,
        packaging,
        quantity: str_field(item, "quantity"),
        ingredients: str_field(item, "ingredients_text"),
        categories: tags_field(item, "categories_tags"),
        labels: tags_field(item, "labels_tags"),
        environmental_tags,
        ..Product::placeholder(code)
    }
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// Tags are usually language-prefixed ("en:organic"); keep them as sent.
fn tags_field(item: &Value, key: &str) -> Vec<String> {
    item.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|t| t.as_str())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn code_string(v: &Value) -> Option<String> {
    v.as_str()
        .map(|s| s.trim().to_string())
        .or_else(|| v.as_u64().map(|n| n.to_string()))
        .filter(|s| !s.is_empty())
}

fn as_i64_lenient(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

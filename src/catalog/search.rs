use super::mapping::PRODUCT_FIELDS;
use clap::ValueEnum;
use url::Url;

pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// Server-side sort keys supported by the catalog search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Popularity,
    EcoScore,
    Nutrition,
    Recent,
}

impl SortKey {
    pub fn as_param(self) -> &'static str {
        match self {
            SortKey::Popularity => "unique_scans_n",
            SortKey::EcoScore => "ecoscore_score",
            SortKey::Nutrition => "nutriscore_score",
            SortKey::Recent => "last_modified_t",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Free-text terms; `None` browses the whole catalog.
    pub query: Option<String>,
    pub sort: Option<SortKey>,
    pub page_size: u32,
    pub page: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

impl SearchParams {
    pub fn text(query: &str, page_size: u32) -> Self {
        Self {
            query: Some(query.to_string()),
            page_size,
            ..Self::default()
        }
    }

    pub fn sorted(sort: SortKey, page_size: u32) -> Self {
        Self {
            sort: Some(sort),
            page_size,
            ..Self::default()
        }
    }
}

/// Build the search URL. Free-text queries go through the legacy `search.pl`
/// endpoint, which is the only one that supports full-text terms; plain
/// browsing uses the v2 search API.
pub fn build_search_url(base_url: &str, params: &SearchParams) -> Result<Url, url::ParseError> {
    let page_size = params.page_size.max(1).to_string();
    let page = params.page.max(1).to_string();

    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    let mut url = match query {
        Some(_) => Url::parse(&format!("{}/cgi/search.pl", base_url.trim_end_matches('/')))?,
        None => Url::parse(&format!("{}/api/v2/search", base_url.trim_end_matches('/')))?,
    };

    {
        let mut pairs = url.query_pairs_mut();
        if let Some(terms) = query {
            pairs
                .append_pair("search_terms", terms)
                .append_pair("search_simple", "1")
                .append_pair("action", "process")
                .append_pair("json", "1");
        }
        pairs.append_pair("fields", PRODUCT_FIELDS);
        if let Some(sort) = params.sort {
            pairs.append_pair("sort_by", sort.as_param());
        }
        pairs
            .append_pair("page_size", &page_size)
            .append_pair("page", &page);
    }

    Ok(url)
}

pub fn build_product_url(base_url: &str, code: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url.trim_end_matches('/'))?;
    let file_name = format!("{}.json", code);
    // Pushed as a segment so that stray '/' or '?' in a decoded symbol get escaped.
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["api", "v2", "product", file_name.as_str()]);
    url.query_pairs_mut().append_pair("fields", PRODUCT_FIELDS);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://world.openfoodfacts.org";

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn param(url: &Url, key: &str) -> Option<String> {
        pairs(url).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[test]
    fn browse_url_uses_v2_search() {
        let url = build_search_url(BASE, &SearchParams::sorted(SortKey::Popularity, 10)).unwrap();
        assert_eq!(url.path(), "/api/v2/search");
        assert_eq!(param(&url, "sort_by").as_deref(), Some("unique_scans_n"));
        assert_eq!(param(&url, "page_size").as_deref(), Some("10"));
        assert_eq!(param(&url, "page").as_deref(), Some("1"));
        assert!(param(&url, "search_terms").is_none());
    }

    #[test]
    fn text_query_uses_search_pl_and_encodes_terms() {
        let url = build_search_url(BASE, &SearchParams::text("oat milk & honey", 1)).unwrap();
        assert_eq!(url.path(), "/cgi/search.pl");
        assert_eq!(param(&url, "search_terms").as_deref(), Some("oat milk & honey"));
        assert_eq!(param(&url, "json").as_deref(), Some("1"));
        assert!(param(&url, "sort_by").is_none());
    }

    #[test]
    fn blank_query_falls_back_to_browsing() {
        let url = build_search_url(BASE, &SearchParams::text("   ", 5)).unwrap();
        assert_eq!(url.path(), "/api/v2/search");
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        let params = SearchParams {
            page_size: 0,
            page: 0,
            ..SearchParams::default()
        };
        let url = build_search_url(BASE, &params).unwrap();
        assert_eq!(param(&url, "page_size").as_deref(), Some("1"));
        assert_eq!(param(&url, "page").as_deref(), Some("1"));
    }

    #[test]
    fn product_url_embeds_code() {
        let url = build_product_url(&format!("{}/", BASE), "0041331023061").unwrap();
        assert_eq!(url.path(), "/api/v2/product/0041331023061.json");
        assert!(param(&url, "fields").is_some());
    }
}

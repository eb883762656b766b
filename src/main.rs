mod analysis;
mod catalog;
mod classify;
mod cli;
mod config;
mod error;
mod model;
mod output;
mod request_state;
mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;

use crate::analysis::{AnalysisRequester, GeminiClient, ProductKind};
use crate::catalog::search::DEFAULT_PAGE_SIZE;
use crate::catalog::{CatalogClient, SearchParams, SortKey};
use crate::classify::Listing;
use crate::model::LookupOutcome;
use crate::scanner::session::SessionOptions;
use crate::scanner::LineScanner;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "ecoscan=debug"
    } else {
        "ecoscan=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.api_key, cli.currency_symbol, cli.catalog_url)?;

    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted.");
        std::process::exit(130);
    })
    .context("Failed to set Ctrl+C handler")?;

    let catalog = CatalogClient::new(&config.catalog_url, &config.user_agent)
        .context("Failed to create catalog client")?;
    tracing::debug!("Using catalog at {}", catalog.base_url());

    match cli.command {
        Commands::Lookup { code } => cmd_lookup(&catalog, &code, cli.json).await?,
        Commands::List {
            listing,
            limit,
            page_size,
        } => cmd_list(&config, &catalog, listing, limit, page_size, cli.json).await?,
        Commands::Search {
            query,
            sort,
            page_size,
        } => cmd_search(&catalog, &query, sort, page_size, cli.json).await?,
        Commands::Analyze { code, kind } => {
            cmd_analyze(&config, catalog, &code, kind, cli.json).await?
        }
        Commands::Scan {
            input,
            analyze,
            kind,
        } => cmd_scan(&config, catalog, input, analyze, kind, cli.json).await?,
    }

    Ok(())
}

async fn cmd_lookup(catalog: &CatalogClient, code: &str, json: bool) -> Result<()> {
    let outcome = catalog
        .fetch_by_code(code)
        .await
        .with_context(|| format!("Failed to look up barcode {}", code))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    match outcome {
        LookupOutcome::Found(product) => print!("{}", output::format_product(&product)),
        LookupOutcome::NotFound { code } => print!("{}", output::format_not_found(&code)),
    }
    Ok(())
}

async fn cmd_list(
    config: &AppConfig,
    catalog: &CatalogClient,
    listing: Listing,
    limit: Option<usize>,
    page_size: Option<u32>,
    json: bool,
) -> Result<()> {
    let params = SearchParams::sorted(
        listing.sort_key(),
        page_size.unwrap_or_else(|| listing.page_size()),
    );
    let candidates = catalog
        .search(&params)
        .await
        .with_context(|| format!("Failed to fetch the {:?} listing", listing))?;

    let mut query = match listing {
        Listing::Green => config.green_query(),
        other => other.query(),
    };
    if let Some(limit) = limit {
        query = query.with_limit(limit);
    }

    let products = classify::classify(&candidates, &query);
    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
    } else {
        print!("{}", output::format_product_list(listing.title(), &products));
    }
    Ok(())
}

async fn cmd_search(
    catalog: &CatalogClient,
    query: &str,
    sort: Option<SortKey>,
    page_size: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut params = SearchParams::text(query, page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    params.sort = sort;

    let products = catalog
        .search(&params)
        .await
        .with_context(|| format!("Failed to search for: {}", query))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
    } else {
        let title = format!("Search results for \"{}\"", query);
        print!("{}", output::format_product_list(&title, &products));
    }
    Ok(())
}

fn build_requester(
    config: &AppConfig,
    catalog: CatalogClient,
) -> Result<AnalysisRequester<GeminiClient, CatalogClient>> {
    if config.api_key.is_none() {
        tracing::warn!("No Gemini API key configured; analyses will use fallback text");
    }
    let generator = GeminiClient::new(
        config.api_key.clone(),
        &config.model,
        &config.gemini_url,
        config.generation.clone(),
    )
    .context("Failed to create Gemini client")?;
    Ok(AnalysisRequester::new(
        generator,
        catalog,
        config.prompt.clone(),
    ))
}

async fn cmd_analyze(
    config: &AppConfig,
    catalog: CatalogClient,
    code: &str,
    kind: Option<ProductKind>,
    json: bool,
) -> Result<()> {
    let outcome = catalog
        .fetch_by_code(code)
        .await
        .with_context(|| format!("Failed to look up barcode {}", code))?;

    let product = match outcome {
        LookupOutcome::Found(product) => product,
        LookupOutcome::NotFound { code } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&LookupOutcome::NotFound { code })?);
            } else {
                print!("{}", output::format_not_found(&code));
            }
            return Ok(());
        }
    };

    let requester = build_requester(config, catalog)?;
    let result = match kind {
        Some(kind) => requester.request_analysis_as(&product, kind).await,
        None => requester.request_analysis(&product).await,
    };

    if json {
        let value = serde_json::json!({ "product": product, "analysis": result });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", output::format_product(&product));
        print!("{}", output::format_analysis(&result));
    }
    Ok(())
}

async fn cmd_scan(
    config: &AppConfig,
    catalog: CatalogClient,
    input: Option<PathBuf>,
    analyze: bool,
    kind: Option<ProductKind>,
    json: bool,
) -> Result<()> {
    let mut source = match input {
        Some(path) => LineScanner::file(path),
        None => {
            eprintln!("Reading barcodes from stdin, one per line. Ctrl+D to finish.");
            LineScanner::stdin()
        }
    };

    let lookup = catalog.clone();
    let requester = build_requester(config, catalog)?;
    let options = SessionOptions { analyze, json, kind };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = scanner::session::run(&mut source, &lookup, &requester, options, &mut out)
        .await
        .context("Scan session failed")?;

    if !json {
        eprintln!(
            "Scanned {} codes: {} found, {} not found, {} failed.",
            summary.scanned, summary.found, summary.not_found, summary.failed
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::analysis::requester::tests::{lentils, FakeCatalog, FakeGenerator, FULL_COMPLETION};
    use crate::analysis::{AnalysisRequester, PromptSettings, FALLBACK_FULL_TEXT};
    use crate::analysis::parse::Label;
    use crate::catalog::mapping::decode_lookup_body;
    use crate::classify::{classify, ClassificationQuery};
    use crate::model::{EcoScore, Grade, LookupOutcome};

    #[tokio::test]
    async fn scanned_product_flows_from_lookup_to_listing_to_analysis() {
        let body = r#"{
            "code": "0041331023061",
            "status": 1,
            "product": {
                "product_name": "Lentils",
                "image_url": "https://images.example/lentils.jpg",
                "ecoscore_grade": "b",
                "ecoscore_score": 72,
                "packaging": "Pp-bag"
            }
        }"#;

        let LookupOutcome::Found(product) = decode_lookup_body(body, "0041331023061").unwrap() else {
            panic!("expected the product to be found");
        };
        assert_eq!(product.ecoscore_grade, Grade::B);
        assert_eq!(product.ecoscore_score, EcoScore::Score(72));
        assert_eq!(product.packaging, "Pp-bag");
        assert_eq!(product.name, lentils().name);

        let green = classify(std::slice::from_ref(&product), &ClassificationQuery::green());
        assert_eq!(green, vec![product.clone()]);

        let requester = AnalysisRequester::new(
            FakeGenerator::replying(FULL_COMPLETION),
            FakeCatalog {
                results: Vec::new(),
                fail: false,
            },
            PromptSettings::default(),
        );
        let result = requester.request_analysis(&product).await;
        assert_ne!(result.full_text, FALLBACK_FULL_TEXT);
        for label in Label::ALL {
            let fallback = label.fallback();
            assert!(!result.environmental_impact.contains(fallback));
            assert!(!result.ingredient_concern.contains(fallback));
            assert!(result.alternatives.iter().all(|a| !a.contains(fallback)));
        }
    }
}

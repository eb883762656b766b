use crate::analysis::ProductKind;
use crate::catalog::SortKey;
use crate::classify::Listing;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ecoscan",
    version,
    about = "Scan product barcodes and see their environmental footprint"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print machine-readable JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Currency symbol used in analysis text (default: ₹)
    #[arg(long, global = true)]
    pub currency_symbol: Option<String>,

    /// Gemini API key (overrides ECOSCAN_API_KEY / GEMINI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Product catalog base URL (default: https://world.openfoodfacts.org)
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up a single product by barcode
    Lookup {
        /// Barcode value (e.g., 0041331023061)
        code: String,
    },

    /// Show a curated product listing
    List {
        /// Which listing to show
        #[arg(value_enum)]
        listing: Listing,

        /// Max number of products to show (default depends on the listing)
        #[arg(long)]
        limit: Option<usize>,

        /// Number of candidates to request from the catalog
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Free-text catalog search
    Search {
        /// Search terms (e.g., "oat milk")
        query: String,

        /// Sort order: popularity, eco-score, nutrition, recent
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Max number of results (default: 24)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Look up a product and ask for an environmental analysis
    Analyze {
        /// Barcode value
        code: String,

        /// Prompt framing; inferred from the product categories when omitted
        #[arg(long, value_enum)]
        kind: Option<ProductKind>,
    },

    /// Read decoded barcodes line by line and look each one up
    Scan {
        /// Read codes from a file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Also request an analysis for every product found
        #[arg(long)]
        analyze: bool,

        /// Prompt framing for analyses; inferred per product when omitted
        #[arg(long, value_enum)]
        kind: Option<ProductKind>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ecoscan", "list", "green", "--limit", "5", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::List { listing, limit, page_size } => {
                assert_eq!(listing, Listing::Green);
                assert_eq!(limit, Some(5));
                assert_eq!(page_size, None);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn parses_scan_and_analyze_options() {
        let cli = Cli::parse_from(["ecoscan", "scan", "--input", "codes.txt", "--analyze"]);
        match cli.command {
            Commands::Scan { input, analyze, kind } => {
                assert_eq!(input, Some(PathBuf::from("codes.txt")));
                assert!(analyze);
                assert_eq!(kind, None);
            }
            _ => panic!("expected scan command"),
        }

        let cli = Cli::parse_from(["ecoscan", "analyze", "123", "--kind", "non-food"]);
        assert!(matches!(
            cli.command,
            Commands::Analyze {
                kind: Some(ProductKind::NonFood),
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_listing() {
        assert!(Cli::try_parse_from(["ecoscan", "list", "cheapest"]).is_err());
    }
}

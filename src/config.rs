use crate::analysis::gemini::{DEFAULT_GEMINI_URL, DEFAULT_MODEL};
use crate::analysis::{GenerationConfig, PromptSettings};
use crate::catalog::client::DEFAULT_CATALOG_URL;
use crate::classify::ClassificationQuery;
use crate::error::ConfigError;
use crate::model::Grade;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_url: String,
    pub user_agent: String,
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_url: String,
    pub generation: GenerationConfig,
    pub prompt: PromptSettings,
    pub green_grades: Vec<Grade>,
    pub green_excluded_terms: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    catalog: CatalogSection,
    #[serde(default)]
    analysis: AnalysisSection,
    #[serde(default)]
    green: GreenSection,
}

#[derive(Debug, Deserialize, Default)]
struct CatalogSection {
    base_url: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct AnalysisSection {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    currency_symbol: Option<String>,
    price_ceiling: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct GreenSection {
    grades: Option<Vec<String>>,
    excluded_terms: Option<Vec<String>>,
}

impl AppConfig {
    pub fn load(
        api_key: Option<String>,
        currency_symbol: Option<String>,
        catalog_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ecoscan");
        let file_config = load_config_file(&config_dir.join("config.toml"));

        // Priority: CLI flags → env vars → config file → defaults
        let api_key = api_key
            .or_else(|| std::env::var("ECOSCAN_API_KEY").ok())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        let currency_symbol = currency_symbol.or_else(|| std::env::var("ECOSCAN_CURRENCY_SYMBOL").ok());
        let catalog_url = catalog_url.or_else(|| std::env::var("ECOSCAN_CATALOG_URL").ok());

        Self::resolve(file_config, api_key, currency_symbol, catalog_url)
    }

    fn resolve(
        file: ConfigFile,
        api_key: Option<String>,
        currency_symbol: Option<String>,
        catalog_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults_prompt = PromptSettings::default();
        let defaults_generation = GenerationConfig::default();
        let green = ClassificationQuery::green();

        let green_grades = match file.green.grades {
            Some(grades) => grades
                .iter()
                .map(|g| match Grade::from_catalog(g) {
                    Grade::Unknown => Err(ConfigError::Invalid(format!(
                        "green.grades contains '{}'; expected one of a, b, c, d, e",
                        g
                    ))),
                    grade => Ok(grade),
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => green.allowed_grades.unwrap_or_default(),
        };

        let config = AppConfig {
            catalog_url: catalog_url
                .or(file.catalog.base_url)
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            user_agent: file.catalog.user_agent.unwrap_or_else(|| {
                format!("ecoscan/{} (command-line client)", env!("CARGO_PKG_VERSION"))
            }),
            api_key: api_key.or(file.analysis.api_key),
            model: file
                .analysis
                .model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_url: file
                .analysis
                .base_url
                .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            generation: GenerationConfig {
                temperature: file
                    .analysis
                    .temperature
                    .unwrap_or(defaults_generation.temperature),
                max_output_tokens: file
                    .analysis
                    .max_output_tokens
                    .unwrap_or(defaults_generation.max_output_tokens),
            },
            prompt: PromptSettings {
                currency_symbol: currency_symbol
                    .or(file.analysis.currency_symbol)
                    .unwrap_or(defaults_prompt.currency_symbol),
                price_ceiling: file
                    .analysis
                    .price_ceiling
                    .unwrap_or(defaults_prompt.price_ceiling),
            },
            green_grades,
            green_excluded_terms: file.green.excluded_terms.unwrap_or(green.excluded_terms),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be between 0 and 2, got {}",
                self.generation.temperature
            )));
        }
        if self.generation.max_output_tokens == 0 {
            return Err(ConfigError::Invalid(
                "max_output_tokens must be greater than 0".to_string(),
            ));
        }
        if self.prompt.currency_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "currency_symbol must not be empty".to_string(),
            ));
        }
        if url::Url::parse(&self.catalog_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "catalog URL '{}' is not a valid URL",
                self.catalog_url
            )));
        }
        Ok(())
    }

    /// The green listing query with configured grades and exclusions applied.
    pub fn green_query(&self) -> ClassificationQuery {
        ClassificationQuery {
            allowed_grades: Some(self.green_grades.clone()),
            excluded_terms: self.green_excluded_terms.clone(),
            ..ClassificationQuery::green()
        }
    }
}

fn load_config_file(config_path: &Path) -> ConfigFile {
    if !config_path.exists() {
        return ConfigFile::default();
    }
    match std::fs::read_to_string(config_path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid config file {}: {}", config_path.display(), e);
            ConfigFile::default()
        }),
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", config_path.display(), e);
            ConfigFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolve_file(content: &str) -> Result<AppConfig, ConfigError> {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, content).expect("should write config");
        AppConfig::resolve(load_config_file(&path), None, None, None)
    }

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::resolve(ConfigFile::default(), None, None, None).unwrap();
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.generation.max_output_tokens, 800);
        assert_eq!(config.prompt.currency_symbol, "₹");
        assert_eq!(config.green_query(), ClassificationQuery::green());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn file_values_are_applied() {
        let config = resolve_file(
            r#"
[catalog]
base_url = "https://world.openbeautyfacts.org"

[analysis]
model = "gemini-1.5-flash"
temperature = 0.2
currency_symbol = "€"
price_ceiling = 20

[green]
grades = ["A"]
excluded_terms = ["soda"]
"#,
        )
        .unwrap();
        assert_eq!(config.catalog_url, "https://world.openbeautyfacts.org");
        assert_eq!(config.model, "gemini-1.5-flash");
        assert!((config.generation.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.prompt.currency_symbol, "€");
        assert_eq!(config.prompt.price_ceiling, 20);

        let green = config.green_query();
        assert_eq!(green.allowed_grades, Some(vec![Grade::A]));
        assert_eq!(green.excluded_terms, vec!["soda".to_string()]);
        assert_eq!(green.limit, ClassificationQuery::green().limit);
    }

    #[test]
    fn cli_values_win_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analysis]\napi_key = \"from-file\"\ncurrency_symbol = \"€\"\n").unwrap();
        let config = AppConfig::resolve(
            load_config_file(&path),
            Some("from-cli".to_string()),
            Some("£".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-cli"));
        assert_eq!(config.prompt.currency_symbol, "£");
    }

    #[test]
    fn invalid_toml_is_ignored() {
        let config = resolve_file("this is = = not toml").unwrap();
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            resolve_file("[analysis]\ntemperature = 3.5\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            resolve_file("[analysis]\nmax_output_tokens = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            resolve_file("[green]\ngrades = [\"z\"]\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            resolve_file("[catalog]\nbase_url = \"not a url\"\n"),
            Err(ConfigError::Invalid(_))
        ));
    }
}

use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PRIMARY_TABLE: &str = "benefits360.gold.person_profile";
pub const DEFAULT_SECONDARY_TABLE: &str = "benefits360.silver.matched_people";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub api_prefix: String,
    pub vector_search_host: Option<String>, // None disables /search
    pub vector_search_token: Option<String>,
    pub primary_profile_table: String,
    pub secondary_profile_table: String,
    pub backend_timeout_secs: u64,
    pub max_search_results: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            api_prefix: std::env::var("API_PREFIX")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|prefix| normalize_prefix(&prefix))
                .unwrap_or_else(|| "/api".to_string()),
            vector_search_host: std::env::var("VECTOR_SEARCH_HOST")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("VECTOR_SEARCH_HOST must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?,
            vector_search_token: std::env::var("VECTOR_SEARCH_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            primary_profile_table: table_from_env(
                "PRIMARY_PROFILE_TABLE",
                DEFAULT_PRIMARY_TABLE,
            )?,
            secondary_profile_table: table_from_env(
                "SECONDARY_PROFILE_TABLE",
                DEFAULT_SECONDARY_TABLE,
            )?,
            backend_timeout_secs: std::env::var("BACKEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("BACKEND_TIMEOUT_SECS must be a whole number"))
                .and_then(|secs: u64| {
                    if secs == 0 {
                        anyhow::bail!("BACKEND_TIMEOUT_SECS must be greater than zero");
                    }
                    Ok(secs)
                })?,
            max_search_results: std::env::var("MAX_SEARCH_RESULTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_SEARCH_RESULTS must be a whole number"))
                .and_then(|max: u32| {
                    if max == 0 {
                        anyhow::bail!("MAX_SEARCH_RESULTS must be greater than zero");
                    }
                    Ok(max)
                })?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        match config.vector_search_host {
            Some(ref host) => tracing::info!("Vector search host configured: {}", host),
            None => tracing::warn!("VECTOR_SEARCH_HOST not set, search endpoint disabled"),
        }
        tracing::debug!(
            "Profile tables: primary={} secondary={}",
            config.primary_profile_table,
            config.secondary_profile_table
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }
}

/// Table names are spliced into SQL, so only dotted identifiers are accepted.
pub fn is_valid_table_name(name: &str) -> bool {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*){0,2}$")
        .expect("static regex");
    re.is_match(name)
}

fn table_from_env(var: &str, default: &str) -> anyhow::Result<String> {
    let name = std::env::var(var)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    if !is_valid_table_name(&name) {
        anyhow::bail!("{} must be a table name like schema.table, got '{}'", var, name);
    }
    Ok(name)
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

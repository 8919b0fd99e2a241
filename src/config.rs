use serde::Deserialize;

/// Default upload size limit in bytes (~5MB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 5_000_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Largest accepted upload, in bytes.
    pub max_file_size: usize,
    /// Keep the uploaded XML next to the normalized record.
    pub store_raw_xml: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            max_file_size: match std::env::var("MAX_FILE_SIZE") {
                Ok(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("MAX_FILE_SIZE must be a positive number of bytes")
                    })?,
                Err(_) => DEFAULT_MAX_FILE_SIZE,
            },
            store_raw_xml: match std::env::var("STORE_RAW_XML") {
                Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                    anyhow::anyhow!("STORE_RAW_XML must be one of true/false/1/0/yes/no")
                })?,
                Err(_) => true,
            },
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", url_preview(&config.database_url));
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Max upload size: {} bytes", config.max_file_size);
        if !config.store_raw_xml {
            tracing::info!("Raw XML storage disabled; only normalized records are kept");
        }

        Ok(config)
    }
}

/// First 20 characters of a connection URL, for logging without credentials.
fn url_preview(url: &str) -> String {
    url.chars().take(20).collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

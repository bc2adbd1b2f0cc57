use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use anyhow::{Result, Context, anyhow};
use tracing::info;

pub const API_KEY_VAR: &str = "LRR_API_KEY";

/// Connection settings for the LANraragi server.
pub struct ServerConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Builds the server settings from the CLI url and the API key.
/// The key comes from the environment first, then from `.env`.
pub fn load_server_config(base_url: &str) -> Result<ServerConfig> {
    let base_url = normalize_base_url(base_url)?;
    let api_key = match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
        _ => {
            let env_path = Path::new(".env");
            let key = load_from_env(env_path).with_context(|| {
                format!("{} is not set and could not be read from .env", API_KEY_VAR)
            })?;
            info!("Loaded {} from .env", API_KEY_VAR);
            key
        }
    };

    Ok(ServerConfig { base_url, api_key })
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(anyhow!("LANraragi URL must start with http:// or https://: {}", raw));
    }
    Ok(url.to_string())
}

fn load_from_env(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line?;
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == API_KEY_VAR {
                let value = value.trim().trim_matches('"');
                if !value.is_empty() {
                    return Ok(value.to_string());
                }
            }
        }
    }

    Err(anyhow!("No {} entry in {:?}", API_KEY_VAR, path))
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

/// Deployment configuration published by the backend next to the query API.
///
/// Both ids are required; there is no usable degraded mode without them, so
/// loading fails initialization outright instead of falling back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub client_id: String,
    pub search_application_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchConfig {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    search_app_id: String,
}

fn validated(raw: RawSearchConfig) -> Result<SearchConfig> {
    if raw.client_id.is_empty() {
        bail!("config.json is missing clientId");
    }
    if raw.search_app_id.is_empty() {
        bail!("config.json is missing searchAppId");
    }
    Ok(SearchConfig {
        client_id: raw.client_id,
        search_application_id: raw.search_app_id,
    })
}

/// Fetch and validate `{base}/config.json`.
pub async fn load_configuration(
    http: &reqwest::Client,
    base_url: &str,
) -> Result<SearchConfig> {
    let url = format!("{}/config.json", base_url.trim_end_matches('/'));
    let response = http
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch configuration from {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Configuration endpoint {} returned {}", url, status);
    }

    let raw: RawSearchConfig = response
        .json()
        .await
        .context("Failed to parse config.json")?;
    let config = validated(raw)?;
    info!(search_application_id = %config.search_application_id, "Loaded deployment configuration");
    Ok(config)
}

/// Optional local settings from `~/.trawl.toml`. CLI flags override these.
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    pub url: Option<String>,
    pub auth_url: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Settings {
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if let Ok(content) = std::fs::read_to_string(&path) {
                match toml::from_str::<Settings>(&content) {
                    Ok(settings) => return settings,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to parse settings");
                    }
                }
            }
        }
        Self::default()
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let home = match std::env::var("HOME") {
            Ok(h) => PathBuf::from(h),
            Err(_) => return Vec::new(),
        };

        vec![home.join(".trawl.toml")]
    }
}

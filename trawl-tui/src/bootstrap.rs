use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::layout::Rect;
use tracing::info;

use trawl_widget::{
    event, ApiVersion, Credentials, HttpQueryClient, QueryClient, ResultsContainer,
    ResultsContainerConfig, SearchBox, SearchBoxConfig, Session,
};

use crate::app::App;
use crate::config::{self, SearchConfig};
use crate::filter::{SourceFilterAdapter, ALL_SOURCES};
use crate::ui;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct BootstrapParams {
    pub base_url: String,
    pub auth_url: Option<String>,
    pub sources: Vec<String>,
}

/// Backend handles shared by the TUI and the one-shot CLI: the loaded
/// deployment configuration, the query client, and the auth session, which
/// stays uninitialized until [`authorize`] runs.
pub struct Backend {
    pub config: SearchConfig,
    pub client: Arc<dyn QueryClient>,
    pub session: Arc<Session>,
    http: reqwest::Client,
    auth_url: String,
}

/// Fetch the deployment configuration and pin the API version into a query
/// client. Auth deliberately does not happen here; every flow runs
/// [`authorize`] as its final step, after the rest of its wiring is up.
pub async fn connect(base_url: &str, auth_url: Option<String>) -> Result<Backend> {
    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    info!(url = %base_url, "Loading deployment configuration");
    let config = config::load_configuration(&http, base_url)
        .await
        .context("Initialization aborted: configuration unavailable")?;

    let api_version = ApiVersion::V1;
    info!(%api_version, "Pinned query API version");

    let session = Arc::new(Session::new());
    let client: Arc<dyn QueryClient> = Arc::new(HttpQueryClient::new(
        base_url,
        api_version,
        Arc::clone(&session),
    ));

    let auth_url = auth_url
        .unwrap_or_else(|| format!("{}/auth/token", base_url.trim_end_matches('/')));

    Ok(Backend {
        config,
        client,
        session,
        http,
        auth_url,
    })
}

/// Initialize the auth session for the configured client id and the
/// read-query scope.
pub async fn authorize(backend: &Backend) -> Result<()> {
    let credentials = Credentials::query(backend.config.client_id.clone());
    backend
        .session
        .init(&backend.http, &backend.auth_url, &credentials)
        .await
        .context("Initialization aborted: auth session init failed")?;
    info!("Auth session ready");
    Ok(())
}

fn selector_options(configured: Vec<String>) -> Vec<String> {
    let mut sources = configured;
    sources.retain(|s| s != ALL_SOURCES);
    sources.sort();
    sources.dedup();
    sources.insert(0, ALL_SOURCES.to_string());
    sources
}

/// Full application bootstrap, strictly ordered: configuration, version
/// pin, filter adapter, page validation and widget construction, selector
/// options, auth last. Any failure aborts initialization with context,
/// before the terminal enters raw mode.
pub async fn init(params: BootstrapParams) -> Result<App> {
    let backend = connect(&params.base_url, params.auth_url).await?;

    let source_filter = Arc::new(SourceFilterAdapter::new());

    // The registered element set does not depend on the area given here;
    // per-frame layouts recompute only the geometry.
    let page = ui::page_layout(Rect::new(0, 0, 80, 24));
    page.require(&ui::WIDGET_ELEMENTS)
        .context("Page element contract violated")?;

    let (events, receiver) = event::channel();
    let container = ResultsContainer::new(
        ResultsContainerConfig {
            search_application_id: backend.config.search_application_id.clone(),
            search_results: ui::SEARCH_RESULTS,
            facet_results: ui::FACET_RESULTS,
            interceptor: source_filter.clone(),
            client: Arc::clone(&backend.client),
            events: events.clone(),
        },
        &page,
    )
    .context("Results container rejected its configuration")?;
    let search_box = SearchBox::new(
        SearchBoxConfig {
            search_application_id: backend.config.search_application_id.clone(),
            input: ui::SEARCH_INPUT,
            anchor: ui::SUGGESTIONS_ANCHOR,
            client: Arc::clone(&backend.client),
            events,
        },
        &page,
    )
    .context("Search box rejected its configuration")?;
    info!("Widgets bound to page elements");

    let sources = selector_options(params.sources);
    info!(count = sources.len(), "Source selector populated");

    authorize(&backend).await?;

    Ok(App::new(
        search_box,
        container,
        source_filter,
        sources,
        receiver,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_options_keep_the_all_sentinel_first() {
        let options = selector_options(vec![
            "tickets".to_string(),
            "ALL".to_string(),
            "wiki".to_string(),
            "tickets".to_string(),
        ]);
        assert_eq!(options, vec!["ALL", "tickets", "wiki"]);
    }

    #[test]
    fn selector_options_with_nothing_configured_offer_only_all() {
        assert_eq!(selector_options(Vec::new()), vec!["ALL"]);
    }

    #[tokio::test]
    async fn unreachable_configuration_aborts_initialization() {
        let err = init(BootstrapParams {
            base_url: "http://127.0.0.1:1".to_string(),
            auth_url: None,
            sources: Vec::new(),
        })
        .await
        .unwrap_err();
        assert!(format!("{:#}", err).contains("configuration unavailable"));
    }
}

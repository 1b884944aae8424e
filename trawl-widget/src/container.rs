use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use thiserror::Error;
use tracing::debug;

use crate::client::{QueryClient, QueryError};
use crate::event::{RequestToken, WidgetEvent, WidgetSender};
use crate::interceptor::RequestInterceptor;
use crate::page::{ElementId, Page, PageError};
use crate::query::{FacetResult, SearchRequest, SearchResponse, SearchResult};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("search application id must not be empty")]
    EmptySearchApplicationId,
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Everything a results container needs, validated up front in
/// [`ResultsContainer::new`] instead of accumulating through setter chains.
pub struct ResultsContainerConfig {
    pub search_application_id: String,
    pub search_results: ElementId,
    pub facet_results: ElementId,
    /// Applied to every request immediately before dispatch.
    pub interceptor: Arc<dyn RequestInterceptor>,
    pub client: Arc<dyn QueryClient>,
    pub events: WidgetSender,
}

/// Rendering surface for search results and facets.
///
/// Owns the canonical current request. Executing a request runs the
/// interceptor, stamps the configured search application id, and dispatches
/// the query on a background task; the completion comes back through the
/// widget event channel and must be handed to [`ResultsContainer::absorb`].
pub struct ResultsContainer {
    config: ResultsContainerConfig,
    current_request: SearchRequest,
    results: Vec<SearchResult>,
    facets: Vec<FacetResult>,
    result_count: Option<u64>,
    error: Option<String>,
    loading: bool,
    selected: usize,
    next_token: u64,
    latest_token: Option<RequestToken>,
}

impl std::fmt::Debug for ResultsContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsContainer")
            .field("current_request", &self.current_request)
            .field("results", &self.results)
            .field("facets", &self.facets)
            .field("result_count", &self.result_count)
            .field("error", &self.error)
            .field("loading", &self.loading)
            .field("selected", &self.selected)
            .field("next_token", &self.next_token)
            .field("latest_token", &self.latest_token)
            .finish_non_exhaustive()
    }
}

impl ResultsContainer {
    pub fn new(config: ResultsContainerConfig, page: &Page) -> Result<Self, ConfigError> {
        if config.search_application_id.is_empty() {
            return Err(ConfigError::EmptySearchApplicationId);
        }
        page.require(&[config.search_results, config.facet_results])?;

        Ok(ResultsContainer {
            config,
            current_request: SearchRequest::default(),
            results: Vec::new(),
            facets: Vec::new(),
            result_count: None,
            error: None,
            loading: false,
            selected: 0,
            next_token: 1,
            latest_token: None,
        })
    }

    pub fn search_application_id(&self) -> &str {
        &self.config.search_application_id
    }

    /// The canonical request: the interceptor's output for whatever was
    /// executed last, or the empty request before any search.
    pub fn current_request(&self) -> &SearchRequest {
        &self.current_request
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn facets(&self) -> &[FacetResult] {
        &self.facets
    }

    pub fn result_count(&self) -> Option<u64> {
        self.result_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Run `request` through the interceptor and dispatch it. Returns the
    /// token identifying this execution; any completion for an older token
    /// is dropped by [`ResultsContainer::absorb`].
    pub fn execute_request(&mut self, request: SearchRequest) -> RequestToken {
        let mut request = self.config.interceptor.intercept_search_request(request);
        request.search_application_id = Some(self.config.search_application_id.clone());
        self.current_request = request.clone();

        let token = RequestToken::new(self.next_token);
        self.next_token += 1;
        self.latest_token = Some(token);
        self.loading = true;
        self.error = None;

        let client = Arc::clone(&self.config.client);
        let events = self.config.events.clone();
        tokio::spawn(async move {
            let outcome = client.search(request).await;
            // Send failure means the host loop is gone; nothing to do.
            let _ = events.send(WidgetEvent::Results { token, outcome });
        });
        token
    }

    /// Install a completed search, unless a newer request has been issued
    /// since `token` was handed out.
    pub fn absorb(&mut self, token: RequestToken, outcome: Result<SearchResponse, QueryError>) {
        if self.latest_token != Some(token) {
            debug!(%token, "dropping stale search completion");
            return;
        }
        self.loading = false;
        match outcome {
            Ok(response) => {
                self.result_count = response.result_count_estimate;
                self.results = response.results;
                self.facets = response.facet_results;
                self.error = None;
                self.selected = 0;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Clear the displayed results, facets, and error. The canonical
    /// request is kept so it can be re-executed.
    pub fn reset_state(&mut self) {
        self.results.clear();
        self.facets.clear();
        self.result_count = None;
        self.error = None;
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1).min(self.results.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn render(&self, frame: &mut Frame, page: &Page) {
        if let Some(area) = page.area(self.config.search_results) {
            self.render_results(frame, area);
        }
        if let Some(area) = page.area(self.config.facet_results) {
            self.render_facets(frame, area);
        }
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let title = match (self.loading, self.result_count) {
            (true, _) => " Results (searching...) ".to_string(),
            (false, Some(n)) => format!(" Results (~{n}) "),
            (false, None) => " Results ".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if let Some(error) = &self.error {
            let message = Paragraph::new(format!("search failed: {error}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        if self.results.is_empty() {
            let hint = if self.loading { "" } else { "No results to show." };
            frame.render_widget(
                Paragraph::new(hint)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                area,
            );
            return;
        }

        let items: Vec<ListItem> = self
            .results
            .iter()
            .map(|result| {
                let mut title_spans = vec![Span::styled(
                    result.title.as_str(),
                    Style::default().fg(Color::White),
                )];
                if let Some(source) = &result.source {
                    title_spans.push(Span::raw("  "));
                    title_spans.push(Span::styled(
                        format!("[{source}]"),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                let mut lines = vec![Line::from(title_spans)];
                if let Some(snippet) = &result.snippet {
                    lines.push(Line::from(Span::styled(
                        snippet.as_str(),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .bg(Color::DarkGray),
            )
            .highlight_symbol(">> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_facets(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for facet in &self.facets {
            lines.push(Line::from(Span::styled(
                facet.operator_name.as_str(),
                Style::default().fg(Color::Yellow),
            )));
            for bucket in &facet.buckets {
                let label = match bucket.count {
                    Some(count) => format!("  {} ({count})", bucket.value),
                    None => format!("  {}", bucket.value),
                };
                lines.push(Line::from(Span::styled(
                    label,
                    Style::default().fg(Color::White),
                )));
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Facets "));
        frame.render_widget(paragraph, area);
    }
}

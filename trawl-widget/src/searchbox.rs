use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use tracing::debug;

use crate::client::{QueryClient, QueryError};
use crate::container::{ConfigError, ResultsContainer};
use crate::event::{RequestToken, WidgetEvent, WidgetSender};
use crate::page::{ElementId, Page};
use crate::query::{SearchRequest, Suggestion};

pub struct SearchBoxConfig {
    pub search_application_id: String,
    pub input: ElementId,
    /// Element the suggestion popup is anchored to, typically directly
    /// below the input.
    pub anchor: ElementId,
    pub client: Arc<dyn QueryClient>,
    pub events: WidgetSender,
}

/// Query input widget with as-you-type suggestions.
///
/// Submitting hands the built request to a [`ResultsContainer`]; the link
/// between the two is the call site, not a stored back-reference.
pub struct SearchBox {
    config: SearchBoxConfig,
    input: String,
    suggestions: Vec<Suggestion>,
    show_suggestions: bool,
}

impl std::fmt::Debug for SearchBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBox")
            .field("input", &self.input)
            .field("suggestions", &self.suggestions)
            .field("show_suggestions", &self.show_suggestions)
            .finish_non_exhaustive()
    }
}

impl SearchBox {
    pub fn new(config: SearchBoxConfig, page: &Page) -> Result<Self, ConfigError> {
        if config.search_application_id.is_empty() {
            return Err(ConfigError::EmptySearchApplicationId);
        }
        page.require(&[config.input, config.anchor])?;

        Ok(SearchBox {
            config,
            input: String::new(),
            suggestions: Vec::new(),
            show_suggestions: false,
        })
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn suggestions_visible(&self) -> bool {
        self.show_suggestions && !self.suggestions.is_empty()
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.push(c);
        self.refresh_suggestions();
    }

    pub fn backspace(&mut self) {
        self.input.pop();
        self.refresh_suggestions();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.suggestions.clear();
        self.show_suggestions = false;
    }

    pub fn dismiss_suggestions(&mut self) {
        self.show_suggestions = false;
    }

    /// Replace the input with the first live suggestion, if any.
    pub fn accept_first_suggestion(&mut self) {
        if !self.suggestions_visible() {
            return;
        }
        if let Some(first) = self.suggestions.first() {
            self.input = first.text.clone();
        }
        self.show_suggestions = false;
    }

    /// Dispatch a suggest call for the current input. Completions arrive as
    /// [`WidgetEvent::Suggestions`] tagged with the text they answer.
    fn refresh_suggestions(&mut self) {
        if self.input.is_empty() {
            self.suggestions.clear();
            self.show_suggestions = false;
            return;
        }

        let query = self.input.clone();
        let search_application_id = self.config.search_application_id.clone();
        let client = Arc::clone(&self.config.client);
        let events = self.config.events.clone();
        tokio::spawn(async move {
            let outcome = client.suggest(&query, &search_application_id).await;
            let _ = events.send(WidgetEvent::Suggestions {
                for_query: query,
                outcome,
            });
        });
    }

    /// Install suggestions, unless the input has moved on since the call
    /// was issued. Suggest failures are logged and otherwise ignored; they
    /// never block searching.
    pub fn absorb_suggestions(
        &mut self,
        for_query: String,
        outcome: Result<Vec<Suggestion>, QueryError>,
    ) {
        if for_query != self.input {
            debug!(%for_query, "dropping suggestions for stale input");
            return;
        }
        match outcome {
            Ok(suggestions) => {
                self.show_suggestions = !suggestions.is_empty();
                self.suggestions = suggestions;
            }
            Err(e) => {
                debug!(error = %e, "suggest call failed");
                self.suggestions.clear();
                self.show_suggestions = false;
            }
        }
    }

    /// Build a request for the current input and execute it through the
    /// container. Empty input is a no-op.
    pub fn submit(&mut self, container: &mut ResultsContainer) -> Option<RequestToken> {
        if self.input.is_empty() {
            return None;
        }
        self.show_suggestions = false;
        let request = SearchRequest::default().with_query(self.input.clone());
        Some(container.execute_request(request))
    }

    pub fn render(&self, frame: &mut Frame, page: &Page) {
        if let Some(area) = page.area(self.config.input) {
            self.render_input(frame, area);
        }
        if self.suggestions_visible() {
            if let Some(area) = page.area(self.config.anchor) {
                self.render_suggestions(frame, area);
            }
        }
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::raw(self.input.as_str()),
            Span::styled("_", Style::default().fg(Color::Green)),
        ]);
        let input = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title(" Search "));
        frame.render_widget(input, area);
    }

    fn render_suggestions(&self, frame: &mut Frame, area: Rect) {
        let height = (self.suggestions.len() as u16 + 2).min(area.height);
        let popup = Rect::new(area.x, area.y, area.width, height);
        frame.render_widget(Clear, popup);

        let items: Vec<ListItem> = self
            .suggestions
            .iter()
            .map(|s| ListItem::new(Line::from(s.text.as_str())))
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Suggestions "),
        );
        frame.render_widget(list, popup);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::container::ResultsContainerConfig;
    use crate::event;
    use crate::interceptor::PassthroughInterceptor;
    use crate::page::PageError;
    use crate::query::SearchResponse;

    const INPUT: ElementId = ElementId::new("search_input");
    const ANCHOR: ElementId = ElementId::new("suggestions_anchor");
    const RESULTS: ElementId = ElementId::new("search_results");
    const FACETS: ElementId = ElementId::new("facet_results");

    struct CannedClient {
        suggestions: Vec<Suggestion>,
    }

    impl CannedClient {
        fn new(texts: &[&str]) -> Arc<Self> {
            Arc::new(CannedClient {
                suggestions: texts
                    .iter()
                    .map(|t| Suggestion {
                        text: t.to_string(),
                    })
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl QueryClient for CannedClient {
        async fn search(&self, _request: SearchRequest) -> Result<SearchResponse, QueryError> {
            Ok(SearchResponse::default())
        }

        async fn suggest(
            &self,
            _query: &str,
            _search_application_id: &str,
        ) -> Result<Vec<Suggestion>, QueryError> {
            Ok(self.suggestions.clone())
        }
    }

    fn page() -> Page {
        let mut page = Page::new();
        page.register(INPUT, Rect::new(0, 0, 40, 3));
        page.register(ANCHOR, Rect::new(0, 3, 40, 10));
        page.register(RESULTS, Rect::new(40, 0, 40, 20));
        page.register(FACETS, Rect::new(0, 13, 40, 7));
        page
    }

    fn search_box(client: Arc<dyn QueryClient>, events: WidgetSender) -> SearchBox {
        SearchBox::new(
            SearchBoxConfig {
                search_application_id: "searchapplications/test".to_string(),
                input: INPUT,
                anchor: ANCHOR,
                client,
                events,
            },
            &page(),
        )
        .unwrap()
    }

    fn container(client: Arc<dyn QueryClient>, events: WidgetSender) -> ResultsContainer {
        ResultsContainer::new(
            ResultsContainerConfig {
                search_application_id: "searchapplications/test".to_string(),
                search_results: RESULTS,
                facet_results: FACETS,
                interceptor: Arc::new(PassthroughInterceptor),
                client,
                events,
            },
            &page(),
        )
        .unwrap()
    }

    #[test]
    fn construction_requires_the_anchor_element() {
        let (events, _rx) = event::channel();
        let client = CannedClient::new(&[]);
        let mut partial = Page::new();
        partial.register(INPUT, Rect::new(0, 0, 40, 3));
        let err = SearchBox::new(
            SearchBoxConfig {
                search_application_id: "searchapplications/test".to_string(),
                input: INPUT,
                anchor: ANCHOR,
                client,
                events,
            },
            &partial,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Page(PageError::MissingElement(ANCHOR))
        ));
    }

    #[tokio::test]
    async fn typing_fetches_suggestions_for_the_current_input() {
        let (events, mut rx) = event::channel();
        let client = CannedClient::new(&["rust widgets", "rust tui"]);
        let mut search_box = search_box(client, events);

        search_box.insert_char('r');
        let WidgetEvent::Suggestions { for_query, outcome } = rx.recv().await.unwrap() else {
            panic!("unexpected event");
        };
        assert_eq!(for_query, "r");
        search_box.absorb_suggestions(for_query, outcome);

        assert!(search_box.suggestions_visible());
        assert_eq!(search_box.suggestions().len(), 2);
    }

    #[tokio::test]
    async fn stale_suggestions_are_dropped() {
        let (events, mut rx) = event::channel();
        let client = CannedClient::new(&["rust"]);
        let mut search_box = search_box(client, events);

        search_box.insert_char('r');
        search_box.insert_char('u');

        // Answer for "r" arrives after the input became "ru".
        let mut answers = Vec::new();
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                WidgetEvent::Suggestions { for_query, outcome } => {
                    answers.push((for_query, outcome));
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        answers.sort_by(|a, b| a.0.len().cmp(&b.0.len()));

        let (stale_query, stale_outcome) = answers.remove(0);
        assert_eq!(stale_query, "r");
        search_box.absorb_suggestions(stale_query, stale_outcome);
        assert!(
            !search_box.suggestions_visible(),
            "stale answer must not surface"
        );

        let (fresh_query, fresh_outcome) = answers.remove(0);
        assert_eq!(fresh_query, "ru");
        search_box.absorb_suggestions(fresh_query, fresh_outcome);
        assert!(search_box.suggestions_visible());
    }

    #[tokio::test]
    async fn submit_executes_through_the_container() {
        let (events, _rx) = event::channel();
        let client = CannedClient::new(&[]);
        let mut search_box = search_box(client.clone(), events.clone());
        let mut container = container(client, events);

        for c in "bar".chars() {
            search_box.insert_char(c);
        }
        let token = search_box.submit(&mut container);
        assert!(token.is_some());
        assert_eq!(container.current_request().query.as_deref(), Some("bar"));
        assert!(container.is_loading());
    }

    #[tokio::test]
    async fn submit_with_empty_input_is_a_no_op() {
        let (events, _rx) = event::channel();
        let client = CannedClient::new(&[]);
        let mut search_box = search_box(client.clone(), events.clone());
        let mut container = container(client, events);

        assert!(search_box.submit(&mut container).is_none());
        assert_eq!(container.current_request().query, None);
        assert!(!container.is_loading());
    }

    #[tokio::test]
    async fn accept_first_suggestion_replaces_the_input() {
        let (events, mut rx) = event::channel();
        let client = CannedClient::new(&["rust widgets"]);
        let mut search_box = search_box(client, events);

        search_box.insert_char('r');
        let WidgetEvent::Suggestions { for_query, outcome } = rx.recv().await.unwrap() else {
            panic!("unexpected event");
        };
        search_box.absorb_suggestions(for_query, outcome);

        search_box.accept_first_suggestion();
        assert_eq!(search_box.input(), "rust widgets");
        assert!(!search_box.suggestions_visible());
    }

    #[tokio::test]
    async fn clearing_the_input_hides_suggestions() {
        let (events, mut rx) = event::channel();
        let client = CannedClient::new(&["rust"]);
        let mut search_box = search_box(client, events);

        search_box.insert_char('r');
        let WidgetEvent::Suggestions { for_query, outcome } = rx.recv().await.unwrap() else {
            panic!("unexpected event");
        };
        search_box.absorb_suggestions(for_query, outcome);
        assert!(search_box.suggestions_visible());

        search_box.backspace();
        assert_eq!(search_box.input(), "");
        assert!(!search_box.suggestions_visible());
    }

    #[tokio::test]
    async fn render_smoke_with_suggestions_open() {
        let (events, mut rx) = event::channel();
        let client = CannedClient::new(&["rust widgets"]);
        let mut search_box = search_box(client, events);
        let page = page();

        search_box.insert_char('r');
        let WidgetEvent::Suggestions { for_query, outcome } = rx.recv().await.unwrap() else {
            panic!("unexpected event");
        };
        search_box.absorb_suggestions(for_query, outcome);

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| search_box.render(f, &page)).unwrap();
    }
}

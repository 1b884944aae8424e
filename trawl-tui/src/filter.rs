use std::sync::RwLock;

use tracing::debug;

use trawl_widget::{RequestInterceptor, SearchRequest};

/// Selector value meaning "no source filter".
pub const ALL_SOURCES: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    All,
    Predefined(String),
}

impl SourceSelection {
    /// Map a selector control value to a selection. `"ALL"` is the
    /// unfiltered sentinel; any other value names a predefined source.
    pub fn parse(value: &str) -> Self {
        if value == ALL_SOURCES {
            SourceSelection::All
        } else {
            SourceSelection::Predefined(value.to_string())
        }
    }
}

/// Interceptor narrowing every outgoing search to the selected source.
///
/// Shared between the UI, which updates the selection, and the results
/// container, which applies it at execution time. Until the user makes a
/// selection the adapter behaves as unfiltered.
#[derive(Debug, Default)]
pub struct SourceFilterAdapter {
    selected: RwLock<Option<SourceSelection>>,
}

impl SourceFilterAdapter {
    pub fn new() -> Self {
        SourceFilterAdapter::default()
    }

    pub fn selected(&self) -> Option<SourceSelection> {
        self.selected.read().unwrap().clone()
    }

    pub fn set_selected(&self, selection: Option<SourceSelection>) {
        debug!(?selection, "source selection updated");
        *self.selected.write().unwrap() = selection;
    }
}

impl RequestInterceptor for SourceFilterAdapter {
    fn intercept_search_request(&self, request: SearchRequest) -> SearchRequest {
        match self.selected() {
            None | Some(SourceSelection::All) => request.clear_restrictions(),
            Some(SourceSelection::Predefined(id)) => request.restrict_to_predefined(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restriction_ids(request: &SearchRequest) -> Vec<&str> {
        request
            .data_source_restrictions
            .iter()
            .flatten()
            .filter_map(|r| r.source.predefined_source.as_deref())
            .collect()
    }

    #[test]
    fn parse_maps_the_all_sentinel() {
        assert_eq!(SourceSelection::parse("ALL"), SourceSelection::All);
        assert_eq!(
            SourceSelection::parse("source_123"),
            SourceSelection::Predefined("source_123".to_string())
        );
    }

    #[test]
    fn selecting_a_source_restricts_the_request() {
        let adapter = SourceFilterAdapter::new();
        adapter.set_selected(Some(SourceSelection::parse("source_123")));

        let out =
            adapter.intercept_search_request(SearchRequest::default().with_query("bar"));

        assert_eq!(out.query.as_deref(), Some("bar"));
        assert_eq!(restriction_ids(&out), vec!["source_123"]);
    }

    #[test]
    fn selecting_all_clears_existing_restrictions() {
        let adapter = SourceFilterAdapter::new();
        adapter.set_selected(Some(SourceSelection::All));

        let already_restricted = SearchRequest::default()
            .with_query("foo")
            .restrict_to_predefined("source_999");
        let out = adapter.intercept_search_request(already_restricted);

        assert_eq!(out.query.as_deref(), Some("foo"));
        assert_eq!(out.data_source_restrictions, None);
    }

    #[test]
    fn no_selection_behaves_as_unfiltered() {
        let adapter = SourceFilterAdapter::new();
        assert_eq!(adapter.selected(), None);

        let out = adapter.intercept_search_request(SearchRequest::default().with_query("foo"));
        assert_eq!(out.query.as_deref(), Some("foo"));
        assert_eq!(out.data_source_restrictions, None);
    }

    #[test]
    fn changing_selection_replaces_the_restriction() {
        let adapter = SourceFilterAdapter::new();
        adapter.set_selected(Some(SourceSelection::Predefined("first".to_string())));
        let out = adapter.intercept_search_request(SearchRequest::default().with_query("q"));

        adapter.set_selected(Some(SourceSelection::Predefined("second".to_string())));
        let out = adapter.intercept_search_request(out);

        assert_eq!(restriction_ids(&out), vec!["second"]);
    }

    #[test]
    fn interception_is_idempotent() {
        for selection in [
            None,
            Some(SourceSelection::All),
            Some(SourceSelection::Predefined("source_123".to_string())),
        ] {
            let adapter = SourceFilterAdapter::new();
            adapter.set_selected(selection);

            let request = SearchRequest::default().with_query("bar");
            let once = adapter.intercept_search_request(request.clone());
            let twice = adapter.intercept_search_request(once.clone());
            assert_eq!(once, twice);
        }
    }
}

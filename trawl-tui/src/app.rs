use std::sync::Arc;

use tracing::debug;

use trawl_widget::{ResultsContainer, SearchBox, WidgetEvent, WidgetReceiver};

use crate::filter::{SourceFilterAdapter, SourceSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Results,
    Sources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Query,
}

pub struct App {
    pub search_box: SearchBox,
    pub container: ResultsContainer,
    source_filter: Arc<SourceFilterAdapter>,
    /// Selector options; index 0 is always the ALL sentinel.
    pub sources: Vec<String>,
    pub source_cursor: usize,
    /// Index of the applied selection, `None` until the user picks one.
    pub applied_source: Option<usize>,
    pub active_pane: Pane,
    pub mode: Mode,
    pub status_message: String,
    pub should_quit: bool,
    events: WidgetReceiver,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("sources", &self.sources)
            .field("source_cursor", &self.source_cursor)
            .field("applied_source", &self.applied_source)
            .field("active_pane", &self.active_pane)
            .field("mode", &self.mode)
            .field("status_message", &self.status_message)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(
        search_box: SearchBox,
        container: ResultsContainer,
        source_filter: Arc<SourceFilterAdapter>,
        sources: Vec<String>,
        events: WidgetReceiver,
    ) -> Self {
        Self {
            search_box,
            container,
            source_filter,
            sources,
            source_cursor: 0,
            applied_source: None,
            active_pane: Pane::Results,
            mode: Mode::Normal,
            status_message: String::new(),
            should_quit: false,
            events,
        }
    }

    pub fn selected_source_value(&self) -> Option<&str> {
        self.applied_source
            .and_then(|i| self.sources.get(i))
            .map(String::as_str)
    }

    /// Change handler for the source selector. Updates the shared filter,
    /// then resets and re-executes the current search so the new filter
    /// applies; with no active query only the filter changes.
    pub fn on_source_changed(&mut self, value: &str) {
        self.source_filter
            .set_selected(Some(SourceSelection::parse(value)));

        let request = self.container.current_request().clone();
        if request.has_query() {
            self.container.reset_state();
            self.container.execute_request(request);
        }
    }

    /// Apply the highlighted selector row, like a `<select>` committing its
    /// value.
    pub fn apply_source_cursor(&mut self) {
        let value = match self.sources.get(self.source_cursor) {
            Some(value) => value.clone(),
            None => return,
        };
        self.applied_source = Some(self.source_cursor);
        self.status_message = format!("Source: {}", value);
        self.on_source_changed(&value);
    }

    pub fn activate_selection(&mut self) {
        if self.active_pane == Pane::Sources {
            self.apply_source_cursor();
        }
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            Pane::Results => self.container.select_previous(),
            Pane::Sources => {
                if self.source_cursor > 0 {
                    self.source_cursor -= 1;
                }
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            Pane::Results => self.container.select_next(),
            Pane::Sources => {
                if !self.sources.is_empty() && self.source_cursor < self.sources.len() - 1 {
                    self.source_cursor += 1;
                }
            }
        }
    }

    pub fn toggle_pane(&mut self) {
        self.active_pane = match self.active_pane {
            Pane::Results => Pane::Sources,
            Pane::Sources => Pane::Results,
        };
    }

    pub fn enter_query_mode(&mut self) {
        self.mode = Mode::Query;
        self.search_box.clear();
    }

    pub fn cancel_query(&mut self) {
        self.mode = Mode::Normal;
        self.search_box.clear();
    }

    pub fn submit_query(&mut self) {
        self.mode = Mode::Normal;
        if let Some(token) = self.search_box.submit(&mut self.container) {
            debug!(%token, "query submitted");
        }
    }

    /// Route completions from spawned widget work back into the widgets.
    pub fn on_widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Results { token, outcome } => self.container.absorb(token, outcome),
            WidgetEvent::Suggestions { for_query, outcome } => {
                self.search_box.absorb_suggestions(for_query, outcome)
            }
        }
    }

    /// Drain everything queued since the last tick.
    pub fn drain_widget_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.on_widget_event(event);
        }
    }
}

use std::fmt;

use tokio::sync::mpsc;

use crate::client::QueryError;
use crate::query::{SearchResponse, Suggestion};

/// Identity of one executed search request. Tokens increase monotonically
/// per container; a completion carrying anything older than the latest
/// issued token is stale and gets discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub(crate) fn new(value: u64) -> Self {
        RequestToken(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Messages sent from spawned widget work back to the UI thread. The host
/// drains these every tick and routes them to the owning widget.
#[derive(Debug)]
pub enum WidgetEvent {
    /// A search dispatched by a results container completed.
    Results {
        token: RequestToken,
        outcome: Result<SearchResponse, QueryError>,
    },
    /// A suggest call issued by a search box completed. `for_query` is the
    /// input text the suggestions answer.
    Suggestions {
        for_query: String,
        outcome: Result<Vec<Suggestion>, QueryError>,
    },
}

pub type WidgetSender = mpsc::UnboundedSender<WidgetEvent>;
pub type WidgetReceiver = mpsc::UnboundedReceiver<WidgetEvent>;

/// Channel connecting the widgets to the host's event loop.
pub fn channel() -> (WidgetSender, WidgetReceiver) {
    mpsc::unbounded_channel()
}

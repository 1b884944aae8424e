pub mod auth;
pub mod client;
pub mod container;
pub mod event;
pub mod interceptor;
pub mod page;
pub mod query;
pub mod searchbox;

pub use auth::{AccessToken, AuthError, Credentials, Session, QUERY_SCOPE};
pub use client::{ApiVersion, HttpQueryClient, QueryClient, QueryError};
pub use container::{ConfigError, ResultsContainer, ResultsContainerConfig};
pub use event::{RequestToken, WidgetEvent, WidgetReceiver, WidgetSender};
pub use interceptor::{PassthroughInterceptor, RequestInterceptor};
pub use page::{ElementId, Page, PageError};
pub use query::{
    DataSourceRestriction, FacetBucket, FacetResult, SearchRequest, SearchResponse, SearchResult,
    Source, Suggestion,
};
pub use searchbox::{SearchBox, SearchBoxConfig};

use crate::query::SearchRequest;

/// Extension point invoked on every outgoing search request.
///
/// A results container applies its registered interceptor immediately
/// before dispatch, so re-executing a stored request re-applies whatever
/// policy the interceptor currently holds. The transform consumes the
/// request and returns the one to send; callers must treat the returned
/// value as canonical. There is no error path: implementations are expected
/// to be total over any request they are handed.
pub trait RequestInterceptor: Send + Sync {
    fn intercept_search_request(&self, request: SearchRequest) -> SearchRequest;
}

/// Interceptor that forwards every request untouched. Containers without a
/// custom policy are built with this.
#[derive(Debug, Default)]
pub struct PassthroughInterceptor;

impl RequestInterceptor for PassthroughInterceptor {
    fn intercept_search_request(&self, request: SearchRequest) -> SearchRequest {
        request
    }
}

use serde::{Deserialize, Serialize};

/// An outgoing search request in the backend's wire form.
///
/// All fields are optional on the wire; `Default` is the empty request a
/// results container starts from before any search has been issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_application_id: Option<String>,
    /// `None` means unrestricted: the search application's own configured
    /// sources apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_restrictions: Option<Vec<DataSourceRestriction>>,
}

impl SearchRequest {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// True iff the request carries a non-empty query string. The empty
    /// string counts as "no query", matching the widget's re-execution
    /// guard.
    pub fn has_query(&self) -> bool {
        self.query.as_deref().map_or(false, |q| !q.is_empty())
    }

    /// Restrict the request to a single predefined source, replacing any
    /// restriction already present.
    pub fn restrict_to_predefined(mut self, id: impl Into<String>) -> Self {
        self.data_source_restrictions = Some(vec![DataSourceRestriction {
            source: Source::predefined(id),
        }]);
        self
    }

    /// Drop any source restriction, deferring to the search application's
    /// configured sources.
    pub fn clear_restrictions(mut self) -> Self {
        self.data_source_restrictions = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceRestriction {
    pub source: Source,
}

/// A data source reference: either a named source or one of the backend's
/// predefined sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predefined_source: Option<String>,
}

impl Source {
    pub fn predefined(id: impl Into<String>) -> Self {
        Source {
            name: None,
            predefined_source: Some(id.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_count_estimate: Option<u64>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub facet_results: Vec<FacetResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Name of the data source the result came from, when the backend
    /// reports it.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetResult {
    pub operator_name: String,
    #[serde(default)]
    pub buckets: Vec<FacetBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetBucket {
    pub value: String,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_serializes_to_empty_object() {
        let json = serde_json::to_string(&SearchRequest::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn restriction_wire_shape_is_single_predefined_source() {
        let request = SearchRequest::default()
            .with_query("bar")
            .restrict_to_predefined("source_123");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "bar",
                "dataSourceRestrictions": [
                    { "source": { "predefinedSource": "source_123" } }
                ]
            })
        );
    }

    #[test]
    fn clear_restrictions_omits_the_field_entirely() {
        let request = SearchRequest::default()
            .with_query("foo")
            .restrict_to_predefined("source_123")
            .clear_restrictions();
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"query":"foo"}"#);
    }

    #[test]
    fn restrict_replaces_rather_than_appends() {
        let request = SearchRequest::default()
            .restrict_to_predefined("first")
            .restrict_to_predefined("second");
        let restrictions = request.data_source_restrictions.unwrap();
        assert_eq!(restrictions.len(), 1);
        assert_eq!(
            restrictions[0].source.predefined_source.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn has_query_treats_empty_string_as_absent() {
        assert!(!SearchRequest::default().has_query());
        assert!(!SearchRequest::default().with_query("").has_query());
        assert!(SearchRequest::default().with_query("foo").has_query());
        // Whitespace is a query, as in the original widget.
        assert!(SearchRequest::default().with_query("  ").has_query());
    }

    #[test]
    fn response_decodes_with_missing_collections() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
        assert!(response.facet_results.is_empty());
        assert_eq!(response.result_count_estimate, None);
    }

    #[test]
    fn response_decodes_camel_case_fields() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "resultCountEstimate": 2,
            "results": [
                { "title": "One", "url": "https://example.com/1", "snippet": "first" },
                { "title": "Two", "source": "tickets" }
            ],
            "facetResults": [
                { "operatorName": "type", "buckets": [ { "value": "doc", "count": 7 } ] }
            ]
        }))
        .unwrap();

        assert_eq!(response.result_count_estimate, Some(2));
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[1].source.as_deref(), Some("tickets"));
        assert_eq!(response.facet_results[0].operator_name, "type");
        assert_eq!(response.facet_results[0].buckets[0].count, Some(7));
    }
}

use std::io::{self, IsTerminal};

use anyhow::Result;
use serde_json::json;

use trawl_widget::{QueryClient, RequestInterceptor, SearchRequest, SearchResponse};

use crate::filter::{SourceFilterAdapter, SourceSelection};

/// Determine whether output should be JSON.
/// JSON is used when: --json flag is set, OR stdout is not a terminal (piped).
pub fn use_json(flag: bool) -> bool {
    flag || !io::stdout().is_terminal()
}

/// Print a structured error and exit with code 1.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let msg = format!("{:#}", err);
        eprintln!("{}", json!({ "error": msg }));
    } else {
        eprintln!("error: {:#}", err);
    }
    std::process::exit(1);
}

fn print_response(response: &SearchResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    match response.result_count_estimate {
        Some(estimate) => println!("~{} results", estimate),
        None => println!("{} results", response.results.len()),
    }
    for result in &response.results {
        println!(
            "{:<40} {}",
            result.title,
            result.url.as_deref().unwrap_or("")
        );
        if let Some(snippet) = &result.snippet {
            println!("    {}", snippet);
        }
    }
    for facet in &response.facet_results {
        let buckets: Vec<String> = facet
            .buckets
            .iter()
            .map(|b| match b.count {
                Some(n) => format!("{} ({})", b.value, n),
                None => b.value.clone(),
            })
            .collect();
        println!("{}: {}", facet.operator_name, buckets.join(", "));
    }
    Ok(())
}

/// One-shot filtered query: the same interceptor path the TUI uses, without
/// the widgets.
pub async fn search(
    client: &dyn QueryClient,
    search_application_id: &str,
    query: &str,
    source: Option<&str>,
    json: bool,
) -> Result<()> {
    let filter = SourceFilterAdapter::new();
    if let Some(source) = source {
        filter.set_selected(Some(SourceSelection::parse(source)));
    }

    let mut request =
        filter.intercept_search_request(SearchRequest::default().with_query(query));
    request.search_application_id = Some(search_application_id.to_string());

    let response = client.search(request).await?;
    print_response(&response, json)
}

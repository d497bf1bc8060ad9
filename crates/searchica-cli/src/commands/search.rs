use std::io::{self, Write};

use anyhow::{Context, Result};
use searchica_client::{SearchApi, SearchClient};
use searchica_core::SearchResponse;

/// Run one search and print the ranked results, or the raw response with
/// `json`.
pub async fn run_search(
    client: &SearchClient,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let response = client
        .search(query)
        .await
        .with_context(|| format!("Search for {:?} failed", query))?;
    response
        .validate()
        .context("Search service returned a malformed response")?;

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &response)?;
        writeln!(stdout)?;
    } else {
        write_results(&mut stdout, query, &response, limit)?;
    }
    Ok(())
}

fn write_results(
    out: &mut impl Write,
    query: &str,
    response: &SearchResponse,
    limit: Option<usize>,
) -> io::Result<()> {
    let total = response.results.len();
    if total == 0 {
        return writeln!(out, "No results for {:?}", query);
    }

    let shown = limit.unwrap_or(total).min(total);
    if shown < total {
        writeln!(out, "Top {} of {} results for {:?}\n", shown, total, query)?;
    } else {
        writeln!(out, "{} results for {:?}\n", total, query)?;
    }

    for (rank, doc) in response.results.iter().take(shown).enumerate() {
        writeln!(out, "{:>3}. {}  [{:.3}]", rank + 1, doc.display_subject(), doc.score)?;
        writeln!(out, "     From: {}  {}", doc.sender.trim(), doc.short_date())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchica_core::{DocumentId, DocumentResult, PlotPayload};

    fn response(subjects: &[&str]) -> SearchResponse {
        SearchResponse {
            plot_data: PlotPayload::default(),
            results: subjects
                .iter()
                .enumerate()
                .map(|(i, subject)| DocumentResult {
                    id: DocumentId::new(i as u64),
                    subject: subject.to_string(),
                    sender: "Rebecca Mark ".to_string(),
                    recipient: "ken.lay@enron.com".to_string(),
                    cc: None,
                    date: "Mon, 13 Aug 2001 08:15:00 -0700".to_string(),
                    body: String::new(),
                    score: 0.9 - i as f64 / 10.0,
                })
                .collect(),
        }
    }

    fn render(response: &SearchResponse, limit: Option<usize>) -> String {
        let mut out = Vec::new();
        write_results(&mut out, "azurix", response, limit).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_results_in_rank_order() {
        let text = render(&response(&["Azurix IPO", ""]), None);
        assert!(text.starts_with("2 results for \"azurix\""));
        assert!(text.contains("  1. Azurix IPO  [0.900]"));
        assert!(text.contains("  2. (no subject)  [0.800]"));
        assert!(text.contains("From: Rebecca Mark  2001-08-13"));
        assert!(text.find("Azurix IPO").unwrap() < text.find("(no subject)").unwrap());
    }

    #[test]
    fn test_limit() {
        let text = render(&response(&["one", "two", "three"]), Some(2));
        assert!(text.starts_with("Top 2 of 3 results"));
        assert!(text.contains("two"));
        assert!(!text.contains("three"));
    }

    #[test]
    fn test_no_results() {
        assert_eq!(render(&response(&[]), None), "No results for \"azurix\"\n");
    }
}

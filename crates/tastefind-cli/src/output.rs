//! Output formatting for search and evaluation results.
//!
//! Supports both human-readable terminal output and JSON for scripting.
//! JSON output is the core response types serialized as-is, so it matches
//! what an HTTP layer would return.

use serde::Serialize;
use std::path::PathBuf;
use tastefind_core::evaluation::QueryEvaluation;
use tastefind_core::search::SearchResponse;

/// Maximum characters to show in a body snippet
const SNIPPET_MAX_LEN: usize = 200;

/// Serializes any result as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats search results for human-readable terminal output.
pub fn format_human(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return format!(
            "No results found for \"{}\" in {}",
            response.query, response.category
        );
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Found {} result{} for \"{}\" in {}:\n\n",
        response.total_results,
        if response.total_results == 1 { "" } else { "s" },
        response.query,
        response.category
    ));

    for (i, result) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} (score: {:.3})\n",
            i + 1,
            result.title,
            result.combined_score
        ));
        output.push_str(&format!(
            "   [lexical: {:.3}, semantic: {:.3}, relevance: {:.2}]\n",
            result.lexical_score, result.semantic_score, result.relevance_score
        ));
        if !result.link.is_empty() {
            output.push_str(&format!("   Link: {}\n", result.link));
        }
        let snippet = truncate_text(&result.body, SNIPPET_MAX_LEN);
        if !snippet.is_empty() {
            output.push_str(&format!("   {}\n", snippet));
        }
        output.push('\n');
    }

    if response.semantic_degraded {
        output.push_str("(semantic ranking unavailable: lexical results only)\n");
    }

    output.trim_end().to_string()
}

/// Formats a single-query evaluation as a metrics table.
pub fn format_evaluation_human(eval: &QueryEvaluation) -> String {
    let mut output = format!(
        "Query \"{}\" in {} ({} relevant documents, top {})\n\n",
        eval.query, eval.category, eval.relevant_count, eval.top_k
    );
    output.push_str(&format!(
        "{:<10} {:>9} {:>9} {:>9} {:>9} {:>9} {:>11}\n",
        "ranker", "precision", "recall", "f1", "ap", "retrieved", "runtime_ms"
    ));
    for (ranker, m) in &eval.metrics {
        output.push_str(&format!(
            "{:<10} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9} {:>11.2}\n",
            ranker.name(),
            m.precision,
            m.recall,
            m.f1,
            m.average_precision,
            m.retrieved_count,
            m.runtime_ms
        ));
    }
    output.trim_end().to_string()
}

/// Lists the artifact files written by `index`.
pub fn format_index_human(written: &[PathBuf]) -> String {
    let mut output = format!("Wrote {} artifact files:\n", written.len());
    for path in written {
        output.push_str(&format!("  {}\n", path.display()));
    }
    output.trim_end().to_string()
}

/// Truncates text to a maximum number of characters at a word boundary.
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_len).collect();
    match truncated.rfind(' ') {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}

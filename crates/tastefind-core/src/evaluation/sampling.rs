//! Synthetic query sampling for aggregate evaluation.

use crate::corpus::Document;
use crate::text::word_tokens;
use std::collections::HashMap;

/// Picks the `sample_size` most frequent tokens of at least `min_len`
/// characters across all titles and bodies.
///
/// Frequency is the total occurrence count. Ties are broken alphabetically
/// so the same corpus always yields the same sample.
pub fn sample_queries(documents: &[Document], min_len: usize, sample_size: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for doc in documents {
        for token in word_tokens(&doc.full_text()) {
            if token.chars().count() >= min_len {
                *counts.entry(token).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(sample_size)
        .map(|(token, _)| token)
        .collect()
}

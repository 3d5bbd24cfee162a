use std::collections::BTreeSet;

/// Trims, lowercases, drops blanks and deduplicates tag names. Output is sorted.
pub fn normalize_tag_names<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// Fuzzy matching for step and status name suggestions

/// Levenshtein distance between two strings (single-character edits)
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two-row matrix; row i holds distances for a[..i]
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)                 // deletion
                .min(curr[j - 1] + 1)               // insertion
                .min(prev[j - 1] + cost);           // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Find candidates close to `search` (case-insensitive).
/// Returns up to 3 names sorted by distance, closest first.
pub fn find_near_matches(search: &str, candidates: &[&str], max_distance: usize) -> Vec<String> {
    let search_lower = search.to_lowercase();
    let mut matches: Vec<(&str, usize)> = candidates
        .iter()
        .filter_map(|candidate| {
            let candidate_lower = candidate.to_lowercase();
            let distance = levenshtein_distance(&search_lower, &candidate_lower);
            if distance <= max_distance {
                Some((*candidate, distance))
            } else if !search_lower.is_empty() && candidate_lower.starts_with(&search_lower) {
                // Prefix matches rank after anything within the threshold
                Some((*candidate, max_distance + candidate_lower.len() - search_lower.len()))
            } else {
                None
            }
        })
        .collect();

    matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    matches.into_iter().take(3).map(|(name, _)| name.to_string()).collect()
}

/// Format a "did you mean" hint, or an empty string when nothing is close
pub fn suggestion_hint(search: &str, candidates: &[&str]) -> String {
    let near = find_near_matches(search, candidates, 2);
    if near.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", near.join(", "))
    }
}

//! "Did you mean" suggestions for unresolved names.

/// Levenshtein distance between `left` and `right`, counted in characters.
#[must_use]
pub fn edit_distance(left: &str, right: &str) -> usize {
    let right: Vec<char> = right.chars().collect();
    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];

    for (i, left_char) in left.chars().enumerate() {
        current[0] = i + 1;
        for (j, right_char) in right.iter().enumerate() {
            let substitution = previous[j] + usize::from(left_char != *right_char);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

/// Picks the candidate closest to `name` within `max_distance`.
///
/// Exact matches are ignored; ties resolve to the lexicographically
/// smallest candidate so suggestions are stable across runs.
///
/// # Examples
///
/// ```
/// use vetting_common::suggest::closest_match;
///
/// let candidates = ["requests", "json", "numpy"];
/// assert_eq!(closest_match("reqeusts", candidates, 2), Some("requests"));
/// assert_eq!(closest_match("pandas", candidates, 2), None);
/// ```
pub fn closest_match<'a, I>(name: &str, candidates: I, max_distance: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|candidate| *candidate != name)
        .map(|candidate| (edit_distance(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .min()
        .map(|(_, candidate)| candidate)
}

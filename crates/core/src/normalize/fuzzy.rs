//! Edit-distance lookup over folded vocabulary keys.

/// Levenshtein distance in characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Edit distance scaled by the longer string, in `[0, 1]`.
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    edit_distance(a, b) as f64 / longest as f64
}

/// Keys paired with the index of the canonical name they resolve to.
#[derive(Debug, Clone, Default)]
pub struct FuzzyIndex {
    keys: Vec<(String, usize)>,
}

impl FuzzyIndex {
    pub fn new(keys: impl IntoIterator<Item = (String, usize)>) -> Self {
        let mut keys: Vec<(String, usize)> = keys.into_iter().collect();
        // Deterministic tie-breaking regardless of the source map's order.
        keys.sort();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The closest key whose normalised distance is strictly below
    /// `threshold`, as `(canonical index, distance)`.
    pub fn closest(&self, query: &str, threshold: f64) -> Option<(usize, f64)> {
        let query_len = query.chars().count();
        let mut best: Option<(usize, f64)> = None;

        for (key, idx) in &self.keys {
            let key_len = key.chars().count();
            let longest = query_len.max(key_len);
            if longest == 0 {
                continue;
            }
            // Length difference alone is a lower bound on the distance.
            if query_len.abs_diff(key_len) as f64 / longest as f64 >= threshold {
                continue;
            }
            let distance = normalized_distance(query, key);
            if distance < threshold && best.map_or(true, |(_, d)| distance < d) {
                best = Some((*idx, distance));
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("barre", ""), 5);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("simonelle", "simonele"), 1);
    }

    #[test]
    fn test_normalized_distance() {
        assert_eq!(normalized_distance("abc", "abc"), 0.0);
        assert_eq!(normalized_distance("abcd", "abce"), 0.25);
    }

    #[test]
    fn test_closest_under_threshold() {
        let index = FuzzyIndex::new(vec![("anisha".to_string(), 0), ("richard".to_string(), 1)]);
        assert_eq!(index.closest("anlsha", 0.4).map(|(i, _)| i), Some(0));
        assert_eq!(index.closest("rlchard", 0.4).map(|(i, _)| i), Some(1));
        assert_eq!(index.closest("zzzzzz", 0.4), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let index = FuzzyIndex::new(vec![("ab".to_string(), 0)]);
        // distance 1 / 2 = 0.5
        assert!(index.closest("ac", 0.5).is_none());
        assert!(index.closest("ac", 0.51).is_some());
    }
}

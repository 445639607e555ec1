use std::collections::HashMap;

/// Merge tags extracted from the source file with user-supplied tags.
/// The user side is authoritative: on a key conflict the user value wins.
pub fn merge_tags(
    extracted: HashMap<String, String>,
    user: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = extracted;
    merged.extend(user);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_user_values_win_on_conflict() {
        let extracted = map(&[("album", "Old Title"), ("genre", "Podcast")]);
        let user = map(&[("album", "New Title")]);
        let merged = merge_tags(extracted, user);
        assert_eq!(merged["album"], "New Title");
        assert_eq!(merged["genre"], "Podcast");
    }

    #[test]
    fn test_disjoint_keys_are_unioned() {
        let extracted = map(&[("artist", "A. Uthor")]);
        let user = map(&[("date", "2021")]);
        let merged = merge_tags(extracted, user);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty_sides() {
        assert!(merge_tags(HashMap::new(), HashMap::new()).is_empty());
        let user = map(&[("album", "Title")]);
        assert_eq!(merge_tags(HashMap::new(), user.clone()), user);
    }
}

//! Client-side search over an already fetched listing.

use crate::models::CustomerProfile;

/// Keep the profiles where any column, id included, contains `term`
/// case-insensitively. An empty term keeps everything; whitespace is matched
/// like any other text.
pub fn filter_profiles(profiles: &[CustomerProfile], term: &str) -> Vec<CustomerProfile> {
    if term.is_empty() {
        return profiles.to_vec();
    }

    let needle = term.to_lowercase();
    profiles
        .iter()
        .filter(|profile| matches_term(profile, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lowercase.
pub fn matches_term(profile: &CustomerProfile, needle: &str) -> bool {
    profile
        .column_values()
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i64, name: &str, business: &str, email: &str) -> CustomerProfile {
        CustomerProfile {
            id,
            name: name.to_string(),
            business_name: business.to_string(),
            email: email.to_string(),
            phone: String::new(),
            address: "Main St\nSpringfield".to_string(),
            description: String::new(),
        }
    }

    fn sample() -> Vec<CustomerProfile> {
        vec![
            profile(1, "Ada Lovelace", "Engines Ltd", "ada@example.com"),
            profile(2, "Grace Hopper", "Compilers Inc", "grace@navy.mil"),
            profile(13, "Alan Turing", "Bombe Works", "alan@example.org"),
        ]
    }

    #[test]
    fn empty_term_returns_everything() {
        assert_eq!(filter_profiles(&sample(), "").len(), 3);
    }

    #[test]
    fn space_only_matches_rows_containing_a_space() {
        let mut grace = profile(2, "Grace", "Compilers", "grace@navy.mil");
        grace.address = "Arlington".to_string();
        let rows = vec![profile(1, "Ada Lovelace", "Engines", "ada@example.com"), grace];

        let ids: Vec<i64> = filter_profiles(&rows, " ").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let hits = filter_profiles(&sample(), "HOPPER");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn id_column_is_searchable() {
        let ids: Vec<i64> = filter_profiles(&sample(), "1").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 13]);
    }

    #[test]
    fn multi_line_fields_are_searched() {
        assert_eq!(filter_profiles(&sample(), "springfield").len(), 3);
    }

    #[test]
    fn no_match_yields_empty() {
        assert!(filter_profiles(&sample(), "zzz").is_empty());
    }
}

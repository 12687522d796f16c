// src/backend/services/search_service.rs
use crate::error::AcquisitionError;
use crate::models::{
    normalize_user_id, ExistingUser, RelationshipKind, SearchResultView, TreeAttachment,
};

/// Filters `candidates` against a free-text query.
///
/// A candidate matches when the normalized query is a substring of its User ID,
/// or when the query is a case-insensitive substring of "first last". An empty
/// query returns every candidate. Input order is preserved.
pub fn search(query: &str, candidates: &[ExistingUser]) -> Vec<ExistingUser> {
    // Surrounding whitespace is not part of the query: "   " counts as empty
    // and "lovelace " matches "Ada Lovelace".
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.to_vec();
    }
    let id_needle = normalize_user_id(query);

    candidates
        .iter()
        .filter(|candidate| {
            let id_match = !id_needle.is_empty()
                && candidate
                    .user_id
                    .as_ref()
                    .map_or(false, |id| id.contains(&id_needle));
            id_match || candidate.full_name().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub fn render_results(results: &[ExistingUser]) -> Vec<SearchResultView> {
    results.iter().map(SearchResultView::from).collect()
}

/// Turns a picked search result into a tree attachment. A relationship must
/// already be chosen; nothing is looked up before that check passes.
pub fn select_result(
    relationship: Option<RelationshipKind>,
    candidates: &[ExistingUser],
    selected_id: &str,
) -> Result<TreeAttachment, AcquisitionError> {
    let relationship = relationship.ok_or(AcquisitionError::MissingRelationship)?;
    let user = candidates
        .iter()
        .find(|c| c.id == selected_id)
        .ok_or_else(|| AcquisitionError::ResultNotFound(selected_id.to_string()))?;
    Ok(TreeAttachment::ExistingUser {
        existing_user_id: user.id.clone(),
        relationship,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use proptest::prelude::*;

    fn candidate(id: &str, user_id: Option<&str>, first: &str, last: &str) -> ExistingUser {
        ExistingUser {
            id: id.to_string(),
            user_id: user_id.map(UserId::from),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.com", id),
            photo_url: None,
        }
    }

    fn pool() -> Vec<ExistingUser> {
        vec![
            candidate("1", Some("user123abc"), "Ada", "Lovelace"),
            candidate("2", None, "Charles", "Babbage"),
            candidate("3", Some("gracehopper"), "Grace", "Hopper"),
            candidate("4", Some("adaking"), "Augusta", "King"),
        ]
    }

    #[test]
    fn matches_user_id_fragment() {
        let only = vec![candidate("1", Some("user123abc"), "Ada", "Lovelace")];
        assert_eq!(search("123", &only), only);
        assert!(search("zzz", &only).is_empty());
    }

    #[test]
    fn query_is_normalized_for_user_id_matching() {
        let results = search("@User-123", &pool());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1");
    }

    #[test]
    fn matches_full_name_case_insensitively() {
        let results = search("ADA LOVE", &pool());
        assert_eq!(results.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["1"]);

        let results = search("babbage", &pool());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
    }

    #[test]
    fn keeps_input_order_across_both_match_kinds() {
        // "ada" hits #1 by name and #4 by user id.
        let ids: Vec<String> = search("ada", &pool()).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(search(" \t ", &pool()), pool());
        let ids: Vec<String> = search("lovelace ", &pool()).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn punctuation_only_query_matches_names_only() {
        assert!(search("!!", &pool()).is_empty());
    }

    #[test]
    fn selection_requires_relationship() {
        assert_eq!(
            select_result(None, &pool(), "1"),
            Err(AcquisitionError::MissingRelationship)
        );
    }

    #[test]
    fn selection_builds_attachment() {
        assert_eq!(
            select_result(Some(RelationshipKind::Child), &pool(), "3"),
            Ok(TreeAttachment::ExistingUser {
                existing_user_id: "3".to_string(),
                relationship: RelationshipKind::Child,
            })
        );
        assert_eq!(
            select_result(Some(RelationshipKind::Child), &pool(), "99"),
            Err(AcquisitionError::ResultNotFound("99".to_string()))
        );
    }

    #[test]
    fn rendered_results_use_display_identifier() {
        let views = render_results(&pool());
        assert_eq!(views[0].display_identifier, "@user123abc");
        assert_eq!(views[1].display_identifier, "2@example.com");
    }

    proptest! {
        #[test]
        fn prop_empty_query_returns_candidates_unchanged(
            names in proptest::collection::vec(("[a-z]{0,8}", "[A-Za-z]{1,8}", proptest::option::of("[a-z0-9]{1,20}")), 0..12)
        ) {
            let candidates: Vec<ExistingUser> = names
                .iter()
                .enumerate()
                .map(|(i, (first, last, uid))| candidate(&i.to_string(), uid.as_deref(), first, last))
                .collect();
            prop_assert_eq!(search("", &candidates), candidates.clone());
            prop_assert_eq!(search("   ", &candidates), candidates);
        }

        #[test]
        fn prop_results_are_an_ordered_subsequence(query in "[a-z0-9 ]{0,6}") {
            let candidates = pool();
            let results = search(&query, &candidates);
            let positions = results
                .iter()
                .map(|r| candidates.iter().position(|c| c == r).unwrap());
            let mut last = None;
            for pos in positions {
                prop_assert!(last.map_or(true, |l| pos > l));
                last = Some(pos);
            }
            prop_assert_eq!(results.clone(), search(&query, &candidates));
        }
    }
}

//! Positional answer translation.
//!
//! Option lists of the different editions are curated as parallel arrays:
//! option N in one language is the same choice as option N in another. A
//! value is translated by finding its position in the first source list that
//! contains it and reading the target list at that position. If the lists
//! ever drift apart the translation is silently wrong; the form authoring
//! convention owns that invariant, not this code.

use crate::forms::index::QuestionIndex;

/// Render `raw_value` of `question_id` in `target_language`.
///
/// Values not found in any option list (free text, unknown questions) and
/// values whose position does not exist in the target list are returned
/// unchanged.
pub fn translate(
    index: &QuestionIndex,
    question_id: &str,
    raw_value: &str,
    target_language: &str,
) -> String {
    let Some(question) = index.question(question_id) else {
        return raw_value.to_string();
    };

    let position = index.languages().iter().find_map(|language| {
        question
            .options_for(language)
            .iter()
            .position(|option| option == raw_value)
    });

    position
        .and_then(|pos| question.options_for(target_language).get(pos))
        .cloned()
        .unwrap_or_else(|| raw_value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::index::tests::{colour_index, form};
    use proptest::prelude::*;

    // ==================== Positional Mapping Tests ====================

    #[test]
    fn test_french_value_to_english() {
        let index = colour_index();
        assert_eq!(translate(&index, "q_colour", "Vert", "en"), "Green");
    }

    #[test]
    fn test_french_value_to_french_is_identity() {
        let index = colour_index();
        assert_eq!(translate(&index, "q_colour", "Vert", "fr"), "Vert");
    }

    #[test]
    fn test_english_value_to_french() {
        let index = colour_index();
        assert_eq!(translate(&index, "q_colour", "Blue", "fr"), "Bleu");
        assert_eq!(translate(&index, "q_colour", "Red", "fr"), "Rouge");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let index = colour_index();
        assert_eq!(translate(&index, "q_colour", "vert", "en"), "vert");
    }

    #[test]
    fn test_first_source_language_wins() {
        // "Oui" sits at different positions; the English list is searched first
        let en = form("a", &[(Some("q"), "Q", vec!["Oui", "Non"])]);
        let fr = form("b", &[(Some("q"), "Q", vec!["Non", "Oui"])]);
        let index = crate::forms::index::QuestionIndex::build([("en", &en), ("fr", &fr)]);

        assert_eq!(translate(&index, "q", "Oui", "fr"), "Non");
    }

    #[test]
    fn test_diverging_lists_are_mapped_by_position() {
        let en = form("a", &[(Some("q"), "Q", vec!["Small", "Large"])]);
        let fr = form("b", &[(Some("q"), "Q", vec!["Grand", "Petit"])]);
        let index = crate::forms::index::QuestionIndex::build([("en", &en), ("fr", &fr)]);

        assert_eq!(translate(&index, "q", "Small", "fr"), "Grand");
    }

    // ==================== Fallback Tests ====================

    #[test]
    fn test_free_text_passes_through() {
        let index = colour_index();
        assert_eq!(
            translate(&index, "q_comment", "Great course!", "fr"),
            "Great course!"
        );
    }

    #[test]
    fn test_unknown_question_passes_through() {
        let index = colour_index();
        assert_eq!(translate(&index, "q_missing", "Vert", "en"), "Vert");
    }

    #[test]
    fn test_shorter_target_list_passes_through() {
        let en = form("a", &[(Some("q"), "Q", vec!["One", "Two", "Three"])]);
        let fr = form("b", &[(Some("q"), "Q", vec!["Un", "Deux"])]);
        let index = crate::forms::index::QuestionIndex::build([("en", &en), ("fr", &fr)]);

        assert_eq!(translate(&index, "q", "Three", "fr"), "Three");
        assert_eq!(translate(&index, "q", "Two", "fr"), "Deux");
    }

    #[test]
    fn test_unknown_target_language_passes_through() {
        let index = colour_index();
        assert_eq!(translate(&index, "q_colour", "Vert", "de"), "Vert");
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_same_language_round_trip(options in prop::collection::vec("[A-Za-z]{1,6}", 1..8)) {
            let refs: Vec<&str> = options.iter().map(String::as_str).collect();
            let en = form("a", &[(Some("q"), "Q", refs.clone())]);
            let index = crate::forms::index::QuestionIndex::build([("en", &en)]);

            for value in &options {
                prop_assert_eq!(&translate(&index, "q", value, "en"), value);
            }
        }

        #[test]
        fn prop_unknown_value_passes_through(value in "[0-9]{1,10}", target in "(en|fr|de)") {
            // colour_index only holds alphabetic options
            let index = colour_index();
            prop_assert_eq!(translate(&index, "q_colour", &value, &target), value);
        }
    }
}

//! Cross-language question index.
//!
//! Built fresh from the provider's metadata on every request; form content
//! can change between requests, so the index is never cached.

use crate::forms::model::FormMetadata;
use std::collections::BTreeMap;

/// One question as seen across all form editions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormQuestion {
    pub question_id: String,
    /// Title per language code
    pub titles: BTreeMap<String, String>,
    /// Ordered option values per language code; empty for free text
    pub options: BTreeMap<String, Vec<String>>,
}

impl FormQuestion {
    /// Option list for a language. A language whose edition never mentioned
    /// this question has an empty list.
    pub fn options_for(&self, language: &str) -> &[String] {
        self.options
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuestionIndex {
    /// Language codes in the order editions were supplied
    languages: Vec<String>,
    questions: BTreeMap<String, FormQuestion>,
}

impl QuestionIndex {
    /// Index every question of every edition.
    ///
    /// Items without a question identifier (section headers, images, page
    /// breaks) are skipped. The order of `editions` is the source priority
    /// order used by [`crate::forms::translate`].
    pub fn build<'a, I>(editions: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a FormMetadata)>,
    {
        let mut index = QuestionIndex::default();

        for (language, form) in editions {
            if !index.languages.iter().any(|l| l == language) {
                index.languages.push(language.to_string());
            }

            for item in &form.items {
                let Some(question_id) = item.question_id() else {
                    continue;
                };

                let question = index
                    .questions
                    .entry(question_id.to_string())
                    .or_insert_with(|| FormQuestion {
                        question_id: question_id.to_string(),
                        ..FormQuestion::default()
                    });

                question.titles.insert(
                    language.to_string(),
                    item.title.clone().unwrap_or_default(),
                );
                question
                    .options
                    .insert(language.to_string(), item.option_values());
            }
        }

        index
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn question(&self, question_id: &str) -> Option<&FormQuestion> {
        self.questions.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

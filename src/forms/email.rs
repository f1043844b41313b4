//! Locate a respondent's submission by email address.
//!
//! Submissions carry no correlation key, so the only link between a user and
//! their onboarding answers is the email they typed in. Each edition phrases
//! the email question differently; its question id is discovered by title
//! first, then editions are scanned in priority order.

use crate::error::AppError;
use crate::forms::model::{Answer, FormMetadata, RawResponse};
use std::collections::BTreeMap;
use tracing::debug;

/// Email question id per language code, for the editions where one resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailQuestions(BTreeMap<String, String>);

impl EmailQuestions {
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, language: impl Into<String>, question_id: impl Into<String>) {
        self.0.insert(language.into(), question_id.into());
    }
}

/// First match, tagged with the edition it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMatch<'a> {
    pub language: &'a str,
    pub response: &'a RawResponse,
}

/// Find each edition's email question by exact (trimmed) title.
///
/// `known_titles` holds one `(language, title)` pair per edition. Editions
/// without a matching item are left out of the result.
pub fn resolve_email_questions<'a, I>(editions: I, known_titles: &[(&str, &str)]) -> EmailQuestions
where
    I: IntoIterator<Item = (&'a str, &'a FormMetadata)>,
{
    let mut resolved = EmailQuestions::default();

    for (language, form) in editions {
        let Some((_, title)) = known_titles.iter().find(|(code, _)| *code == language) else {
            continue;
        };

        let question_id = form.items.iter().find_map(|item| {
            let item_title = item.title.as_deref()?.trim();
            if item_title == title.trim() {
                item.question_id()
            } else {
                None
            }
        });

        match question_id {
            Some(id) => resolved.insert(language, id),
            None => debug!("No email question titled {:?} in {} edition", title, language),
        }
    }

    resolved
}

/// Return the first response whose email answer equals `target_email`.
///
/// Cohorts are scanned in the order given and responses in their own order;
/// the first hit wins. Comparison ignores case and surrounding whitespace.
///
/// # Errors
/// `AppError::Configuration` when no edition has a resolved email question,
/// which means the forms no longer look the way this service expects.
pub fn find_by_email<'a, I>(
    email_questions: &EmailQuestions,
    cohorts: I,
    target_email: &str,
) -> Result<Option<EmailMatch<'a>>, AppError>
where
    I: IntoIterator<Item = (&'a str, &'a [RawResponse])>,
{
    if email_questions.is_empty() {
        return Err(AppError::Configuration(
            "no email question found in any form edition".to_string(),
        ));
    }

    let target = normalize(target_email);

    for (language, responses) in cohorts {
        let Some(question_id) = email_questions.get(language) else {
            continue;
        };

        let hit = responses.iter().find(|response| {
            response
                .answers
                .get(question_id)
                .is_some_and(|answer| answer_matches(answer, &target))
        });

        if let Some(response) = hit {
            return Ok(Some(EmailMatch { language, response }));
        }
    }

    Ok(None)
}

fn answer_matches(answer: &Answer, target: &str) -> bool {
    answer.values().any(|value| normalize(value) == target)
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

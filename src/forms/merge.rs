//! Merge per-language response cohorts into one display-language collection.

use crate::forms::index::QuestionIndex;
use crate::forms::model::{RawResponse, TextAnswer, TextAnswers, TranslatedAnswer, TranslatedResponse};
use crate::forms::translate::translate;
use std::collections::BTreeMap;

/// Translate and concatenate cohorts.
///
/// Cohorts are emitted in the order given and each cohort keeps its own
/// order, so the output is the first cohort's responses followed by the
/// next one's. Nothing is sorted, dropped or deduplicated.
pub fn merge<'a, I>(index: &QuestionIndex, cohorts: I, target_language: &str) -> Vec<TranslatedResponse>
where
    I: IntoIterator<Item = (&'a str, &'a [RawResponse])>,
{
    cohorts
        .into_iter()
        .flat_map(|(language, responses)| {
            responses
                .iter()
                .map(move |response| translate_response(index, language, response, target_language))
        })
        .collect()
}

/// Translate every answer of one response.
pub fn translate_response(
    index: &QuestionIndex,
    language: &str,
    response: &RawResponse,
    target_language: &str,
) -> TranslatedResponse {
    let answers: BTreeMap<String, TranslatedAnswer> = response
        .answers
        .iter()
        .map(|(question_id, answer)| {
            let answers = answer
                .values()
                .map(|raw| TextAnswer {
                    value: translate(index, question_id, raw, target_language),
                })
                .collect();

            // The map key is authoritative for the echoed id
            let translated = TranslatedAnswer {
                question_id: question_id.clone(),
                text_answers: TextAnswers { answers },
            };

            (question_id.clone(), translated)
        })
        .collect();

    TranslatedResponse {
        form_id: response.form_id.clone(),
        response_id: response.response_id.clone(),
        language: language.to_string(),
        create_time: response.create_time,
        last_submitted_time: response.last_submitted_time.unwrap_or(response.create_time),
        respondent_email: response.respondent_email.clone(),
        answers,
    }
}

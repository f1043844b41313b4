//! Form Provider wire model.
//!
//! Field names follow the provider's camelCase JSON. Unknown fields are kept
//! in `rest` so a metadata document can be handed back to callers verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata document of one form edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMetadata {
    pub form_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<FormInfo>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInfo {
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One entry of a form: a question, a section header, an image, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_item: Option<QuestionItem>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Item {
    /// The question identifier, if this item is a question.
    pub fn question_id(&self) -> Option<&str> {
        self.question_item
            .as_ref()
            .and_then(|q| q.question.question_id.as_deref())
    }

    /// Ordered choice values; empty for free-text questions.
    pub fn option_values(&self) -> Vec<String> {
        self.question_item
            .as_ref()
            .and_then(|q| q.question.choice_question.as_ref())
            .map(|choice| {
                choice
                    .options
                    .iter()
                    .filter_map(|option| option.value.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    pub question: Question,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_question: Option<ChoiceQuestion>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Single-choice (RADIO, DROP_DOWN) or multi-choice (CHECKBOX) question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    /// Absent for the free-form "other" option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One raw submission as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    #[serde(default)]
    pub form_id: String,
    pub response_id: String,
    pub create_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_submitted_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    #[serde(default)]
    pub answers: BTreeMap<String, Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_answers: Option<TextAnswers>,
    /// Dedicated email-typed answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_answer: Option<TextAnswer>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Answer {
    /// Every raw value in submission order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.text_answers
            .iter()
            .flat_map(|t| t.answers.iter())
            .chain(self.email_answer.iter())
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnswers {
    #[serde(default)]
    pub answers: Vec<TextAnswer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnswer {
    #[serde(default)]
    pub value: String,
}

/// A page of the responses listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsesPage {
    #[serde(default)]
    pub responses: Vec<RawResponse>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A submission with every value rendered in one display language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedResponse {
    pub form_id: String,
    pub response_id: String,
    /// Edition the submission came from
    pub language: String,
    pub create_time: DateTime<Utc>,
    pub last_submitted_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    pub answers: BTreeMap<String, TranslatedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedAnswer {
    pub question_id: String,
    pub text_answers: TextAnswers,
}

impl TranslatedAnswer {
    pub fn values(&self) -> Vec<&str> {
        self.text_answers
            .answers
            .iter()
            .map(|a| a.value.as_str())
            .collect()
    }
}

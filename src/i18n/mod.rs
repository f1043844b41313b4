//! Internationalization (i18n) module for form editions.
//!
//! Each questionnaire exists once per language. This module holds the
//! registry of those languages and the validated `Language` type used to
//! pick a display language and to order editions by priority.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::Language;
//!
//! let language = Language::from_code("fr")?;
//! for edition in Language::priority_order() {
//!     println!("{} -> {}", edition.code(), edition.native_name());
//! }
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};

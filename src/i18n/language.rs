//! Validated edition language handle.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};

/// Copyable handle to an enabled entry of the language table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const FRENCH: Language = Language { code: "fr" };

    /// Parse a display language code. Codes are matched exactly, so `EN`
    /// is rejected.
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(entry) if entry.enabled => Ok(Language { code: entry.code }),
            Some(_) => bail!("Form edition '{}' is disabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The primary edition's language.
    pub fn primary() -> Language {
        let config = LanguageRegistry::get().primary();
        Language { code: config.code }
    }

    /// All enabled editions, highest priority first.
    pub fn priority_order() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// # Panics
    /// Only if a constant names a code missing from the language table.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("language constant missing from table")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constants ====================

    #[test]
    fn test_constants_resolve_in_table() {
        assert_eq!(Language::ENGLISH.name(), "English");
        assert!(Language::ENGLISH.config().is_primary);
        assert_eq!(Language::FRENCH.native_name(), "Français");
        assert!(!Language::FRENCH.config().is_primary);
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        assert_eq!(Language::from_code("en").ok(), Some(Language::ENGLISH));
        assert_eq!(Language::from_code("fr").ok(), Some(Language::FRENCH));
    }

    #[test]
    fn test_from_code_rejects_unknown_and_wrong_case() {
        assert!(Language::from_code("es").is_err());
        assert!(Language::from_code("EN").is_err());
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_from_code_error_message() {
        let err = Language::from_code("xx").unwrap_err();
        assert!(err.to_string().contains("Unknown language code"));
    }

    // ==================== Ordering Tests ====================

    #[test]
    fn test_primary_is_first_in_priority() {
        let order = Language::priority_order();
        assert_eq!(order.first(), Some(&Language::primary()));
        assert_eq!(order, vec![Language::ENGLISH, Language::FRENCH]);
    }

    #[test]
    fn test_display_and_serialize_as_code() {
        assert_eq!(Language::FRENCH.to_string(), "fr");
        assert_eq!(
            serde_json::to_string(&Language::ENGLISH).expect("serialize"),
            "\"en\""
        );
    }
}

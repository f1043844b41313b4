//! Form edition languages.
//!
//! Each questionnaire is authored once per language. Entry order here is the
//! priority order: answer translation and email matching both scan editions
//! in it, and config reads one form id per enabled entry.

use std::sync::OnceLock;

/// One edition language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Code used in config keys and the `lang` query parameter
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// Default display language; exactly one entry sets this
    pub is_primary: bool,
    /// Disabled editions are neither configured nor fetched
    pub enabled: bool,
    /// Exact title of the email question in this edition
    pub email_question_title: &'static str,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Enabled editions, highest priority first.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// # Panics
    /// When the table does not mark exactly one edition as primary.
    pub fn primary(&self) -> &LanguageConfig {
        let mut primaries = self.languages.iter().filter(|lang| lang.is_primary);
        match (primaries.next(), primaries.next()) {
            (Some(primary), None) => primary,
            (None, _) => panic!("language table has no primary edition"),
            (Some(_), Some(_)) => panic!("language table has several primary editions"),
        }
    }

    /// `(code, email question title)` per enabled edition, in priority order.
    pub fn email_question_titles(&self) -> Vec<(&'static str, &'static str)> {
        self.list_enabled()
            .into_iter()
            .map(|lang| (lang.code, lang.email_question_title))
            .collect()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_primary: true,
            enabled: true,
            email_question_title: "Email Address",
        },
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            is_primary: false,
            enabled: true,
            email_question_title: "Adresse e-mail",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_singleton() {
        let a = LanguageRegistry::get() as *const LanguageRegistry;
        let b = LanguageRegistry::get() as *const LanguageRegistry;
        assert_eq!(a, b);
    }

    #[test]
    fn test_priority_order_is_english_then_french() {
        let codes: Vec<&str> = LanguageRegistry::get()
            .list_enabled()
            .iter()
            .map(|l| l.code)
            .collect();
        assert_eq!(codes, vec!["en", "fr"]);
    }

    #[test]
    fn test_exactly_one_primary() {
        assert_eq!(LanguageRegistry::get().primary().code, "en");
    }

    #[test]
    fn test_get_by_code() {
        let table = LanguageRegistry::get();
        assert_eq!(table.get_by_code("fr").map(|l| l.name), Some("French"));
        assert!(table.get_by_code("es").is_none());
    }

    #[test]
    fn test_native_names() {
        let table = LanguageRegistry::get();
        assert_eq!(table.get_by_code("en").map(|l| l.native_name), Some("English"));
        assert_eq!(table.get_by_code("fr").map(|l| l.native_name), Some("Français"));
    }

    #[test]
    fn test_email_titles_differ_per_edition() {
        let titles = LanguageRegistry::get().email_question_titles();
        assert_eq!(
            titles,
            vec![("en", "Email Address"), ("fr", "Adresse e-mail")]
        );
    }
}

//! Internationalization (i18n) module.
//!
//! String tables are embedded JSON files with nested keys, looked up with
//! dot notation (`"subscription.prompt"`). A deployment can override a table
//! by dropping `<code>.json` into the configured directory.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::database::models::DEFAULT_LANGUAGE;

/// Supported language codes, in menu order.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ru", "uz"];

pub fn is_supported(lang: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&lang)
}

fn embedded(lang: &str) -> &'static str {
    match lang {
        "ru" => include_str!("ru.json"),
        "uz" => include_str!("uz.json"),
        _ => include_str!("en.json"),
    }
}

/// Loaded string tables: LangCode -> Key -> Text
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<String, Value>,
}

impl Translations {
    /// Embedded tables only.
    pub fn embedded() -> Self {
        let mut tables = HashMap::new();
        for lang in SUPPORTED_LANGUAGES {
            match serde_json::from_str(embedded(lang)) {
                Ok(val) => {
                    tables.insert(lang.to_string(), val);
                }
                Err(e) => warn!("Embedded string table '{}' is malformed: {}", lang, e),
            }
        }
        Self { tables }
    }

    /// Embedded tables, overridden by `<dir>/<code>.json` where present.
    ///
    /// An unreadable or malformed override is logged and ignored.
    pub fn load(dir: &Path) -> Self {
        let mut translations = Self::embedded();

        for lang in SUPPORTED_LANGUAGES {
            let path = dir.join(format!("{}.json", lang));
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Failed to read {}: {}. Using built-in strings.", path.display(), e);
                    continue;
                }
            };

            match serde_json::from_str::<Value>(&raw) {
                Ok(val) if val.is_object() => {
                    info!("Loaded string table override {}", path.display());
                    translations.tables.insert(lang.to_string(), val);
                }
                Ok(_) => warn!("{} is not a JSON object. Using built-in strings.", path.display()),
                Err(e) => warn!("Failed to parse {}: {}. Using built-in strings.", path.display(), e),
            }
        }

        translations
    }

    /// Get text for a key in a specific language.
    ///
    /// Falls back to the default language, then to the key itself.
    pub fn get_text(&self, lang: &str, key: &str) -> String {
        if let Some(text) = self.tables.get(lang).and_then(|val| resolve_key(val, key)) {
            return text;
        }

        if lang != DEFAULT_LANGUAGE
            && let Some(text) = self
                .tables
                .get(DEFAULT_LANGUAGE)
                .and_then(|val| resolve_key(val, key))
        {
            return text;
        }

        warn!("Missing string '{}' for language '{}'", key, lang);
        key.to_string()
    }
}

fn resolve_key(val: &Value, key: &str) -> Option<String> {
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(|s| s.to_string())
}

//! Internationalization (i18n) support
//!
//! Ships with `pt-br` and `en` string tables. A site can override single keys
//! or add languages with YAML files in its `languages/` directory.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN: [(&str, &str); 2] = [
    ("pt-br", include_str!("languages/pt-br.yml")),
    ("en", include_str!("languages/en.yml")),
];

/// Internationalization handler
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler with the built-in tables loaded
    pub fn new(language: &str) -> Self {
        let mut i18n = Self {
            language: normalize_language(language),
            translations: HashMap::new(),
        };
        for (lang, source) in BUILTIN {
            match serde_yaml::from_str(source) {
                Ok(data) => i18n.merge(lang, data),
                Err(e) => tracing::warn!("Built-in language table {} is invalid: {}", lang, e),
            }
        }
        i18n
    }

    /// Load language files from a directory.
    ///
    /// Keys in a file override the same keys of the built-in table.
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }
            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let lang = normalize_language(lang);

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    self.merge(&lang, data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => tracing::warn!("Failed to parse language file {:?}: {}", path, e),
            }
        }

        Ok(())
    }

    fn merge(&mut self, lang: &str, data: HashMap<String, serde_yaml::Value>) {
        self.translations
            .entry(lang.to_string())
            .or_default()
            .extend(data);
    }

    /// Get a translation by key; nested keys use dots like "menu.home"
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language, falling back to the base
    /// language, then English, then the key itself
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        fallback_chain(lang)
            .iter()
            .filter_map(|lang| self.translations.get(lang))
            .find_map(|data| get_nested_value(data, key))
            .map(yaml_value_to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Translation with its `%s` / `%d` placeholder replaced by `value`
    pub fn format(&self, key: &str, value: impl std::fmt::Display) -> String {
        let value = value.to_string();
        self.get(key).replace("%s", &value).replace("%d", &value)
    }

    /// All translations for the current language as a flat map with
    /// dot-notation keys, resolved through the same fallbacks as `get`
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();

        for lang in fallback_chain(&self.language) {
            let Some(data) = self.translations.get(&lang) else {
                continue;
            };
            let mut flat = HashMap::new();
            flatten_translations(data, "", &mut flat);
            for (k, v) in flat {
                result.entry(k).or_insert(v);
            }
        }

        result
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("pt-br")
    }
}

fn normalize_language(lang: &str) -> String {
    lang.trim().to_lowercase().replace('_', "-")
}

/// `pt-br` -> [`pt-br`, `pt`, `en`]
fn fallback_chain(lang: &str) -> Vec<String> {
    let lang = normalize_language(lang);
    let base = lang.split_once('-').map(|(base, _)| base.to_string());
    let mut chain = vec![lang];
    chain.extend(base);
    if !chain.iter().any(|l| l == "en") {
        chain.push("en".to_string());
    }
    chain
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        current = current?.as_mapping()?.get(part);
    }

    current
}

fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        flatten_value(value, &join_key(prefix, key), result);
    }
}

fn flatten_value(value: &serde_yaml::Value, key: &str, result: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                if let Some(k) = k.as_str() {
                    flatten_value(v, &join_key(key, k), result);
                }
            }
        }
        serde_yaml::Value::String(_) | serde_yaml::Value::Number(_) | serde_yaml::Value::Bool(_) => {
            result.insert(key.to_string(), yaml_value_to_string(value));
        }
        _ => {}
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

//! Three-tier settings lookup: language override, group value, absent.

use std::collections::BTreeMap;

use super::store::SettingsStore;
use super::value::{Resolved, SettingValue};

/// Resolves keys of a settings group against a store.
///
/// Nothing is cached; build a resolver per render so that edits to the
/// settings file show up on the next update.
#[derive(Debug, Clone, Copy)]
pub struct SettingsResolver<'a> {
    store: &'a SettingsStore,
    language: Option<&'a str>,
}

impl<'a> SettingsResolver<'a> {
    /// `language` is the active editor's language id, if an editor is active.
    pub fn new(store: &'a SettingsStore, language: Option<&'a str>) -> Self {
        Self { store, language }
    }

    /// Resolve a single `key` of `group`.
    pub fn resolve_key(&self, group: &str, key: &str) -> Resolved {
        let qualified = format!("{}.{}", group, key);

        if let Some(language) = self.language
            && let Some(value) = self.store.language_override(language, &qualified)
        {
            return Resolved::LanguageOverride(value.clone());
        }

        match self.store.get(&qualified) {
            Some(value) => Resolved::GroupDefault(value.clone()),
            None => Resolved::Absent,
        }
    }

    /// Resolve every key in `keys`. The result has exactly one entry per key.
    pub fn resolve(&self, group: &str, keys: &[&str]) -> ResolvedSettings {
        let entries = keys
            .iter()
            .map(|key| (key.to_string(), self.resolve_key(group, key)))
            .collect();
        ResolvedSettings { entries }
    }
}

/// Resolved values keyed by the names they were requested under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSettings {
    entries: BTreeMap<String, Resolved>,
}

impl ResolvedSettings {
    pub fn get(&self, key: &str) -> &Resolved {
        static ABSENT: Resolved = Resolved::Absent;
        self.entries.get(key).unwrap_or(&ABSENT)
    }

    pub fn value(&self, key: &str) -> Option<&SettingValue> {
        self.get(key).value()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resolved)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rename every key to its bare form (see [`strip_legacy_prefix`]).
    ///
    /// Two keys that share a bare name indicate a broken key list; the later
    /// one in key order wins and the clash is logged.
    pub fn into_bare(self) -> ResolvedSettings {
        let mut entries = BTreeMap::new();
        for (key, value) in self.entries {
            let bare = strip_legacy_prefix(&key).to_string();
            if entries.insert(bare.clone(), value).is_some() {
                log::error!("Settings key '{}' collides with another key after prefix stripping", bare);
            }
        }
        ResolvedSettings { entries }
    }
}

/// Drop everything up to and including the first `.`.
///
/// `container.boxShadow` -> `boxShadow`; keys without a dot are unchanged.
pub fn strip_legacy_prefix(key: &str) -> &str {
    match key.find('.') {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SettingsStore {
        let mut store = SettingsStore::new();
        store
            .set("editor.tabSize", 4)
            .set("editor.fontLigatures", false)
            .set("codeframe.container.boxShadow", "none")
            .set_language_override("rust", "editor.tabSize", 2)
            .set_language_override("rust", "codeframe.container.showWindowTitle", true);
        store
    }

    #[test]
    fn test_language_override_wins() {
        let store = store();
        let resolver = SettingsResolver::new(&store, Some("rust"));
        assert_eq!(
            resolver.resolve_key("editor", "tabSize"),
            Resolved::LanguageOverride(SettingValue::Number(2.0))
        );
    }

    #[test]
    fn test_falls_back_to_group_value() {
        let store = store();
        let resolver = SettingsResolver::new(&store, Some("rust"));
        assert_eq!(
            resolver.resolve_key("editor", "fontLigatures"),
            Resolved::GroupDefault(SettingValue::Bool(false))
        );
    }

    #[test]
    fn test_no_language_skips_overrides() {
        let store = store();
        let resolver = SettingsResolver::new(&store, None);
        assert_eq!(
            resolver.resolve_key("editor", "tabSize"),
            Resolved::GroupDefault(SettingValue::Number(4.0))
        );
        assert_eq!(
            resolver.resolve_key("codeframe", "container.showWindowTitle"),
            Resolved::Absent
        );
    }

    #[test]
    fn test_other_language_ignores_rust_section() {
        let store = store();
        let resolver = SettingsResolver::new(&store, Some("python"));
        assert_eq!(
            resolver.resolve_key("editor", "tabSize"),
            Resolved::GroupDefault(SettingValue::Number(4.0))
        );
    }

    #[test]
    fn test_resolve_returns_one_entry_per_key() {
        let store = store();
        let resolver = SettingsResolver::new(&store, Some("rust"));
        let keys = ["tabSize", "fontLigatures", "wordWrap", "cursorStyle"];
        let resolved = resolver.resolve("editor", &keys);
        assert_eq!(resolved.len(), keys.len());
        assert!(resolved.get("wordWrap").is_absent());
        assert!(resolved.get("cursorStyle").is_absent());
    }

    #[test]
    fn test_resolve_empty_store_is_all_absent() {
        let store = SettingsStore::new();
        let resolver = SettingsResolver::new(&store, Some("rust"));
        let resolved = resolver.resolve("codeframe", &["a.b", "c"]);
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|(_, v)| v.is_absent()));
    }

    #[test]
    fn test_strip_legacy_prefix() {
        assert_eq!(strip_legacy_prefix("container.boxShadow"), "boxShadow");
        assert_eq!(strip_legacy_prefix("tabSize"), "tabSize");
        assert_eq!(strip_legacy_prefix("a.b.c"), "b.c");
    }

    #[test]
    fn test_into_bare_renames_keys() {
        let store = store();
        let resolver = SettingsResolver::new(&store, Some("rust"));
        let bare = resolver
            .resolve("codeframe", &["container.boxShadow", "container.showWindowTitle"])
            .into_bare();
        assert_eq!(bare.value("boxShadow"), Some(&SettingValue::from("none")));
        assert_eq!(bare.value("showWindowTitle"), Some(&SettingValue::Bool(true)));
        assert!(bare.get("container.boxShadow").is_absent());
    }
}

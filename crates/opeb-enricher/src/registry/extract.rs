//! Declarative link extraction from registry entries.

use serde_json::Value;

/// A declarative, recursively nested map describing which JSON fields to
/// collect as links.
///
/// Each key maps either to a nested spec ("descend into the object under
/// this key") or to a terminal marker ("collect string or list-of-strings
/// values here"). Key insertion order is preserved so extraction is
/// deterministic: depth-first, in spec-key order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    entries: Vec<(String, Option<FeatureSpec>)>,
}

impl FeatureSpec {
    /// An empty spec; combine with [`terminal`](Self::terminal) and
    /// [`nested`](Self::nested).
    #[must_use]
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add a terminal key: string or list-of-strings values under it are
    /// collected.
    #[must_use]
    pub fn terminal(mut self, key: impl Into<String>) -> Self {
        self.entries.push((key.into(), None));
        self
    }

    /// Add a nested key: extraction descends into the object under it with
    /// the given sub-spec.
    #[must_use]
    pub fn nested(mut self, key: impl Into<String>, sub: FeatureSpec) -> Self {
        self.entries.push((key.into(), Some(sub)));
        self
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl Default for FeatureSpec {
    /// The OpenEBench feature map: every place the registry is known to hold
    /// link-like fields.
    fn default() -> Self {
        FeatureSpec::empty()
            .nested(
                "documentation",
                FeatureSpec::empty().terminal("general").terminal("manual"),
            )
            .nested(
                "distributions",
                FeatureSpec::empty()
                    .terminal("source_packages")
                    .terminal("binary_packages")
                    .terminal("sourcecode")
                    .terminal("binaries"),
            )
            .nested("web", FeatureSpec::empty().terminal("homepage"))
            .terminal("homepage")
            .terminal("repositories")
    }
}

/// Collect every link-like string from `entry` according to `spec`.
///
/// For each spec key present in the entry: a nested sub-spec descends into
/// object values, a terminal key collects non-empty strings (directly or
/// from list elements). Anything else, including numbers, nulls, empty
/// strings, and non-string list elements, is silently skipped. Never fails
/// on well-formed JSON input; duplicates are kept.
#[must_use]
pub fn extract_links(entry: &Value, spec: &FeatureSpec) -> Vec<String> {
    let mut links = Vec::new();
    let Some(object) = entry.as_object() else {
        return links;
    };

    for (key, sub) in &spec.entries {
        let Some(value) = object.get(key) else {
            continue;
        };

        match sub {
            Some(sub_spec) => {
                if value.is_object() {
                    links.extend(extract_links(value, sub_spec));
                }
            }
            None => match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(s) = item.as_str() {
                            if !s.is_empty() {
                                links.push(s.to_string());
                            }
                        }
                    }
                }
                Value::String(s) if !s.is_empty() => links.push(s.clone()),
                _ => {}
            },
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn documented_example_entry() {
        let entry = json!({
            "@id": "tool:1",
            "web": {"homepage": "https://github.com/x/y"}
        });
        let links = extract_links(&entry, &FeatureSpec::default());
        assert_eq!(links, vec!["https://github.com/x/y"]);
    }

    #[test]
    fn collects_in_depth_first_spec_key_order() {
        let spec = FeatureSpec::empty()
            .nested(
                "docs",
                FeatureSpec::empty().terminal("general").terminal("manual"),
            )
            .terminal("homepage");

        let entry = json!({
            "homepage": "https://example.org",
            "docs": {
                "manual": "https://example.org/manual",
                "general": "https://example.org/docs"
            }
        });

        let links = extract_links(&entry, &spec);
        assert_eq!(
            links,
            vec![
                "https://example.org/docs",
                "https://example.org/manual",
                "https://example.org"
            ]
        );
    }

    #[test]
    fn collects_list_elements_that_are_non_empty_strings() {
        let spec = FeatureSpec::empty().terminal("repositories");
        let entry = json!({
            "repositories": ["https://a", "", 42, null, "https://b", ["nested"]]
        });
        assert_eq!(extract_links(&entry, &spec), vec!["https://a", "https://b"]);
    }

    #[test]
    fn skips_wrong_typed_values_silently() {
        let spec = FeatureSpec::default();
        let entry = json!({
            "homepage": 17,
            "repositories": {"not": "a list"},
            "web": "not an object",
            "documentation": {"general": null, "manual": ""}
        });
        assert!(extract_links(&entry, &spec).is_empty());
    }

    #[test]
    fn keys_absent_from_the_entry_are_ignored() {
        let entry = json!({"unrelated": "https://nope"});
        assert!(extract_links(&entry, &FeatureSpec::default()).is_empty());
    }

    #[test]
    fn non_object_entry_yields_nothing() {
        let spec = FeatureSpec::default();
        assert!(extract_links(&json!("just a string"), &spec).is_empty());
        assert!(extract_links(&json!([1, 2, 3]), &spec).is_empty());
        assert!(extract_links(&Value::Null, &spec).is_empty());
    }

    #[test]
    fn duplicates_are_permitted() {
        let spec = FeatureSpec::empty().terminal("homepage").terminal("mirror");
        let entry = json!({
            "homepage": "https://same",
            "mirror": "https://same"
        });
        assert_eq!(extract_links(&entry, &spec), vec!["https://same", "https://same"]);
    }

    #[test]
    fn default_spec_keys_match_the_documented_feature_map() {
        let spec = FeatureSpec::default();
        let keys: Vec<&str> = spec.keys().collect();
        assert_eq!(
            keys,
            vec![
                "documentation",
                "distributions",
                "web",
                "homepage",
                "repositories"
            ]
        );
    }
}

//! Pattern associations.
//!
//! # Responsibilities
//! - Apply an ordered `{pattern → value}` map to a URL, deep-merging the
//!   values of every matching pattern
//! - Rewrite URLs through alias patterns
//! - Answer whether any URL under a prefix could match a pattern
//!
//! # Design Decisions
//! - Entries keep declaration order; later matches merge over earlier ones
//! - Deep merge: object-vs-object merges key by key, anything else overwrites

use serde_json::Value;

use crate::pattern::resource::ResourcePattern;

/// Ordered `{pattern → value}` associations.
#[derive(Debug, Clone, Default)]
pub struct AssociationResolver {
    entries: Vec<(ResourcePattern, Value)>,
}

impl AssociationResolver {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(pattern, value)| (ResourcePattern::compile(pattern.as_ref()), value))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deep-merged value of every entry whose pattern matches `url`, or
    /// `None` when nothing matched.
    pub fn resolve(&self, url: &str) -> Option<Value> {
        self.entries
            .iter()
            .filter(|(pattern, _)| pattern.matches(url).is_some())
            .fold(None, |merged, (_, value)| match merged {
                None => Some(value.clone()),
                Some(mut acc) => {
                    deep_merge(&mut acc, value);
                    Some(acc)
                }
            })
    }

    /// Whether any entry could match a URL beginning with `prefix`.
    pub fn could_match_under(&self, prefix: &str) -> bool {
        self.entries
            .iter()
            .any(|(pattern, _)| pattern.could_match_under(prefix))
    }
}

/// Merge `overlay` into `base`.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                deep_merge(base.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Alias rewriting: the first alias whose source matches is rendered through
/// its target with the captured values.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: Vec<(ResourcePattern, ResourcePattern)>,
}

impl AliasTable {
    pub fn new<I, S, T>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(from, to)| {
                    (
                        ResourcePattern::compile(from.as_ref()),
                        ResourcePattern::compile(to.as_ref()),
                    )
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Rewritten URL, or `None` when no alias applies (or the target needs a
    /// value the source did not capture or cannot hold).
    pub fn rewrite(&self, url: &str) -> Option<String> {
        self.aliases.iter().find_map(|(from, to)| {
            let captures = from.matches(url)?;
            match to.generate(&captures) {
                Ok(rewritten) => Some(rewritten),
                Err(e) => {
                    tracing::warn!(alias = %from, target = %to, error = %e, "Alias target could not be rendered");
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_deep_merges_in_order() {
        let resolver = AssociationResolver::new([
            ("/**", json!({"cache": {"public": true, "max_age": 60}, "tags": ["all"]})),
            ("/static/**", json!({"cache": {"max_age": 3600}, "tags": ["static"]})),
            ("/api/**", json!({"cache": {"public": false}})),
        ]);

        let value = resolver.resolve("/static/site.css").unwrap();
        assert_eq!(
            value,
            json!({"cache": {"public": true, "max_age": 3600}, "tags": ["static"]})
        );

        assert!(AssociationResolver::new([("/api/**", json!(1))])
            .resolve("/web")
            .is_none());
    }

    #[test]
    fn test_scalar_overwrites_object() {
        let mut base = json!({"a": {"b": 1}});
        deep_merge(&mut base, &json!({"a": 2}));
        assert_eq!(base, json!({"a": 2}));
    }

    #[test]
    fn test_could_match_under() {
        let resolver = AssociationResolver::new([("/docs/:section/intro", json!(true))]);
        assert!(resolver.could_match_under("/docs/"));
        assert!(!resolver.could_match_under("/blog/"));
    }

    #[test]
    fn test_alias_rewrite() {
        let aliases = AliasTable::new([
            ("/old/:id", "/items/:id"),
            ("/legacy/**", "/archive/**"),
            ("/broken/:id", "/x/:missing"),
            ("/flat/**", "/one/*"),
        ]);
        assert_eq!(aliases.rewrite("/old/7").as_deref(), Some("/items/7"));
        assert_eq!(
            aliases.rewrite("/legacy/2019/a.html").as_deref(),
            Some("/archive/2019/a.html")
        );
        assert_eq!(aliases.rewrite("/broken/1"), None);
        assert_eq!(aliases.rewrite("/new"), None);
        // a single-segment target cannot take a nested capture
        assert_eq!(aliases.rewrite("/flat/a").as_deref(), Some("/one/a"));
        assert_eq!(aliases.rewrite("/flat/a/b"), None);
    }
}

use serde_json::{Map, Value};

use crate::error::{Error, Result};

// Look up a single literal key. Anything that is not an object has no keys.
pub fn lookup<'a>(ctx: &'a Value, key: &str) -> Option<&'a Value> {
    ctx.as_object().and_then(|obj| obj.get(key))
}

/// Walk a dotted path such as `site.url`, one object lookup per segment,
/// starting from the context root.
pub fn lookup_path<'a>(ctx: &'a Value, path: &str) -> Result<&'a Value> {
    path.split('.').try_fold(ctx, |current, segment| {
        if !current.is_object() {
            return Err(Error::NotTraversable {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }

        lookup(current, segment).ok_or_else(|| Error::MissingKey {
            path: path.to_string(),
            segment: segment.to_string(),
        })
    })
}

// Text form of a scalar, as a template would print it.
pub fn stringify(value: &Value, path: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(Error::NotScalar {
            path: path.to_string(),
        }),
    }
}

/// Set `value` at a dotted path, creating intermediate objects as needed.
/// Intermediates that are not objects get replaced.
pub fn assign(ctx: &mut Value, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = ctx;

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }

        let Value::Object(obj) = current else {
            unreachable!()
        };

        if segments.peek().is_none() {
            obj.insert(segment.to_string(), value);
            return;
        }

        current = obj
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_path_nested() {
        let ctx = json!({"site": {"url": "https://x.io"}});
        let value = lookup_path(&ctx, "site.url").unwrap();
        assert_eq!(value, "https://x.io");
    }

    #[test]
    fn test_lookup_path_missing_key() {
        let ctx = json!({"site": {}});
        let err = lookup_path(&ctx, "site.url").unwrap_err();

        let Error::MissingKey { path, segment } = err else {
            panic!("Expected MissingKey, got {err:?}")
        };
        assert_eq!(path, "site.url");
        assert_eq!(segment, "url");
    }

    #[test]
    fn test_lookup_path_missing_root() {
        let ctx = json!({});
        assert!(matches!(
            lookup_path(&ctx, "site.url"),
            Err(Error::MissingKey { segment, .. }) if segment == "site"
        ));
    }

    #[test]
    fn test_lookup_path_through_scalar() {
        let ctx = json!({"site": "https://x.io"});
        assert!(matches!(
            lookup_path(&ctx, "site.url"),
            Err(Error::NotTraversable { segment, .. }) if segment == "url"
        ));
    }

    #[test]
    fn test_lookup_path_through_array() {
        let ctx = json!({"site": [{"url": "https://x.io"}]});
        assert!(matches!(
            lookup_path(&ctx, "site.url"),
            Err(Error::NotTraversable { .. })
        ));
    }

    #[test]
    fn test_lookup_is_literal() {
        let ctx = json!({"page.url": "/a", "page": {"url": "/b"}});
        assert_eq!(lookup(&ctx, "page.url").unwrap(), "/a");
        assert_eq!(lookup_path(&ctx, "page.url").unwrap(), "/b");
    }

    #[test]
    fn test_lookup_on_non_object() {
        assert!(lookup(&json!("text"), "key").is_none());
        assert!(lookup(&json!(null), "key").is_none());
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("/posts/1"), "k").unwrap(), "/posts/1");
        assert_eq!(stringify(&json!(42), "k").unwrap(), "42");
        assert_eq!(stringify(&json!(true), "k").unwrap(), "true");
        assert!(matches!(
            stringify(&json!(null), "k"),
            Err(Error::NotScalar { .. })
        ));
        assert!(matches!(
            stringify(&json!({"a": 1}), "k"),
            Err(Error::NotScalar { .. })
        ));
    }

    #[test]
    fn test_assign_creates_objects() {
        let mut ctx = json!({});
        assign(&mut ctx, "site.url", json!("https://x.io"));
        assign(&mut ctx, "site.title", json!("X"));
        assert_eq!(ctx, json!({"site": {"url": "https://x.io", "title": "X"}}));
    }

    #[test]
    fn test_assign_replaces_scalars() {
        let mut ctx = json!({"site": "old"});
        assign(&mut ctx, "site.url", json!("https://x.io"));
        assert_eq!(ctx["site"]["url"], "https://x.io");
    }

    #[test]
    fn test_assign_top_level() {
        let mut ctx = json!(null);
        assign(&mut ctx, "url", json!("/a"));
        assert_eq!(ctx, json!({"url": "/a"}));
    }
}

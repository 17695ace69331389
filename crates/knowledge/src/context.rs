//! Normalization of index search results into prompt contexts.
//!
//! Index services return items in one of three shapes. Each item is
//! classified once into a `ResultItem` variant, then converted; items that
//! carry no text are dropped.

use crate::types::{Context, INDEX_SOURCE};
use serde_json::{Map, Value};

/// Keys probed, in order, inside a nested `document` object.
const DOCUMENT_TEXT_KEYS: [&str; 3] = ["text", "content", "body"];

/// One search result item, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultItem<'a> {
    /// `{"text": "...", "meta": {"source": ...}}`
    TextField {
        text: &'a str,
        source: Option<String>,
    },
    /// `{"content": "...", "source": ...}`
    ContentField {
        content: &'a str,
        source: Option<String>,
    },
    /// `{"document": {"text" | "content" | "body": "...", "source": ...}}`
    DocumentField {
        text: Option<&'a str>,
        source: Option<String>,
    },
    Unrecognized,
}

impl<'a> ResultItem<'a> {
    /// Classify an item. Earlier shapes win when several keys are present.
    pub fn classify(item: &'a Value) -> Self {
        let Some(obj) = item.as_object() else {
            return Self::Unrecognized;
        };

        if let Some(text) = obj.get("text").and_then(Value::as_str) {
            let source = obj
                .get("meta")
                .and_then(Value::as_object)
                .and_then(|meta| meta.get("source"))
                .and_then(source_label);
            return Self::TextField { text, source };
        }

        if let Some(content) = obj.get("content").and_then(Value::as_str) {
            let source = obj.get("source").and_then(source_label);
            return Self::ContentField { content, source };
        }

        if let Some(document) = obj.get("document").and_then(Value::as_object) {
            return Self::DocumentField {
                text: document_text(document),
                source: document.get("source").and_then(source_label),
            };
        }

        Self::Unrecognized
    }

    /// Convert into a context; `None` when the item has no usable text.
    pub fn into_context(self) -> Option<Context> {
        let (text, source) = match self {
            Self::TextField { text, source } => (text, source),
            Self::ContentField { content, source } => (content, source),
            Self::DocumentField {
                text: Some(text),
                source,
            } => (text, source),
            Self::DocumentField { text: None, .. } | Self::Unrecognized => return None,
        };

        if text.is_empty() {
            return None;
        }

        Some(Context::new(
            text,
            source.unwrap_or_else(|| INDEX_SOURCE.to_string()),
        ))
    }
}

fn document_text(document: &Map<String, Value>) -> Option<&str> {
    DOCUMENT_TEXT_KEYS
        .iter()
        .find_map(|key| document.get(*key).and_then(Value::as_str))
}

/// Render a source value as a label. Strings and scalars qualify; null,
/// empty strings and containers do not.
fn source_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extract contexts from a search result.
///
/// Only `{"results": [...]}` is understood; any other payload yields no
/// contexts. Input order is preserved and missing sources become `"index"`.
pub fn normalize(search_result: &Value) -> Vec<Context> {
    let Some(items) = search_result.get("results").and_then(Value::as_array) else {
        tracing::debug!("Search result has no `results` array; no index contexts");
        return Vec::new();
    };

    let contexts: Vec<Context> = items
        .iter()
        .filter_map(|item| ResultItem::classify(item).into_context())
        .collect();

    tracing::debug!(
        "Normalized {} of {} search result items",
        contexts.len(),
        items.len()
    );

    contexts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_three_shapes_and_malformed_item() {
        let result = json!({
            "results": [
                {"text": "from text", "meta": {"source": "a.pdf"}},
                {"content": "from content", "source": "b.html"},
                {"score": 0.3},
                {"document": {"body": "from body", "source": "c.csv"}}
            ]
        });

        let contexts = normalize(&result);
        assert_eq!(
            contexts,
            vec![
                Context::new("from text", "a.pdf"),
                Context::new("from content", "b.html"),
                Context::new("from body", "c.csv"),
            ]
        );
    }

    #[test]
    fn test_missing_sources_default_to_index() {
        let result = json!({
            "results": [
                {"text": "no meta"},
                {"text": "meta not a map", "meta": "x"},
                {"content": "no source"},
                {"document": {"content": "doc no source"}}
            ]
        });

        let contexts = normalize(&result);
        assert_eq!(contexts.len(), 4);
        assert!(contexts.iter().all(|c| c.source == "index"));
    }

    #[test]
    fn test_text_priority_over_content() {
        let item = json!({"text": "t", "content": "c", "source": "ignored"});
        assert_eq!(
            ResultItem::classify(&item),
            ResultItem::TextField {
                text: "t",
                source: None
            }
        );
    }

    #[test]
    fn test_non_string_text_falls_through_to_content() {
        let item = json!({"text": 5, "content": "c", "source": "s"});
        assert_eq!(
            ResultItem::classify(&item).into_context(),
            Some(Context::new("c", "s"))
        );
    }

    #[test]
    fn test_document_key_priority() {
        let item = json!({"document": {"body": "b", "content": "c", "text": 1}});
        assert_eq!(
            ResultItem::classify(&item).into_context(),
            Some(Context::new("c", "index"))
        );
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let result = json!({"results": [{"text": ""}, {"content": "", "source": "s"}]});
        assert!(normalize(&result).is_empty());
    }

    #[test]
    fn test_document_without_text_is_skipped() {
        let item = json!({"document": {"title": "no text"}});
        assert_eq!(ResultItem::classify(&item).into_context(), None);
    }

    #[test]
    fn test_invalid_payloads() {
        assert!(normalize(&json!([{"text": "a"}])).is_empty());
        assert!(normalize(&json!({"results": "nope"})).is_empty());
        assert!(normalize(&json!({"data": []})).is_empty());
        assert!(normalize(&json!("text")).is_empty());
        assert!(normalize(&json!({"results": ["plain", 3, null]})).is_empty());
    }

    #[test]
    fn test_numeric_source_is_rendered() {
        let result = json!({"results": [{"content": "c", "source": 42}]});
        assert_eq!(normalize(&result), vec![Context::new("c", "42")]);
    }
}

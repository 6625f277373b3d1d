//! Tagged view over a parsed JSON document.

use serde_json::{Map, Number, Value};

/// A JSON leaf value that is neither null nor a container.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Display form used by card and table views: strings are quoted, the rest verbatim.
    pub fn display(&self) -> String {
        match self {
            Scalar::String(s) => format!("\"{s}\""),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Shape of a JSON node, as shown on card badges and table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Null,
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
        }
    }
}

/// A JSON document as an explicit tagged union.
///
/// Object entries keep their document order.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    Null,
    Scalar(Scalar),
    Array(Vec<JsonNode>),
    Object(Vec<(String, JsonNode)>),
}

impl JsonNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            JsonNode::Null => NodeKind::Null,
            JsonNode::Scalar(Scalar::String(_)) => NodeKind::String,
            JsonNode::Scalar(Scalar::Number(_)) => NodeKind::Number,
            JsonNode::Scalar(Scalar::Bool(_)) => NodeKind::Boolean,
            JsonNode::Array(_) => NodeKind::Array,
            JsonNode::Object(_) => NodeKind::Object,
        }
    }

    /// Container badge, `Array[n]` or `Object{n}`. Leaves have none.
    pub fn badge(&self) -> Option<String> {
        match self {
            JsonNode::Array(items) => Some(format!("Array[{}]", items.len())),
            JsonNode::Object(entries) => Some(format!("Object{{{}}}", entries.len())),
            JsonNode::Null | JsonNode::Scalar(_) => None,
        }
    }

    /// One-line summary: the badge for containers, the display form for leaves.
    pub fn summary(&self) -> String {
        match self {
            JsonNode::Null => "null".to_string(),
            JsonNode::Scalar(scalar) => scalar.display(),
            JsonNode::Array(_) | JsonNode::Object(_) => self.badge().unwrap_or_default(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, JsonNode::Array(_) | JsonNode::Object(_))
    }
}

impl From<&Value> for JsonNode {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => JsonNode::Null,
            Value::Bool(b) => JsonNode::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => JsonNode::Scalar(Scalar::Number(n.clone())),
            Value::String(s) => JsonNode::Scalar(Scalar::String(s.clone())),
            Value::Array(items) => JsonNode::Array(items.iter().map(JsonNode::from).collect()),
            Value::Object(map) => JsonNode::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), JsonNode::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for JsonNode {
    fn from(value: Value) -> Self {
        JsonNode::from(&value)
    }
}

impl From<JsonNode> for Value {
    fn from(node: JsonNode) -> Self {
        match node {
            JsonNode::Null => Value::Null,
            JsonNode::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            JsonNode::Scalar(Scalar::Number(n)) => Value::Number(n),
            JsonNode::Scalar(Scalar::String(s)) => Value::String(s),
            JsonNode::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonNode::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, node)| (key, Value::from(node)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn badges_describe_container_sizes() {
        let node = JsonNode::from(json!({"a": [1, 2, 3], "b": {"c": null}}));
        assert_eq!(node.badge().as_deref(), Some("Object{2}"));

        let JsonNode::Object(entries) = &node else {
            panic!("expected object root");
        };
        assert_eq!(entries[0].1.badge().as_deref(), Some("Array[3]"));
        assert_eq!(entries[1].1.summary(), "Object{1}");
    }

    #[test]
    fn object_order_survives_conversion() {
        let value = json!({"zeta": 1, "alpha": 2, "mid": 3});
        let node = JsonNode::from(&value);
        let JsonNode::Object(entries) = &node else {
            panic!("expected object root");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(Value::from(node), value);
    }

    #[test]
    fn scalar_display_quotes_strings_only() {
        assert_eq!(JsonNode::from(json!("hi")).summary(), "\"hi\"");
        assert_eq!(JsonNode::from(json!(4.5)).summary(), "4.5");
        assert_eq!(JsonNode::from(json!(false)).summary(), "false");
        assert_eq!(JsonNode::from(json!(null)).kind(), NodeKind::Null);
    }
}

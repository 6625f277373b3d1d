//! View models over a parsed document: cards, a flattened table, patient summaries.

use crate::constants::CARD_PREVIEW_LIMIT;
use crate::time::format_date;
use jsonviz_types::{JsonNode, NodeKind};
use records::PatientRecord;
use serde::Serialize;
use serde_json::Value;

/// One card of the card view.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub title: String,
    pub key: String,
    pub kind: NodeKind,
    /// `Array[n]`, `Object{n}`, or the kind name for leaves.
    pub badge: String,
    /// Display form of a leaf card's value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub entries: Vec<CardEntry>,
    /// Entries not previewed.
    pub more: usize,
}

/// A previewed child of a container card. Nested containers show their badge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardEntry {
    pub label: String,
    pub value: String,
}

/// One leaf of the flattened table view.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Path such as `patients[0].name`.
    pub key: String,
    pub kind: NodeKind,
    pub value: Value,
    pub display: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub index: usize,
    pub date: String,
    pub points: usize,
    pub notes: usize,
    pub truncated: bool,
}

/// Patient list entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    pub test_count: usize,
    pub tests: Vec<TestSummary>,
}

/// One card per top-level key of an object root, or per item of an array root.
/// A leaf root yields a single `value` card.
pub fn cards(root: &JsonNode) -> Vec<Card> {
    match root {
        JsonNode::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| card(format!("Item {i}"), format!("[{i}]"), item))
            .collect(),
        JsonNode::Object(entries) => entries
            .iter()
            .map(|(key, value)| card(key.clone(), key.clone(), value))
            .collect(),
        JsonNode::Null => Vec::new(),
        leaf @ JsonNode::Scalar(_) => vec![card("value".into(), "value".into(), leaf)],
    }
}

fn card(title: String, key: String, node: &JsonNode) -> Card {
    let kind = node.kind();
    let badge = node.badge().unwrap_or_else(|| kind.as_str().to_string());

    let children: Vec<CardEntry> = match node {
        JsonNode::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| CardEntry {
                label: format!("[{i}]"),
                value: item.summary(),
            })
            .collect(),
        JsonNode::Object(entries) => entries
            .iter()
            .map(|(key, value)| CardEntry {
                label: key.clone(),
                value: value.summary(),
            })
            .collect(),
        JsonNode::Null | JsonNode::Scalar(_) => Vec::new(),
    };

    let more = children.len().saturating_sub(CARD_PREVIEW_LIMIT);
    let entries = children.into_iter().take(CARD_PREVIEW_LIMIT).collect();
    let value = (!node.is_container()).then(|| node.summary());

    Card {
        title,
        key,
        kind,
        badge,
        value,
        entries,
        more,
    }
}

/// Flatten a document into leaf rows keyed by dotted/bracketed paths.
///
/// Empty containers produce no rows. A null root yields nothing; any other leaf root
/// yields a single row keyed `value`.
pub fn flatten(root: &JsonNode) -> Vec<TableRow> {
    let mut rows = Vec::new();
    match root {
        JsonNode::Null => {}
        JsonNode::Scalar(_) => rows.push(row("value".into(), root)),
        _ => flatten_into(root, "", &mut rows),
    }
    rows
}

fn flatten_into(node: &JsonNode, prefix: &str, rows: &mut Vec<TableRow>) {
    match node {
        JsonNode::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let key = format!("{prefix}[{i}]");
                if item.is_container() {
                    flatten_into(item, &key, rows);
                } else {
                    rows.push(row(key, item));
                }
            }
        }
        JsonNode::Object(entries) => {
            for (name, value) in entries {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                if value.is_container() {
                    flatten_into(value, &key, rows);
                } else {
                    rows.push(row(key, value));
                }
            }
        }
        JsonNode::Null | JsonNode::Scalar(_) => rows.push(row(prefix.to_string(), node)),
    }
}

fn row(key: String, leaf: &JsonNode) -> TableRow {
    TableRow {
        key,
        kind: leaf.kind(),
        value: Value::from(leaf.clone()),
        display: leaf.summary(),
    }
}

/// Summaries for the patient list.
pub fn patient_summaries(records: &[PatientRecord]) -> Vec<PatientSummary> {
    records
        .iter()
        .map(|patient| PatientSummary {
            patient_id: patient.patient_id.as_ref().map(ToString::to_string),
            name: patient.name.clone(),
            age: patient.age,
            sex: patient.sex.clone(),
            test_count: patient.cmg_tests.len(),
            tests: patient
                .cmg_tests
                .iter()
                .enumerate()
                .map(|(index, test)| TestSummary {
                    index,
                    date: format_date(test.created_at.as_deref()),
                    points: test.point_count(),
                    notes: test.notes.len(),
                    truncated: test.is_truncated(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::Records;
    use serde_json::json;

    fn node(value: Value) -> JsonNode {
        JsonNode::from(value)
    }

    #[test]
    fn object_root_gives_card_per_key() {
        let root = node(json!({"name": "Ada", "tags": [1, 2], "meta": {"a": null}, "gone": null}));
        let cards = cards(&root);

        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].title, "name");
        assert_eq!(cards[0].badge, "string");
        assert_eq!(cards[0].value.as_deref(), Some("\"Ada\""));

        assert_eq!(cards[1].kind, NodeKind::Array);
        assert_eq!(cards[1].badge, "Array[2]");
        assert_eq!(
            cards[1].entries,
            vec![
                CardEntry { label: "[0]".into(), value: "1".into() },
                CardEntry { label: "[1]".into(), value: "2".into() },
            ]
        );

        assert_eq!(cards[2].badge, "Object{1}");
        assert_eq!(cards[3].kind, NodeKind::Null);
        assert_eq!(cards[3].value.as_deref(), Some("null"));
    }

    #[test]
    fn array_root_titles_items_by_index() {
        let root = node(json!([{"x": [1, 2, 3]}, true]));
        let cards = cards(&root);
        assert_eq!(cards[0].title, "Item 0");
        assert_eq!(cards[0].key, "[0]");
        assert_eq!(cards[0].entries[0].value, "Array[3]");
        assert_eq!(cards[1].badge, "boolean");
    }

    #[test]
    fn long_containers_preview_eight_entries() {
        let root = node(json!({"list": (0..11).collect::<Vec<u32>>()}));
        let card = &cards(&root)[0];
        assert_eq!(card.entries.len(), 8);
        assert_eq!(card.more, 3);
    }

    #[test]
    fn flatten_builds_dotted_and_bracketed_paths() {
        let root = node(json!({
            "a": {"b": [10, {"c": "x"}]},
            "empty": {},
            "flag": false
        }));
        let keys: Vec<String> = flatten(&root).into_iter().map(|row| row.key).collect();
        assert_eq!(keys, vec!["a.b[0]", "a.b[1].c", "flag"]);
    }

    #[test]
    fn flatten_array_root_and_leaf_roots() {
        let rows = flatten(&node(json!([null, "s"])));
        assert_eq!(rows[0].key, "[0]");
        assert_eq!(rows[0].display, "null");
        assert_eq!(rows[1].display, "\"s\"");

        let rows = flatten(&node(json!(42)));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "value");
        assert_eq!(rows[0].value, json!(42));

        assert!(flatten(&JsonNode::Null).is_empty());
    }

    #[test]
    fn patient_summaries_count_tests_and_points() {
        let records = Records::from_value(&json!([{
            "patientId": 12,
            "name": "Ada",
            "cmgTests": [
                {"dataPoints": [1, 2, 3], "notes": [{"timestamp": 1, "pressure": 2}]},
                {"dataPoints": [1, 2], "dataPointsCount": 50, "createdAt": "2024-01-01T00:00:00Z"}
            ]
        }]))
        .expect("records");

        let summaries = patient_summaries(&records);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.patient_id.as_deref(), Some("12"));
        assert_eq!(summary.test_count, 2);
        assert_eq!(summary.tests[0].points, 3);
        assert_eq!(summary.tests[0].notes, 1);
        assert_eq!(summary.tests[0].date, "N/A");
        assert_eq!(summary.tests[1].points, 50);
        assert!(summary.tests[1].truncated);
        assert_eq!(summary.tests[1].date, "2024-01-01 00:00:00");
    }
}

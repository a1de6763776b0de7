//! Recovers a column → value mapping from a result item of unknown shape.
//!
//! Strategies run in a fixed priority order and the first one that yields at
//! least one field wins. Scores are pulled out separately. Precedence is the
//! item's own `score`/`_score`, then a reserved key inside the decoded data,
//! then a trailing numeric element of a positional row.
use crate::result_item::{FieldList, FieldObject, FieldPair, ResultItem};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys that always go to the score slot, never into the data mapping.
pub const RESERVED_SCORE_KEYS: [&str; 2] = ["score", "_score"];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_SCORE_KEYS.contains(&key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// `document`, `row` or `data` sub-object.
    NamedContainer,
    /// `fields` / `data_array` containers or a bare list of pairs.
    FieldList,
    /// Ordered values zipped against the column list.
    Positional,
    /// The item itself is a keyed mapping.
    Mapping,
    /// The object's own remaining attributes.
    Attributes,
}

pub const STRATEGY_ORDER: [DecodeStrategy; 5] = [
    DecodeStrategy::NamedContainer,
    DecodeStrategy::FieldList,
    DecodeStrategy::Positional,
    DecodeStrategy::Mapping,
    DecodeStrategy::Attributes,
];

impl DecodeStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeStrategy::NamedContainer => "named_container",
            DecodeStrategy::FieldList => "field_list",
            DecodeStrategy::Positional => "positional",
            DecodeStrategy::Mapping => "mapping",
            DecodeStrategy::Attributes => "attributes",
        }
    }
}

/// One decoded result item. Serializes as `{score, data}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedRecord {
    score: Option<f64>,
    data: Map<String, Value>,
}

impl NormalizedRecord {
    /// Reserved score keys are dropped from `data` on construction.
    pub fn new(mut data: Map<String, Value>, score: Option<f64>) -> Self {
        data.retain(|key, _| !is_reserved_key(key));
        Self { score, data }
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

struct Extracted {
    data: Map<String, Value>,
    inferred_score: Option<f64>,
}

impl Extracted {
    fn from_data(data: Map<String, Value>) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        Some(Self {
            data,
            inferred_score: None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RowShapeDecoder;

impl RowShapeDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes one item. An item no strategy can read yields an empty record.
    pub fn decode(&self, item: &ResultItem, columns: &[String]) -> NormalizedRecord {
        self.decode_traced(item, columns).0
    }

    /// Same as [`decode`](Self::decode), also reporting which strategy won.
    pub fn decode_traced(
        &self,
        item: &ResultItem,
        columns: &[String],
    ) -> (NormalizedRecord, Option<DecodeStrategy>) {
        let explicit_score = explicit_score(item);
        // Score seen by a strategy that found no data fields.
        let mut leftover_score = None;

        for strategy in STRATEGY_ORDER {
            let Some(extracted) = apply(strategy, item, columns) else {
                continue;
            };

            let found_score = reserved_score(&extracted.data).or(extracted.inferred_score);
            let record = NormalizedRecord::new(
                extracted.data,
                explicit_score.or(found_score).or(leftover_score),
            );
            if record.is_empty() {
                // No data fields, only a score; keep looking.
                leftover_score = leftover_score.or(found_score);
                continue;
            }

            tracing::debug!(
                "Decoded {} item via {} strategy: {} field(s), score {:?}",
                item.kind(),
                strategy.as_str(),
                record.data().len(),
                record.score()
            );
            return (record, Some(strategy));
        }

        (
            NormalizedRecord::new(Map::new(), explicit_score.or(leftover_score)),
            None,
        )
    }
}

fn apply(strategy: DecodeStrategy, item: &ResultItem, columns: &[String]) -> Option<Extracted> {
    match (strategy, item) {
        (DecodeStrategy::NamedContainer, ResultItem::Object(obj)) => named_container(obj),
        (DecodeStrategy::FieldList, ResultItem::Object(obj)) => object_field_list(obj),
        (DecodeStrategy::FieldList, ResultItem::FieldPairs(pairs)) => {
            Extracted::from_data(from_pairs(pairs))
        }
        (DecodeStrategy::Positional, ResultItem::Object(obj)) => obj
            .values
            .as_deref()
            .and_then(|values| positional(values, columns)),
        (DecodeStrategy::Positional, ResultItem::Positional(values)) => {
            positional(values, columns)
        }
        (DecodeStrategy::Mapping, ResultItem::Mapping(map)) => Extracted::from_data(
            map.iter()
                .filter(|(key, _)| !is_reserved_key(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        (DecodeStrategy::Attributes, ResultItem::Object(obj)) => Extracted::from_data(
            obj.attributes
                .iter()
                .filter(|(key, value)| !is_reserved_key(key) && !value.is_null())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        _ => None,
    }
}

fn named_container(obj: &FieldObject) -> Option<Extracted> {
    if let Some(doc) = obj.document.as_ref().filter(|d| !d.is_empty()) {
        return Extracted::from_data(doc.clone());
    }
    if let Some(row) = obj.row.as_ref().filter(|r| !r.is_empty()) {
        return Extracted::from_data(row.clone());
    }
    match obj.data.as_ref()? {
        Value::Object(map) => Extracted::from_data(map.clone()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Extracted::from_data(map),
            _ => {
                let mut data = Map::new();
                data.insert("raw".to_string(), Value::String(raw.clone()));
                Extracted::from_data(data)
            }
        },
        _ => None,
    }
}

fn object_field_list(obj: &FieldObject) -> Option<Extracted> {
    let from_fields = match obj.fields.as_ref() {
        Some(FieldList::Keyed(map)) => map.clone(),
        Some(FieldList::Pairs(pairs)) => from_pairs(pairs),
        None => Map::new(),
    };
    if !from_fields.is_empty() {
        return Extracted::from_data(from_fields);
    }
    obj.data_array
        .as_deref()
        .and_then(|pairs| Extracted::from_data(from_pairs(pairs)))
}

/// Duplicate names keep the first value seen.
fn from_pairs(pairs: &[FieldPair]) -> Map<String, Value> {
    let mut data = Map::new();
    for pair in pairs {
        data.entry(pair.name.clone())
            .or_insert_with(|| pair.value.clone());
    }
    data
}

/// Zips values against columns. A numeric last element beyond the column
/// count is the score; any other overflow is kept as `field_<index>`.
fn positional(values: &[Value], columns: &[String]) -> Option<Extracted> {
    let mut data = Map::new();
    let mut inferred_score = None;
    let last = values.len().saturating_sub(1);

    for (i, value) in values.iter().enumerate() {
        if let Some(column) = columns.get(i) {
            data.entry(column.clone()).or_insert_with(|| value.clone());
        } else if i == last && value.is_number() {
            inferred_score = value.as_f64();
        } else {
            data.insert(format!("field_{}", i), value.clone());
        }
    }

    // A lone trailing score still counts even with no data fields.
    if data.is_empty() && inferred_score.is_none() {
        return None;
    }
    Some(Extracted {
        data,
        inferred_score,
    })
}

/// First numeric reserved key in a decoded mapping, `score` before `_score`.
fn reserved_score(data: &Map<String, Value>) -> Option<f64> {
    RESERVED_SCORE_KEYS
        .iter()
        .find_map(|key| data.get(*key).and_then(Value::as_f64))
}

/// Explicit score on the item itself. Only JSON numbers count.
fn explicit_score(item: &ResultItem) -> Option<f64> {
    match item {
        ResultItem::Object(obj) => obj
            .score
            .as_ref()
            .and_then(Value::as_f64)
            .or_else(|| reserved_score(&obj.attributes)),
        ResultItem::Mapping(map) => reserved_score(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn decode(value: Value, columns: &[&str]) -> (NormalizedRecord, Option<DecodeStrategy>) {
        RowShapeDecoder::new().decode_traced(&ResultItem::from_value(value), &cols(columns))
    }

    #[test]
    fn test_positional_exact_length_has_no_score() {
        let (record, strategy) = decode(
            json!(["p1", "Jane Doe", "1980-01-01"]),
            &["person_id", "full_name", "birthdate"],
        );

        assert_eq!(strategy, Some(DecodeStrategy::Positional));
        assert_eq!(record.get("person_id"), Some(&json!("p1")));
        assert_eq!(record.get("full_name"), Some(&json!("Jane Doe")));
        assert_eq!(record.get("birthdate"), Some(&json!("1980-01-01")));
        assert_eq!(record.score(), None);
    }

    #[test]
    fn test_positional_trailing_number_is_score() {
        let (record, _) = decode(json!(["p1", "Jane Doe", 0.87]), &["person_id", "full_name"]);

        assert_eq!(record.data().len(), 2);
        assert_eq!(record.score(), Some(0.87));
    }

    #[test]
    fn test_positional_numeric_last_column_is_data() {
        let (record, _) = decode(json!(["p1", 42]), &["person_id", "age"]);

        assert_eq!(record.get("age"), Some(&json!(42)));
        assert_eq!(record.score(), None);
    }

    #[test]
    fn test_positional_short_and_overflow() {
        let (short, _) = decode(json!(["p1"]), &["person_id", "full_name", "birthdate"]);
        assert_eq!(short.data().len(), 1);
        assert_eq!(short.get("full_name"), None);

        let (long, _) = decode(json!(["p1", "extra", "tail"]), &["person_id"]);
        assert_eq!(long.get("field_1"), Some(&json!("extra")));
        assert_eq!(long.get("field_2"), Some(&json!("tail")));
        assert_eq!(long.score(), None);
    }

    #[test]
    fn test_named_container_beats_other_shapes() {
        let (record, strategy) = decode(
            json!({
                "document": {"full_name": "Jane Doe", "_score": 3},
                "values": ["ignored"],
                "extra": "also ignored"
            }),
            &["full_name"],
        );

        assert_eq!(strategy, Some(DecodeStrategy::NamedContainer));
        assert_eq!(record.data().len(), 1);
        assert_eq!(record.get("full_name"), Some(&json!("Jane Doe")));
    }

    #[test]
    fn test_data_string_container() {
        let (parsed, _) = decode(json!({"data": "{\"full_name\": \"Jane\"}"}), &[]);
        assert_eq!(parsed.get("full_name"), Some(&json!("Jane")));

        let (raw, _) = decode(json!({"data": "not json"}), &[]);
        assert_eq!(raw.get("raw"), Some(&json!("not json")));
    }

    #[test]
    fn test_field_list_shapes() {
        let (from_fields, strategy) = decode(
            json!({"fields": [
                {"name": "person_id", "value": "p1"},
                {"name": "person_id", "value": "p2"}
            ]}),
            &[],
        );
        assert_eq!(strategy, Some(DecodeStrategy::FieldList));
        assert_eq!(from_fields.get("person_id"), Some(&json!("p1")));

        let (from_data_array, _) = decode(
            json!({"score": 0.4, "data_array": [{"name": "full_name", "value": "Jane"}]}),
            &[],
        );
        assert_eq!(from_data_array.get("full_name"), Some(&json!("Jane")));
        assert_eq!(from_data_array.score(), Some(0.4));

        let (bare, _) = decode(json!([{"name": "full_name", "value": "Jane"}]), &["x"]);
        assert_eq!(bare.get("full_name"), Some(&json!("Jane")));
    }

    #[test]
    fn test_explicit_score_beats_trailing_numeric() {
        let (record, _) = decode(
            json!({"score": 0.99, "values": ["p1", 0.12]}),
            &["person_id"],
        );

        assert_eq!(record.get("person_id"), Some(&json!("p1")));
        assert_eq!(record.score(), Some(0.99));
    }

    #[test]
    fn test_mapping_strips_reserved_keys() {
        let (record, strategy) = decode(
            json!({"person_id": "p1", "score": 0.5, "_score": 0.6}),
            &[],
        );

        assert_eq!(strategy, Some(DecodeStrategy::Mapping));
        assert_eq!(record.data().len(), 1);
        assert_eq!(record.score(), Some(0.5));
    }

    #[test]
    fn test_attribute_fallback_skips_nulls() {
        let (record, strategy) = decode(
            json!({"values": [], "id": "p1", "note": null}),
            &["person_id"],
        );

        assert_eq!(strategy, Some(DecodeStrategy::Attributes));
        assert_eq!(record.get("id"), Some(&json!("p1")));
        assert_eq!(record.get("note"), None);
    }

    #[test]
    fn test_unreadable_item_is_empty_not_error() {
        let (record, strategy) = decode(json!(17), &["full_name"]);
        assert!(record.is_empty());
        assert_eq!(strategy, None);

        let (only_score, _) = decode(json!({"score": 0.3}), &["full_name"]);
        assert!(only_score.is_empty());
        assert_eq!(only_score.score(), Some(0.3));
    }

    #[test]
    fn test_score_column_moves_to_score_slot() {
        let (record, _) = decode(
            json!(["p1", "Jane Doe", 0.87]),
            &["person_id", "full_name", "score"],
        );

        assert_eq!(record.data().len(), 2);
        assert!(record.get("score").is_none());
        assert_eq!(record.score(), Some(0.87));
    }

    #[test]
    fn test_score_inside_container_moves_to_score_slot() {
        let (from_document, _) = decode(json!({"document": {"full_name": "J", "score": 0.9}}), &[]);
        assert_eq!(from_document.get("full_name"), Some(&json!("J")));
        assert_eq!(from_document.score(), Some(0.9));

        let (from_row, _) = decode(json!({"row": {"full_name": "J", "_score": 0.2}}), &[]);
        assert_eq!(from_row.score(), Some(0.2));
    }

    #[test]
    fn test_object_level_underscore_score() {
        let (record, _) = decode(json!({"_score": 0.4, "values": ["J"]}), &["full_name"]);

        assert_eq!(record.get("full_name"), Some(&json!("J")));
        assert_eq!(record.score(), Some(0.4));
    }

    #[test]
    fn test_item_score_beats_score_in_data() {
        let (record, _) = decode(
            json!({"score": 0.99, "document": {"full_name": "J", "score": 0.1}}),
            &[],
        );
        assert_eq!(record.score(), Some(0.99));

        let (column_beats_trailing, _) = decode(
            json!(["p1", 0.5, 0.7]),
            &["person_id", "score"],
        );
        assert_eq!(column_beats_trailing.score(), Some(0.5));
    }

    #[test]
    fn test_lone_trailing_score_is_kept() {
        let (record, strategy) = decode(json!([0.5]), &[]);

        assert!(record.is_empty());
        assert_eq!(strategy, None);
        assert_eq!(record.score(), Some(0.5));
    }

    #[test]
    fn test_record_serializes_as_score_and_data() {
        let (record, _) = decode(json!(["Jane", 0.5]), &["full_name"]);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"score": 0.5, "data": {"full_name": "Jane"}})
        );
    }
}

//! Closed set of shapes a backend result item can arrive in.
//!
//! Backends (and different versions of the same backend) return matched rows
//! as positional arrays, plain mappings, objects with named containers, or
//! lists of `{name, value}` pairs. [`ResultItem::from_value`] classifies a raw
//! JSON value into exactly one of these variants so the decoder can dispatch
//! on the variant instead of probing for attributes.
use serde_json::{Map, Value};

/// Keys that mark an object as a named-field object rather than a plain mapping.
pub const CONTAINER_KEYS: [&str; 6] = ["document", "row", "fields", "data_array", "values", "data"];

/// One matched entity as returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultItem {
    /// Bare ordered values, matched to column names by position.
    Positional(Vec<Value>),
    /// Keyed mapping of column name to value.
    Mapping(Map<String, Value>),
    /// Object exposing named sub-containers and/or its own attributes.
    Object(FieldObject),
    /// List of `(name, value)` pairs.
    FieldPairs(Vec<FieldPair>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPair {
    pub name: String,
    pub value: Value,
}

/// A `fields` container is either already keyed or a list of pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldList {
    Keyed(Map<String, Value>),
    Pairs(Vec<FieldPair>),
}

/// Named-field object: the known containers are lifted into typed slots,
/// everything else stays in `attributes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldObject {
    pub score: Option<Value>,
    pub document: Option<Map<String, Value>>,
    pub row: Option<Map<String, Value>>,
    pub data: Option<Value>,
    pub fields: Option<FieldList>,
    pub data_array: Option<Vec<FieldPair>>,
    pub values: Option<Vec<Value>>,
    pub attributes: Map<String, Value>,
}

impl ResultItem {
    /// Classifies a raw JSON value. Never fails: scalars become an empty
    /// object so they decode to an empty record downstream.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => match pairs_from_items(&items) {
                Some(pairs) => ResultItem::FieldPairs(pairs),
                None => ResultItem::Positional(items),
            },
            Value::Object(map) => {
                if CONTAINER_KEYS.iter().any(|key| map.contains_key(*key)) {
                    ResultItem::Object(FieldObject::from_map(map))
                } else {
                    ResultItem::Mapping(map)
                }
            }
            scalar => {
                tracing::debug!("Scalar result item has no named fields: {}", scalar);
                ResultItem::Object(FieldObject::default())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResultItem::Positional(_) => "positional",
            ResultItem::Mapping(_) => "mapping",
            ResultItem::Object(_) => "object",
            ResultItem::FieldPairs(_) => "field_pairs",
        }
    }
}

impl FieldObject {
    fn from_map(map: Map<String, Value>) -> Self {
        let mut object = FieldObject::default();

        for (key, value) in map {
            match key.as_str() {
                "score" => object.score = Some(value),
                "document" => match value {
                    Value::Object(doc) => object.document = Some(doc),
                    other => {
                        object.attributes.insert(key, other);
                    }
                },
                "row" => match value {
                    Value::Object(row) => object.row = Some(row),
                    other => {
                        object.attributes.insert(key, other);
                    }
                },
                "data" => object.data = Some(value),
                "fields" => match value {
                    Value::Object(keyed) => object.fields = Some(FieldList::Keyed(keyed)),
                    Value::Array(items) => {
                        object.fields = Some(FieldList::Pairs(collect_pairs(&items)))
                    }
                    other => {
                        object.attributes.insert(key, other);
                    }
                },
                "data_array" => match value {
                    Value::Array(items) => object.data_array = Some(collect_pairs(&items)),
                    other => {
                        object.attributes.insert(key, other);
                    }
                },
                "values" => match value {
                    Value::Array(items) => object.values = Some(items),
                    other => {
                        object.attributes.insert(key, other);
                    }
                },
                _ => {
                    object.attributes.insert(key, value);
                }
            }
        }

        object
    }
}

fn pair_from_value(value: &Value) -> Option<FieldPair> {
    let map = value.as_object()?;
    let name = map.get("name")?.as_str()?;
    let value = map.get("value")?;
    Some(FieldPair {
        name: name.to_string(),
        value: value.clone(),
    })
}

/// Some(pairs) only when the list is non-empty and every element is a pair.
fn pairs_from_items(items: &[Value]) -> Option<Vec<FieldPair>> {
    if items.is_empty() {
        return None;
    }
    items.iter().map(pair_from_value).collect()
}

/// Lenient variant for named containers: elements that are not pairs are skipped.
fn collect_pairs(items: &[Value]) -> Vec<FieldPair> {
    items.iter().filter_map(pair_from_value).collect()
}

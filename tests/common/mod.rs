#![allow(dead_code)]

use benefits360_api::errors::AppError;
use benefits360_api::reconciler::TabularBackend;
use benefits360_api::result_item::ResultItem;
use benefits360_api::schema::Statement;
use serde_json::Value;
use std::sync::Mutex;

pub const PRIMARY_TABLE: &str = "gold.person_profile";
pub const SECONDARY_TABLE: &str = "silver.matched_people";

/// Person id of a canned row: first element of an array row, or `person_id`
/// of an object row.
fn row_key(row: &Value) -> Option<&str> {
    match row {
        Value::Array(values) => values.first().and_then(Value::as_str),
        Value::Object(map) => map.get("person_id").and_then(Value::as_str),
        _ => None,
    }
}

/// In-memory tabular backend. Rows are filtered by the bound key; tables without a canned answer return no rows.
#[derive(Default)]
pub struct FakeBackend {
    answers: Vec<(String, Result<Vec<Value>, AppError>)>,
    calls: Mutex<Vec<Statement>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &str, rows: Vec<Value>) -> Self {
        self.answers.push((table.to_string(), Ok(rows)));
        self
    }

    pub fn with_error(mut self, table: &str, error: AppError) -> Self {
        self.answers.push((table.to_string(), Err(error)));
        self
    }

    pub fn calls(&self) -> Vec<Statement> {
        self.calls.lock().unwrap().clone()
    }

    /// Tables queried, in call order.
    pub fn tables_queried(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|stmt| {
                [PRIMARY_TABLE, SECONDARY_TABLE]
                    .iter()
                    .find(|t| stmt.sql.contains(&format!(" FROM {} ", t)))
                    .map(|t| t.to_string())
            })
            .collect()
    }
}

impl TabularBackend for FakeBackend {
    async fn query(&self, statement: &Statement) -> Result<Vec<ResultItem>, AppError> {
        self.calls.lock().unwrap().push(statement.clone());

        let answer = self
            .answers
            .iter()
            .find(|(table, _)| statement.sql.contains(&format!(" FROM {} ", table)))
            .map(|(_, answer)| answer.clone());

        match answer {
            Some(Ok(rows)) => {
                let key = statement.params.first().cloned().unwrap_or_default();
                Ok(rows
                    .into_iter()
                    .filter(|row| row_key(row).map_or(true, |k| k == key))
                    .map(ResultItem::from_value)
                    .collect())
            }
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}

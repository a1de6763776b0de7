//! Native column layouts of the two person tables and their mapping onto the
//! canonical profile fields.
use crate::decoder::NormalizedRecord;
use crate::models::CanonicalProfile;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    PersonId,
    FullName,
    Birthdate,
    FirstName,
    LastName,
    MedicalId,
    SnapId,
    AssistanceId,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::PersonId,
        CanonicalField::FullName,
        CanonicalField::Birthdate,
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::MedicalId,
        CanonicalField::SnapId,
        CanonicalField::AssistanceId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::PersonId => "person_id",
            CanonicalField::FullName => "full_name",
            CanonicalField::Birthdate => "birthdate",
            CanonicalField::FirstName => "first_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::MedicalId => "medical_id",
            CanonicalField::SnapId => "snap_id",
            CanonicalField::AssistanceId => "assistance_id",
        }
    }
}

/// Ordered (native column, canonical field) pairs for one backing table.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceSchema {
    pub name: &'static str,
    pub columns: &'static [(&'static str, CanonicalField)],
}

/// Curated profile table with short column aliases.
pub static PRIMARY_SCHEMA: SourceSchema = SourceSchema {
    name: "primary",
    columns: &[
        ("person_id", CanonicalField::PersonId),
        ("name", CanonicalField::FullName),
        ("dob", CanonicalField::Birthdate),
        ("first_nm", CanonicalField::FirstName),
        ("last_nm", CanonicalField::LastName),
        ("med_id", CanonicalField::MedicalId),
        ("snap_no", CanonicalField::SnapId),
        ("asst_id", CanonicalField::AssistanceId),
    ],
};

/// Legacy matched-people table; names already match the canonical fields
/// but the column order differs.
pub static SECONDARY_SCHEMA: SourceSchema = SourceSchema {
    name: "secondary",
    columns: &[
        ("person_id", CanonicalField::PersonId),
        ("full_name", CanonicalField::FullName),
        ("first_name", CanonicalField::FirstName),
        ("last_name", CanonicalField::LastName),
        ("birthdate", CanonicalField::Birthdate),
        ("medical_id", CanonicalField::MedicalId),
        ("snap_id", CanonicalField::SnapId),
        ("assistance_id", CanonicalField::AssistanceId),
    ],
};

/// Parameterized statement handed to a tabular backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<String>,
}

impl SourceSchema {
    pub fn native_columns(&self) -> Vec<String> {
        self.columns.iter().map(|(native, _)| native.to_string()).collect()
    }

    pub fn native_name(&self, field: CanonicalField) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(_, canonical)| *canonical == field)
            .map(|(native, _)| *native)
    }

    pub fn key_column(&self) -> &'static str {
        self.native_name(CanonicalField::PersonId).unwrap_or("person_id")
    }

    /// Selects one row as a JSON array in native column order.
    /// `table` must already be a validated identifier.
    pub fn select_statement(&self, table: &str, key: &str) -> Statement {
        let sql = format!(
            "SELECT json_build_array({}) AS row FROM {} WHERE {}::text = $1 LIMIT 1",
            self.native_columns().join(", "),
            table,
            self.key_column()
        );
        Statement {
            sql,
            params: vec![key.to_string()],
        }
    }

    /// Renames native columns of a decoded row to canonical fields.
    pub fn to_profile(&self, record: &NormalizedRecord) -> CanonicalProfile {
        let mut profile = CanonicalProfile::default();
        for (native, field) in self.columns {
            if let Some(value) = record.get(native).and_then(scalar_to_string) {
                profile.set(*field, value);
            }
        }
        profile
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use std::collections::HashSet;

    #[test]
    fn test_schemas_cover_every_canonical_field_once() {
        for schema in [&PRIMARY_SCHEMA, &SECONDARY_SCHEMA] {
            let fields: HashSet<_> = schema.columns.iter().map(|(_, f)| *f).collect();
            assert_eq!(fields.len(), CanonicalField::ALL.len(), "{}", schema.name);
        }
    }

    #[test]
    fn test_native_names_differ_between_sources() {
        assert_eq!(PRIMARY_SCHEMA.native_name(CanonicalField::MedicalId), Some("med_id"));
        assert_eq!(
            SECONDARY_SCHEMA.native_name(CanonicalField::MedicalId),
            Some("medical_id")
        );
    }

    #[test]
    fn test_select_statement_uses_native_order() {
        let stmt = PRIMARY_SCHEMA.select_statement("benefits360.gold.person_profile", "X1");
        assert_eq!(
            stmt.sql,
            "SELECT json_build_array(person_id, name, dob, first_nm, last_nm, med_id, snap_no, asst_id) AS row \
             FROM benefits360.gold.person_profile WHERE person_id::text = $1 LIMIT 1"
        );
        assert_eq!(stmt.params, vec!["X1".to_string()]);
    }

    #[test]
    fn test_to_profile_translates_names() {
        let mut data = Map::new();
        data.insert("med_id".into(), json!("M1"));
        data.insert("dob".into(), json!("1980-01-01"));
        data.insert("snap_no".into(), json!(5512));
        data.insert("asst_id".into(), Value::Null);
        let record = NormalizedRecord::new(data, None);

        let profile = PRIMARY_SCHEMA.to_profile(&record);
        assert_eq!(profile.medical_id.as_deref(), Some("M1"));
        assert_eq!(profile.birthdate.as_deref(), Some("1980-01-01"));
        assert_eq!(profile.snap_id.as_deref(), Some("5512"));
        assert_eq!(profile.assistance_id, None);
    }
}

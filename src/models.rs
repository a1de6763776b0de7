use crate::decoder::NormalizedRecord;
use crate::schema::CanonicalField;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT_NAME: &str = "lewis";
pub const DEFAULT_INDEX_NAME: &str = "benefits360.silver.matched_people_vec";
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

// ============ Domain Models ============

/// Person profile in the canonical schema, regardless of which table supplied it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalProfile {
    pub person_id: Option<String>,
    pub full_name: Option<String>,
    pub birthdate: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub medical_id: Option<String>,
    pub snap_id: Option<String>,
    pub assistance_id: Option<String>,
}

impl CanonicalProfile {
    pub fn set(&mut self, field: CanonicalField, value: String) {
        let slot = match field {
            CanonicalField::PersonId => &mut self.person_id,
            CanonicalField::FullName => &mut self.full_name,
            CanonicalField::Birthdate => &mut self.birthdate,
            CanonicalField::FirstName => &mut self.first_name,
            CanonicalField::LastName => &mut self.last_name,
            CanonicalField::MedicalId => &mut self.medical_id,
            CanonicalField::SnapId => &mut self.snap_id,
            CanonicalField::AssistanceId => &mut self.assistance_id,
        };
        *slot = Some(value);
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::PersonId => self.person_id.as_deref(),
            CanonicalField::FullName => self.full_name.as_deref(),
            CanonicalField::Birthdate => self.birthdate.as_deref(),
            CanonicalField::FirstName => self.first_name.as_deref(),
            CanonicalField::LastName => self.last_name.as_deref(),
            CanonicalField::MedicalId => self.medical_id.as_deref(),
            CanonicalField::SnapId => self.snap_id.as_deref(),
            CanonicalField::AssistanceId => self.assistance_id.as_deref(),
        }
    }
}

/// Which backing table answered a profile lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    Primary,
    Secondary,
}

// ============ API Request/Response Models ============

/// Request payload for `POST /search`.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorSearchRequest {
    /// Free-text query, usually a person's name.
    pub query: String,
    /// Vector search endpoint serving the index.
    #[serde(default = "default_endpoint_name")]
    pub endpoint_name: String,
    /// Fully qualified index name.
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Maximum number of results.
    #[serde(default = "default_limit")]
    pub limit: Option<u32>,
}

fn default_endpoint_name() -> String {
    DEFAULT_ENDPOINT_NAME.to_string()
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_limit() -> Option<u32> {
    Some(DEFAULT_SEARCH_LIMIT)
}

/// Response payload for `POST /search`. Results keep backend rank order.
#[derive(Debug, Clone, Serialize)]
pub struct VectorSearchResponse {
    pub results: Vec<NormalizedRecord>,
    pub query: String,
}

/// Response payload for `GET /people/:person_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub source: ProfileSource,
    pub profile: CanonicalProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionOut {
    pub version: String,
}

impl VersionOut {
    pub fn from_metadata() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_defaults() {
        let req: VectorSearchRequest = serde_json::from_value(json!({"query": "Jane"})).unwrap();
        assert_eq!(req.endpoint_name, "lewis");
        assert_eq!(req.index_name, DEFAULT_INDEX_NAME);
        assert_eq!(req.limit, Some(10));

        let explicit_null: VectorSearchRequest =
            serde_json::from_value(json!({"query": "Jane", "limit": null})).unwrap();
        assert_eq!(explicit_null.limit, None);
    }

    #[test]
    fn test_profile_serializes_missing_fields_as_null() {
        let mut profile = CanonicalProfile::default();
        profile.set(CanonicalField::PersonId, "X1".to_string());

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["person_id"], json!("X1"));
        assert_eq!(value["medical_id"], json!(null));
        assert_eq!(profile.get(CanonicalField::PersonId), Some("X1"));
    }
}

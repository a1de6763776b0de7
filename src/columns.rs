/// Column list used when neither the caller nor the backend names any columns.
pub const DEFAULT_COLUMNS: [&str; 1] = ["full_name"];

/// Picks the column names positional values are matched against.
///
/// Backends may reorder or substitute columns without telling the caller, so
/// the list they advertise in their result metadata wins over the list that
/// was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolver {
    default_columns: Vec<String>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

impl ColumnResolver {
    pub fn new(default_columns: Vec<String>) -> Self {
        Self { default_columns }
    }

    pub fn default_columns(&self) -> &[String] {
        &self.default_columns
    }

    /// Never fails: with nothing requested and nothing advertised, the
    /// configured default list is returned.
    pub fn resolve(&self, requested: &[String], advertised: Option<&[String]>) -> Vec<String> {
        if let Some(advertised) = advertised.filter(|cols| !cols.is_empty()) {
            if advertised != requested {
                tracing::debug!(
                    "Backend advertised columns {:?} override requested {:?}",
                    advertised,
                    requested
                );
            }
            return advertised.to_vec();
        }

        if !requested.is_empty() {
            return requested.to_vec();
        }

        tracing::debug!(
            "No columns requested or advertised, using defaults {:?}",
            self.default_columns
        );
        self.default_columns.clone()
    }
}

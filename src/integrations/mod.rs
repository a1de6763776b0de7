//! Backend integrations.

pub mod vector_search {
    pub use crate::services::*;
}

pub mod postgres {
    pub use crate::db_storage::*;
}

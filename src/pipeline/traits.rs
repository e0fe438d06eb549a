//! Storage boundary for the processing pipeline.
//!
//! The processor only needs "create file record", "bulk insert mapping
//! rows" and "update file status"; listing and lookup serve callers that
//! show history. `pipeline::store` provides the SQLite implementation.

use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ProcessingStatus;
use crate::models::{MappingResult, UploadedFile};

pub trait MappingStore: Send + Sync {
    /// Register a new upload in `processing` state.
    fn create_file_record(
        &self,
        user_id: &str,
        filename: &str,
        file_size: u64,
        total_records: u32,
    ) -> Result<UploadedFile, DatabaseError>;

    /// Append mapping rows for a file. `start_index` is the file position of
    /// `results[0]`. Returns the number of rows written.
    fn insert_mappings(
        &self,
        file_id: &Uuid,
        user_id: &str,
        start_index: usize,
        results: &[MappingResult],
    ) -> Result<usize, DatabaseError>;

    fn update_file_status(
        &self,
        file_id: &Uuid,
        status: ProcessingStatus,
        processed_records: u32,
    ) -> Result<(), DatabaseError>;

    /// Uploads of one user, newest first.
    fn list_files(&self, user_id: &str) -> Result<Vec<UploadedFile>, DatabaseError>;

    /// Mapping rows of one file in row order, scoped to its owner.
    fn get_mappings(&self, user_id: &str, file_id: &Uuid) -> Result<Vec<MappingResult>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::mapping::TargetGenerator;

    #[test]
    fn traits_are_object_safe() {
        fn _assert_store(_: &dyn MappingStore) {}
        fn _assert_generator(_: &dyn TargetGenerator) {}
    }
}

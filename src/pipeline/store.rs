//! SQLite-backed `MappingStore`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use super::traits::MappingStore;
use crate::db::{self, DatabaseError};
use crate::models::enums::ProcessingStatus;
use crate::models::{MappingResult, UploadedFile};

/// Owns one connection; calls are serialized through the mutex.
pub struct SqliteMappingStore {
    conn: Mutex<Connection>,
}

impl SqliteMappingStore {
    /// Open (or create) a database file and apply pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::from_connection(db::open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl MappingStore for SqliteMappingStore {
    fn create_file_record(
        &self,
        user_id: &str,
        filename: &str,
        file_size: u64,
        total_records: u32,
    ) -> Result<UploadedFile, DatabaseError> {
        let now = Utc::now().naive_utc();
        let file = UploadedFile {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            filename: filename.to_string(),
            file_size,
            total_records,
            processed_records: 0,
            processing_status: ProcessingStatus::Processing,
            created_at: now,
            updated_at: now,
        };
        db::insert_uploaded_file(&*self.lock()?, &file)?;
        Ok(file)
    }

    fn insert_mappings(
        &self,
        file_id: &Uuid,
        user_id: &str,
        start_index: usize,
        results: &[MappingResult],
    ) -> Result<usize, DatabaseError> {
        db::insert_processed_codes(&*self.lock()?, file_id, user_id, start_index, results)
    }

    fn update_file_status(
        &self,
        file_id: &Uuid,
        status: ProcessingStatus,
        processed_records: u32,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().naive_utc();
        db::update_file_status(&*self.lock()?, file_id, status, processed_records, now)
    }

    fn list_files(&self, user_id: &str) -> Result<Vec<UploadedFile>, DatabaseError> {
        db::list_uploaded_files(&*self.lock()?, user_id)
    }

    fn get_mappings(&self, user_id: &str, file_id: &Uuid) -> Result<Vec<MappingResult>, DatabaseError> {
        db::get_processed_codes(&*self.lock()?, user_id, file_id)
    }
}

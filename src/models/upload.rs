use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ProcessingStatus;

/// Bookkeeping record for one uploaded terminology file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: Uuid,
    pub user_id: String,
    pub filename: String,
    pub file_size: u64,
    pub total_records: u32,
    pub processed_records: u32,
    pub processing_status: ProcessingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

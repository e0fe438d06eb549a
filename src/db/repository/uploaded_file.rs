use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ProcessingStatus;
use crate::models::UploadedFile;

pub fn insert_uploaded_file(conn: &Connection, file: &UploadedFile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO uploaded_files (id, user_id, filename, file_size, total_records,
         processed_records, processing_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            file.id.to_string(),
            file.user_id,
            file.filename,
            file.file_size as i64,
            file.total_records,
            file.processed_records,
            file.processing_status.as_str(),
            file.created_at.to_string(),
            file.updated_at.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_uploaded_file(conn: &Connection, id: &Uuid) -> Result<Option<UploadedFile>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, filename, file_size, total_records, processed_records,
         processing_status, created_at, updated_at
         FROM uploaded_files WHERE id = ?1",
        params![id.to_string()],
        read_row,
    );

    match result {
        Ok(row) => Ok(Some(uploaded_file_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Files uploaded by one user, newest first.
pub fn list_uploaded_files(conn: &Connection, user_id: &str) -> Result<Vec<UploadedFile>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, filename, file_size, total_records, processed_records,
         processing_status, created_at, updated_at
         FROM uploaded_files WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![user_id], read_row)?;

    let mut files = Vec::new();
    for row in rows {
        files.push(uploaded_file_from_row(row?)?);
    }
    Ok(files)
}

pub fn update_file_status(
    conn: &Connection,
    id: &Uuid,
    status: ProcessingStatus,
    processed_records: u32,
    updated_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE uploaded_files
         SET processing_status = ?1, processed_records = ?2, updated_at = ?3
         WHERE id = ?4",
        params![
            status.as_str(),
            processed_records,
            updated_at.to_string(),
            id.to_string(),
        ],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "UploadedFile".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct UploadedFileRow {
    id: String,
    user_id: String,
    filename: String,
    file_size: i64,
    total_records: u32,
    processed_records: u32,
    processing_status: String,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UploadedFileRow> {
    Ok(UploadedFileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        file_size: row.get(3)?,
        total_records: row.get(4)?,
        processed_records: row.get(5)?,
        processing_status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn uploaded_file_from_row(row: UploadedFileRow) -> Result<UploadedFile, DatabaseError> {
    Ok(UploadedFile {
        id: Uuid::parse_str(&row.id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id: row.user_id,
        filename: row.filename,
        file_size: row.file_size.max(0) as u64,
        total_records: row.total_records,
        processed_records: row.processed_records,
        processing_status: ProcessingStatus::from_str(&row.processing_status)?,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    })
}

fn parse_timestamp(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .unwrap_or_default()
}

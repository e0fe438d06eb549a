use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::MappingStatus;
use crate::models::MappingResult;

/// Insert a run of mapping results in one transaction.
///
/// `start_index` is the position of `results[0]` within the whole file so
/// that chunked inserts keep the original row order queryable.
pub fn insert_processed_codes(
    conn: &Connection,
    file_id: &Uuid,
    user_id: &str,
    start_index: usize,
    results: &[MappingResult],
) -> Result<usize, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let now = Utc::now().naive_utc().to_string();

    {
        let mut stmt = tx.prepare(
            "INSERT INTO processed_codes (id, file_id, user_id, row_index, namaste_code, namaste_term,
             icd11_tm2_code, icd11_tm2_term, icd11_bio_code, icd11_bio_term,
             confidence_score, mapping_status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;

        for (offset, result) in results.iter().enumerate() {
            stmt.execute(params![
                Uuid::new_v4().to_string(),
                file_id.to_string(),
                user_id,
                (start_index + offset) as i64,
                result.source_code,
                result.source_term,
                non_empty(&result.secondary_code),
                non_empty(&result.secondary_term),
                non_empty(&result.tertiary_code),
                non_empty(&result.tertiary_term),
                result.confidence_score,
                result.mapping_status.as_str(),
                now,
            ])?;
        }
    }

    tx.commit()?;
    Ok(results.len())
}

/// Mapping rows of one file, in original row order. Scoped by user so one
/// user can never read another user's file.
pub fn get_processed_codes(
    conn: &Connection,
    user_id: &str,
    file_id: &Uuid,
) -> Result<Vec<MappingResult>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT namaste_code, namaste_term, icd11_tm2_code, icd11_tm2_term,
         icd11_bio_code, icd11_bio_term, confidence_score, mapping_status
         FROM processed_codes
         WHERE user_id = ?1 AND file_id = ?2
         ORDER BY row_index ASC",
    )?;

    let rows = stmt.query_map(params![user_id, file_id.to_string()], |row| {
        Ok(ProcessedCodeRow {
            namaste_code: row.get(0)?,
            namaste_term: row.get(1)?,
            icd11_tm2_code: row.get(2)?,
            icd11_tm2_term: row.get(3)?,
            icd11_bio_code: row.get(4)?,
            icd11_bio_term: row.get(5)?,
            confidence_score: row.get(6)?,
            mapping_status: row.get(7)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        let row = row?;
        results.push(MappingResult {
            source_code: row.namaste_code,
            source_term: row.namaste_term,
            secondary_code: row.icd11_tm2_code,
            secondary_term: row.icd11_tm2_term,
            tertiary_code: row.icd11_bio_code,
            tertiary_term: row.icd11_bio_term,
            confidence_score: row.confidence_score,
            mapping_status: MappingStatus::from_str(&row.mapping_status)?,
        });
    }
    Ok(results)
}

pub fn count_processed_codes(conn: &Connection, file_id: &Uuid) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM processed_codes WHERE file_id = ?1",
        params![file_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

struct ProcessedCodeRow {
    namaste_code: String,
    namaste_term: String,
    icd11_tm2_code: Option<String>,
    icd11_tm2_term: Option<String>,
    icd11_bio_code: Option<String>,
    icd11_bio_term: Option<String>,
    confidence_score: f32,
    mapping_status: String,
}

/// Empty target strings are stored as NULL.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

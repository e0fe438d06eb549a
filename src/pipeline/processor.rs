//! Processing orchestrator.
//!
//! Single entry point that drives a terminology file through the pipeline:
//! parse → map (in batches) → persist → bundle.
//!
//! Mapping finishes before anything is written, so a storage failure never
//! costs the caller the computed results: they travel back inside the error.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use super::bundle::{self, Bundle};
use super::import::{parse_table, read_input, sanitize_filename, ImportError};
use super::mapping::MappingEngine;
use super::summary::MappingSummary;
use super::traits::MappingStore;
use crate::config::PipelineConfig;
use crate::db::DatabaseError;
use crate::models::enums::ProcessingStatus;
use crate::models::MappingResult;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("No valid data found in {filename}")]
    NoValidData { filename: String },

    /// Storage failed; every row was still mapped.
    #[error("Failed to persist {} mapped rows: {source}", .results.len())]
    Persistence {
        source: DatabaseError,
        results: Vec<MappingResult>,
    },

    /// Stopped between batches; `results` holds the rows mapped so far.
    #[error("Processing cancelled after {} rows", .results.len())]
    Cancelled { results: Vec<MappingResult> },
}

impl ProcessingError {
    /// Mapping results that survived the failure, if any were computed.
    pub fn results(&self) -> Option<&[MappingResult]> {
        match self {
            Self::Persistence { results, .. } | Self::Cancelled { results } => Some(results),
            Self::Import(_) | Self::NoValidData { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// One uploaded file plus the identity of whoever submitted it.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    pub content: String,
    pub filename: String,
    pub file_size: u64,
    pub user_id: String,
    /// Email placed in each CodeSystem contact.
    pub submitter_email: String,
}

#[derive(Debug, Clone)]
pub struct ProcessingOutput {
    pub file_id: Uuid,
    pub results: Vec<MappingResult>,
    pub summary: MappingSummary,
    pub bundle: Bundle,
}

/// Progress reported between batches.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    Parsed {
        total_rows: usize,
        skipped_lines: usize,
        delimiter: String,
    },
    Mapped {
        completed: usize,
        total: usize,
    },
    Persisting {
        stored: usize,
        total: usize,
    },
    Completed {
        summary: MappingSummary,
        duration_ms: u64,
    },
    Failed {
        error: String,
    },
}

/// Optional observer and cancellation flag for one run.
#[derive(Default, Clone, Copy)]
pub struct RunHooks<'a> {
    pub progress: Option<&'a dyn Fn(ProgressEvent)>,
    pub cancel: Option<&'a AtomicBool>,
}

impl RunHooks<'_> {
    fn emit(&self, event: ProgressEvent) {
        if let Some(progress) = self.progress {
            progress(event);
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

pub struct MappingProcessor {
    engine: MappingEngine,
    config: PipelineConfig,
}

impl MappingProcessor {
    pub fn new(engine: MappingEngine, config: PipelineConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    /// Read a file from disk and process it.
    pub fn process_file(
        &self,
        store: &dyn MappingStore,
        path: &Path,
        user_id: &str,
        submitter_email: &str,
        hooks: RunHooks<'_>,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let input = read_input(path, self.config.max_input_bytes)?;
        let request = ProcessingRequest {
            content: input.content,
            filename: input.filename,
            file_size: input.size_bytes,
            user_id: user_id.to_string(),
            submitter_email: submitter_email.to_string(),
        };
        self.process(store, &request, hooks)
    }

    pub fn process(
        &self,
        store: &dyn MappingStore,
        request: &ProcessingRequest,
        hooks: RunHooks<'_>,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let start = Instant::now();
        let filename = sanitize_filename(&request.filename);

        let table = parse_table(&request.content);
        if table.rows.is_empty() {
            tracing::warn!(filename = %filename, "No valid rows in upload");
            let err = ProcessingError::NoValidData { filename };
            hooks.emit(ProgressEvent::Failed {
                error: err.to_string(),
            });
            return Err(err);
        }

        let total = table.rows.len();
        hooks.emit(ProgressEvent::Parsed {
            total_rows: total,
            skipped_lines: table.skipped_lines,
            delimiter: table.delimiter.as_str().to_string(),
        });

        let batch_size = self.config.batch_size_for(total);
        let mut results = Vec::with_capacity(total);
        for batch in table.rows.chunks(batch_size) {
            if hooks.cancelled() {
                tracing::info!(completed = results.len(), total, "Processing cancelled");
                let err = ProcessingError::Cancelled { results };
                hooks.emit(ProgressEvent::Failed {
                    error: err.to_string(),
                });
                return Err(err);
            }
            results.extend(self.engine.map_batch(batch));
            tracing::debug!(completed = results.len(), total, "Mapped batch");
            hooks.emit(ProgressEvent::Mapped {
                completed: results.len(),
                total,
            });
        }

        let file_id = match self.persist(store, request, &filename, &results, &hooks) {
            Ok(id) => id,
            Err(source) => {
                tracing::warn!(filename = %filename, error = %source, "Persisting mappings failed");
                hooks.emit(ProgressEvent::Failed {
                    error: source.to_string(),
                });
                return Err(ProcessingError::Persistence { source, results });
            }
        };

        let summary = MappingSummary::from_results(&results);
        let bundle = bundle::generate(&results, &request.submitter_email);
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            file_id = %file_id,
            total = summary.total,
            mapped = summary.mapped,
            partial = summary.partial,
            unmapped = summary.unmapped,
            duration_ms,
            "Processing complete"
        );
        hooks.emit(ProgressEvent::Completed {
            summary: summary.clone(),
            duration_ms,
        });

        Ok(ProcessingOutput {
            file_id,
            results,
            summary,
            bundle,
        })
    }

    /// Record the upload and write its rows. On failure after the record
    /// exists, it is marked `failed` on a best-effort basis.
    fn persist(
        &self,
        store: &dyn MappingStore,
        request: &ProcessingRequest,
        filename: &str,
        results: &[MappingResult],
        hooks: &RunHooks<'_>,
    ) -> Result<Uuid, DatabaseError> {
        let file = store.create_file_record(&request.user_id, filename, request.file_size, results.len() as u32)?;

        let mut stored = 0;
        let written = self
            .write_rows(store, &file.id, &request.user_id, results, &mut stored, hooks)
            .and_then(|()| store.update_file_status(&file.id, ProcessingStatus::Completed, stored as u32));

        if let Err(e) = written {
            if let Err(mark) = store.update_file_status(&file.id, ProcessingStatus::Failed, stored as u32) {
                tracing::warn!(file_id = %file.id, error = %mark, "Could not mark file as failed");
            }
            return Err(e);
        }
        Ok(file.id)
    }

    /// Insert rows in chunks. `stored` counts rows committed so far.
    fn write_rows(
        &self,
        store: &dyn MappingStore,
        file_id: &Uuid,
        user_id: &str,
        results: &[MappingResult],
        stored: &mut usize,
        hooks: &RunHooks<'_>,
    ) -> Result<(), DatabaseError> {
        let total = results.len();
        let chunk_size = self.config.insert_chunk();
        for (chunk_index, chunk) in results.chunks(chunk_size).enumerate() {
            store.insert_mappings(file_id, user_id, chunk_index * chunk_size, chunk)?;
            *stored += chunk.len();
            hooks.emit(ProgressEvent::Persisting { stored: *stored, total });
        }
        Ok(())
    }
}

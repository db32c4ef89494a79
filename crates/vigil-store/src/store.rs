//! The report store facade.
//!
//! [`ReportStore`] owns the database and exposes every operation callers
//! need: ingesting analyzer batches, tagging, snapshot access, review
//! statuses, source components, comments, and retention. Write operations
//! serialize on the single write connection; snapshot reads go through the
//! read pool.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;
use vigil_core::config::VigilConfig;
use vigil_core::errors::StoreError;
use vigil_core::types::{
    BugId, Comment, IngestBatch, IngestOutcome, IngestRecord, Report, ReviewRecord, ReviewStatus,
    Run, SnapshotId, SourceComponent, Tag,
};

use crate::connection::writer::with_immediate_transaction;
use crate::connection::Database;
use crate::ingest::{self, RunLocks};
use crate::queries::components::ComponentRow;
use crate::queries::{comments, components, ingest_history, reports, review, runs, tags};
use crate::retention::{self, RetentionPolicy, RetentionReport};

/// Milliseconds since the Unix epoch.
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub struct ReportStore {
    db: Database,
    config: VigilConfig,
    run_locks: RunLocks,
}

impl ReportStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path, config: VigilConfig) -> Result<Self, StoreError> {
        let db = Database::open(path, &config.store)?;
        Ok(Self {
            db,
            config,
            run_locks: RunLocks::new(),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory(config: VigilConfig) -> Result<Self, StoreError> {
        let db = Database::open_in_memory(&config.store)?;
        Ok(Self {
            db,
            config,
            run_locks: RunLocks::new(),
        })
    }

    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    // ─── Ingestion ───────────────────────────────────────────────────────

    /// Ingest an analyzer batch into its run, creating the run on first use.
    pub fn ingest(&self, batch: IngestBatch) -> Result<IngestOutcome, StoreError> {
        self.ingest_at(batch, now_ms())
    }

    /// Like [`ingest`](Self::ingest) with an explicit timestamp, so tests
    /// and replays control `detected_at`/`fixed_at` stamps.
    pub fn ingest_at(&self, batch: IngestBatch, now: i64) -> Result<IngestOutcome, StoreError> {
        ingest::ingest_at(&self.db, &self.config, &self.run_locks, batch, now)
    }

    // ─── Runs ────────────────────────────────────────────────────────────

    /// All runs, ordered by name.
    pub fn list_runs(&self) -> Result<Vec<Run>, StoreError> {
        self.db.with_reader(runs::list)
    }

    pub fn run_by_name(&self, run_name: &str) -> Result<Option<Run>, StoreError> {
        self.db.with_reader(|conn| runs::by_name(conn, run_name))
    }

    /// The queryable head of a run.
    pub fn head_of(&self, run_name: &str) -> Result<SnapshotId, StoreError> {
        let run = self.require_run(run_name)?;
        Ok(SnapshotId::RunHead(run.id))
    }

    /// Delete a run and everything hanging off it.
    pub fn delete_run(&self, run_name: &str) -> Result<(), StoreError> {
        self.db.with_writer(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            runs::delete(conn, run.id)?;
            info!(run = %run_name, "deleted run");
            Ok(())
        })
    }

    /// Ingest records of a run, newest first.
    pub fn ingest_history(&self, run_name: &str) -> Result<Vec<IngestRecord>, StoreError> {
        self.db.with_reader(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            ingest_history::for_run(conn, run.id)
        })
    }

    // ─── Tags ────────────────────────────────────────────────────────────

    /// Freeze the run's current head under a name unique within the run.
    pub fn create_tag(&self, run_name: &str, tag_name: &str) -> Result<Tag, StoreError> {
        self.create_tag_at(run_name, tag_name, now_ms())
    }

    pub fn create_tag_at(
        &self,
        run_name: &str,
        tag_name: &str,
        now: i64,
    ) -> Result<Tag, StoreError> {
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let run =
                    runs::by_name(tx, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                        run: run_name.to_string(),
                    })?;
                if tags::by_name(tx, run.id, tag_name)?.is_some() {
                    return Err(StoreError::TagAlreadyExists {
                        run: run_name.to_string(),
                        name: tag_name.to_string(),
                    });
                }
                let tag_id = tags::insert(tx, run.id, tag_name, now)?;
                let frozen = tags::copy_head(tx, tag_id, run.id)?;
                info!(run = %run_name, tag = %tag_name, frozen, "created tag");
                Ok(Tag {
                    id: tag_id,
                    run_id: run.id,
                    name: tag_name.to_string(),
                    created_at: now,
                })
            })
        })
    }

    /// Tags of a run, oldest first.
    pub fn list_tags(&self, run_name: &str) -> Result<Vec<Tag>, StoreError> {
        self.db.with_reader(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            tags::list(conn, run.id)
        })
    }

    /// The queryable snapshot frozen under a tag.
    pub fn tag_of(&self, run_name: &str, tag_name: &str) -> Result<SnapshotId, StoreError> {
        let tag = self.require_tag(run_name, tag_name)?;
        Ok(SnapshotId::Tag(tag.id))
    }

    /// Delete a tag and its frozen reports. The run's head is untouched.
    pub fn delete_tag(&self, run_name: &str, tag_name: &str) -> Result<(), StoreError> {
        self.db.with_writer(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            let tag =
                tags::by_name(conn, run.id, tag_name)?.ok_or_else(|| StoreError::TagNotFound {
                    tag: tag_name.to_string(),
                })?;
            tags::delete(conn, tag.id)?;
            info!(run = %run_name, tag = %tag_name, "deleted tag");
            Ok(())
        })
    }

    // ─── Snapshots ───────────────────────────────────────────────────────

    /// Every report of a snapshot, ordered by (file_path, line, id).
    ///
    /// Run heads include settled rows (`resolved`, `off`, `unavailable`);
    /// filtering them away is the query layer's default. Tag reports are
    /// frozen payloads with the run's live review statuses joined in.
    pub fn get_snapshot(&self, snapshot: SnapshotId) -> Result<Vec<Report>, StoreError> {
        match snapshot {
            SnapshotId::RunHead(run_id) => self.db.with_reader(|conn| {
                if runs::by_id(conn, run_id)?.is_none() {
                    return Err(StoreError::RunNotFound {
                        run: run_id.to_string(),
                    });
                }
                reports::head_reports(conn, run_id)
            }),
            SnapshotId::Tag(tag_id) => self.db.with_reader(|conn| {
                if tags::by_id(conn, tag_id)?.is_none() {
                    return Err(StoreError::TagNotFound {
                        tag: tag_id.to_string(),
                    });
                }
                tags::tag_reports(conn, tag_id)
            }),
        }
    }

    // ─── Review statuses ─────────────────────────────────────────────────

    /// Set the review verdict for one identity within a run.
    ///
    /// The identity must appear in the run's head or in one of its tags.
    /// The verdict is keyed on the identity, not the report row, so it
    /// survives resolve/reopen cycles and re-ingests.
    pub fn set_review_status(
        &self,
        run_name: &str,
        bug_id: BugId,
        status: ReviewStatus,
        author: &str,
        message: Option<&str>,
    ) -> Result<(), StoreError> {
        self.set_review_status_at(run_name, bug_id, status, author, message, now_ms())
    }

    pub fn set_review_status_at(
        &self,
        run_name: &str,
        bug_id: BugId,
        status: ReviewStatus,
        author: &str,
        message: Option<&str>,
        now: i64,
    ) -> Result<(), StoreError> {
        self.db.with_writer(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            self.require_identity(conn, &run, bug_id)?;
            review::upsert(conn, run.id, bug_id, status, author, message, now)
        })
    }

    /// The stored verdict for one identity, if any was ever set.
    pub fn review_status(
        &self,
        run_name: &str,
        bug_id: BugId,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        self.db.with_reader(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            review::get(conn, run.id, bug_id)
        })
    }

    // ─── Source components ───────────────────────────────────────────────

    /// Register a named pattern list. Pattern syntax is not validated here;
    /// the query layer compiles patterns when a filter first uses them.
    pub fn add_component(
        &self,
        name: &str,
        patterns: &[String],
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        self.db.with_writer(|conn| {
            if components::get(conn, name)?.is_some() {
                return Err(StoreError::ComponentAlreadyExists {
                    name: name.to_string(),
                });
            }
            components::insert(conn, name, patterns, description, now_ms())?;
            Ok(())
        })
    }

    pub fn list_components(&self) -> Result<Vec<SourceComponent>, StoreError> {
        self.db.with_reader(components::list)
    }

    /// A component plus the row id compiled-matcher caches key on.
    pub fn component(&self, name: &str) -> Result<Option<ComponentRow>, StoreError> {
        self.db.with_reader(|conn| components::get(conn, name))
    }

    pub fn remove_component(&self, name: &str) -> Result<(), StoreError> {
        self.db.with_writer(|conn| {
            if !components::delete(conn, name)? {
                return Err(StoreError::ComponentNotFound {
                    name: name.to_string(),
                });
            }
            Ok(())
        })
    }

    // ─── Comments ────────────────────────────────────────────────────────

    /// Attach a triage note to one identity within a run. Returns the
    /// comment id. The identity must appear in the run's head or tags.
    pub fn add_comment(
        &self,
        run_name: &str,
        bug_id: BugId,
        author: &str,
        message: &str,
    ) -> Result<i64, StoreError> {
        self.db.with_writer(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            self.require_identity(conn, &run, bug_id)?;
            comments::insert(conn, run.id, bug_id, author, message, now_ms())
        })
    }

    /// Comments on one identity, oldest first.
    pub fn comments(&self, run_name: &str, bug_id: BugId) -> Result<Vec<Comment>, StoreError> {
        self.db.with_reader(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            comments::for_bug(conn, run.id, bug_id)
        })
    }

    pub fn remove_comment(&self, comment_id: i64) -> Result<(), StoreError> {
        self.db.with_writer(|conn| {
            if !comments::delete(conn, comment_id)? {
                return Err(StoreError::CommentNotFound { id: comment_id });
            }
            Ok(())
        })
    }

    // ─── Maintenance ─────────────────────────────────────────────────────

    /// Run a retention pass with the given policy.
    pub fn apply_retention(&self, policy: &RetentionPolicy) -> Result<RetentionReport, StoreError> {
        self.apply_retention_at(policy, now_ms())
    }

    pub fn apply_retention_at(
        &self,
        policy: &RetentionPolicy,
        now: i64,
    ) -> Result<RetentionReport, StoreError> {
        self.db
            .with_writer(|conn| retention::apply_retention(conn, policy, now))
    }

    /// Truncate the WAL into the main database file.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        self.db.checkpoint()
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn require_run(&self, run_name: &str) -> Result<Run, StoreError> {
        self.db.with_reader(|conn| {
            runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })
        })
    }

    fn require_tag(&self, run_name: &str, tag_name: &str) -> Result<Tag, StoreError> {
        self.db.with_reader(|conn| {
            let run = runs::by_name(conn, run_name)?.ok_or_else(|| StoreError::RunNotFound {
                run: run_name.to_string(),
            })?;
            tags::by_name(conn, run.id, tag_name)?.ok_or_else(|| StoreError::TagNotFound {
                tag: tag_name.to_string(),
            })
        })
    }

    fn require_identity(
        &self,
        conn: &rusqlite::Connection,
        run: &Run,
        bug_id: BugId,
    ) -> Result<(), StoreError> {
        let known = reports::identity_in_head(conn, run.id, bug_id)?
            || tags::identity_in_tags(conn, run.id, bug_id)?;
        if !known {
            return Err(StoreError::ReportNotFound {
                run: run.name.clone(),
                bug_id: bug_id.to_hex(),
            });
        }
        Ok(())
    }
}

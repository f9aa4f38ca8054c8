//! libSQL storage layer for ContentForge.
//!
//! The [`Storage`] struct wraps a libSQL database holding JSON documents
//! (content items, the content definitions document) and the rows derived
//! from them by map indexes.
//!
//! **Access rules:**
//! - Site operations: read-write via [`Storage::open`]
//! - Reporting/inspection: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::Utc;
use contentforge_indexing::IndexRecord;
use contentforge_shared::{ContentForgeError, Result};
use libsql::{Connection, Database, Transaction, params};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

/// A stored JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub collection: String,
    pub id: String,
    /// Raw JSON text.
    pub content: String,
    pub updated_at: String,
}

/// A stored map index row.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub document_id: String,
    pub record: IndexRecord,
}

/// One document to write with [`Storage::write_documents`].
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub collection: String,
    pub id: String,
    /// Raw JSON text.
    pub content: String,
    /// Replacement index rows for the document; `None` leaves its rows alone.
    pub index_rows: Option<Vec<IndexRecord>>,
}

impl DocumentWrite {
    /// A document write that leaves index rows untouched.
    pub fn document(collection: &str, id: &str, content: String) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            content,
            index_rows: None,
        }
    }

    /// Also replace the document's index rows with `records`.
    pub fn with_index_rows(mut self, records: Vec<IndexRecord>) -> Self {
        self.index_rows = Some(records);
        self
    }
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ContentForgeError::io(parent, e))?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        Self::from_database(db, false, true).await
    }

    /// Open a private in-memory database (tests, dry runs).
    pub async fn open_in_memory() -> Result<Self> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        Self::from_database(db, false, true).await
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        Self::from_database(db, true, false).await
    }

    async fn from_database(db: Database, readonly: bool, migrate: bool) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        let storage = Self { db, conn, readonly };
        if migrate {
            storage.run_migrations().await?;
        }
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        ContentForgeError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(ContentForgeError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Document operations
    // -----------------------------------------------------------------------

    /// Insert or replace a document by `collection + id`.
    pub async fn upsert_document(&self, collection: &str, id: &str, content: &str) -> Result<()> {
        self.check_writable()?;
        upsert_document(&self.conn, collection, id, content).await
    }

    /// Write documents and their index rows in one transaction.
    ///
    /// Either every write is committed or none is.
    pub async fn write_documents(&self, writes: &[DocumentWrite]) -> Result<()> {
        self.check_writable()?;
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        let result = async {
            for write in writes {
                upsert_document(&tx, &write.collection, &write.id, &write.content).await?;
                if let Some(records) = &write.index_rows {
                    replace_index_rows(&tx, &write.id, records).await?;
                }
            }
            Ok::<(), ContentForgeError>(())
        }
        .await;

        finish(tx, result).await?;
        tracing::debug!(documents = writes.len(), "committed document batch");
        Ok(())
    }

    /// Get a document by collection and ID.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        let mut rows = self
            .conn
            .query(
                "SELECT collection, id, content, updated_at FROM documents
                 WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_document(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(ContentForgeError::Storage(e.to_string())),
        }
    }

    /// List every document in a collection, ordered by ID.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let mut rows = self
            .conn
            .query(
                "SELECT collection, id, content, updated_at FROM documents
                 WHERE collection = ?1 ORDER BY id",
                params![collection],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            results.push(row_to_document(&row)?);
        }
        Ok(results)
    }

    /// Delete a document. Returns whether a document was removed.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        self.check_writable()?;
        let affected = self
            .conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    // -----------------------------------------------------------------------
    // Map index operations
    // -----------------------------------------------------------------------

    /// Replace every index row of `document_id` with `records`, atomically.
    pub async fn replace_index_rows(&self, document_id: &str, records: &[IndexRecord]) -> Result<()> {
        self.check_writable()?;
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        let result = replace_index_rows(&tx, document_id, records).await;
        finish(tx, result).await?;
        tracing::debug!(document_id, rows = records.len(), "replaced index rows");
        Ok(())
    }

    /// Remove every index row of `document_id`.
    pub async fn delete_index_rows(&self, document_id: &str) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "DELETE FROM map_index WHERE document_id = ?1",
                params![document_id],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Remove every row of an index (before a rebuild).
    pub async fn clear_index(&self, index_name: &str) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "DELETE FROM map_index WHERE index_name = ?1",
                params![index_name],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// List the rows of an index, ordered by document ID.
    pub async fn list_index_rows(&self, index_name: &str) -> Result<Vec<IndexRow>> {
        let mut rows = self
            .conn
            .query(
                "SELECT document_id, index_name, values_json FROM map_index
                 WHERE index_name = ?1 ORDER BY document_id",
                params![index_name],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = next_row(&mut rows).await? {
            results.push(row_to_index_row(&row)?);
        }
        Ok(results)
    }

    /// Document IDs whose `index_name` row has `column == value`.
    pub async fn query_index(
        &self,
        index_name: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<String>> {
        if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ContentForgeError::validation(format!(
                "invalid index column '{column}'"
            )));
        }
        let path = format!("$.{column}");

        let mut rows = self
            .conn
            .query(
                "SELECT document_id FROM map_index
                 WHERE index_name = ?1 AND json_extract(values_json, ?2) = ?3
                 ORDER BY document_id",
                params![index_name, path.as_str(), value],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        collect_ids(&mut rows).await
    }

    /// Document IDs placed in `zone`, read through the `layer_metadata_index` view.
    pub async fn layer_zone_documents(&self, zone: &str) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT document_id FROM layer_metadata_index WHERE zone = ?1 ORDER BY document_id",
                params![zone],
            )
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

        collect_ids(&mut rows).await
    }
}

async fn upsert_document(conn: &Connection, collection: &str, id: &str, content: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO documents (collection, id, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(collection, id) DO UPDATE SET
           content = excluded.content,
           updated_at = excluded.updated_at",
        params![collection, id, content, now.as_str(), now.as_str()],
    )
    .await
    .map_err(|e| ContentForgeError::Storage(e.to_string()))?;
    Ok(())
}

async fn replace_index_rows(conn: &Connection, document_id: &str, records: &[IndexRecord]) -> Result<()> {
    conn.execute(
        "DELETE FROM map_index WHERE document_id = ?1",
        params![document_id],
    )
    .await
    .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

    for record in records {
        let values = serde_json::to_string(&record.values)?;
        conn.execute(
            "INSERT INTO map_index (index_name, document_id, values_json) VALUES (?1, ?2, ?3)",
            params![record.index_name.as_str(), document_id, values.as_str()],
        )
        .await
        .map_err(|e| ContentForgeError::Storage(e.to_string()))?;
    }
    Ok(())
}

/// Commit `tx` if `result` is `Ok`, roll it back otherwise.
async fn finish(tx: Transaction, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => tx
            .commit()
            .await
            .map_err(|e| ContentForgeError::Storage(e.to_string())),
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}

async fn next_row(rows: &mut libsql::Rows) -> Result<Option<libsql::Row>> {
    rows.next()
        .await
        .map_err(|e| ContentForgeError::Storage(e.to_string()))
}

/// Collect the first column of every row as a document ID.
async fn collect_ids(rows: &mut libsql::Rows) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    while let Some(row) = next_row(rows).await? {
        ids.push(
            row.get::<String>(0)
                .map_err(|e| ContentForgeError::Storage(e.to_string()))?,
        );
    }
    Ok(ids)
}

/// Convert a database row to a [`StoredDocument`].
fn row_to_document(row: &libsql::Row) -> Result<StoredDocument> {
    Ok(StoredDocument {
        collection: row
            .get::<String>(0)
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?,
        id: row
            .get::<String>(1)
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?,
        content: row
            .get::<String>(2)
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?,
        updated_at: row
            .get::<String>(3)
            .map_err(|e| ContentForgeError::Storage(e.to_string()))?,
    })
}

/// Convert a database row to an [`IndexRow`].
fn row_to_index_row(row: &libsql::Row) -> Result<IndexRow> {
    let document_id: String = row
        .get(0)
        .map_err(|e| ContentForgeError::Storage(e.to_string()))?;
    let index_name: String = row
        .get(1)
        .map_err(|e| ContentForgeError::Storage(e.to_string()))?;
    let values_json: String = row
        .get(2)
        .map_err(|e| ContentForgeError::Storage(e.to_string()))?;

    Ok(IndexRow {
        document_id,
        record: IndexRecord {
            index_name,
            values: serde_json::from_str(&values_json)?,
        },
    })
}

//! SQL migration definitions for the ContentForge database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: documents, map_index",
            sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- JSON documents (content items, definitions), grouped by collection
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id         TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

-- Derived map index rows, one per (index, document)
CREATE TABLE IF NOT EXISTS map_index (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    index_name  TEXT NOT NULL,
    document_id TEXT NOT NULL,
    values_json TEXT NOT NULL,
    UNIQUE(index_name, document_id)
);

CREATE INDEX IF NOT EXISTS idx_map_index_document ON map_index(document_id);
CREATE INDEX IF NOT EXISTS idx_map_index_name ON map_index(index_name);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Relational view over LayerMetadataIndex rows",
            sql: r#"
CREATE VIEW IF NOT EXISTS layer_metadata_index AS
    SELECT document_id,
           json_extract(values_json, '$.Zone') AS zone
    FROM map_index
    WHERE index_name = 'LayerMetadataIndex';

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
    ]
}

//! Database schema and migrations.
//!
//! Migrations are applied in order when the database is opened. The
//! schema_version table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: applicant records
    r#"
CREATE TABLE applicants (
    id                  TEXT PRIMARY KEY,          -- UUID v4, used in share links
    name                TEXT NOT NULL,
    passport_number     TEXT NOT NULL,
    doc_password        TEXT NOT NULL,             -- plaintext or Argon2 PHC string
    password_scheme     TEXT NOT NULL DEFAULT 'plain',
    file_path           TEXT NOT NULL,             -- address returned by intake
    file_name           TEXT NOT NULL,             -- original filename
    file_type           TEXT NOT NULL,
    file_size           INTEGER NOT NULL,
    status              TEXT NOT NULL DEFAULT 'Approved',
    created_by          TEXT,
    created_at          INTEGER NOT NULL,          -- Unix milliseconds
    updated_at          INTEGER,
    searchable_passport TEXT NOT NULL,
    searchable_name     TEXT NOT NULL
);

CREATE INDEX idx_applicants_created_at ON applicants(created_at);
CREATE INDEX idx_applicants_status ON applicants(status);
"#,
];

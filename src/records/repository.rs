//! Applicant repository.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::model::{
    searchable, ApplicantFilter, ApplicantRecord, ApplicantStatus, ApplicantUpdate, NewApplicant,
    StatusCounts,
};
use crate::access::{DocumentSecret, PasswordScheme};
use crate::db::DbPool;
use crate::Result;

const SELECT_COLUMNS: &str = "SELECT id, name, passport_number, doc_password, password_scheme,
        file_path, file_name, file_type, file_size, status, created_by,
        created_at, updated_at, searchable_passport, searchable_name
     FROM applicants";

/// Raw applicant row.
#[derive(Debug, sqlx::FromRow)]
struct ApplicantRow {
    id: String,
    name: String,
    passport_number: String,
    doc_password: String,
    password_scheme: String,
    file_path: String,
    file_name: String,
    file_type: String,
    file_size: i64,
    status: String,
    created_by: Option<String>,
    created_at: i64,
    updated_at: Option<i64>,
    searchable_passport: String,
    searchable_name: String,
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

impl From<ApplicantRow> for ApplicantRecord {
    fn from(row: ApplicantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            passport_number: row.passport_number,
            secret: DocumentSecret::from_parts(
                PasswordScheme::from_db(&row.password_scheme),
                row.doc_password,
            ),
            file_path: row.file_path,
            file_name: row.file_name,
            file_type: row.file_type,
            file_size: row.file_size,
            // Unknown values from older rows fall back to the default.
            status: row.status.parse().unwrap_or_default(),
            created_by: row.created_by,
            created_at: from_millis(row.created_at),
            updated_at: row.updated_at.map(from_millis),
            searchable_passport: row.searchable_passport,
            searchable_name: row.searchable_name,
        }
    }
}

/// Repository for applicant records.
pub struct ApplicantRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ApplicantRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a record.
    pub async fn create(&self, new: &NewApplicant) -> Result<ApplicantRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();

        sqlx::query(
            "INSERT INTO applicants (
                id, name, passport_number, doc_password, password_scheme,
                file_path, file_name, file_type, file_size, status, created_by,
                created_at, searchable_passport, searchable_name
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.passport_number)
        .bind(new.secret.stored_value())
        .bind(new.secret.scheme().as_str())
        .bind(&new.file_path)
        .bind(&new.file_name)
        .bind(&new.file_type)
        .bind(new.file_size)
        .bind(new.status.as_str())
        .bind(&new.created_by)
        .bind(now)
        .bind(searchable(&new.passport_number))
        .bind(searchable(&new.name))
        .execute(self.pool)
        .await?;

        debug!(id = %id, "Applicant record created");

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| crate::PortalError::NotFound("Applicant".into()))
    }

    /// Get a record by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<ApplicantRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, ApplicantRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(ApplicantRecord::from))
    }

    /// List records, newest first.
    pub async fn list(&self, filter: &ApplicantFilter) -> Result<Vec<ApplicantRecord>> {
        let search = filter
            .search
            .as_deref()
            .map(searchable)
            .filter(|s| !s.is_empty());

        let mut sql = format!("{SELECT_COLUMNS} WHERE 1 = 1");
        if search.is_some() {
            sql.push_str(
                " AND (instr(searchable_name, ?) > 0 OR instr(searchable_passport, ?) > 0)",
            );
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut query = sqlx::query_as::<_, ApplicantRow>(&sql);
        if let Some(term) = &search {
            query = query.bind(term.clone()).bind(term.clone());
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }

        let rows = query.fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(ApplicantRecord::from).collect())
    }

    /// Count records per status.
    pub async fn status_counts(&self) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM applicants GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.total += count;
            match status.parse() {
                Ok(ApplicantStatus::Approved) => counts.approved += count,
                Ok(ApplicantStatus::Pending) => counts.pending += count,
                Ok(ApplicantStatus::Rejected) => counts.rejected += count,
                Err(_) => {}
            }
        }
        Ok(counts)
    }

    /// Apply an edit. Returns `None` if the record does not exist.
    ///
    /// The searchable mirrors and `updated_at` are refreshed on every edit.
    pub async fn update(
        &self,
        id: &str,
        update: &ApplicantUpdate,
    ) -> Result<Option<ApplicantRecord>> {
        let Some(current) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let name = update.name.as_ref().unwrap_or(&current.name);
        let passport_number = update
            .passport_number
            .as_ref()
            .unwrap_or(&current.passport_number);
        let secret = update.secret.as_ref().unwrap_or(&current.secret);
        let status = update.status.unwrap_or(current.status);

        sqlx::query(
            "UPDATE applicants SET
                name = ?, passport_number = ?, doc_password = ?, password_scheme = ?,
                status = ?, updated_at = ?, searchable_passport = ?, searchable_name = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(passport_number)
        .bind(secret.stored_value())
        .bind(secret.scheme().as_str())
        .bind(status.as_str())
        .bind(Utc::now().timestamp_millis())
        .bind(searchable(passport_number))
        .bind(searchable(name))
        .bind(id)
        .execute(self.pool)
        .await?;

        debug!(id = %id, "Applicant record updated");
        self.get_by_id(id).await
    }

    /// Delete a record. The stored file is left in place.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM applicants WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all records.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applicants")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn new_applicant(name: &str, passport: &str, status: ApplicantStatus) -> NewApplicant {
        NewApplicant {
            name: name.to_string(),
            passport_number: passport.to_string(),
            secret: DocumentSecret::Plain("1234".to_string()),
            file_path: format!("/uploads/{passport}/passport_1.pdf"),
            file_name: "passport.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            file_size: 2048,
            status,
            created_by: Some("admin@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());

        let record = repo
            .create(&new_applicant("Jane Doe", "AB123", ApplicantStatus::Approved))
            .await
            .unwrap();

        assert_eq!(record.id.len(), 36);
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.searchable_name, "jane doe");
        assert_eq!(record.searchable_passport, "ab123");
        assert_eq!(record.secret, DocumentSecret::Plain("1234".to_string()));
        assert_eq!(record.status, ApplicantStatus::Approved);
        assert_eq!(record.created_by.as_deref(), Some("admin@example.com"));
        assert!(record.updated_at.is_none());
        assert_eq!(record.share_path(), format!("/employer/document/{}", record.id));

        let found = repo.get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(found.file_path, "/uploads/AB123/passport_1.pdf");
        assert_eq!(found.file_size, 2048);
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());

        for (name, passport) in [("First", "P1"), ("Second", "P2"), ("Third", "P3")] {
            repo.create(&new_applicant(name, passport, ApplicantStatus::Approved))
                .await
                .unwrap();
        }

        let records = repo.list(&ApplicantFilter::default()).await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_list_search_case_insensitive() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());

        repo.create(&new_applicant("Jane Doe", "AB123", ApplicantStatus::Approved))
            .await
            .unwrap();
        repo.create(&new_applicant("John Smith", "XY789", ApplicantStatus::Pending))
            .await
            .unwrap();

        let by_name = repo
            .list(&ApplicantFilter {
                search: Some("JANE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Jane Doe");

        let by_passport = repo
            .list(&ApplicantFilter {
                search: Some("xy7".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_passport.len(), 1);
        assert_eq!(by_passport[0].passport_number, "XY789");

        let empty = repo
            .list(&ApplicantFilter {
                search: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(empty.len(), 2);

        // Whitespace is part of the term, not trimmed away
        let spaces = repo
            .list(&ApplicantFilter {
                search: Some("   ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(spaces.is_empty());

        let padded = repo
            .list(&ApplicantFilter {
                search: Some(" jane".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(padded.is_empty());

        let literal = repo
            .list(&ApplicantFilter {
                search: Some("%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(literal.is_empty());
    }

    #[tokio::test]
    async fn test_list_status_filter() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());

        repo.create(&new_applicant("A", "P1", ApplicantStatus::Approved))
            .await
            .unwrap();
        repo.create(&new_applicant("B", "P2", ApplicantStatus::Pending))
            .await
            .unwrap();
        repo.create(&new_applicant("C", "P3", ApplicantStatus::Pending))
            .await
            .unwrap();

        let pending = repo
            .list(&ApplicantFilter {
                status: Some(ApplicantStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|r| r.status == ApplicantStatus::Pending));

        let combined = repo
            .list(&ApplicantFilter {
                search: Some("b".to_string()),
                status: Some(ApplicantStatus::Pending),
            })
            .await
            .unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].name, "B");
    }

    #[tokio::test]
    async fn test_status_counts() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());

        assert_eq!(repo.status_counts().await.unwrap(), StatusCounts::default());

        repo.create(&new_applicant("A", "P1", ApplicantStatus::Approved))
            .await
            .unwrap();
        repo.create(&new_applicant("B", "P2", ApplicantStatus::Approved))
            .await
            .unwrap();
        repo.create(&new_applicant("C", "P3", ApplicantStatus::Pending))
            .await
            .unwrap();
        repo.create(&new_applicant("D", "P4", ApplicantStatus::Rejected))
            .await
            .unwrap();

        let counts = repo.status_counts().await.unwrap();
        assert_eq!(
            counts,
            StatusCounts {
                total: 4,
                approved: 2,
                pending: 1,
                rejected: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_update_refreshes_mirrors() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());
        let record = repo
            .create(&new_applicant("Jane Doe", "AB123", ApplicantStatus::Approved))
            .await
            .unwrap();

        let updated = repo
            .update(
                &record.id,
                &ApplicantUpdate {
                    name: Some("Jane Q. Public".to_string()),
                    passport_number: Some("ZZ999".to_string()),
                    secret: Some(DocumentSecret::Plain("new-pass".to_string())),
                    status: Some(ApplicantStatus::Rejected),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Jane Q. Public");
        assert_eq!(updated.searchable_name, "jane q. public");
        assert_eq!(updated.searchable_passport, "zz999");
        assert_eq!(updated.secret, DocumentSecret::Plain("new-pass".to_string()));
        assert_eq!(updated.status, ApplicantStatus::Rejected);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.file_path, record.file_path);
        assert_eq!(updated.created_at, record.created_at);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());
        let record = repo
            .create(&new_applicant("Jane Doe", "AB123", ApplicantStatus::Approved))
            .await
            .unwrap();

        let updated = repo
            .update(
                &record.id,
                &ApplicantUpdate {
                    status: Some(ApplicantStatus::Pending),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.passport_number, "AB123");
        assert_eq!(updated.secret, record.secret);
        assert_eq!(updated.status, ApplicantStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_unknown() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());
        let result = repo
            .update("missing", &ApplicantUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_hashed_secret_persists_scheme() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());

        let mut new = new_applicant("Jane", "AB1", ApplicantStatus::Approved);
        new.secret = DocumentSecret::new("1234", true).unwrap();
        let record = repo.create(&new).await.unwrap();

        let found = repo.get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(found.secret.scheme(), PasswordScheme::Argon2);
        assert!(found.secret.authorize("1234").is_granted());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = ApplicantRepository::new(db.pool());
        let record = repo
            .create(&new_applicant("Jane", "AB1", ApplicantStatus::Approved))
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.delete(&record.id).await.unwrap());
        assert!(!repo.delete(&record.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}

//! Relational storage for patient records.

use crate::patient::{NewPatient, Patient};
use crate::repositories::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

/// Durable storage of patient records.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Assigns an identifier and timestamps, then stores the patient.
    ///
    /// Fails with `StoreError::UniqueViolation` if the email is already taken.
    async fn create(&self, patient: NewPatient) -> StoreResult<Patient>;

    /// Fails with `StoreError::NotFound` if no patient has this identifier.
    async fn get(&self, id: i64) -> StoreResult<Patient>;

    /// Patients by ascending identifier, skipping `offset` and returning at most `limit`.
    async fn list(&self, offset: u32, limit: u32) -> StoreResult<Vec<Patient>>;
}

#[derive(sqlx::FromRow)]
struct PatientRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    address: Option<String>,
    emergency_contact: Option<String>,
    medical_info: Option<String>,
    preferences: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn decode_json(raw: Option<String>) -> StoreResult<Option<serde_json::Value>> {
    Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
}

fn encode_json(value: Option<&serde_json::Value>) -> StoreResult<Option<String>> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

impl TryFrom<PatientRow> for Patient {
    type Error = StoreError;

    fn try_from(row: PatientRow) -> StoreResult<Self> {
        Ok(Patient {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            address: row.address,
            emergency_contact: decode_json(row.emergency_contact)?,
            medical_info: decode_json(row.medical_info)?,
            preferences: decode_json(row.preferences)?,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// sqlite implementation of [`PatientRepository`].
#[derive(Clone)]
pub struct SqlitePatientRepository {
    pool: SqlitePool,
    max_list_limit: u32,
}

impl SqlitePatientRepository {
    /// # Arguments
    /// * `pool` - Shared connection pool; each call acquires and releases its own connection
    /// * `max_list_limit` - Upper bound applied to `limit` in [`PatientRepository::list`]
    pub fn new(pool: SqlitePool, max_list_limit: u32) -> Self {
        Self {
            pool,
            max_list_limit,
        }
    }
}

#[async_trait]
impl PatientRepository for SqlitePatientRepository {
    async fn create(&self, patient: NewPatient) -> StoreResult<Patient> {
        let emergency_contact = encode_json(patient.emergency_contact.as_ref())?;
        let medical_info = encode_json(patient.medical_info.as_ref())?;
        let preferences = encode_json(patient.preferences.as_ref())?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let row: PatientRow = sqlx::query_as(
            r#"
INSERT INTO patients (
    first_name, last_name, email, phone, date_of_birth, gender, address,
    emergency_contact, medical_info, preferences, status, created_at, updated_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING id, first_name, last_name, email, phone, date_of_birth, gender, address,
    emergency_contact, medical_info, preferences, status, created_at, updated_at
            "#,
        )
        .bind(patient.first_name.into_inner())
        .bind(patient.last_name.into_inner())
        .bind(patient.email.map(|e| e.into_inner()))
        .bind(patient.phone)
        .bind(patient.date_of_birth)
        .bind(patient.gender)
        .bind(patient.address)
        .bind(emergency_contact)
        .bind(medical_info)
        .bind(preferences)
        .bind(patient.status.into_inner())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> StoreResult<Patient> {
        let row: Option<PatientRow> = sqlx::query_as(
            r#"
SELECT id, first_name, last_name, email, phone, date_of_birth, gender, address,
    emergency_contact, medical_info, preferences, status, created_at, updated_at
FROM patients
WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::NotFound { id })?.try_into()
    }

    async fn list(&self, offset: u32, limit: u32) -> StoreResult<Vec<Patient>> {
        let limit = limit.min(self.max_list_limit);
        let rows: Vec<PatientRow> = sqlx::query_as(
            r#"
SELECT id, first_name, last_name, email, phone, date_of_birth, gender, address,
    emergency_contact, medical_info, preferences, status, created_at, updated_at
FROM patients
ORDER BY id ASC
LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Patient::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use clinic_types::{EmailAddress, NonEmptyText};
    use std::sync::Arc;

    fn new_patient(first: &str, email: Option<&str>) -> NewPatient {
        NewPatient {
            first_name: NonEmptyText::new(first).unwrap(),
            last_name: NonEmptyText::new("Tester").unwrap(),
            email: email.map(|e| EmailAddress::parse(e).unwrap()),
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            emergency_contact: None,
            medical_info: None,
            preferences: None,
            status: NonEmptyText::new("active").unwrap(),
        }
    }

    async fn memory_repo(max_list_limit: u32) -> SqlitePatientRepository {
        let pool = db::connect("sqlite::memory:")
            .await
            .expect("pool should open");
        db::ensure_schema(&pool).await.expect("schema should apply");
        SqlitePatientRepository::new(pool, max_list_limit)
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let repo = memory_repo(100).await;

        let a = repo.create(new_patient("A", None)).await.unwrap();
        let b = repo.create(new_patient("B", None)).await.unwrap();

        assert!(a.id > 0);
        assert!(b.id > a.id);
        assert!(b.created_at >= a.created_at);
    }

    #[tokio::test]
    async fn failed_insert_leaves_no_row() {
        let repo = memory_repo(100).await;
        repo.create(new_patient("A", Some("a@example.com")))
            .await
            .unwrap();

        let err = repo
            .create(new_patient("B", Some("a@example.com")))
            .await
            .expect_err("duplicate email should fail");
        assert!(matches!(err, StoreError::UniqueViolation(_)), "got {err:?}");

        let all = repo.list(0, 100).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "A");
    }

    #[tokio::test]
    async fn list_applies_offset_and_caps_limit() {
        let repo = memory_repo(2).await;
        for name in ["A", "B", "C", "D"] {
            repo.create(new_patient(name, None)).await.unwrap();
        }

        let first_page = repo.list(0, 50).await.unwrap();
        assert_eq!(first_page.len(), 2, "limit should be capped at 2");
        assert_eq!(first_page[0].first_name, "A");

        let tail = repo.list(3, 2).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].first_name, "D");

        let past_end = repo.list(10, 2).await.unwrap();
        assert!(past_end.is_empty());

        let none = repo.list(0, 0).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let repo = memory_repo(100).await;
        let err = repo.get(7).await.expect_err("get should fail");
        assert!(matches!(err, StoreError::NotFound { id: 7 }));
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_email_admit_exactly_one() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("clinic.db").display());
        let pool = db::connect(&url).await.expect("pool should open");
        db::ensure_schema(&pool).await.expect("schema should apply");
        let repo = Arc::new(SqlitePatientRepository::new(pool, 100));

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(new_patient(&format!("P{i}"), Some("same@example.com")))
                    .await
            }));
        }

        let mut created = 0;
        let mut violations = 0;
        for handle in handles {
            match handle.await.expect("task should not panic") {
                Ok(_) => created += 1,
                Err(StoreError::UniqueViolation(_)) => violations += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(violations, 7);
    }
}

//! SQLite-backed job store.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Row, Sqlite};
use tokio::sync::Mutex;

use jobsheet_core::{
    DailyCounter, IntakeForm, JobCode, JobId, JobRecord, NewJobRecord, SearchFilter,
};

use super::{JobStore, StoreError};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS jobsheet (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        code          TEXT    NOT NULL UNIQUE,
        date          TEXT    NOT NULL,
        daily_counter INTEGER NOT NULL,
        customer_name TEXT    NOT NULL,
        phone         TEXT    NOT NULL,
        model         TEXT    NOT NULL,
        serial        TEXT    NOT NULL,
        symptom       TEXT    NOT NULL,
        created_at    TEXT    NOT NULL,
        UNIQUE (date, daily_counter)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_counters (
        date TEXT    PRIMARY KEY,
        last INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS jobsheet_created_at ON jobsheet (created_at)",
];

/// SQLite job store (WAL journal, NORMAL sync, 10s busy timeout).
///
/// Counter reservation is one upsert on `daily_counters` inside the same
/// transaction as the insert, so a failed insert gives the counter back.
/// Within one process reservations are also serialised by `reserve_lock`.
#[derive(Debug)]
pub struct SqliteJobStore {
    pool: SqlitePool,
    reserve_lock: Mutex<()>,
}

impl SqliteJobStore {
    /// Connect to a `sqlite://` URL, creating the database if missing.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| map_sqlx_error("parse_url", e))?;
        Self::connect_with(options).await
    }

    /// Open (or create) the database file at `path`.
    pub async fn connect_path(path: &Path) -> Result<Self, StoreError> {
        Self::connect_with(SqliteConnectOptions::new().filename(path)).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self {
            pool,
            reserve_lock: Mutex::new(()),
        };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        tracing::debug!("jobsheet schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn insert_row<'e, E>(executor: E, record: &NewJobRecord) -> Result<JobId, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO jobsheet (
            code, date, daily_counter, customer_name, phone, model, serial, symptom, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(record.code.as_str())
    .bind(date_key(record.date))
    .bind(i64::from(record.daily_counter.get()))
    .bind(&record.customer_name)
    .bind(&record.phone)
    .bind(&record.model)
    .bind(&record.serial)
    .bind(&record.symptom)
    .bind(timestamp_key(record.created_at))
    .execute(executor)
    .await
    .map_err(|e| map_sqlx_error("insert_jobsheet", e))?;

    Ok(JobId::new(result.last_insert_rowid()))
}

#[async_trait::async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, record: NewJobRecord) -> Result<JobId, StoreError> {
        insert_row(&self.pool, &record).await
    }

    async fn max_counter_for_date(&self, date: NaiveDate) -> Result<u32, StoreError> {
        let max: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(daily_counter), 0) FROM jobsheet WHERE date = ?1",
        )
        .bind(date_key(date))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("max_counter_for_date", e))?;

        u32::try_from(max).map_err(|_| StoreError::Corrupt(format!("daily counter out of range: {max}")))
    }

    async fn reserve_and_insert(
        &self,
        date: NaiveDate,
        form: IntakeForm,
        created_at: DateTime<Utc>,
    ) -> Result<JobRecord, StoreError> {
        let _guard = self.reserve_lock.lock().await;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Seed from the stored max so rows written through `insert` are
        // never re-issued.
        let reserved: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO daily_counters (date, last)
            VALUES (?1, (SELECT COALESCE(MAX(daily_counter), 0) FROM jobsheet WHERE date = ?1) + 1)
            ON CONFLICT (date) DO UPDATE SET last = MAX(daily_counters.last + 1, excluded.last)
            RETURNING last
            "#,
        )
        .bind(date_key(date))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("reserve_counter", e))?;

        let counter = u32::try_from(reserved)
            .ok()
            .and_then(DailyCounter::new)
            .ok_or_else(|| StoreError::Corrupt(format!("reserved counter out of range: {reserved}")))?;

        let record = NewJobRecord::sequenced(form, date, counter, created_at);
        let row_id = insert_row(&mut *tx, &record).await?;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        tracing::debug!(code = %record.code, %date, counter = counter.get(), "counter reserved");
        Ok(record.into_record(row_id))
    }

    async fn get_by_code(&self, code: &JobCode) -> Result<Option<JobRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, code, date, daily_counter, customer_name, phone, model, serial, symptom, created_at
            FROM jobsheet
            WHERE code = ?1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_by_code", e))?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn query(&self, filter: &SearchFilter) -> Result<Vec<JobRecord>, StoreError> {
        // instr() is case-sensitive, unlike LIKE. Phone digits are compared
        // in Rust because the stored text may contain separators.
        let rows = sqlx::query(
            r#"
            SELECT id, code, date, daily_counter, customer_name, phone, model, serial, symptom, created_at
            FROM jobsheet
            WHERE (?1 IS NULL OR instr(customer_name, ?1) > 0)
              AND (?2 IS NULL OR instr(serial, ?2) > 0)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.customer_term())
        .bind(filter.serial_term())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_jobsheets", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let record = row_to_record(row)?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Fixed-width UTC timestamps so text order equals time order.
fn timestamp_key(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_record(row: &SqliteRow) -> Result<JobRecord, StoreError> {
    let get_text = |col: &str| -> Result<String, StoreError> {
        row.try_get::<String, _>(col)
            .map_err(|e| StoreError::Corrupt(format!("{col}: {e}")))
    };

    let id: i64 = row
        .try_get("id")
        .map_err(|e| StoreError::Corrupt(format!("id: {e}")))?;
    let counter: i64 = row
        .try_get("daily_counter")
        .map_err(|e| StoreError::Corrupt(format!("daily_counter: {e}")))?;

    let code = JobCode::parse(&get_text("code")?).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let date_text = get_text("date")?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
        .map_err(|e| StoreError::Corrupt(format!("date {date_text:?}: {e}")))?;
    let daily_counter = u32::try_from(counter)
        .ok()
        .and_then(DailyCounter::new)
        .ok_or_else(|| StoreError::Corrupt(format!("daily_counter {counter}")))?;
    let created_text = get_text("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("created_at {created_text:?}: {e}")))?;

    Ok(JobRecord {
        row_id: JobId::new(id),
        code,
        date,
        daily_counter,
        customer_name: get_text("customer_name")?,
        phone: get_text("phone")?,
        model: get_text("model")?,
        serial: get_text("serial")?,
        symptom: get_text("symptom")?,
        created_at,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            if db_err.is_unique_violation() {
                return StoreError::Conflict(msg);
            }
            // SQLITE_BUSY / SQLITE_LOCKED, including extended codes.
            let primary = db_err
                .code()
                .and_then(|c| c.parse::<i32>().ok())
                .map(|c| c & 0xff);
            match primary {
                Some(5) | Some(6) => StoreError::Unavailable(msg),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        other => StoreError::Storage(format!("{operation}: {other}")),
    }
}

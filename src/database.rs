use chrono::{DateTime, Utc};
use mobc::{Manager, Pool};
use rusqlite::{params, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::email_extractor::ContactDraft;
use crate::enrichment::result::EnrichmentResult;
use crate::errors::EnrichmentError;

/// A company row as the enrichment engine sees it. Only the write-back
/// step mutates these columns, and never one that is already populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: i64,
    pub name: String,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub glassdoor_url: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub num_employees: Option<String>,
    pub is_enriched: bool,
    pub enriched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredContact {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStats {
    pub total_companies: i64,
    pub enriched_companies: i64,
    pub total_contacts: i64,
    pub enrichment_rate: f64,
}

pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    pub fn new(db_path: String) -> Self {
        debug!("creating SqliteManager for {}", db_path);
        Self { db_path }
    }
}

#[async_trait::async_trait]
impl Manager for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let conn = Connection::open(&self.db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        init_database(&conn)?;
        Ok(conn)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(conn)
    }
}

pub type DbPool = Pool<SqliteManager>;

pub async fn create_db_pool(
    db_path: &str,
) -> Result<DbPool, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let manager = SqliteManager::new(db_path.to_string());
    let pool = Pool::builder().max_open(10).max_idle(5).build(manager);

    // Fail fast on an unusable path.
    let conn = pool.get().await?;
    drop(conn);

    info!("database ready at {}", db_path);
    Ok(pool)
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    create_companies_table(conn)?;
    create_contacts_table(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_companies_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            name_normalized TEXT UNIQUE,
            website TEXT,
            linkedin_url TEXT,
            glassdoor_url TEXT,
            description TEXT,
            industry TEXT,
            num_employees TEXT,
            is_enriched BOOLEAN DEFAULT FALSE,
            enriched_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_contacts_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            position TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (company_id) REFERENCES companies (id) ON DELETE CASCADE,
            UNIQUE(company_id, email)
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_indexes(conn: &Connection) -> SqliteResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name)",
        "CREATE INDEX IF NOT EXISTS idx_companies_enriched ON companies(is_enriched)",
        "CREATE INDEX IF NOT EXISTS idx_contacts_company ON contacts(company_id)",
        "CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email)",
    ];
    for index_sql in indexes.iter() {
        conn.execute(index_sql, [])?;
    }
    Ok(())
}

const COMPANY_COLUMNS: &str = "id, name, website, linkedin_url, glassdoor_url, description, \
     industry, num_employees, is_enriched, enriched_at";

fn row_to_company(row: &rusqlite::Row<'_>) -> SqliteResult<CompanyRecord> {
    Ok(CompanyRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        website: row.get(2)?,
        linkedin_url: row.get(3)?,
        glassdoor_url: row.get(4)?,
        description: row.get(5)?,
        industry: row.get(6)?,
        num_employees: row.get(7)?,
        is_enriched: row.get(8)?,
        enriched_at: row
            .get::<_, Option<String>>(9)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

pub async fn get_company(
    pool: &DbPool,
    company_id: i64,
) -> Result<Option<CompanyRecord>, EnrichmentError> {
    let conn = pool.get().await?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies WHERE id = ?",
        COMPANY_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![company_id], row_to_company)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Look a company up by normalized name, inserting a bare row when it is
/// new. Used by the CLI so an enrichment can start from just a name.
pub async fn find_or_create_company(
    pool: &DbPool,
    name: &str,
) -> Result<CompanyRecord, EnrichmentError> {
    let conn = pool.get().await?;
    let normalized = normalize_name(name);
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO companies (name, name_normalized, created_at, updated_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(name_normalized) DO NOTHING",
        params![name, normalized, now, now],
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies WHERE name_normalized = ?",
        COMPANY_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![normalized], row_to_company)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(EnrichmentError::Database(format!(
            "failed to create company {}",
            name
        ))),
    }
}

pub async fn list_unenriched(
    pool: &DbPool,
    limit: usize,
) -> Result<Vec<CompanyRecord>, EnrichmentError> {
    let conn = pool.get().await?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies WHERE is_enriched = 0 ORDER BY id LIMIT ?",
        COMPANY_COLUMNS
    ))?;
    let rows = stmt.query_map(params![limit as i64], row_to_company)?;
    Ok(rows.collect::<SqliteResult<Vec<_>>>()?)
}

pub async fn list_enriched(pool: &DbPool) -> Result<Vec<CompanyRecord>, EnrichmentError> {
    let conn = pool.get().await?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies WHERE is_enriched = 1 ORDER BY name",
        COMPANY_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_company)?;
    Ok(rows.collect::<SqliteResult<Vec<_>>>()?)
}

pub async fn get_contacts(
    pool: &DbPool,
    company_id: i64,
) -> Result<Vec<StoredContact>, EnrichmentError> {
    let conn = pool.get().await?;
    let mut stmt = conn.prepare(
        "SELECT id, company_id, name, email, position, notes
         FROM contacts WHERE company_id = ? ORDER BY id",
    )?;
    let rows = stmt.query_map(params![company_id], |row| {
        Ok(StoredContact {
            id: row.get(0)?,
            company_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            position: row.get(4)?,
            notes: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<SqliteResult<Vec<_>>>()?)
}

/// Write enrichment output back to storage. Only columns that are empty
/// on the stored row are filled; `is_enriched`/`enriched_at` are always
/// stamped so a run counts as attempted even when it found nothing.
/// Returns the company columns actually written.
pub async fn persist_enrichment(
    pool: &DbPool,
    company_id: i64,
    result: &EnrichmentResult,
) -> Result<Vec<String>, EnrichmentError> {
    let current = get_company(pool, company_id)
        .await?
        .ok_or(EnrichmentError::CompanyNotFound(company_id))?;

    let conn = pool.get().await?;
    let candidates: [(&str, &Option<String>, &Option<String>); 6] = [
        ("website", &current.website, &result.website),
        ("linkedin_url", &current.linkedin_url, &result.linkedin_url),
        (
            "glassdoor_url",
            &current.glassdoor_url,
            &result.glassdoor_url,
        ),
        ("description", &current.description, &result.description),
        ("industry", &current.industry, &result.industry),
        (
            "num_employees",
            &current.num_employees,
            &result.num_employees,
        ),
    ];

    let mut set_clauses = Vec::new();
    let mut values: Vec<String> = Vec::new();
    let mut fields_written = Vec::new();
    for (column, current_value, new_value) in candidates {
        let occupied = current_value
            .as_deref()
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if occupied {
            continue;
        }
        if let Some(value) = new_value {
            set_clauses.push(format!("{} = ?", column));
            values.push(value.clone());
            fields_written.push(column.to_string());
        }
    }

    let now = Utc::now().to_rfc3339();
    set_clauses.push("is_enriched = 1".to_string());
    set_clauses.push("enriched_at = ?".to_string());
    values.push(now.clone());
    set_clauses.push("updated_at = ?".to_string());
    values.push(now);

    let sql = format!(
        "UPDATE companies SET {} WHERE id = ?",
        set_clauses.join(", ")
    );
    let mut sql_params: Vec<&dyn rusqlite::types::ToSql> = values
        .iter()
        .map(|v| v as &dyn rusqlite::types::ToSql)
        .collect();
    sql_params.push(&company_id);
    conn.execute(&sql, sql_params.as_slice())?;

    let inserted = insert_contacts(&conn, company_id, &result.contacts)?;
    debug!(
        "persisted company {}: wrote {:?}, {} new contacts",
        company_id, fields_written, inserted
    );
    Ok(fields_written)
}

/// Contact-only persistence for the enrich-from-text path.
pub async fn persist_contacts(
    pool: &DbPool,
    company_id: i64,
    contacts: &[ContactDraft],
) -> Result<usize, EnrichmentError> {
    let conn = pool.get().await?;
    Ok(insert_contacts(&conn, company_id, contacts)?)
}

fn insert_contacts(
    conn: &Connection,
    company_id: i64,
    contacts: &[ContactDraft],
) -> SqliteResult<usize> {
    let now = Utc::now().to_rfc3339();
    let mut inserted = 0;
    for contact in contacts {
        let notes: String = contact.context.chars().take(500).collect();
        let changed = conn.execute(
            "INSERT INTO contacts (company_id, name, email, position, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(company_id, email) DO NOTHING",
            params![
                company_id,
                contact_name_from_email(&contact.email),
                contact.email,
                contact.kind.as_str(),
                notes,
                now
            ],
        )?;
        inserted += changed;
    }
    Ok(inserted)
}

/// "jane.doe@acme.io" → "Jane Doe"; the best name available when only an
/// address was found.
pub fn contact_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split(['.', '_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clears the attempted-once marker so the next run may enrich again.
pub async fn reset_enrichment(pool: &DbPool, company_id: i64) -> Result<bool, EnrichmentError> {
    let conn = pool.get().await?;
    let now = Utc::now().to_rfc3339();
    let changed = conn.execute(
        "UPDATE companies SET is_enriched = 0, enriched_at = NULL, updated_at = ? WHERE id = ?",
        params![now, company_id],
    )?;
    Ok(changed > 0)
}

pub async fn get_database_stats(pool: &DbPool) -> Result<DatabaseStats, EnrichmentError> {
    let conn = pool.get().await?;
    let total_companies: i64 =
        conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
    let enriched_companies: i64 = conn.query_row(
        "SELECT COUNT(*) FROM companies WHERE is_enriched = 1",
        [],
        |row| row.get(0),
    )?;
    let total_contacts: i64 =
        conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;

    let enrichment_rate = if total_companies > 0 {
        enriched_companies as f64 / total_companies as f64 * 100.0
    } else {
        0.0
    };

    Ok(DatabaseStats {
        total_companies,
        enriched_companies,
        total_contacts,
        enrichment_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email_extractor::{ContactKind, ContactPriority};

    async fn test_pool() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enricher_test.db");
        let pool = create_db_pool(path.to_str().unwrap()).await.unwrap();
        (dir, pool)
    }

    fn draft(email: &str, kind: ContactKind) -> ContactDraft {
        ContactDraft {
            email: email.to_string(),
            kind,
            context: "found in test".to_string(),
            priority: ContactPriority::Low,
        }
    }

    #[tokio::test]
    async fn find_or_create_is_idempotent_by_normalized_name() {
        let (_dir, pool) = test_pool().await;
        let first = find_or_create_company(&pool, "Acme Inc.").await.unwrap();
        let second = find_or_create_company(&pool, "acme inc").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Acme Inc.");
    }

    #[tokio::test]
    async fn write_back_fills_only_empty_columns() {
        let (_dir, pool) = test_pool().await;
        let company = find_or_create_company(&pool, "Acme").await.unwrap();

        let mut first = EnrichmentResult::new();
        first.website = Some("https://acme.io".to_string());
        first.description = Some("first description".to_string());
        let written = persist_enrichment(&pool, company.id, &first).await.unwrap();
        assert_eq!(written, vec!["website", "description"]);

        let mut second = EnrichmentResult::new();
        second.website = Some("https://other.example".to_string());
        second.industry = Some("Aerospace".to_string());
        let written = persist_enrichment(&pool, company.id, &second)
            .await
            .unwrap();
        assert_eq!(written, vec!["industry"]);

        let stored = get_company(&pool, company.id).await.unwrap().unwrap();
        assert_eq!(stored.website.as_deref(), Some("https://acme.io"));
        assert_eq!(stored.industry.as_deref(), Some("Aerospace"));
        assert!(stored.is_enriched);
        assert!(stored.enriched_at.is_some());
    }

    #[tokio::test]
    async fn repeated_enrichment_does_not_duplicate_contacts() {
        let (_dir, pool) = test_pool().await;
        let company = find_or_create_company(&pool, "Acme").await.unwrap();

        let mut result = EnrichmentResult::new();
        result.push_contact(draft("jane.doe@acme.io", ContactKind::Recruiter));
        result.push_contact(draft("support@acme.io", ContactKind::Support));

        persist_enrichment(&pool, company.id, &result)
            .await
            .unwrap();
        let first_stamp = get_company(&pool, company.id)
            .await
            .unwrap()
            .unwrap()
            .enriched_at
            .unwrap();

        persist_enrichment(&pool, company.id, &result)
            .await
            .unwrap();
        let contacts = get_contacts(&pool, company.id).await.unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].name, "Jane Doe");
        assert_eq!(contacts[0].position.as_deref(), Some("recruiter"));

        let second_stamp = get_company(&pool, company.id)
            .await
            .unwrap()
            .unwrap()
            .enriched_at
            .unwrap();
        assert!(second_stamp >= first_stamp);
    }

    #[tokio::test]
    async fn reset_reopens_a_company_for_enrichment() {
        let (_dir, pool) = test_pool().await;
        let company = find_or_create_company(&pool, "Acme").await.unwrap();
        persist_enrichment(&pool, company.id, &EnrichmentResult::new())
            .await
            .unwrap();
        assert!(list_unenriched(&pool, 10).await.unwrap().is_empty());

        assert!(reset_enrichment(&pool, company.id).await.unwrap());
        let pending = list_unenriched(&pool, 10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, company.id);
    }

    #[tokio::test]
    async fn stats_reflect_enrichment_progress() {
        let (_dir, pool) = test_pool().await;
        let a = find_or_create_company(&pool, "Acme").await.unwrap();
        find_or_create_company(&pool, "Widget Co").await.unwrap();

        let mut result = EnrichmentResult::new();
        result.push_contact(draft("info@acme.io", ContactKind::General));
        persist_enrichment(&pool, a.id, &result).await.unwrap();

        let stats = get_database_stats(&pool).await.unwrap();
        assert_eq!(stats.total_companies, 2);
        assert_eq!(stats.enriched_companies, 1);
        assert_eq!(stats.total_contacts, 1);
        assert!((stats.enrichment_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn contact_names_derive_from_local_parts() {
        assert_eq!(contact_name_from_email("jane.doe@acme.io"), "Jane Doe");
        assert_eq!(contact_name_from_email("support@acme.io"), "Support");
        assert_eq!(contact_name_from_email("dev_team@acme.io"), "Dev Team");
    }
}

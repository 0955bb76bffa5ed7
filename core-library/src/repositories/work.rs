//! Work repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::{Circle, Tag, VoiceActor, WorkEntry, WorkId, WorkMetadata, WorkRecord};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

/// Work repository interface for catalog access
#[async_trait]
pub trait WorkRepository: Send + Sync {
    /// Number of records stored under `id` (0 or 1)
    async fn count_by_id(&self, id: WorkId) -> Result<u64>;

    /// Insert a new record together with its circle, tags and voice actors
    ///
    /// # Errors
    /// Returns error if:
    /// - A record with the same ID already exists
    /// - Record validation fails
    /// - Database error occurs
    async fn insert(&self, record: &WorkRecord) -> Result<()>;

    /// Delete a record by ID
    ///
    /// # Returns
    /// - `Ok(true)` if the record was deleted
    /// - `Ok(false)` if no record had that ID
    async fn delete(&self, id: WorkId) -> Result<bool>;

    /// Every stored record as an `{id, dir}` pair, ordered by ID
    async fn list_all(&self) -> Result<Vec<WorkEntry>>;

    /// Load a full record by ID
    async fn find_by_id(&self, id: WorkId) -> Result<Option<WorkRecord>>;

    /// Release the underlying connections
    ///
    /// Subsequent calls on this repository fail.
    async fn close(&self) -> Result<()>;
}

/// SQLite implementation of WorkRepository
pub struct SqliteWorkRepository {
    pool: SqlitePool,
}

impl SqliteWorkRepository {
    /// Create a new SQLite work repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_circle(tx: &mut Transaction<'_, Sqlite>, circle: &Circle) -> Result<()> {
        sqlx::query("INSERT INTO t_circle (id, name) VALUES (?, ?) ON CONFLICT(id) DO NOTHING")
            .bind(circle.id)
            .bind(&circle.name)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn insert_tag(tx: &mut Transaction<'_, Sqlite>, work_id: i64, tag: &Tag) -> Result<()> {
        sqlx::query("INSERT INTO t_tag (id, name) VALUES (?, ?) ON CONFLICT(id) DO NOTHING")
            .bind(tag.id)
            .bind(&tag.name)
            .execute(&mut **tx)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO r_tag_work (tag_id, work_id) VALUES (?, ?)")
            .bind(tag.id)
            .bind(work_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn insert_voice_actor(
        tx: &mut Transaction<'_, Sqlite>,
        work_id: i64,
        va: &VoiceActor,
    ) -> Result<()> {
        sqlx::query("INSERT INTO t_va (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(&va.name)
            .execute(&mut **tx)
            .await?;

        let (va_id,): (i64,) = sqlx::query_as("SELECT id FROM t_va WHERE name = ?")
            .bind(&va.name)
            .fetch_one(&mut **tx)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO r_va_work (va_id, work_id) VALUES (?, ?)")
            .bind(va_id)
            .bind(work_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Remove circles, tags and voice actors no work refers to anymore
    async fn prune_orphans(tx: &mut Transaction<'_, Sqlite>) -> Result<()> {
        sqlx::query(
            "DELETE FROM t_circle WHERE id NOT IN \
             (SELECT circle_id FROM t_work WHERE circle_id IS NOT NULL)",
        )
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM t_tag WHERE id NOT IN (SELECT tag_id FROM r_tag_work)")
            .execute(&mut **tx)
            .await?;

        sqlx::query("DELETE FROM t_va WHERE id NOT IN (SELECT va_id FROM r_va_work)")
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// Database row representation of a work joined with its circle
#[derive(Debug, FromRow)]
struct WorkRow {
    id: i64,
    title: String,
    dir: String,
    circle_id: Option<i64>,
    circle_name: Option<String>,
    extra: String,
}

#[derive(Debug, FromRow)]
struct WorkEntryRow {
    id: i64,
    dir: String,
}

fn work_id_from_row(raw: i64) -> Result<WorkId> {
    WorkId::from_i64(raw).ok_or_else(|| LibraryError::InvalidInput {
        field: "id".to_string(),
        message: format!("stored work id {} is out of range", raw),
    })
}

impl TryFrom<WorkEntryRow> for WorkEntry {
    type Error = LibraryError;

    fn try_from(row: WorkEntryRow) -> Result<Self> {
        Ok(WorkEntry {
            id: work_id_from_row(row.id)?,
            dir: row.dir,
        })
    }
}

#[async_trait]
impl WorkRepository for SqliteWorkRepository {
    async fn count_by_id(&self, id: WorkId) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t_work WHERE id = ?")
            .bind(id.as_i64())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn insert(&self, record: &WorkRecord) -> Result<()> {
        record.validate().map_err(|msg| LibraryError::InvalidInput {
            field: "work".to_string(),
            message: msg,
        })?;

        let work_id = record.id.as_i64();
        let metadata = &record.metadata;
        let extra = serde_json::to_string(&metadata.extra)?;

        let mut tx = self.pool.begin().await?;

        if let Some(circle) = &metadata.circle {
            Self::insert_circle(&mut tx, circle).await?;
        }

        sqlx::query("INSERT INTO t_work (id, title, dir, circle_id, extra) VALUES (?, ?, ?, ?, ?)")
            .bind(work_id)
            .bind(&metadata.title)
            .bind(&record.dir)
            .bind(metadata.circle.as_ref().map(|c| c.id))
            .bind(&extra)
            .execute(&mut *tx)
            .await?;

        for tag in &metadata.tags {
            Self::insert_tag(&mut tx, work_id, tag).await?;
        }

        for va in &metadata.vas {
            Self::insert_voice_actor(&mut tx, work_id, va).await?;
        }

        tx.commit().await?;

        debug!(work = %record.id, dir = %record.dir, "Inserted work record");
        Ok(())
    }

    async fn delete(&self, id: WorkId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM t_work WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() > 0 {
            Self::prune_orphans(&mut tx).await?;
        }

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<WorkEntry>> {
        let rows = sqlx::query_as::<_, WorkEntryRow>("SELECT id, dir FROM t_work ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(WorkEntry::try_from).collect()
    }

    async fn find_by_id(&self, id: WorkId) -> Result<Option<WorkRecord>> {
        let row = sqlx::query_as::<_, WorkRow>(
            r#"
            SELECT w.id, w.title, w.dir, w.circle_id, c.name AS circle_name, w.extra
            FROM t_work w
            LEFT JOIN t_circle c ON c.id = w.circle_id
            WHERE w.id = ?
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tags = sqlx::query_as::<_, (i64, String)>(
            "SELECT t.id, t.name FROM t_tag t \
             JOIN r_tag_work r ON r.tag_id = t.id \
             WHERE r.work_id = ? ORDER BY t.id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(id, name)| Tag { id, name })
        .collect();

        let vas = sqlx::query_as::<_, (String,)>(
            "SELECT v.name FROM t_va v \
             JOIN r_va_work r ON r.va_id = v.id \
             WHERE r.work_id = ? ORDER BY v.id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(name,)| VoiceActor { name })
        .collect();

        let extra: Map<String, Value> = serde_json::from_str(&row.extra)?;
        let circle = match (row.circle_id, row.circle_name) {
            (Some(id), Some(name)) => Some(Circle { id, name }),
            _ => None,
        };

        Ok(Some(WorkRecord {
            id: work_id_from_row(row.id)?,
            dir: row.dir,
            metadata: WorkMetadata {
                title: row.title,
                circle,
                tags,
                vas,
                extra,
            },
        }))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        info!("Catalog connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use serde_json::json;

    async fn setup_test_repo() -> SqliteWorkRepository {
        let pool = create_test_pool().await.unwrap();
        SqliteWorkRepository::new(pool)
    }

    fn id(raw: u32) -> WorkId {
        WorkId::new(raw).unwrap()
    }

    fn sample_record(raw: u32) -> WorkRecord {
        let mut metadata = WorkMetadata::new(format!("Work {}", raw));
        metadata.circle = Some(Circle {
            id: 7,
            name: "Circle Seven".to_string(),
        });
        metadata.tags = vec![
            Tag {
                id: 1,
                name: "ASMR".to_string(),
            },
            Tag {
                id: 2,
                name: "Binaural".to_string(),
            },
        ];
        metadata.vas = vec![VoiceActor {
            name: "Voice One".to_string(),
        }];
        metadata.extra.insert("price".to_string(), json!(1100));
        metadata.extra.insert("nsfw".to_string(), json!(false));

        WorkRecord::new(id(raw), format!("RJ{:06}", raw), metadata)
    }

    #[tokio::test]
    async fn test_insert_and_find_work() {
        let repo = setup_test_repo().await;
        let record = sample_record(123_456);

        repo.insert(&record).await.unwrap();

        let found = repo.find_by_id(id(123_456)).await.unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_count_by_id() {
        let repo = setup_test_repo().await;
        assert_eq!(repo.count_by_id(id(1)).await.unwrap(), 0);

        repo.insert(&sample_record(1)).await.unwrap();
        assert_eq!(repo.count_by_id(id(1)).await.unwrap(), 1);
        assert_eq!(repo.count_by_id(id(2)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let repo = setup_test_repo().await;
        repo.insert(&sample_record(1)).await.unwrap();

        let result = repo.insert(&sample_record(1)).await;
        assert!(matches!(result, Err(LibraryError::Database(_))));
        assert_eq!(repo.count_by_id(id(1)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_record() {
        let repo = setup_test_repo().await;
        let record = WorkRecord::new(id(1), "RJ000001", WorkMetadata::new(""));

        let result = repo.insert(&record).await;
        assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
        assert_eq!(repo.count_by_id(id(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_shared_tags_and_voice_actors() {
        let repo = setup_test_repo().await;
        repo.insert(&sample_record(1)).await.unwrap();
        repo.insert(&sample_record(2)).await.unwrap();

        let (va_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t_va")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(va_count, 1);

        let second = repo.find_by_id(id(2)).await.unwrap().unwrap();
        assert_eq!(second.metadata.tags.len(), 2);
        assert_eq!(second.metadata.vas[0].name, "Voice One");
    }

    #[tokio::test]
    async fn test_delete_prunes_orphans() {
        let repo = setup_test_repo().await;
        repo.insert(&sample_record(1)).await.unwrap();
        repo.insert(&sample_record(2)).await.unwrap();

        assert!(repo.delete(id(1)).await.unwrap());
        // Still referenced by work 2
        let (tags,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t_tag")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(tags, 2);

        assert!(repo.delete(id(2)).await.unwrap());
        for table in ["t_circle", "t_tag", "t_va", "r_tag_work", "r_va_work"] {
            let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&repo.pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "{} should be empty", table);
        }
    }

    #[tokio::test]
    async fn test_delete_missing_work() {
        let repo = setup_test_repo().await;
        assert!(!repo.delete(id(42)).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_all() {
        let repo = setup_test_repo().await;
        repo.insert(&sample_record(3)).await.unwrap();
        repo.insert(&sample_record(1)).await.unwrap();

        let entries = repo.list_all().await.unwrap();
        assert_eq!(
            entries,
            vec![
                WorkEntry {
                    id: id(1),
                    dir: "RJ000001".to_string()
                },
                WorkEntry {
                    id: id(3),
                    dir: "RJ000003".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_work_without_circle() {
        let repo = setup_test_repo().await;
        let record = WorkRecord::new(id(5), "RJ000005", WorkMetadata::new("Solo"));
        repo.insert(&record).await.unwrap();

        let found = repo.find_by_id(id(5)).await.unwrap().unwrap();
        assert!(found.metadata.circle.is_none());
        assert!(found.metadata.tags.is_empty());
    }

    #[tokio::test]
    async fn test_close_rejects_further_queries() {
        let repo = setup_test_repo().await;
        repo.close().await.unwrap();
        assert!(repo.count_by_id(id(1)).await.is_err());
    }
}

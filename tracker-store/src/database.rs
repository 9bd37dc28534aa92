use crate::ReleaseStore;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    Row, Sqlite, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};
use std::str::FromStr;
use tracing::Instrument;
use tracker_core::{
    ItemId, ItemStage, NewPrerequisite, NewProduct, NewRelease, NewReleaseItem, Prerequisite,
    PrerequisiteId, PrerequisiteStage, Product, ProductId, Release, ReleaseId, ReleaseItem,
    ReleaseItemPatch, ReleaseStage, Result, TrackerError,
};
use tracker_telemetry::store_span;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS releases (
        id TEXT PRIMARY KEY,
        product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT,
        target_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'PLANNED' CHECK (status IN ('PLANNED', 'RELEASED')),
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_releases_product ON releases(product_id)",
    r#"
    CREATE TABLE IF NOT EXISTS release_items (
        id TEXT PRIMARY KEY,
        release_id TEXT NOT NULL REFERENCES releases(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        type TEXT NOT NULL CHECK (type IN ('FEATURE', 'BUG_FIX')),
        status TEXT NOT NULL DEFAULT 'DEV' CHECK (status IN ('DEV', 'PRE_PROD', 'RELEASED')),
        jira_link TEXT,
        doc_link TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_release_items_release ON release_items(release_id)",
    r#"
    CREATE TABLE IF NOT EXISTS prerequisites (
        id TEXT PRIMARY KEY,
        release_item_id TEXT NOT NULL REFERENCES release_items(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        category TEXT NOT NULL
            CHECK (category IN ('ENV_VAR', 'MIGRATION', 'INFRA', 'PERMISSIONS')),
        status TEXT NOT NULL DEFAULT 'PENDING' CHECK (status IN ('PENDING', 'DONE')),
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_prerequisites_item ON prerequisites(release_item_id)",
];

fn db_err(action: &'static str) -> impl FnOnce(sqlx::Error) -> TrackerError {
    move |e| TrackerError::Store(format!("{action} failed: {e}"))
}

fn column<T: FromStr>(row: &SqliteRow, name: &str) -> Result<T> {
    let raw: String = row.try_get(name).map_err(db_err("decode"))?;
    raw.parse()
        .map_err(|_| TrackerError::Store(format!("invalid value in column {name}: {raw}")))
}

fn optional(row: &SqliteRow, name: &str) -> Result<Option<String>> {
    row.try_get(name).map_err(db_err("decode"))
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    Ok(Product {
        id: column(row, "id")?,
        name: column(row, "name")?,
        created_at: column(row, "created_at")?,
    })
}

fn release_from_row(row: &SqliteRow) -> Result<Release> {
    Ok(Release {
        id: column(row, "id")?,
        product_id: column(row, "product_id")?,
        name: column(row, "name")?,
        description: optional(row, "description")?,
        target_date: column(row, "target_date")?,
        stage: column(row, "status")?,
        created_at: column(row, "created_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<ReleaseItem> {
    Ok(ReleaseItem {
        id: column(row, "id")?,
        release_id: column(row, "release_id")?,
        title: column(row, "title")?,
        description: optional(row, "description")?,
        item_type: column(row, "type")?,
        stage: column(row, "status")?,
        jira_link: optional(row, "jira_link")?,
        doc_link: optional(row, "doc_link")?,
        created_at: column(row, "created_at")?,
        prerequisites: None,
    })
}

fn prerequisite_from_row(row: &SqliteRow) -> Result<Prerequisite> {
    Ok(Prerequisite {
        id: column(row, "id")?,
        release_item_id: column(row, "release_item_id")?,
        title: column(row, "title")?,
        category: column(row, "category")?,
        stage: column(row, "status")?,
        created_at: column(row, "created_at")?,
    })
}

fn pool_options(database_url: &str) -> SqlitePoolOptions {
    // an in-memory database lives only as long as its connection, so that
    // single connection is never recycled
    if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
}

/// SQLite-backed store.
pub struct DatabaseReleaseStore {
    pool: SqlitePool,
}

impl DatabaseReleaseStore {
    /// Connects to `database_url`, e.g. `sqlite://tracker.db` or `sqlite::memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| TrackerError::Config(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = pool_options(database_url)
            .connect_with(options)
            .await
            .map_err(db_err("database connection"))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await.map_err(db_err("migration"))?;
        }
        tracing::debug!(tables = 4, "release tracker schema is up to date");
        Ok(())
    }

    async fn exists(&self, table: &'static str, id: &str) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {table} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("query"))?;
        Ok(row.is_some())
    }

    async fn insert_prerequisite(
        tx: &mut Transaction<'_, Sqlite>,
        item_id: ItemId,
        prerequisite: NewPrerequisite,
    ) -> Result<Prerequisite> {
        let row = Prerequisite {
            id: PrerequisiteId::new(),
            release_item_id: item_id,
            title: prerequisite.title,
            category: prerequisite.category,
            stage: PrerequisiteStage::Pending,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO prerequisites (id, release_item_id, title, category, status, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(row.id.to_string())
        .bind(item_id.to_string())
        .bind(&row.title)
        .bind(row.category.as_str())
        .bind(row.stage.as_str())
        .bind(row.created_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .map_err(db_err("insert"))?;

        Ok(row)
    }

    /// Item row and its initial prerequisites, committed together.
    async fn insert_item(
        &self,
        release_id: ReleaseId,
        item: NewReleaseItem,
    ) -> Result<ReleaseItem> {
        let mut tx = self.pool.begin().await.map_err(db_err("transaction"))?;

        let release = sqlx::query("SELECT 1 FROM releases WHERE id = ?")
            .bind(release_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("query"))?;
        if release.is_none() {
            return Err(ReleaseId::not_found());
        }

        let row = ReleaseItem {
            id: ItemId::new(),
            release_id,
            title: item.title,
            description: item.description,
            item_type: item.item_type,
            stage: ItemStage::Dev,
            jira_link: item.jira_link,
            doc_link: item.doc_link,
            created_at: Utc::now(),
            prerequisites: None,
        };

        sqlx::query(
            "INSERT INTO release_items (id, release_id, title, description, type, status, jira_link, doc_link, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(row.id.to_string())
        .bind(release_id.to_string())
        .bind(&row.title)
        .bind(&row.description)
        .bind(row.item_type.as_str())
        .bind(row.stage.as_str())
        .bind(&row.jira_link)
        .bind(&row.doc_link)
        .bind(row.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(db_err("insert"))?;

        let mut prerequisites = Vec::with_capacity(item.prerequisites.len());
        for prerequisite in item.prerequisites {
            prerequisites.push(Self::insert_prerequisite(&mut tx, row.id, prerequisite).await?);
        }

        tx.commit().await.map_err(db_err("commit"))?;
        Ok(row.with_prerequisites(prerequisites))
    }

    async fn count(&self, sql: &str, id: String) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count"))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl ReleaseStore for DatabaseReleaseStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = Product { id: ProductId::new(), name: product.name, created_at: Utc::now() };

        sqlx::query("INSERT INTO products (id, name, created_at) VALUES (?, ?, ?)")
            .bind(row.id.to_string())
            .bind(&row.name)
            .bind(row.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(db_err("insert"))?;

        Ok(row)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        sqlx::query("SELECT * FROM products ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("query"))?
            .iter()
            .map(product_from_row)
            .collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("query"))?
            .as_ref()
            .map(product_from_row)
            .transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_release(&self, product_id: ProductId, release: NewRelease) -> Result<Release> {
        if !self.exists("products", &product_id.to_string()).await? {
            return Err(ProductId::not_found());
        }

        let row = Release {
            id: ReleaseId::new(),
            product_id,
            name: release.name,
            description: release.description,
            target_date: release.target_date,
            stage: ReleaseStage::Planned,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO releases (id, product_id, name, description, target_date, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(row.id.to_string())
        .bind(product_id.to_string())
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.target_date.format("%Y-%m-%d").to_string())
        .bind(row.stage.as_str())
        .bind(row.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err("insert"))?;

        Ok(row)
    }

    async fn list_releases(&self, product_id: ProductId) -> Result<Vec<Release>> {
        sqlx::query("SELECT * FROM releases WHERE product_id = ? ORDER BY target_date, rowid")
            .bind(product_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("query"))?
            .iter()
            .map(release_from_row)
            .collect()
    }

    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>> {
        sqlx::query("SELECT * FROM releases WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("query"))?
            .as_ref()
            .map(release_from_row)
            .transpose()
    }

    async fn set_release_stage(
        &self,
        id: ReleaseId,
        stage: ReleaseStage,
    ) -> Result<Option<Release>> {
        let result = sqlx::query("UPDATE releases SET status = ? WHERE id = ?")
            .bind(stage.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err("update"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_release(id).await
    }

    async fn complete_release(&self, id: ReleaseId) -> Result<bool> {
        let result = sqlx::query("UPDATE releases SET status = ? WHERE id = ? AND status <> ?")
            .bind(ReleaseStage::Released.as_str())
            .bind(id.to_string())
            .bind(ReleaseStage::Released.as_str())
            .execute(&self.pool)
            .instrument(store_span("complete_release"))
            .await
            .map_err(db_err("update"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn create_item(
        &self,
        release_id: ReleaseId,
        item: NewReleaseItem,
    ) -> Result<ReleaseItem> {
        self.insert_item(release_id, item).instrument(store_span("create_item")).await
    }

    async fn list_items(&self, release_id: ReleaseId) -> Result<Vec<ReleaseItem>> {
        sqlx::query("SELECT * FROM release_items WHERE release_id = ? ORDER BY rowid")
            .bind(release_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("query"))?
            .iter()
            .map(item_from_row)
            .collect()
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<ReleaseItem>> {
        sqlx::query("SELECT * FROM release_items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("query"))?
            .as_ref()
            .map(item_from_row)
            .transpose()
    }

    async fn update_item(
        &self,
        id: ItemId,
        patch: ReleaseItemPatch,
    ) -> Result<Option<ReleaseItem>> {
        let mut tx = self.pool.begin().await.map_err(db_err("transaction"))?;

        let current = sqlx::query("SELECT * FROM release_items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("query"))?;
        let Some(current) = current else {
            return Ok(None);
        };

        let mut item = item_from_row(&current)?;
        patch.apply(&mut item);

        sqlx::query(
            "UPDATE release_items SET title = ?, description = ?, type = ?, jira_link = ?, doc_link = ? WHERE id = ?",
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.item_type.as_str())
        .bind(&item.jira_link)
        .bind(&item.doc_link)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_err("update"))?;

        tx.commit().await.map_err(db_err("commit"))?;
        Ok(Some(item))
    }

    async fn set_item_stage(&self, id: ItemId, stage: ItemStage) -> Result<Option<ReleaseItem>> {
        let result = sqlx::query("UPDATE release_items SET status = ? WHERE id = ?")
            .bind(stage.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err("update"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_item(id).await
    }

    async fn count_unreleased_items(&self, release_id: ReleaseId) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM release_items WHERE release_id = ? AND status <> 'RELEASED'",
            release_id.to_string(),
        )
        .await
    }

    async fn create_prerequisite(
        &self,
        item_id: ItemId,
        prerequisite: NewPrerequisite,
    ) -> Result<Prerequisite> {
        let mut tx = self.pool.begin().await.map_err(db_err("transaction"))?;

        let item = sqlx::query("SELECT 1 FROM release_items WHERE id = ?")
            .bind(item_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("query"))?;
        if item.is_none() {
            return Err(ItemId::not_found());
        }

        let row = Self::insert_prerequisite(&mut tx, item_id, prerequisite).await?;
        tx.commit().await.map_err(db_err("commit"))?;
        Ok(row)
    }

    async fn list_prerequisites(&self, item_id: ItemId) -> Result<Vec<Prerequisite>> {
        sqlx::query("SELECT * FROM prerequisites WHERE release_item_id = ? ORDER BY rowid")
            .bind(item_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("query"))?
            .iter()
            .map(prerequisite_from_row)
            .collect()
    }

    async fn set_prerequisite_stage(
        &self,
        id: PrerequisiteId,
        stage: PrerequisiteStage,
    ) -> Result<Option<Prerequisite>> {
        let result = sqlx::query("UPDATE prerequisites SET status = ? WHERE id = ?")
            .bind(stage.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err("update"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("SELECT * FROM prerequisites WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("query"))?
            .as_ref()
            .map(prerequisite_from_row)
            .transpose()
    }

    async fn count_pending_prerequisites(&self, item_id: ItemId) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM prerequisites WHERE release_item_id = ? AND status <> 'DONE'",
            item_id.to_string(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_pool_keeps_its_connection() {
        let options = pool_options("sqlite::memory:");
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[test]
    fn test_file_pool_is_recycled() {
        let options = pool_options("sqlite://tracker.db");
        assert_eq!(options.get_max_connections(), 5);
        assert!(options.get_max_lifetime().is_some());
    }
}

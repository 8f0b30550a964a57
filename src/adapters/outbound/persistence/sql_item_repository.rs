use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{RepositoryError, RepositoryResult},
        models::{Item, NewItem, StoredPhoto},
        value_objects::{ItemId, PhotoKey, Price},
    },
    ports::repositories::ItemRepository,
};

const ITEM_COLUMNS: &str =
    "id, name, price, note, category, photo_url, photo_key, created_at, updated_at";

/// SQL-based implementation of ItemRepository using PostgreSQL
#[derive(Clone)]
pub struct SqlItemRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    price: f64,
    note: String,
    category: Option<String>,
    photo_url: Option<String>,
    photo_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| RepositoryError::CorruptRecord {
            id: row.id.to_string(),
            reason,
        };

        let price = Price::new(row.price).map_err(|e| corrupt(e.to_string()))?;

        let photo = match (row.photo_url.clone(), row.photo_key.clone()) {
            (Some(url), Some(key)) => Some(StoredPhoto {
                url,
                key: PhotoKey::new(key).map_err(|e| corrupt(e.to_string()))?,
            }),
            (None, None) => None,
            _ => {
                return Err(corrupt(
                    "photo_url and photo_key must be set together".to_string(),
                ))
            }
        };

        Ok(Item {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            price,
            note: row.note,
            category: row.category,
            photo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn database_error(context: &str, err: sqlx::Error) -> RepositoryError {
    RepositoryError::Database {
        message: format!("{}: {}", context, err),
        source: Some(err.to_string()),
    }
}

impl SqlItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id UUID PRIMARY KEY,
                name VARCHAR(200) NOT NULL DEFAULT '',
                price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
                note TEXT NOT NULL DEFAULT '',
                category VARCHAR(100),
                photo_url TEXT,
                photo_key TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_items_created_at ON items(created_at DESC, id DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ItemRepository for SqlItemRepository {
    async fn insert(&self, item: NewItem) -> RepositoryResult<Item> {
        let (photo_url, photo_key) = match &item.photo {
            Some(photo) => (Some(photo.url.as_str()), Some(photo.key.as_str())),
            None => (None, None),
        };

        let row: ItemRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO items (id, name, price, note, category, photo_url, photo_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(*ItemId::generate().as_uuid())
        .bind(&item.name)
        .bind(item.price.value())
        .bind(&item.note)
        .bind(&item.category)
        .bind(photo_url)
        .bind(photo_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("Database error inserting item", e))?;

        row.try_into()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM items ORDER BY created_at DESC, id DESC",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Database error listing items", e))?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn find_by_id(&self, id: &ItemId) -> RepositoryResult<Option<Item>> {
        let row: Option<ItemRow> =
            sqlx::query_as(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Database error retrieving item", e))?;

        row.map(Item::try_from).transpose()
    }

    async fn update(&self, item: &Item) -> RepositoryResult<Item> {
        let (photo_url, photo_key) = match &item.photo {
            Some(photo) => (Some(photo.url.as_str()), Some(photo.key.as_str())),
            None => (None, None),
        };

        let row: Option<ItemRow> = sqlx::query_as(&format!(
            r#"
            UPDATE items
            SET name = $2, price = $3, note = $4, category = $5,
                photo_url = $6, photo_key = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(*item.id.as_uuid())
        .bind(&item.name)
        .bind(item.price.value())
        .bind(&item.note)
        .bind(&item.category)
        .bind(photo_url)
        .bind(photo_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Database error updating item", e))?;

        row.ok_or(RepositoryError::NotFound { id: item.id })?
            .try_into()
    }

    async fn delete(&self, id: &ItemId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Database error deleting item", e))?;

        Ok(result.rows_affected() > 0)
    }
}

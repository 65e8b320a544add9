use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gn_core::{ArticleStorage, EnrichedArticle, Error, Result, StorageSession, StoredArticle};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row};

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        location TEXT NOT NULL,
        lat REAL,
        lon REAL
    )
    "#,
    // Lookups by url happen once per stored article
    r#"
    CREATE INDEX IF NOT EXISTS idx_articles_url ON articles (url)
    "#,
];

fn storage_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Storage(format!("{}: {}", context, e))
}

/// SQLite file store. Every session is its own connection to the file.
pub struct SQLiteStorage {
    options: SqliteConnectOptions,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn scheme() -> &'static str {
        "sqlite"
    }

    async fn open(location: &str) -> Result<Self> {
        if location.is_empty() {
            return Err(Error::Config("SQLite store URL needs a file path".to_string()));
        }
        Self::new_with_path(Path::new(location)).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let mut conn = options
            .connect()
            .await
            .map_err(storage_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&mut conn)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        conn.close()
            .await
            .map_err(storage_error("Failed to close database connection"))?;

        Ok(Self {
            options,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn connect(&self) -> Result<Box<dyn StorageSession>> {
        let conn = self
            .options
            .connect()
            .await
            .map_err(storage_error("Failed to connect to database"))?;
        Ok(Box::new(SQLiteSession { conn }))
    }
}

struct SQLiteSession {
    conn: SqliteConnection,
}

fn row_to_article(row: &SqliteRow) -> Result<StoredArticle> {
    let read = storage_error("Failed to read article row");
    Ok(StoredArticle {
        id: row.try_get("id").map_err(&read)?,
        title: row.try_get("title").map_err(&read)?,
        url: row.try_get("url").map_err(&read)?,
        location: row.try_get("location").map_err(&read)?,
        lat: row.try_get("lat").map_err(&read)?,
        lon: row.try_get("lon").map_err(&read)?,
    })
}

#[async_trait]
impl StorageSession for SQLiteSession {
    async fn find_by_url(&mut self, url: &str) -> Result<Option<StoredArticle>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, url, location, lat, lon FROM articles
            WHERE url = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(&mut self.conn)
        .await
        .map_err(storage_error("Failed to look up article"))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn insert(&mut self, article: &EnrichedArticle) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, url, location, lat, lon)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.location)
        .bind(article.lat)
        .bind(article.lon)
        .execute(&mut self.conn)
        .await
        .map_err(storage_error("Failed to insert article"))?;

        Ok(result.last_insert_rowid())
    }

    async fn update_coordinates(&mut self, id: i64, lat: Option<f64>, lon: Option<f64>) -> Result<()> {
        let result = sqlx::query("UPDATE articles SET lat = ?, lon = ? WHERE id = ?")
            .bind(lat)
            .bind(lon)
            .bind(id)
            .execute(&mut self.conn)
            .await
            .map_err(storage_error("Failed to update article geocode"))?;

        if result.rows_affected() == 0 {
            return Err(Error::Storage(format!("No article with id {}", id)));
        }
        Ok(())
    }

    async fn find_all(&mut self) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query("SELECT id, title, url, location, lat, lon FROM articles ORDER BY id")
            .fetch_all(&mut self.conn)
            .await
            .map_err(storage_error("Failed to list articles"))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(storage_error("Failed to close database connection"))
    }
}

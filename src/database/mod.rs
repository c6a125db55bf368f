// 数据库模块
// 本地 SQLite 文件，预测缓存与请求记录两张表

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::{config::Config, error::StoreError};

const CREATE_PREDICTION_CACHE: &str = r#"
    CREATE TABLE IF NOT EXISTS prediction_cache (
        key               TEXT PRIMARY KEY,
        bot_probability   REAL NOT NULL,
        human_probability REAL NOT NULL,
        cached_at         INTEGER NOT NULL
    )
"#;

const CREATE_PREDICTION_CACHE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_prediction_cache_cached_at
    ON prediction_cache (cached_at DESC)
"#;

const CREATE_REQUEST_LOG: &str = r#"
    CREATE TABLE IF NOT EXISTS request_log (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        source_id   TEXT NOT NULL UNIQUE,
        timestamps  TEXT NOT NULL DEFAULT '[]',
        last_seen   INTEGER NOT NULL,
        total_count INTEGER NOT NULL DEFAULT 0
    )
"#;

const CREATE_REQUEST_LOG_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_request_log_total_count ON request_log (total_count DESC)",
    "CREATE INDEX IF NOT EXISTS idx_request_log_last_seen ON request_log (last_seen DESC)",
];

/// 共享的存储句柄，克隆只复制连接池引用
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// 打开（必要时创建）数据库文件并建表
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.database_busy_timeout());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_with(options)
            .await?;

        tracing::info!("Connected to store at {}", config.database_url);

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(CREATE_PREDICTION_CACHE).execute(&mut *tx).await?;
        sqlx::query(CREATE_PREDICTION_CACHE_INDEX)
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_REQUEST_LOG).execute(&mut *tx).await?;
        for statement in CREATE_REQUEST_LOG_INDEXES {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

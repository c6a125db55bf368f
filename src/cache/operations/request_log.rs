use crate::{
    cache::models::request_log::{RequestRecord, RequestRow, RequestSummary},
    database::Store,
    error::StoreError,
    utils::now_timestamp,
};

const SELECT_RECORD: &str = r#"
    SELECT source_id, timestamps, last_seen, total_count
    FROM request_log
"#;

/// 请求记录操作：每个来源保留有限的时间窗口和累计总数
#[derive(Debug, Clone)]
pub struct RequestLedger {
    store: Store,
    window: usize,
}

impl RequestLedger {
    pub fn new(store: Store, window: usize) -> Self {
        Self {
            store,
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// 记录一次来自 `source_id` 的请求
    pub async fn record(&self, source_id: &str) -> Result<RequestRecord, StoreError> {
        self.record_at(source_id, now_timestamp()).await
    }

    pub async fn record_at(&self, source_id: &str, now: i64) -> Result<RequestRecord, StoreError> {
        let mut tx = self.store.pool().begin().await?;

        // 第一条语句就是写操作，事务从此持有写锁，后面的读改写不会和并发写交错
        let bumped = sqlx::query(
            r#"
            UPDATE request_log
            SET total_count = total_count + 1, last_seen = ?
            WHERE source_id = ?
            "#,
        )
        .bind(now)
        .bind(source_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let record = if bumped == 0 {
            let record = RequestRecord::new(source_id, now);
            sqlx::query(
                r#"
                INSERT INTO request_log (source_id, timestamps, last_seen, total_count)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&record.source_id)
            .bind(serde_json::to_string(&record.timestamps)?)
            .bind(record.last_seen)
            .bind(record.total_count)
            .execute(&mut *tx)
            .await?;
            record
        } else {
            let row = sqlx::query_as::<_, RequestRow>(&format!("{SELECT_RECORD} WHERE source_id = ?"))
                .bind(source_id)
                .fetch_one(&mut *tx)
                .await?;

            let mut record = RequestRecord::try_from(row)?;
            record.push_timestamp(now, self.window);

            sqlx::query("UPDATE request_log SET timestamps = ? WHERE source_id = ?")
                .bind(serde_json::to_string(&record.timestamps)?)
                .bind(source_id)
                .execute(&mut *tx)
                .await?;
            record
        };

        tx.commit().await?;
        Ok(record)
    }

    pub async fn get(&self, source_id: &str) -> Result<Option<RequestRecord>, StoreError> {
        sqlx::query_as::<_, RequestRow>(&format!("{SELECT_RECORD} WHERE source_id = ?"))
            .bind(source_id)
            .fetch_optional(self.store.pool())
            .await?
            .map(RequestRecord::try_from)
            .transpose()
    }

    /// 按累计请求数降序
    pub async fn top_by_activity(&self, limit: i64) -> Result<Vec<RequestRecord>, StoreError> {
        self.fetch_ordered("ORDER BY total_count DESC, id ASC", limit)
            .await
    }

    /// 按最近一次请求时间降序
    pub async fn most_recent(&self, limit: i64) -> Result<Vec<RequestRecord>, StoreError> {
        self.fetch_ordered("ORDER BY last_seen DESC, id DESC", limit)
            .await
    }

    pub async fn summary(&self) -> Result<RequestSummary, StoreError> {
        let summary = sqlx::query_as::<_, RequestSummary>(
            r#"
            SELECT COUNT(*) AS total_sources, COALESCE(SUM(total_count), 0) AS total_requests
            FROM request_log
            "#,
        )
        .fetch_one(self.store.pool())
        .await?;

        Ok(summary)
    }

    async fn fetch_ordered(
        &self,
        order_by: &str,
        limit: i64,
    ) -> Result<Vec<RequestRecord>, StoreError> {
        sqlx::query_as::<_, RequestRow>(&format!("{SELECT_RECORD} {order_by} LIMIT ?"))
            .bind(limit.max(0))
            .fetch_all(self.store.pool())
            .await?
            .into_iter()
            .map(RequestRecord::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::temp_store;

    async fn ledger() -> (RequestLedger, tempfile::TempDir) {
        let (store, dir) = temp_store().await;
        (RequestLedger::new(store, 100), dir)
    }

    #[tokio::test]
    async fn first_request_creates_record() {
        let (ledger, _dir) = ledger().await;
        let record = ledger.record_at("1.2.3.4", 1000).await.unwrap();

        assert_eq!(record, RequestRecord::new("1.2.3.4", 1000));
        assert_eq!(ledger.get("1.2.3.4").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn repeated_requests_accumulate() {
        let (ledger, _dir) = ledger().await;
        for _ in 0..3 {
            ledger.record("1.2.3.4").await.unwrap();
        }

        let record = ledger.get("1.2.3.4").await.unwrap().unwrap();
        assert_eq!(record.total_count, 3);
        assert_eq!(record.timestamps.len(), 3);
        assert_eq!(Some(&record.last_seen), record.timestamps.iter().max());
    }

    #[tokio::test]
    async fn window_keeps_latest_hundred_in_order() {
        let (ledger, _dir) = ledger().await;
        for call in 1..=150 {
            ledger.record_at("s", call).await.unwrap();
        }

        let record = ledger.get("s").await.unwrap().unwrap();
        assert_eq!(record.total_count, 150);
        assert_eq!(record.timestamps.len(), 100);
        assert_eq!(record.timestamps, (51..=150).collect::<Vec<i64>>());
        assert_eq!(record.last_seen, 150);
    }

    #[tokio::test]
    async fn unknown_source_is_absent() {
        let (ledger, _dir) = ledger().await;
        assert!(ledger.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn orderings_and_summary() {
        let (ledger, _dir) = ledger().await;
        // busy: 3 次但较早；quiet: 1 次但最新
        for ts in [10, 11, 12] {
            ledger.record_at("busy", ts).await.unwrap();
        }
        ledger.record_at("middle", 20).await.unwrap();
        ledger.record_at("middle", 21).await.unwrap();
        ledger.record_at("quiet", 30).await.unwrap();

        let top = ledger.top_by_activity(10).await.unwrap();
        let ids: Vec<_> = top.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(ids, vec!["busy", "middle", "quiet"]);

        let recent = ledger.most_recent(2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(ids, vec!["quiet", "middle"]);

        let summary = ledger.summary().await.unwrap();
        assert_eq!(summary.total_sources, 3);
        assert_eq!(summary.total_requests, 6);
    }

    #[tokio::test]
    async fn empty_summary_is_zero() {
        let (ledger, _dir) = ledger().await;
        let summary = ledger.summary().await.unwrap();
        assert_eq!(summary.total_sources, 0);
        assert_eq!(summary.total_requests, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_never_lose_increments() {
        let (ledger, _dir) = ledger().await;
        ledger.record("shared").await.unwrap();
        let before = ledger.get("shared").await.unwrap().unwrap().total_count;

        let tasks = (0..40).map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.record("shared").await })
        });
        for result in futures_util::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let record = ledger.get("shared").await.unwrap().unwrap();
        assert_eq!(record.total_count, before + 40);
        assert_eq!(record.timestamps.len(), 41);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_requests_create_one_record() {
        let (ledger, _dir) = ledger().await;

        for round in 0..5 {
            let source = format!("fresh-{round}");
            let tasks = (0..60).map(|_| {
                let ledger = ledger.clone();
                let source = source.clone();
                tokio::spawn(async move { ledger.record(&source).await })
            });
            for result in futures_util::future::join_all(tasks).await {
                result.unwrap().unwrap();
            }

            let record = ledger.get(&source).await.unwrap().unwrap();
            assert_eq!(record.total_count, 60);
            assert_eq!(record.timestamps.len(), 60);
        }

        assert_eq!(ledger.summary().await.unwrap().total_sources, 5);
    }
}

use crate::codec::{Category, Measurement};
use crate::reading::error::ReadingError;
use crate::reading::range::{parse_instant, TimeWindow};
use crate::reading::submission::Submission;
use crate::storage::repository::{Reading, ReadingRepository, StoreStats};
use crate::storage::Store;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use log::{error, info, warn};
use sea_orm::{DbErr, TransactionTrait};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RECENT_LIMIT: u64 = 30;
/// SQLite binds LIMIT as a signed 64-bit integer.
pub const MAX_RECENT_LIMIT: u64 = i64::MAX as u64;

#[derive(Clone, Debug)]
pub struct ServiceSettings {
    pub recent_limit: u64,
    pub store_timeout: Duration,
    pub max_concurrent_inserts: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            store_timeout: Duration::from_secs(8),
            max_concurrent_inserts: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedReading {
    #[serde(flatten)]
    pub reading: Reading,
    /// False when some category got no rows; such a reading is stored but
    /// left out of every listing.
    pub complete: bool,
}

pub struct ReadingService {
    store: Arc<Store>,
    settings: ServiceSettings,
}

impl ReadingService {
    pub fn new(store: Arc<Store>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    pub async fn create(&self, submission: &Submission) -> Result<CreatedReading, ReadingError> {
        self.create_at(submission, Utc::now()).await
    }

    /// Stores one reading and all of its rows atomically: either every row
    /// is committed or nothing is, parent included.
    pub async fn create_at(
        &self,
        submission: &Submission,
        created_at: DateTime<Utc>,
    ) -> Result<CreatedReading, ReadingError> {
        let rows = submission.decode().map_err(|e| {
            warn!("Rejected submission: {}", e);
            e
        })?;

        let id = self
            .bounded(self.write(created_at.timestamp_millis(), &rows))
            .await
            .map_err(|e| {
                error!("Failed to store reading: {}", e);
                e
            })?;

        let reading = self.find(id).await?.ok_or_else(|| {
            ReadingError::Storage(DbErr::RecordNotFound(format!(
                "reading {} vanished after commit",
                id
            )))
        })?;
        let complete = reading.is_complete();
        if complete {
            info!("✓ Reading [{}] stored with {} rows", id, rows.len());
        } else {
            let missing: Vec<&str> = Category::ALL
                .into_iter()
                .filter(|c| reading.count(*c) == 0)
                .map(|c| c.field_name())
                .collect();
            warn!(
                "Reading [{}] stored incomplete, missing: {}",
                id,
                missing.join(", ")
            );
        }

        Ok(CreatedReading { reading, complete })
    }

    async fn write(&self, created_at: i64, rows: &[(Category, Measurement)]) -> Result<i32, DbErr> {
        let txn = self.store.connection().begin().await?;

        let leitura = ReadingRepository::insert_reading(&txn, created_at).await?;

        // The first failed insert drops the rest and the transaction with
        // them, which rolls back the parent row as well.
        let inserts: Vec<_> = rows
            .iter()
            .map(|(category, m)| {
                ReadingRepository::insert_measurement(&txn, *category, leitura.id, m)
            })
            .collect();
        stream::iter(inserts)
            .buffer_unordered(self.settings.max_concurrent_inserts.max(1))
            .try_collect::<Vec<i32>>()
            .await?;

        txn.commit().await?;
        Ok(leitura.id)
    }

    /// Most recent complete readings, newest first.
    pub async fn recent(&self, limit: Option<u64>) -> Result<Vec<Reading>, ReadingError> {
        let limit = limit.unwrap_or(self.settings.recent_limit);
        if limit == 0 || limit > MAX_RECENT_LIMIT {
            return Err(ReadingError::InvalidLimit);
        }
        self.bounded(ReadingRepository::find_recent_complete(
            self.store.connection(),
            limit,
        ))
        .await
    }

    /// Complete readings created in `[from, to)`, oldest first.
    pub async fn by_range(&self, from: &str, to: &str) -> Result<Vec<Reading>, ReadingError> {
        self.in_window(TimeWindow::parse(from, to)?).await
    }

    /// Complete readings created in the 24 hours starting at `day`.
    pub async fn by_day(&self, day: &str) -> Result<Vec<Reading>, ReadingError> {
        self.in_window(TimeWindow::day(parse_instant(day)?)).await
    }

    pub async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>, ReadingError> {
        self.in_window(TimeWindow::between(from, to)).await
    }

    async fn in_window(&self, window: TimeWindow) -> Result<Vec<Reading>, ReadingError> {
        self.bounded(ReadingRepository::find_complete_between(
            self.store.connection(),
            window.from_ms,
            window.to_ms,
        ))
        .await
    }

    pub async fn find(&self, id: i32) -> Result<Option<Reading>, ReadingError> {
        self.bounded(ReadingRepository::find_by_id(self.store.connection(), id))
            .await
    }

    pub async fn stats(&self) -> Result<StoreStats, ReadingError> {
        self.bounded(ReadingRepository::stats(self.store.connection()))
            .await
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, ReadingError>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.settings.store_timeout, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(ReadingError::Timeout(self.settings.store_timeout)),
        }
    }
}

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{CompletionReport, PlayRecord, PlayRecordStatus},
};

/// Write-side store of play sessions. Written at most twice per session:
/// once on start, once on completion.
#[async_trait]
pub trait PlayRecordRepository: Send + Sync {
    async fn create_started(&self, record: PlayRecord) -> AppResult<PlayRecord>;
    async fn mark_completed(&self, id: &str, report: &CompletionReport) -> AppResult<PlayRecord>;
}

pub struct MongoPlayRecordRepository {
    collection: Collection<PlayRecord>,
}

impl MongoPlayRecordRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for play_records collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        self.collection.create_index(id_index).await?;

        let owner_index = IndexModel::builder()
            .keys(doc! { "owner_id": 1 })
            .options(IndexOptions::builder().name("owner_id".to_string()).build())
            .build();
        self.collection.create_index(owner_index).await?;

        log::info!("Successfully created indexes for play_records collection");
        Ok(())
    }
}

#[async_trait]
impl PlayRecordRepository for MongoPlayRecordRepository {
    async fn create_started(&self, record: PlayRecord) -> AppResult<PlayRecord> {
        self.collection.insert_one(&record).await?;
        Ok(record)
    }

    async fn mark_completed(&self, id: &str, report: &CompletionReport) -> AppResult<PlayRecord> {
        let mut record = self
            .collection
            .find_one(doc! { "id": id })
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Play record with id '{}' not found", id))
            })?;

        record.status = PlayRecordStatus::Completed;
        record.score = report.final_score;
        record.termination_reason = Some(report.reason);
        record.rounds_completed = report.rounds_completed;
        record.main_words_found = report.main_words_found;
        record.bonus_words_found = report.bonus_words_found;
        record.completed_at = Some(Utc::now());

        self.collection
            .replace_one(doc! { "id": id }, &record)
            .await?;
        Ok(record)
    }
}

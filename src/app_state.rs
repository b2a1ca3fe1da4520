use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        DocumentRepository, MongoDocumentRepository, MongoPlayRecordRepository,
        PlayRecordRepository,
    },
    services::{
        backend::{GenerationBackend, ImageBackend, OpenAiBackend},
        document_service::DocumentService,
        generation_service::GenerationService,
        hint_service::HintService,
        play_session_service::PlaySessionService,
    },
};

pub struct AppState {
    pub document_service: Arc<DocumentService>,
    pub play_session_service: Arc<PlaySessionService>,
    pub hint_service: Arc<HintService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let document_repository = Arc::new(MongoDocumentRepository::new(
            &db,
            &config.documents_collection,
        ));
        document_repository.ensure_indexes().await?;
        let documents: Arc<dyn DocumentRepository> = document_repository;

        let record_repository = Arc::new(MongoPlayRecordRepository::new(
            &db,
            &config.play_records_collection,
        ));
        record_repository.ensure_indexes().await?;
        let records: Arc<dyn PlayRecordRepository> = record_repository;

        let openai = Arc::new(OpenAiBackend::from_config(&config));
        let generation_backend: Arc<dyn GenerationBackend> = openai.clone();
        let image_backend: Arc<dyn ImageBackend> = openai;

        let generation_service = Arc::new(GenerationService::new(
            generation_backend.clone(),
            image_backend,
        ));
        let document_service = Arc::new(DocumentService::new(
            documents.clone(),
            generation_backend.clone(),
        ));
        let play_session_service = Arc::new(PlaySessionService::new(
            documents,
            records,
            generation_service,
        ));
        let hint_service = Arc::new(HintService::new(generation_backend));

        Ok(Self {
            document_service,
            play_session_service,
            hint_service,
            config: Arc::new(config),
        })
    }
}

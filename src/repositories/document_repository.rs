use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Document,
};

/// Read-mostly store of uploaded documents, queried by owner.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Document>>;
    async fn list_by_owner(&self, owner_id: &str) -> AppResult<Vec<Document>>;
    async fn create(&self, document: Document) -> AppResult<Document>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoDocumentRepository {
    collection: Collection<Document>,
}

impl MongoDocumentRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for documents collection");

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

        log::info!("Successfully created indexes for documents collection");
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for MongoDocumentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Document>> {
        let document = self.collection.find_one(doc! { "id": id }).await?;
        Ok(document)
    }

    async fn list_by_owner(&self, owner_id: &str) -> AppResult<Vec<Document>> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(doc! { "owner_id": owner_id })
            .await?;
        let items: Vec<Document> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn create(&self, document: Document) -> AppResult<Document> {
        self.collection.insert_one(&document).await?;
        Ok(document)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Document with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}

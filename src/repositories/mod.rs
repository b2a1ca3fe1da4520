pub mod document_repository;
pub mod play_record_repository;

pub use document_repository::{DocumentRepository, MongoDocumentRepository};
pub use play_record_repository::{MongoPlayRecordRepository, PlayRecordRepository};

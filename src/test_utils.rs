use crate::models::domain::{Document, DocumentCategory};

use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{valid_owner_id, OwnerQuery, UploadDocumentRequest},
};

#[post("/api/documents")]
async fn upload_document(
    state: web::Data<Arc<AppState>>,
    request: web::Json<UploadDocumentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    if !valid_owner_id(&request.owner_id) {
        return Err(AppError::ValidationError(
            "owner_id must be alphanumeric with dashes or underscores".to_string(),
        ));
    }

    let document = state
        .document_service
        .ingest_document(&request.owner_id, &request.title, &request.content)
        .await?;
    Ok(HttpResponse::Created().json(document))
}

#[get("/api/documents/{id}")]
async fn get_document(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let document = state.document_service.get_document(&id).await?;
    Ok(HttpResponse::Ok().json(document))
}

#[get("/api/documents")]
async fn list_documents(
    state: web::Data<Arc<AppState>>,
    query: web::Query<OwnerQuery>,
) -> Result<HttpResponse, AppError> {
    if !valid_owner_id(&query.owner_id) {
        return Err(AppError::ValidationError(
            "owner_id must be alphanumeric with dashes or underscores".to_string(),
        ));
    }

    let documents = state
        .document_service
        .list_documents(&query.owner_id)
        .await?;
    Ok(HttpResponse::Ok().json(documents))
}

#[delete("/api/documents/{id}")]
async fn delete_document(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.document_service.delete_document(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

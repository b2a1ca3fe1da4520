use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{HintRequest, StartSessionRequest, SubmitAnswerRequest},
        response::{
            HintResponse, RevealAnswerResponse, StartSessionResponse, SubmitAnswerResponse,
        },
    },
};

#[post("/api/sessions")]
async fn start_session(
    state: web::Data<Arc<AppState>>,
    request: web::Json<StartSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let started = state
        .play_session_service
        .start_session(&request.document_id, request.game_type, request.difficulty)
        .await?;
    Ok(HttpResponse::Created().json(StartSessionResponse {
        session_id: started.session_id,
        payload: started.payload,
        state: started.state,
    }))
}

#[get("/api/sessions/{id}")]
async fn get_session(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.play_session_service.snapshot(&id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/answers")]
async fn submit_answer(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<SubmitAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let (outcome, session_state) = state
        .play_session_service
        .submit_answer(&id, &request.answer)
        .await?;
    Ok(HttpResponse::Ok().json(SubmitAnswerResponse {
        outcome,
        state: session_state,
    }))
}

#[post("/api/sessions/{id}/reveal")]
async fn reveal_answer(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (outcome, session_state) = state.play_session_service.reveal_answer(&id).await?;
    Ok(HttpResponse::Ok().json(RevealAnswerResponse {
        outcome,
        state: session_state,
    }))
}

#[post("/api/sessions/{id}/tick")]
async fn tick(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.play_session_service.tick(&id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/advance")]
async fn advance_round(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.play_session_service.advance_round(&id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/hints")]
async fn get_hint(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
    request: web::Json<HintRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let context = state.play_session_service.document_context(&id).await?;
    let hint = state
        .hint_service
        .get_hint(&context, &request.target_term)
        .await?;
    Ok(HttpResponse::Ok().json(HintResponse { hint }))
}

#[delete("/api/sessions/{id}")]
async fn abandon_session(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.play_session_service.abandon(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

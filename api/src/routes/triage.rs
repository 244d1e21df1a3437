use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode, header::CONTENT_LENGTH};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use triage_core::draft::DraftResult;
use triage_core::edit_tracking::{EditMetrics, measure_edit};
use triage_core::guidance::AgentGuidance;
use triage_core::validation::{
    MAX_PAYLOAD_BYTES, ValidationError, oversized_payload, parse_payload,
};
use triage_core::{ClassificationResult, TicketAnalysis, analyze, classify};
use utoipa::ToSchema;

use crate::error::{AppError, now_rfc3339};
use crate::extract::AppJson;
use crate::knowledge::{KnowledgeQuery, KnowledgeRetrieval, retrieve_with_timeout};
use crate::state::AppState;

pub const RESPONSE_VERSION: &str = "1.0";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/draft", post(create_draft))
        .route("/api/v1/classify", post(classify_ticket))
        .route("/api/v1/draft/edits", post(measure_draft_edits))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DraftResponse {
    pub success: bool,
    /// Response contract version
    pub version: String,
    pub request_id: String,
    pub timestamp: String,
    pub processing_time_ms: u64,
    pub intent_classification: ClassificationResult,
    pub draft: DraftResult,
    pub agent_guidance: AgentGuidance,
    pub knowledge_retrieval: KnowledgeRetrieval,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassifyResponse {
    pub success: bool,
    pub version: String,
    pub request_id: String,
    pub timestamp: String,
    pub processing_time_ms: u64,
    pub intent_classification: ClassificationResult,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DraftEditsRequest {
    /// Draft text as generated
    pub draft_text: String,
    /// Text the agent actually sent
    pub final_text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DraftEditsResponse {
    pub success: bool,
    pub request_id: String,
    pub timestamp: String,
    pub edit_metrics: EditMetrics,
}

/// Classify a ticket, generate a draft and decide auto-send eligibility
#[utoipa::path(
    post,
    path = "/api/v1/draft",
    request_body = triage_core::TicketRequest,
    responses(
        (status = 200, description = "Triage decision", body = DraftResponse),
        (status = 400, description = "Malformed JSON or invalid input", body = triage_core::error::ApiError),
        (status = 413, description = "Payload or field exceeds limits", body = triage_core::error::ApiError)
    ),
    tag = "triage"
)]
pub async fn create_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DraftResponse>, AppError> {
    let started = Instant::now();
    let ticket = parse_payload(&read_body(&headers, body)?)?;
    let request_id = uuid::Uuid::now_v7().to_string();

    let analysis = analyze(&ticket);
    log_decision(&request_id, &analysis);

    let query = KnowledgeQuery::new(
        analysis.intent_classification.primary_intent,
        ticket.metadata.product.as_deref(),
    );
    let knowledge_retrieval =
        retrieve_with_timeout(state.knowledge.as_ref(), &query, state.knowledge_timeout).await;

    let TicketAnalysis {
        intent_classification,
        draft,
        agent_guidance,
    } = analysis;

    Ok(Json(DraftResponse {
        success: true,
        version: RESPONSE_VERSION.to_string(),
        request_id,
        timestamp: now_rfc3339(),
        processing_time_ms: elapsed_ms(started),
        intent_classification,
        draft,
        agent_guidance,
        knowledge_retrieval,
    }))
}

/// Classify a ticket without drafting a response
#[utoipa::path(
    post,
    path = "/api/v1/classify",
    request_body = triage_core::TicketRequest,
    responses(
        (status = 200, description = "Intent classification", body = ClassifyResponse),
        (status = 400, description = "Malformed JSON or invalid input", body = triage_core::error::ApiError),
        (status = 413, description = "Payload or field exceeds limits", body = triage_core::error::ApiError)
    ),
    tag = "triage"
)]
pub async fn classify_ticket(
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let started = Instant::now();
    let ticket = parse_payload(&read_body(&headers, body)?)?;
    let intent_classification = classify(&ticket);

    Ok(Json(ClassifyResponse {
        success: true,
        version: RESPONSE_VERSION.to_string(),
        request_id: uuid::Uuid::now_v7().to_string(),
        timestamp: now_rfc3339(),
        processing_time_ms: elapsed_ms(started),
        intent_classification,
    }))
}

/// Compare a generated draft with the text the agent sent
#[utoipa::path(
    post,
    path = "/api/v1/draft/edits",
    request_body = DraftEditsRequest,
    responses(
        (status = 200, description = "Edit metrics", body = DraftEditsResponse),
        (status = 400, description = "Malformed JSON or invalid input", body = triage_core::error::ApiError)
    ),
    tag = "triage"
)]
pub async fn measure_draft_edits(
    AppJson(req): AppJson<DraftEditsRequest>,
) -> Result<Json<DraftEditsResponse>, AppError> {
    let edit_metrics = measure_edit(&req.draft_text, &req.final_text);
    tracing::info!(
        edit_distance = edit_metrics.edit_distance,
        similarity = edit_metrics.normalized_similarity,
        unchanged = edit_metrics.unchanged,
        "Draft edit measured"
    );
    Ok(Json(DraftEditsResponse {
        success: true,
        request_id: uuid::Uuid::now_v7().to_string(),
        timestamp: now_rfc3339(),
        edit_metrics,
    }))
}

/// The body limit layer rejects oversized bodies before the handler runs;
/// report those in the same shape as every other size violation.
fn read_body(headers: &HeaderMap, body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    match body {
        Ok(bytes) => Ok(bytes),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let declared = headers
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(MAX_PAYLOAD_BYTES + 1);
            Err(oversized_payload(declared.max(MAX_PAYLOAD_BYTES + 1)).into())
        }
        Err(rejection) => Err(ValidationError::MalformedJson {
            reason: rejection.body_text(),
        }
        .into()),
    }
}

/// One structured event per triaged ticket. Customer text is never logged;
/// the draft digest lets the outcome be matched to the text later.
fn log_decision(request_id: &str, analysis: &TicketAnalysis) {
    let classification = &analysis.intent_classification;
    let guidance = &analysis.agent_guidance;
    tracing::info!(
        request_id,
        primary_intent = %classification.primary_intent,
        confidence = classification.confidence_overall,
        ambiguity_detected = classification.ambiguity_detected,
        safety_mode = classification.safety_mode.as_str(),
        draft_type = analysis.draft.draft_type.as_str(),
        auto_send_eligible = guidance.auto_send_eligible,
        failed_criterion = guidance.failed_criterion.map(|c| c.code()),
        draft_hash = %draft_digest(&analysis.draft.response_text),
        "Ticket triaged"
    );
}

pub fn draft_digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

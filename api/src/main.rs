use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod knowledge;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticket Triage API",
        version = "0.1.0",
        description = "Rule-based intent classification, draft generation and auto-send gating for support tickets."
    ),
    paths(
        routes::health::health_check,
        routes::triage::create_draft,
        routes::triage::classify_ticket,
        routes::triage::measure_draft_edits,
    ),
    components(schemas(
        HealthResponse,
        triage_core::error::ApiError,
        triage_core::ticket::TicketRequest,
        triage_core::ticket::ConversationMessage,
        triage_core::ticket::Role,
        triage_core::ticket::TicketMetadata,
        triage_core::intent::Intent,
        triage_core::intent::SafetyMode,
        triage_core::intent::ConfidenceLabel,
        triage_core::intent::Tone,
        triage_core::intent::ActionKind,
        triage_core::intent::DraftType,
        triage_core::pipeline::ClassificationResult,
        triage_core::draft::DraftResult,
        triage_core::draft::QualityMetrics,
        triage_core::guidance::AgentGuidance,
        triage_core::guidance::AutoSendCriterion,
        triage_core::guidance::CannedResponseSuggestion,
        triage_core::edit_tracking::EditMetrics,
        knowledge::KnowledgeRetrieval,
        knowledge::KnowledgeSource,
        knowledge::RetrievalStatus,
        knowledge::Coverage,
        routes::triage::DraftResponse,
        routes::triage::ClassifyResponse,
        routes::triage::DraftEditsRequest,
        routes::triage::DraftEditsResponse,
    )),
    tags(
        (name = "triage", description = "Ticket classification and drafting"),
        (name = "system", description = "Service health")
    )
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triage_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::ServerConfig::from_env();
    let app_state = state::AppState::new(&config, Arc::new(knowledge::EmptyKnowledgeRetriever));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::triage::router().layer(middleware::rate_limit::triage_layer()))
        .layer(middleware::access_log::AccessLogLayer::new())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer(&config.cors_origins)),
        )
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        knowledge_timeout_ms = config.knowledge_timeout.as_millis() as u64,
        "Ticket triage API listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

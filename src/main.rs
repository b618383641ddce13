use axum::{Router, routing::get};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use topology_advisor::config::Config;
use topology_advisor::services::ledger;
use topology_advisor::services::llm::{LLMGateway, LLMGatewayImpl, ModelSelection};
use topology_advisor::utils::JwtUtil;
use topology_advisor::{AppState, api_router, db, handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        // AI
        handlers::ai::analyze_topology,
        handlers::ai::suggest_improvements,
        handlers::ai::security_analysis,
        handlers::ai::ai_health,
        handlers::ai::list_models,
        handlers::ai::set_model,
        // Analysis history
        handlers::analysis_history::list_history,
        handlers::analysis_history::create_history_record,
        handlers::analysis_history::get_history_record,
        handlers::analysis_history::delete_history_record,
        handlers::analysis_history::clear_history,
        handlers::analysis_history::history_stats,
        // Projects
        handlers::project::list_projects,
        handlers::project::create_project,
        handlers::project::get_project,
        handlers::project::update_project,
        handlers::project::delete_project,
    ),
    components(
        schemas(
            handlers::ai::AnalyzeRequest,
            handlers::ai::TopologyRequest,
            handlers::ai::AnalysisResponse,
            handlers::ai::AiHealthResponse,
            handlers::ai::ModelsResponse,
            handlers::ai::SetModelRequest,
            handlers::ai::SetModelResponse,
            handlers::analysis_history::CreateAnalysisRequest,
            handlers::analysis_history::MessageResponse,
            handlers::analysis_history::ClearHistoryResponse,
            handlers::project::CreateProjectRequest,
            handlers::project::UpdateProjectRequest,
            ledger::AnalysisRecord,
            ledger::AnalysisStats,
            ledger::Project,
        )
    ),
    tags(
        (name = "AI", description = "Topology analysis and model server control"),
        (name = "Analysis History", description = "Stored analyses and usage statistics"),
        (name = "Projects", description = "Project bookkeeping"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first
    let config = Config::load()?;

    // Initialize logging
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);

    let registry = tracing_subscriber::registry().with(log_filter);

    // Keeps the non-blocking file writer flushing until shutdown
    let mut _log_guard = None;

    if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path.parent().and_then(|p| p.to_str()).unwrap_or("logs");
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("topology-advisor.log");
        // Rolling appender adds the date suffix itself
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        _log_guard = Some(guard);
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    tracing::info!("Topology Advisor starting up");
    tracing::info!("Configuration loaded successfully");

    let pool = db::create_pool(&config.database.url).await?;
    tracing::info!("Database pool created successfully");

    let jwt_util = Arc::new(JwtUtil::new(&config.auth.jwt_secret, config.auth.jwt_expires_in));

    let selection = Arc::new(ModelSelection::new(
        config.llm.base_url.as_str(),
        config.llm.model.as_str(),
        config.llm.request_timeout(),
    ));
    let gateway: Arc<dyn LLMGateway> =
        Arc::new(LLMGatewayImpl::new(selection, config.llm.gateway_settings())?);
    tracing::info!(
        "LLM gateway initialized (base_url: {}, model: {}, timeout: {}s, locale: {})",
        gateway.base_url(),
        gateway.current_model(),
        config.llm.timeout_secs,
        config.llm.locale
    );

    if !gateway.check_health().await {
        tracing::warn!(
            "Model server at {} is not reachable yet, analyses will report it until it is",
            gateway.base_url()
        );
    }

    let app_state = Arc::new(AppState::new(pool, jwt_util, gateway));

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check));

    let app = Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router(app_state))
        .merge(health_routes)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API documentation available at http://{}/api-docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn ready_check() -> &'static str {
    "READY"
}

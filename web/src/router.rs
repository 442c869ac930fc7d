use crate::{
    controller::{diagnostics_controller, health_check_controller},
    error::handle_panic,
    middleware::request_logging,
    sse, AppState,
};
use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use log::*;
use service::config::Config;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Agent Diagnostics API"
        ),
        paths(
            health_check_controller::health_check,
            diagnostics_controller::emit,
            sse::handler::diagnostics_stream,
        ),
        components(
            schemas(
                health_check_controller::HealthResponse,
                diagnostics_controller::EmitParams,
                diagnostics_controller::EmitResponse,
            )
        ),
        tags(
            (name = "health", description = "Liveness and environment"),
            (name = "diagnostics", description = "Agent observability event stream")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    let router = Router::new()
        .merge(health_routes(app_state.clone()))
        .merge(diagnostics_routes(app_state.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"));

    apply_middleware(router, &app_state.config)
}

/// Wraps routes in panic recovery, CORS (outside production) and request logging,
/// innermost first.
pub(crate) fn apply_middleware(router: Router, config: &Config) -> Router {
    let router = router.layer(CatchPanicLayer::custom(handle_panic));

    let router = if config.is_production() {
        router
    } else {
        router.layer(cors_layer(config))
    };

    router.layer(from_fn(request_logging::log_request))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    info!("CORS allowed origins: {:?}", config.allowed_origins);

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false)
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

fn diagnostics_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/diagnostics/stream", get(sse::handler::diagnostics_stream))
        .route("/diagnostics/emit", post(diagnostics_controller::emit))
        .with_state(app_state)
}

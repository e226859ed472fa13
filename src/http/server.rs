//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router catching every path
//! - Wire up middleware (request ID, tracing, timeout, concurrency limit)
//! - Classify each request and forward it once to its backend's upstream
//! - Swap routing state when a new configuration arrives
//!
//! # Design Decisions
//! - No retries and no load balancing: one upstream address per backend
//! - Routing state is read lock-free per request via `ArcSwap`
//! - The body is buffered once; the upstream receives the original bytes

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{uri::Authority, Request, StatusCode, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::error_response;
use crate::observability::metrics;
use crate::routing::{Classification, Classifier, FallbackChain, RouteError};

/// Everything a request needs that may change on config reload.
#[derive(Debug)]
pub struct RoutingState {
    pub classifier: Classifier,
    pub upstreams: HashMap<String, Authority>,
    pub max_body_bytes: usize,
}

impl RoutingState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let classifier = if config.fallback_routes.is_empty() {
            Classifier::new()
        } else {
            Classifier::with_fallback(Arc::new(FallbackChain::from_config(&config.fallback_routes)))
        };

        let mut upstreams = HashMap::new();
        for (name, address) in &config.upstreams {
            match Authority::from_str(address) {
                Ok(authority) => {
                    upstreams.insert(name.clone(), authority);
                }
                Err(e) => tracing::warn!(backend = %name, address = %address, error = %e, "Invalid upstream address"),
            }
        }

        Self {
            classifier,
            upstreams,
            max_body_bytes: config.limits.max_body_bytes,
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routing: Arc<ArcSwap<RoutingState>>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    routing: Arc<ArcSwap<RoutingState>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let routing = Arc::new(ArcSwap::from_pointee(RoutingState::from_config(&config)));

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            routing: routing.clone(),
            client,
        };
        let router = Self::build_router(&config, state);

        Self {
            router,
            config,
            routing,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections));

        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Serve on `listener` until `shutdown` fires, applying every config
    /// received on `config_updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let routing = self.routing.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                routing.store(Arc::new(RoutingState::from_config(&config)));
                tracing::info!(upstreams = config.upstreams.len(), "Routing state swapped");
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Classify, rewrite and forward one request.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let routing = state.routing.load_full();

    let (parts, classification) = match routing
        .classifier
        .classify_http(request, routing.max_body_bytes)
        .await
    {
        Ok(classified) => classified,
        Err(e) => return reject(&request_id, &path, e, start),
    };

    let Classification {
        target,
        request: routable,
        legacy,
    } = classification;
    let backend = target.identifier().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        backend = %backend,
        rewritten = %routable.uri(),
        legacy,
        "Routing request"
    );

    let Some(authority) = routing.upstreams.get(&backend).cloned() else {
        tracing::warn!(request_id = %request_id, backend = %backend, "No upstream configured for backend");
        metrics::record_request(&backend, 503, start);
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("no upstream configured for backend {backend}"),
        );
    };

    let mut upstream_request = match routable.into_http(parts, Some(authority)) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Failed to build upstream request");
            metrics::record_request(&backend, 502, start);
            return error_response(StatusCode::BAD_GATEWAY, "invalid upstream request");
        }
    };
    *upstream_request.version_mut() = Version::HTTP_11;

    match state.client.request(upstream_request).await {
        Ok(response) => {
            metrics::record_request(&backend, response.status().as_u16(), start);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Upstream error");
            metrics::record_request(&backend, 502, start);
            error_response(StatusCode::BAD_GATEWAY, "upstream request failed")
        }
    }
}

fn reject(request_id: &str, path: &str, error: RouteError, start: Instant) -> Response {
    match &error {
        RouteError::UnrecognizedRoute { .. } => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        }
        RouteError::MalformedRequest { route, source } => {
            tracing::warn!(request_id = %request_id, route = %route, error = %source, "Malformed legacy request");
        }
        RouteError::BodyRead(reason) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %reason, "Failed to read request body");
        }
    }
    metrics::record_classification_failure(error.kind());
    metrics::record_request(error.backend().identifier(), error.status_code().as_u16(), start);
    error.into_response()
}

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use kubevnf_engine::{EngineError, VnfOrchestrator};
use kubevnf_models::{
    CreateVnfRequest, CreateVnfResponse, DeleteVnfResponse, ListVnfResponse, VnfInstance,
};

use crate::config::Config;

/// Shared API state. The instance map holds each VNF's ownership record
/// between creation and deletion; the engine itself keeps no durable
/// state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<VnfOrchestrator>,
    pub config: Arc<Config>,
    pub instances: Arc<RwLock<HashMap<String, VnfInstance>>>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/vnf_instances", post(create_vnf).get(list_vnf))
        .route("/v1/vnf_instances/:id", delete(delete_vnf))
        .layer(cors)
        .with_state(state)
}

/// Start the API server
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<()> {
    let app = create_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "kubevnf",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn create_vnf(
    State(state): State<AppState>,
    Json(request): Json<CreateVnfRequest>,
) -> Result<(StatusCode, Json<CreateVnfResponse>), AppError> {
    let namespace = request
        .namespace
        .clone()
        .unwrap_or_else(|| state.config.namespace.clone());

    let created = state
        .orchestrator
        .create_vnf(
            &request.csar_id,
            &request.cloud_region_id,
            &namespace,
            &CancellationToken::new(),
        )
        .await
        .map_err(|failure| AppError::CreateFailed {
            message: failure.error.to_string(),
            partial: failure.partial,
        })?;

    let instance = VnfInstance {
        vnf_id: created.external_id.clone(),
        csar_id: request.csar_id,
        cloud_region_id: request.cloud_region_id,
        namespace: namespace.clone(),
        resources: created.resources.clone(),
        created_at: chrono::Utc::now(),
    };
    state
        .instances
        .write()
        .await
        .insert(created.external_id.clone(), instance);

    Ok((
        StatusCode::CREATED,
        Json(CreateVnfResponse {
            vnf_id: created.external_id,
            namespace,
            resources: created.resources,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    namespace: Option<String>,
    limit: Option<u32>,
}

async fn list_vnf(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListVnfResponse>, AppError> {
    let namespace = query
        .namespace
        .unwrap_or_else(|| state.config.namespace.clone());
    let limit = query.limit.unwrap_or(100);

    let vnf_ids = state
        .orchestrator
        .list_vnfs(&namespace, limit)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ListVnfResponse { vnf_ids }))
}

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    namespace: Option<String>,
}

async fn delete_vnf(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteVnfResponse>, AppError> {
    let instance = state
        .instances
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("VNF instance '{id}' not found")))?;

    let namespace = query.namespace.unwrap_or(instance.namespace.clone());

    match state
        .orchestrator
        .destroy_vnf(&instance.resources, &namespace, &CancellationToken::new())
        .await
    {
        Ok(()) => {
            state.instances.write().await.remove(&id);
            Ok(Json(DeleteVnfResponse {
                vnf_id: id,
                deleted: true,
            }))
        }
        Err(failure) => {
            // Keep the undeleted remainder so the call can be retried.
            if let Some(stored) = state.instances.write().await.get_mut(&id) {
                stored.resources = failure.remaining.clone();
            }
            Err(AppError::DestroyFailed {
                message: failure.error.to_string(),
                remaining: failure.remaining,
            })
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    CreateFailed {
        message: String,
        partial: kubevnf_models::OwnershipRecord,
    },
    DestroyFailed {
        message: String,
        remaining: kubevnf_models::OwnershipRecord,
    },
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ResourceNotFound { .. } => AppError::NotFound(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": msg }),
            ),
            AppError::CreateFailed { message, partial } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": message, "partial_resources": partial }),
            ),
            AppError::DestroyFailed { message, remaining } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": message, "remaining_resources": remaining }),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

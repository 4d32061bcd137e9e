use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub modules: HealthModules,
}

#[derive(Debug, Serialize)]
pub struct HealthModules {
    pub store: StoreStatus,
    pub auth: AuthStatus,
}

#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub backend: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub configured: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        modules: HealthModules {
            store: StoreStatus {
                backend: state.store.backend(),
            },
            auth: AuthStatus {
                configured: state.tokens.is_some(),
            },
        },
    })
}

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateStore, EntitlementGrant, Store};

#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Store profile as served to the map client: entitlement status plus
/// grant history, without the internal pending-slot bookkeeping.
#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub id: String,
    pub name: String,
    pub vip: bool,
    pub ad_tier: Option<String>,
    pub ad_expires_at: Option<i64>,
    /// Whether a checkout is currently awaiting gateway confirmation
    pub order_pending: bool,
    pub grants: Vec<EntitlementGrant>,
}

impl StoreResponse {
    fn new(store: Store, grants: Vec<EntitlementGrant>) -> Self {
        Self {
            id: store.id,
            name: store.name,
            vip: store.vip,
            ad_tier: store.ad_tier,
            ad_expires_at: store.ad_expires_at,
            order_pending: store.pending_entitlement.is_some(),
            grants,
        }
    }
}

pub async fn create_store(
    State(state): State<AppState>,
    Json(request): Json<CreateStoreRequest>,
) -> Result<Json<Store>> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let conn = state.db.get()?;
    let input = CreateStore {
        id: request.id,
        name: request.name,
    };

    match queries::create_store(&conn, &input) {
        Ok(store) => Ok(Json(store)),
        Err(AppError::Database(rusqlite::Error::SqliteFailure(e, _)))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Conflict(msg::STORE_EXISTS.into()))
        }
        Err(e) => Err(e),
    }
}

pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoreResponse>> {
    let conn = state.db.get()?;
    let store = queries::get_store_by_id(&conn, &id)?.or_not_found(msg::STORE_NOT_FOUND)?;
    let grants = queries::list_grants_for_store(&conn, &store.id)?;
    Ok(Json(StoreResponse::new(store, grants)))
}

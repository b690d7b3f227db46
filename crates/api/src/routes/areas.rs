//! Area route handlers.
//!
//! Province and sub-area listings, served through the in-process area cache.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use pavilion_core::AreaId;

use crate::db::areas::{AreaListing, AreaRepository};
use crate::error::ApiError;
use crate::models::area::Area;
use crate::state::AppState;

fn area_json(area: &Area) -> Value {
    json!({"id": area.id, "name": area.name})
}

/// List all provinces.
pub async fn provinces(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let repo = AreaRepository::new(state.pool());
    let listing = state.areas().provinces(&repo).await?;

    let AreaListing::Provinces(areas) = listing.as_ref() else {
        return Err(ApiError::Internal(
            "area cache returned wrong listing kind".to_owned(),
        ));
    };

    let province_list: Vec<Value> = areas.iter().map(area_json).collect();

    Ok(Json(json!({
        "code": 0,
        "errmsg": "OK",
        "province_list": province_list,
    })))
}

/// List the sub-areas of a region.
pub async fn sub_areas(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let id = AreaId::new(id);
    let repo = AreaRepository::new(state.pool());

    let listing = state
        .areas()
        .children(&repo, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("area {id}")))?;

    let AreaListing::Children { parent, subs } = listing.as_ref() else {
        return Err(ApiError::Internal(
            "area cache returned wrong listing kind".to_owned(),
        ));
    };

    let subs_json: Vec<Value> = subs.iter().map(area_json).collect();

    Ok(Json(json!({
        "code": 0,
        "errmsg": "OK",
        "sub_data": {
            "id": parent.id,
            "name": parent.name,
            "subs": subs_json,
        },
    })))
}

//! Delivery challan API.
//!
//! All endpoints require JWT authentication; the creating user is taken from
//! the verified claims, never from the request body.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::envelope::{ApiError, Envelope, FieldErrors, ResultExt, push_field_error};
use crate::auth::{AnyRole, Auth};
use crate::db::{ChallanStatus, ChallanUpdate, Database, NewChallan};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct ChallansState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(ChallansState);

pub fn router(state: ChallansState) -> Router {
    Router::new()
        .route("/", get(list_challans))
        .route("/create", post(create_challan))
        .route("/{id}", get(get_challan).put(update_challan).delete(delete_challan))
        .with_state(state)
}

// --- Request types ---

#[derive(Deserialize)]
struct ListQuery {
    status: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
struct CreateChallanRequest {
    #[serde(rename = "dcNumber")]
    dc_number: Option<String>,
    #[serde(rename = "customerName")]
    customer_name: Option<String>,
    #[serde(rename = "itemNames", default)]
    item_names: Vec<String>,
    #[serde(rename = "totalDispatchQty", default)]
    total_dispatch_qty: i64,
    #[serde(rename = "totalReceivedQty", default)]
    total_received_qty: i64,
    status: Option<String>,
}

#[derive(Deserialize)]
struct UpdateChallanRequest {
    #[serde(rename = "customerName")]
    customer_name: Option<String>,
    #[serde(rename = "itemNames")]
    item_names: Option<Vec<String>>,
    #[serde(rename = "totalDispatchQty")]
    total_dispatch_qty: Option<i64>,
    #[serde(rename = "totalReceivedQty")]
    total_received_qty: Option<i64>,
    status: Option<String>,
}

// --- Helpers ---

fn parse_status(value: &str, errors: &mut FieldErrors) -> Option<ChallanStatus> {
    let status = ChallanStatus::parse(value);
    if status.is_none() {
        push_field_error(
            errors,
            "status",
            "Status must be one of draft, open, partial, closed, cancelled, deleted",
        );
    }
    status
}

// --- Handlers ---

/// List challans with pagination and an optional status filter.
async fn list_challans(
    State(state): State<ChallansState>,
    _auth: Auth<AnyRole>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::new();

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(value) => parse_status(value, &mut errors),
    };

    let page = match query.page.as_deref() {
        None | Some("") => 1,
        Some(value) => value.parse::<i64>().unwrap_or(0),
    };
    if page < 1 {
        push_field_error(&mut errors, "page", "Page must be at least 1");
    }

    let limit = match query.limit.as_deref() {
        None | Some("") => 10,
        Some(value) => value.parse::<i64>().unwrap_or(0),
    };
    if !(1..=100).contains(&limit) {
        push_field_error(&mut errors, "limit", "Limit must be between 1 and 100");
    }

    if !errors.is_empty() {
        return Err(ApiError::validation("Invalid query parameters", errors));
    }

    let total = state
        .db
        .challans()
        .count(status)
        .await
        .db_err("Failed to count delivery challans")?;
    let challans = state
        .db
        .challans()
        .list(status, limit, (page - 1) * limit)
        .await
        .db_err("Failed to list delivery challans")?;

    let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

    Ok(Envelope::ok(
        "Delivery challans retrieved successfully",
        json!({
            "data": challans,
            "pagination": {
                "total": total,
                "page": page,
                "limit": limit,
                "pages": pages,
            },
        }),
    ))
}

/// Create a new challan owned by the authenticated caller.
async fn create_challan(
    State(state): State<ChallansState>,
    auth: Auth<AnyRole>,
    Json(payload): Json<CreateChallanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let dc_number = payload.dc_number.as_deref().unwrap_or("").trim().to_string();
    let customer_name = payload
        .customer_name
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();

    let mut errors = FieldErrors::new();
    if dc_number.is_empty() {
        push_field_error(&mut errors, "dcNumber", "DC Number is required");
    }
    if customer_name.is_empty() {
        push_field_error(&mut errors, "customerName", "Customer name is required");
    }
    if payload.total_dispatch_qty < 0 {
        push_field_error(&mut errors, "totalDispatchQty", "Quantity must be positive");
    }
    if payload.total_received_qty < 0 {
        push_field_error(&mut errors, "totalReceivedQty", "Quantity must be positive");
    }
    let status = match payload.status.as_deref() {
        None | Some("") => Some(ChallanStatus::Draft),
        Some(value) => parse_status(value, &mut errors),
    };
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    if state
        .db
        .challans()
        .dc_number_exists(&dc_number)
        .await
        .db_err("Failed to check DC number")?
    {
        return Err(ApiError::conflict(
            "Delivery Challan with this number already exists",
        ));
    }

    let uuid = uuid::Uuid::new_v4().to_string();
    state
        .db
        .challans()
        .create(NewChallan {
            uuid: &uuid,
            dc_number: &dc_number,
            customer_name: &customer_name,
            item_names: &payload.item_names,
            total_dispatch_qty: payload.total_dispatch_qty,
            total_received_qty: payload.total_received_qty,
            status: status.unwrap_or(ChallanStatus::Draft),
            created_by: &auth.claims.sub,
        })
        .await
        .db_err("Failed to create delivery challan")?;

    let challan = state
        .db
        .challans()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created delivery challan")?
        .ok_or_else(|| ApiError::internal("Failed to create delivery challan"))?;

    Ok((
        StatusCode::CREATED,
        Envelope::ok("Delivery challan created successfully", json!(challan)),
    ))
}

/// Get a single challan by UUID.
async fn get_challan(
    State(state): State<ChallansState>,
    _auth: Auth<AnyRole>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let challan = state
        .db
        .challans()
        .get_by_uuid(&id)
        .await
        .db_err("Failed to load delivery challan")?
        .ok_or_else(|| ApiError::not_found("Delivery challan not found"))?;

    Ok(Envelope::ok(
        "Delivery challan retrieved successfully",
        json!(challan),
    ))
}

/// Apply a partial update to a challan.
async fn update_challan(
    State(state): State<ChallansState>,
    _auth: Auth<AnyRole>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateChallanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::new();

    let customer_name = match payload.customer_name {
        Some(value) => {
            let value = value.trim().to_string();
            if value.is_empty() {
                push_field_error(&mut errors, "customerName", "Customer name is required");
            }
            Some(value)
        }
        None => None,
    };
    if payload.total_dispatch_qty.is_some_and(|q| q < 0) {
        push_field_error(&mut errors, "totalDispatchQty", "Quantity must be positive");
    }
    if payload.total_received_qty.is_some_and(|q| q < 0) {
        push_field_error(&mut errors, "totalReceivedQty", "Quantity must be positive");
    }
    let status = match payload.status.as_deref() {
        None => None,
        Some(value) => parse_status(value, &mut errors),
    };
    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }

    let updated = state
        .db
        .challans()
        .update(
            &id,
            ChallanUpdate {
                customer_name,
                item_names: payload.item_names,
                total_dispatch_qty: payload.total_dispatch_qty,
                total_received_qty: payload.total_received_qty,
                status,
            },
        )
        .await
        .db_err("Failed to update delivery challan")?;

    if !updated {
        return Err(ApiError::not_found("Delivery challan not found"));
    }

    let challan = state
        .db
        .challans()
        .get_by_uuid(&id)
        .await
        .db_err("Failed to load updated delivery challan")?
        .ok_or_else(|| ApiError::not_found("Delivery challan not found"))?;

    Ok(Envelope::ok(
        "Delivery challan updated successfully",
        json!(challan),
    ))
}

/// Delete a challan.
async fn delete_challan(
    State(state): State<ChallansState>,
    _auth: Auth<AnyRole>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .challans()
        .delete(&id)
        .await
        .db_err("Failed to delete delivery challan")?;

    if !deleted {
        return Err(ApiError::not_found("Delivery challan not found"));
    }

    Ok(Envelope::message("Delivery challan deleted successfully"))
}

/// Login history routes (admin only)

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::HistoryLedger;

/// GET /history
pub async fn list_history(history: web::Data<HistoryLedger>) -> Result<HttpResponse, AppError> {
    tracing::info!("Request to find all history records");

    let entries = history.find_all().await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// DELETE /history/{id}
pub async fn delete_history(
    id: web::Path<Uuid>,
    history: web::Data<HistoryLedger>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    tracing::info!(history_id = %id, "Request to delete history record");

    let deleted = history.delete_one(id).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

/// DELETE /history
pub async fn clear_history(history: web::Data<HistoryLedger>) -> Result<HttpResponse, AppError> {
    tracing::warn!("Request to clear all history records");

    let cleared = history.clear_all().await?;
    Ok(HttpResponse::Ok().json(cleared))
}

//! `POST /analyze`: run one assessment.

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::assessment::AssessmentReport;
use crate::models::{missing_fields, PatientRecord};

/// Validate the body, then run the blocking pipeline on a worker thread.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AssessmentReport>, ApiError> {
    let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4());

    async move {
        let body = match payload {
            Ok(Json(Value::Object(map))) if !map.is_empty() => map,
            Ok(_) => return Err(ApiError::NoJson),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Unreadable request body");
                return Err(ApiError::NoJson);
            }
        };

        let missing = missing_fields(&body);
        if !missing.is_empty() {
            return Err(ApiError::MissingFields(missing));
        }

        let record = PatientRecord::from_fields(&body);
        let service = ctx.service.clone();
        let worker_span = tracing::Span::current();

        let report = tokio::task::spawn_blocking(move || {
            let _entered = worker_span.enter();
            service.assess(&record)
        })
        .await
        .map_err(|e| {
            if e.is_panic() {
                ApiError::Internal(panic_message(e.into_panic()))
            } else {
                ApiError::Internal(e.to_string())
            }
        })?;

        tracing::info!(risk = report.risk.as_str(), hospitals = report.hospitals.len(), "Assessment complete");
        Ok(Json(report))
    }
    .instrument(span)
    .await
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "assessment worker panicked".to_string()
    }
}

//! HTTP handlers for the order workflow
//!
//! Every session handler works on an owned copy of the stored record: load,
//! apply the operation, write back. An operation that fails is never saved,
//! so a rejected submit leaves the stored session exactly as it was.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::core::auth::Authenticator;
use crate::core::distribution::DistributionEntry;
use crate::core::error::{NurseryError, NurseryResult, SessionError};
use crate::core::extractors::{Payload, SessionToken, Validated};
use crate::core::order::{BoxEntry, OrderDetails};
use crate::core::service::{SessionRecord, SessionStore};
use crate::core::session::{DistributionView, Session, SessionView, Stage};
use crate::core::summary::{OrderSummary, PrintSnapshot};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
    pub authenticator: Authenticator,
}

/// Login request body
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response body
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub user: String,
    pub stage: Stage,
}

/// Body for `PUT /session/order/box-count`
#[derive(Debug, Deserialize)]
pub struct BoxCountRequest {
    pub count: u32,
}

impl AppState {
    /// Fetch a live session; an idle one is discarded and reported missing
    async fn load(&self, token: SessionToken) -> NurseryResult<SessionRecord> {
        let not_found = || NurseryError::from(SessionError::NotFound { token: token.0 });
        let record = self.sessions.get(&token.0).await?.ok_or_else(not_found)?;

        if record.is_idle(self.config.session_idle_timeout()) {
            self.sessions.delete(&token.0).await?;
            tracing::info!(user = %record.user, "idle session expired");
            return Err(not_found());
        }
        Ok(record)
    }

    /// Apply `op` to a copy of the session and store it if `op` succeeds
    async fn edit<F>(&self, token: SessionToken, op: F) -> NurseryResult<SessionView>
    where
        F: FnOnce(&mut Session) -> NurseryResult<()>,
    {
        let mut record = self.load(token).await?;
        op(&mut record.session)?;
        record.touch();
        let record = self
            .sessions
            .update(&token.0, record)
            .await?
            .ok_or(SessionError::NotFound { token: token.0 })?;
        Ok(record.session.view())
    }
}

/// Check credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    Validated(request): Validated<LoginRequest>,
) -> Result<impl IntoResponse, NurseryError> {
    state
        .authenticator
        .login(&request.email, &request.password)
        .await?;

    let purged = state
        .sessions
        .purge_idle(state.config.session_idle_timeout())
        .await?;
    if purged > 0 {
        tracing::debug!(purged, "idle sessions discarded");
    }

    let record = SessionRecord::open(request.email, state.config.limits());
    let record = state.sessions.create(record).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token: record.token,
            stage: record.session.stage(),
            user: record.user,
        }),
    ))
}

/// Close the session and discard its data
pub async fn logout(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<StatusCode, NurseryError> {
    let record = state.load(token).await?;
    state.sessions.delete(&token.0).await?;
    tracing::info!(user = %record.user, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_session(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<SessionView>, NurseryError> {
    let record = state.load(token).await?;
    Ok(Json(record.session.view()))
}

pub async fn reset_session(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.reset();
            Ok(())
        })
        .await?;
    Ok(Json(view))
}

pub async fn update_order_details(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(details): Payload<OrderDetails>,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.edit_order()?.set_details(details);
            Ok(())
        })
        .await?;
    tracing::debug!("order details updated");
    Ok(Json(view))
}

pub async fn set_box_count(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(request): Payload<BoxCountRequest>,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.edit_order()?.set_box_count(request.count)?;
            Ok(())
        })
        .await?;
    tracing::debug!(count = request.count, "box count set");
    Ok(Json(view))
}

pub async fn update_box(
    State(state): State<AppState>,
    token: SessionToken,
    Path(index): Path<usize>,
    Payload(entry): Payload<BoxEntry>,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.edit_order()?.update_box(index, entry)?;
            Ok(())
        })
        .await?;
    tracing::debug!(index, "box updated");
    Ok(Json(view))
}

pub async fn remove_box(
    State(state): State<AppState>,
    token: SessionToken,
    Path(index): Path<usize>,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.edit_order()?.remove_box(index)?;
            Ok(())
        })
        .await?;
    tracing::debug!(index, "box removed");
    Ok(Json(view))
}

pub async fn submit_order(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| session.submit_order().map(|_| ()))
        .await?;
    Ok(Json(view))
}

pub async fn get_distribution(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<DistributionView>, NurseryError> {
    let record = state.load(token).await?;
    Ok(Json(record.session.distribution_view()?))
}

pub async fn add_distribution_entry(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.edit_distribution()?.add_entry()?;
            Ok(())
        })
        .await?;
    tracing::debug!("distribution entry added");
    Ok(Json(view))
}

pub async fn update_distribution_entry(
    State(state): State<AppState>,
    token: SessionToken,
    Path(index): Path<usize>,
    Payload(entry): Payload<DistributionEntry>,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.edit_distribution()?.update_entry(index, entry)?;
            Ok(())
        })
        .await?;
    tracing::debug!(index, "distribution entry updated");
    Ok(Json(view))
}

pub async fn remove_distribution_entry(
    State(state): State<AppState>,
    token: SessionToken,
    Path(index): Path<usize>,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| {
            session.edit_distribution()?.remove_entry(index)?;
            Ok(())
        })
        .await?;
    tracing::debug!(index, "distribution entry removed");
    Ok(Json(view))
}

pub async fn back_to_order(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| Ok(session.back_to_order()?))
        .await?;
    Ok(Json(view))
}

pub async fn submit_distribution(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<SessionView>, NurseryError> {
    let view = state
        .edit(token, |session| session.submit_distribution().map(|_| ()))
        .await?;
    Ok(Json(view))
}

pub async fn get_summary(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<OrderSummary>, NurseryError> {
    let record = state.load(token).await?;
    Ok(Json(record.session.summary()?))
}

/// Owned snapshot of the summary for the print collaborator
pub async fn print_summary(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Json<PrintSnapshot>, NurseryError> {
    let record = state.load(token).await?;
    let summary = record.session.summary()?;
    tracing::info!(order_number = %summary.order_number, "print snapshot taken");
    Ok(Json(PrintSnapshot::new(
        summary,
        state.config.page_size,
        Utc::now(),
    )))
}

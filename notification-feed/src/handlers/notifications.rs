use axum::extract::State;

use crate::models::ResultEnvelope;
use crate::startup::AppState;

/// `GET /get-notifications`: the whole feed, newest first.
///
/// Store failures never escape as faults; they become a
/// `{ success: false, message }` envelope with status 500.
#[tracing::instrument(skip(state))]
pub async fn get_notifications(State(state): State<AppState>) -> ResultEnvelope {
    ResultEnvelope::from(state.fetcher.fetch().await)
}

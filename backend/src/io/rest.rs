use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::{CommandOutcome, ErrorResponse, LedgerView, RecordBorrowRequest, RecordPaymentRequest, SnapshotRecord};
use tracing::{error, info, warn};

use crate::domain::LedgerError;
use crate::AppState;

/// Create the ledger API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_ledger))
        .route("/history", get(get_history))
        .route("/payments", post(record_payment))
        .route("/borrows", post(record_borrow))
        .route("/undo", post(undo))
}

/// Map a ledger error to its HTTP status and JSON body
fn error_response(err: LedgerError) -> Response {
    let status = match err {
        LedgerError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        LedgerError::NoHistory => StatusCode::CONFLICT,
        LedgerError::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = ErrorResponse {
        error: err.to_string(),
        event: err.to_event(),
    };
    (status, Json(body)).into_response()
}

/// A body that is not valid JSON or has a non-numeric amount counts as
/// invalid input, same as a bad number
fn rejection_response(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    error_response(LedgerError::InvalidAmount(rejection.body_text()))
}

/// GET /api/ledger
pub async fn get_ledger(State(state): State<AppState>) -> Json<LedgerView> {
    info!("GET /api/ledger");
    let ledger = state.ledger.lock().await;
    Json(ledger.view())
}

/// GET /api/ledger/history
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<SnapshotRecord>> {
    info!("GET /api/ledger/history");
    let ledger = state.ledger.lock().await;
    Json(ledger.history())
}

/// POST /api/ledger/payments
pub async fn record_payment(
    State(state): State<AppState>,
    request: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    info!("POST /api/ledger/payments - request: {:?}", request);

    let mut ledger = state.ledger.lock().await;
    command_response(ledger.record_payment(request.amount).await)
}

/// POST /api/ledger/borrows
pub async fn record_borrow(
    State(state): State<AppState>,
    request: Result<Json<RecordBorrowRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    info!("POST /api/ledger/borrows - request: {:?}", request);

    let mut ledger = state.ledger.lock().await;
    command_response(ledger.record_borrow(request.amount).await)
}

/// POST /api/ledger/undo
pub async fn undo(State(state): State<AppState>) -> Response {
    info!("POST /api/ledger/undo");
    let mut ledger = state.ledger.lock().await;
    command_response(ledger.undo().await)
}

fn command_response(result: Result<CommandOutcome, LedgerError>) -> Response {
    match result {
        Ok(outcome) => {
            if outcome.events.iter().any(|event| event.is_failure()) {
                error!("Command applied with failures: {:?}", outcome.events);
            }
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => {
            info!("Command rejected: {}", e);
            error_response(e)
        }
    }
}

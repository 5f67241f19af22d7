//! Analysis API endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::run_analysis;
use crate::error::ApiError;
use crate::models::{
    AnalyzeMoveRequest, AnalyzeMoveResponse, DataResponse, EvaluatePositionRequest,
    EvaluatePositionResponse, TopThreeMovesResponse,
};
use crate::AppState;

/// POST /evaluate-position
///
/// Evaluates a position: search score, win/draw/loss statistics for the side
/// to move and the three best moves.
///
/// # Errors
/// * 400 Bad Request - Invalid FEN, time out of range or malformed engine output
/// * 422 Unprocessable Entity - Body is not a valid request
/// * 500 Internal Server Error - Engine failed
/// * 504 Gateway Timeout - Analysis exceeded the request deadline
pub async fn evaluate_position(
    State(state): State<AppState>,
    payload: Result<Json<EvaluatePositionRequest>, JsonRejection>,
) -> Result<Json<DataResponse<EvaluatePositionResponse>>, ApiError> {
    let Json(request) = payload?;

    let result = run_analysis(&state, move |analyzer| {
        analyzer.evaluate_position(&request.fen, request.time_to_analyze)
    })
    .await?;

    Ok(Json(DataResponse::new(result.into())))
}

/// POST /analyze-move
///
/// Reports whether a move captures and how the static evaluation changes
/// when it is played.
///
/// # Errors
/// * 400 Bad Request - Invalid FEN or invalid move
/// * 422 Unprocessable Entity - Body is not a valid request
/// * 500 Internal Server Error - Engine failed, or has no static evaluation
///   because a side is in check
/// * 504 Gateway Timeout - Analysis exceeded the request deadline
pub async fn analyze_move(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeMoveRequest>, JsonRejection>,
) -> Result<Json<DataResponse<AnalyzeMoveResponse>>, ApiError> {
    let Json(request) = payload?;

    let result = run_analysis(&state, move |analyzer| {
        analyzer.analyze_move(&request.fen, &request.mv)
    })
    .await?;

    Ok(Json(DataResponse::new(result.into())))
}

/// GET /
///
/// The three best moves from the starting position.
pub async fn opening_moves(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<TopThreeMovesResponse>>, ApiError> {
    let moves = run_analysis(&state, |analyzer| analyzer.opening_top_moves()).await?;

    Ok(Json(DataResponse::new(TopThreeMovesResponse {
        top_three_moves: moves.into_iter().map(Into::into).collect(),
    })))
}

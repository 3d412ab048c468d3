//! HTTP front end for the comparison.

use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use log::{error, info};

use crate::compare::{self, Comparison};
use crate::data::CompareRequest;
use crate::error::{SchedulerError, SchedulerResult};
use crate::sample;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

fn status_code(error: &SchedulerError) -> StatusCode {
    match error {
        SchedulerError::Config { .. } | SchedulerError::ManualRejected { .. } => {
            StatusCode::BAD_REQUEST
        }
        SchedulerError::Solver { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SchedulerError::Input { .. } | SchedulerError::Render(_) | SchedulerError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn compare_handler(
    Json(request): Json<CompareRequest>,
) -> Result<Json<Comparison>, (StatusCode, String)> {
    // the solver blocks; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || compare::run(&request))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    match outcome {
        Ok(comparison) => Ok(Json(comparison)),
        Err(e) => {
            error!("Comparison failed: {}", e);
            Err((status_code(&e), e.to_string()))
        }
    }
}

async fn sample_handler() -> Json<CompareRequest> {
    Json(sample::request())
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/staffing/compare", post(compare_handler))
        .route("/v1/staffing/sample", get(sample_handler))
}

pub async fn run_server(addr: &str) -> SchedulerResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let error = SchedulerError::Config {
            key: "T0".into(),
            message: "undefined".into(),
        };
        assert_eq!(status_code(&error), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn solver_errors_map_to_unprocessable() {
        let error = SchedulerError::Solver {
            status: crate::solver::SolverStatus::Infeasible,
            message: String::new(),
        };
        assert_eq!(status_code(&error), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

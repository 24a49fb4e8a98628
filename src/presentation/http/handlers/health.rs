//! Health Handlers
//!
//! `/health` and `/health/live` answer from memory. `/health/ready` pings the
//! database and reports how many sockets and rooms the gateway is holding.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::infrastructure::database;
use crate::startup::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Outcome of the readiness ping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseState {
    Up,
    Down,
    TimedOut,
}

/// Live gateway load at the time of the check
#[derive(Debug, Serialize)]
pub struct GatewayLoad {
    pub connections: usize,
    pub rooms: usize,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: DatabaseState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_latency_ms: Option<u64>,
    pub gateway: GatewayLoad,
}

impl ReadinessResponse {
    fn new(database: DatabaseState, latency_ms: Option<u64>, gateway: GatewayLoad) -> Self {
        Self {
            ready: database == DatabaseState::Up,
            database,
            database_latency_ms: latency_ms,
            gateway,
        }
    }

    fn status_code(&self) -> StatusCode {
        if self.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 200 when the database answers within the query timeout, 503 otherwise.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let ping = tokio::time::timeout(
        state.settings.database.query_timeout(),
        database::ping(&state.db),
    )
    .await;

    let (database, latency_ms) = match ping {
        Ok(Ok(())) => (DatabaseState::Up, Some(started.elapsed().as_millis() as u64)),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Readiness ping failed");
            (DatabaseState::Down, None)
        }
        Err(_) => {
            tracing::warn!("Readiness ping timed out");
            (DatabaseState::TimedOut, None)
        }
    };

    let response = ReadinessResponse::new(
        database,
        latency_ms,
        GatewayLoad {
            connections: state.registry.connection_count(),
            rooms: state.registry.room_count(),
        },
    );

    (response.status_code(), Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn idle() -> GatewayLoad {
        GatewayLoad {
            connections: 0,
            rooms: 0,
        }
    }

    #[test_case(DatabaseState::Up, StatusCode::OK ; "up")]
    #[test_case(DatabaseState::Down, StatusCode::SERVICE_UNAVAILABLE ; "down")]
    #[test_case(DatabaseState::TimedOut, StatusCode::SERVICE_UNAVAILABLE ; "timed out")]
    fn readiness_follows_the_database(database: DatabaseState, expected: StatusCode) {
        assert_eq!(ReadinessResponse::new(database, None, idle()).status_code(), expected);
    }

    #[test]
    fn readiness_body_shape() {
        let body = serde_json::to_value(ReadinessResponse::new(
            DatabaseState::TimedOut,
            None,
            GatewayLoad {
                connections: 3,
                rooms: 2,
            },
        ))
        .unwrap();

        assert_eq!(body["ready"], false);
        assert_eq!(body["database"], "timed_out");
        assert!(body.get("database_latency_ms").is_none());
        assert_eq!(body["gateway"]["connections"], 3);
    }
}

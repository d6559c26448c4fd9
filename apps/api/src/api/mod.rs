use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, middleware, routing::get};
use axum_helpers::auth::{TokenProvider, auth_middleware};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_members::PgMemberRepository;
use domain_users::{NoopEventSink, PgUserRepository, UserEventSink, UserService, handlers};
use serde_json::Value;
use std::sync::Arc;

use crate::events::NatsEventSink;
use crate::state::AppState;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// `/auth/*` is public; `/user/*` sits behind the authentication
/// middleware, with per-handler role checks on top.
pub fn routes(state: &AppState) -> Router {
    let tokens = TokenProvider::new(&state.config.jwt);

    let events: Arc<dyn UserEventSink> = match &state.nats {
        Some(client) => Arc::new(NatsEventSink::new(client.clone())),
        None => Arc::new(NoopEventSink),
    };

    let service = UserService::new(
        PgUserRepository::new(state.db.clone()),
        PgMemberRepository::new(state.db.clone()),
        tokens.clone(),
        events,
    );

    Router::new()
        .nest("/auth", handlers::auth_router(service.clone()))
        .nest(
            "/user",
            handlers::user_router(service)
                .layer(middleware::from_fn_with_state(tokens, auth_middleware)),
        )
}

/// Creates a router with the /ready endpoint that performs actual health
/// checks against the database and, when configured, NATS.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state)
}

async fn ready_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mut checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&state.db)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    if let Some(nats) = &state.nats {
        checks.push((
            "nats",
            Box::pin(async move {
                match nats.connection_state() {
                    async_nats::connection::State::Connected => Ok(()),
                    other => Err(format!("NATS connection state: {other:?}")),
                }
            }),
        ));
    }

    run_health_checks(checks).await
}

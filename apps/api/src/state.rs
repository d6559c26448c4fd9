use crate::config::Config;
use sea_orm::DatabaseConnection;

/// Shared application state.
///
/// Cheap to clone: the connection pool and NATS client are both
/// reference-counted handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
    pub nats: Option<async_nats::Client>,
}

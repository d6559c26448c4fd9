pub mod auth;
pub mod envelope;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;
pub mod shutdown;

pub use envelope::ApiResponse;
pub use errors::{ApiError, ErrorKind};
pub use extractors::validated_json::ValidatedJson;
pub use shutdown::ShutdownCoordinator;

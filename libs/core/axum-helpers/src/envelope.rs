use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform wrapper applied to every JSON body this API returns.
///
/// Successful responses carry the payload in `data` with `success: true`;
/// error responses carry a human-readable message in `data` with
/// `success: false`. Clients can branch on `success` without inspecting
/// the HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
        }
    }

    pub fn error(data: T) -> Self {
        Self {
            data,
            success: false,
        }
    }
}

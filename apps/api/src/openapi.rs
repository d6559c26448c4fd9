use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(
        domain_users::UserDto,
        domain_users::UserRequest,
        domain_users::LoginRequest,
        domain_users::RefreshRequest,
        domain_users::TokenResponse,
        domain_users::Role,
    )),
    info(
        title = "Roster API",
        version = "0.1.0",
        description = "User management and JWT authentication service"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    tags(
        (name = "auth", description = "Login and token refresh"),
        (name = "user", description = "User management operations")
    )
)]
pub struct ApiDoc;

//! User identity domain: models, persistence, read cache, outbound
//! events, the user/auth services, and their HTTP handlers.

pub mod cache;
pub mod events;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use cache::UserCache;
pub use events::{NoopEventSink, UserAction, UserEvent, UserEventSink};
pub use models::{LoginRequest, RefreshRequest, Role, TokenResponse, User, UserDto, UserFilter, UserRequest};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;

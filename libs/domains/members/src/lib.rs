//! Member reference data. Every user must be linked to an existing
//! member; this crate owns the member model and its lookups.

pub mod models;
pub mod postgres;
pub mod repository;

pub use models::Member;
pub use postgres::PgMemberRepository;
pub use repository::{InMemoryMemberRepository, MemberRepository};

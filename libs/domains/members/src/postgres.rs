use async_trait::async_trait;
use axum_helpers::ApiError;
use sea_orm::{DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::models::Member;
use crate::repository::MemberRepository;

/// PostgreSQL implementation of MemberRepository using SeaORM
#[derive(Clone)]
pub struct PgMemberRepository {
    db: sea_orm::DatabaseConnection,
}

impl PgMemberRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct MemberRow {
    id: Uuid,
    name: String,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

fn db_error(e: sea_orm::DbErr) -> ApiError {
    tracing::error!("Member query failed: {e}");
    ApiError::app("Database error")
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn create(&self, member: Member) -> Result<Member, ApiError> {
        let sql = r#"
            INSERT INTO members (id, name, email, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                member.id.into(),
                member.name.clone().into(),
                member.email.clone().into(),
                member.created_at.into(),
            ],
        );

        let row = MemberRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| ApiError::app("Failed to create member"))?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Member>, ApiError> {
        let sql = "SELECT * FROM members WHERE id = $1";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = MemberRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

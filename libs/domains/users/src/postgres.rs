use async_trait::async_trait;
use axum_helpers::ApiError;
use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::models::{Role, User, UserFilter};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    roles: Vec<String>, // PostgreSQL text array
    email_verified: bool,
    member_id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        use std::str::FromStr;

        let roles = row
            .roles
            .iter()
            .filter_map(|s| Role::from_str(s).ok())
            .collect();

        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            roles,
            email_verified: row.email_verified,
            member_id: row.member_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(e: sea_orm::DbErr) -> ApiError {
    tracing::error!("User query failed: {e}");
    ApiError::app("Database error")
}

/// Map a write failure, translating unique violations to the error the
/// violated column calls for: username to an insertion failure, email to
/// the already-used conflict.
fn unique_violation_error(e: sea_orm::DbErr, username: &str, email: &str) -> ApiError {
    let err_str = e.to_string();
    if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
        if err_str.contains("email") {
            ApiError::already_used(format!("{email} is already in use"))
        } else {
            ApiError::insertion_failed(format!("{username} already exists"))
        }
    } else {
        db_error(e)
    }
}

#[derive(Debug, FromQueryResult)]
struct ExistsRow {
    exists: bool,
}

impl PgUserRepository {
    async fn exists(&self, sql: &str, values: Vec<sea_orm::Value>) -> Result<bool, ApiError> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let row = ExistsRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| r.exists).unwrap_or(false))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> Result<User, ApiError> {
        let sql = r#"
            INSERT INTO users (id, username, email, password_hash, roles, email_verified, member_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
        "#;

        let roles_array: Vec<String> = user.role_names();

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.username.clone().into(),
                user.email.clone().into(),
                user.password_hash.clone().into(),
                roles_array.into(),
                user.email_verified.into(),
                user.member_id.into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| unique_violation_error(e, &user.username, &user.email))?
            .ok_or_else(|| ApiError::app("Failed to create user"))?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let sql = "SELECT * FROM users WHERE id = $1";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let sql = "SELECT * FROM users WHERE LOWER(username) = LOWER($1)";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [username.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, ApiError> {
        let sql = "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2";
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [(filter.limit as i64).into(), (filter.offset as i64).into()],
        );

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn update(&self, user: User) -> Result<User, ApiError> {
        let sql = r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, roles = $5,
                email_verified = $6, member_id = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
        "#;

        let roles_array: Vec<String> = user.role_names();

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.username.clone().into(),
                user.email.clone().into(),
                user.password_hash.clone().into(),
                roles_array.into(),
                user.email_verified.into(),
                user.member_id.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| unique_violation_error(e, &user.username, &user.email))?
            .ok_or_else(|| ApiError::not_found("User", "id", user.id))?;

        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let sql = "DELETE FROM users WHERE id = $1";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let result = self.db.execute_raw(stmt).await.map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, ApiError> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1)) AS exists",
            vec![username.into()],
        )
        .await
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1) AS exists",
            vec![id.into()],
        )
        .await
    }

    async fn email_taken_by_other(&self, email: &str, exclude: Uuid) -> Result<bool, ApiError> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id <> $2) AS exists",
            vec![email.into(), exclude.into()],
        )
        .await
    }
}

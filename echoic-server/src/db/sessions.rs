//! Bearer session tokens

use anyhow::Result;
use sqlx::SqlitePool;

use echoic_common::auth::generate_session_token;
use echoic_common::time::{now, to_db_timestamp};

use super::User;

/// Open a session for a user, returning its token
pub async fn create_session(pool: &SqlitePool, user_guid: &str) -> Result<String> {
    let token = generate_session_token();

    sqlx::query("INSERT INTO sessions (token, user_guid, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_guid)
        .bind(to_db_timestamp(now()))
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve a token to its user
pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.guid, u.username, u.email, u.password_hash, u.created_at
        FROM sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Remove a session; returns false when the token was unknown
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::create_user;
    use echoic_common::db::init_database;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("test.db")).await.unwrap();
        let user = create_user(&pool, "alice", "alice@example.com", "secret1")
            .await
            .unwrap();

        let token = create_session(&pool, &user.guid).await.unwrap();
        let found = find_user_by_token(&pool, &token).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");

        assert!(delete_session(&pool, &token).await.unwrap());
        assert!(find_user_by_token(&pool, &token).await.unwrap().is_none());
        assert!(!delete_session(&pool, &token).await.unwrap());
    }
}

//! CRUD against the `users` table.
//!
//! At most one row exists per distinct `openid` value. The invariant is
//! application-enforced: callers look an identity up before inserting, the
//! table itself carries no unique constraint.

use sqlx::{Row, SqlitePool};

/// A profile tied to a verified OpenID identity URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub openid: String,
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        openid: row.get("openid"),
    }
}

pub async fn find_by_openid(pool: &SqlitePool, openid: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query("SELECT id, name, email, openid FROM users WHERE openid = ?1 LIMIT 1")
        .bind(openid)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row))
}

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    openid: &str,
) -> Result<User, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO users (name, email, openid) VALUES (?1, ?2, ?3) \
         RETURNING id, name, email, openid",
    )
    .bind(name)
    .bind(email)
    .bind(openid)
    .fetch_one(pool)
    .await?;

    Ok(user_from_row(&row))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET name = ?1, email = ?2 WHERE id = ?3")
        .bind(name)
        .bind(email)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let pool = test_pool().await;

        let missing = find_by_openid(&pool, "https://id.example.com#abc")
            .await
            .unwrap();
        assert!(missing.is_none());

        let user = insert(
            &pool,
            "Armin",
            "armin@example.com",
            "https://id.example.com#abc",
        )
        .await
        .unwrap();
        assert_eq!(user.name, "Armin");

        let found = find_by_openid(&pool, "https://id.example.com#abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, user);
    }

    #[tokio::test]
    async fn test_update() {
        let pool = test_pool().await;
        let user = insert(
            &pool,
            "Armin",
            "armin@example.com",
            "https://id.example.com#abc",
        )
        .await
        .unwrap();

        assert!(update(&pool, user.id, "Armin R", "armin@ronacher.example")
            .await
            .unwrap());

        let found = find_by_openid(&pool, "https://id.example.com#abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Armin R");
        assert_eq!(found.email, "armin@ronacher.example");

        // unknown id touches nothing
        assert!(!update(&pool, 999, "x", "x@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;
        let user = insert(
            &pool,
            "Armin",
            "armin@example.com",
            "https://id.example.com#abc",
        )
        .await
        .unwrap();

        assert!(delete(&pool, user.id).await.unwrap());
        assert!(!delete(&pool, user.id).await.unwrap());

        let missing = find_by_openid(&pool, "https://id.example.com#abc")
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}

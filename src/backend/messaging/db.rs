//! Message log
//!
//! Durable, append-only storage of direct messages. Rows are never edited
//! or deleted; the only mutation is flipping `is_read` from false to true.
//!
//! Timestamps are stored as integer microseconds since the Unix epoch, and
//! every conversation query orders by `(created_at, id)` so that messages
//! written within the same microsecond keep their insertion order.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::shared::{Message, Peer, Profile, UserId};

const SELECT_MESSAGE: &str = r#"
    SELECT m.id, m.sender_id, m.receiver_id, m.content, m.created_at, m.is_read,
           u.username AS sender_username
    FROM messages m
    JOIN users u ON u.id = m.sender_id
"#;

fn to_micros(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_micros()
}

fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}

fn message_from_row(row: &SqliteRow) -> Message {
    Message {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        receiver_id: row.get("receiver_id"),
        content: row.get("content"),
        timestamp: from_micros(row.get("created_at")),
        sender_username: row.get("sender_username"),
        is_read: row.get("is_read"),
    }
}

/// Append a message with an explicit creation time
///
/// The message starts unread. Returns the stored row, including the id the
/// log assigned and the sender's current username.
pub async fn insert_message(
    pool: &SqlitePool,
    sender_id: UserId,
    receiver_id: UserId,
    content: &str,
    created_at: DateTime<Utc>,
) -> Result<Message, sqlx::Error> {
    let mut conn = pool.acquire().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO messages (sender_id, receiver_id, content, created_at, is_read)
        VALUES (?1, ?2, ?3, ?4, FALSE)
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .bind(to_micros(created_at))
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();
    let row = sqlx::query(&format!("{} WHERE m.id = ?1", SELECT_MESSAGE))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(message_from_row(&row))
}

async fn select_conversation(
    conn: &mut SqliteConnection,
    a: UserId,
    b: UserId,
) -> Result<Vec<Message>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"{}
        WHERE (m.sender_id = ?1 AND m.receiver_id = ?2)
           OR (m.sender_id = ?2 AND m.receiver_id = ?1)
        ORDER BY m.created_at ASC, m.id ASC
        "#,
        SELECT_MESSAGE
    ))
    .bind(a)
    .bind(b)
    .fetch_all(conn)
    .await?;

    Ok(rows.iter().map(message_from_row).collect())
}

async fn update_read(
    conn: &mut SqliteConnection,
    reader_id: UserId,
    sender_id: UserId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET is_read = TRUE
        WHERE sender_id = ?1 AND receiver_id = ?2 AND is_read = FALSE
        "#,
    )
    .bind(sender_id)
    .bind(reader_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Mark everything `sender_id` sent to `reader_id` as read
///
/// Returns how many rows changed; zero is not an error.
pub async fn mark_read_from(
    pool: &SqlitePool,
    reader_id: UserId,
    sender_id: UserId,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let updated = update_read(&mut tx, reader_id, sender_id).await?;
    tx.commit().await?;
    Ok(updated)
}

/// Mark `peer`'s messages to `requester` read, then load the conversation
///
/// Both steps run in one transaction. The `UPDATE` comes first so the write
/// lock is taken before anything is read, and the returned rows already
/// reflect the new read state.
pub async fn fetch_conversation(
    pool: &SqlitePool,
    requester: UserId,
    peer: UserId,
) -> Result<(u64, Vec<Message>), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let updated = update_read(&mut tx, requester, peer).await?;
    let messages = select_conversation(&mut tx, requester, peer).await?;
    tx.commit().await?;
    Ok((updated, messages))
}

/// Every user except `current`, with how many of their messages to
/// `current` are unread, in id order
pub async fn list_peers_with_unread(
    pool: &SqlitePool,
    current: UserId,
) -> Result<Vec<Peer>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, u.avatar_url, u.about, COUNT(m.id) AS unread
        FROM users u
        LEFT JOIN messages m
               ON m.sender_id = u.id
              AND m.receiver_id = ?1
              AND m.is_read = FALSE
        WHERE u.id != ?1
        GROUP BY u.id
        ORDER BY u.id ASC
        "#,
    )
    .bind(current)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Peer {
            profile: Profile {
                id: row.get("id"),
                username: row.get("username"),
                avatar_url: row.get("avatar_url"),
                about: row.get("about"),
            },
            unread: row.get("unread"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::connect_in_memory;

    async fn user(pool: &SqlitePool, name: &str) -> UserId {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, avatar_url, about, created_at) VALUES (?1, 'x', 'a.png', 'hi', 0)",
        )
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }

    /// All messages between `a` and `b`, oldest first
    async fn conversation_between(
        pool: &SqlitePool,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        select_conversation(&mut conn, a, b).await
    }

    /// Unread count from `sender_id` to `reader_id`
    async fn unread_count(
        pool: &SqlitePool,
        reader_id: UserId,
        sender_id: UserId,
    ) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE sender_id = ?1 AND receiver_id = ?2 AND is_read = FALSE",
        )
        .bind(sender_id)
        .bind(reader_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    fn at(micros: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(micros).unwrap()
    }

    #[tokio::test]
    async fn test_insert_message_returns_stored_row() {
        let pool = connect_in_memory().await.unwrap();
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;

        let message = insert_message(&pool, alice, bob, "hi", at(1_000_001)).await.unwrap();

        assert!(message.id > 0);
        assert_eq!(message.sender_username, "alice");
        assert_eq!(message.timestamp, at(1_000_001));
        assert!(!message.is_read);
    }

    #[tokio::test]
    async fn test_same_timestamp_keeps_insertion_order() {
        let pool = connect_in_memory().await.unwrap();
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;

        let m3 = insert_message(&pool, alice, bob, "third", at(2)).await.unwrap();
        let m1 = insert_message(&pool, alice, bob, "first", at(1)).await.unwrap();
        let m2 = insert_message(&pool, bob, alice, "second", at(1)).await.unwrap();

        let ids: Vec<i64> = conversation_between(&pool, alice, bob)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![m1.id, m2.id, m3.id]);
    }

    #[tokio::test]
    async fn test_conversation_excludes_other_pairs() {
        let pool = connect_in_memory().await.unwrap();
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let carol = user(&pool, "carol").await;

        insert_message(&pool, alice, bob, "to bob", at(1)).await.unwrap();
        insert_message(&pool, alice, carol, "to carol", at(2)).await.unwrap();

        let conversation = conversation_between(&pool, bob, alice).await.unwrap();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation[0].sender_id, alice);
        assert_eq!(conversation[0].receiver_id, bob);
    }

    #[tokio::test]
    async fn test_mark_read_only_touches_one_direction() {
        let pool = connect_in_memory().await.unwrap();
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;

        insert_message(&pool, alice, bob, "a1", at(1)).await.unwrap();
        insert_message(&pool, alice, bob, "a2", at(2)).await.unwrap();
        insert_message(&pool, bob, alice, "b1", at(3)).await.unwrap();

        assert_eq!(mark_read_from(&pool, bob, alice).await.unwrap(), 2);
        assert_eq!(mark_read_from(&pool, bob, alice).await.unwrap(), 0);
        assert_eq!(unread_count(&pool, alice, bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_conversation_reflects_mark_read() {
        let pool = connect_in_memory().await.unwrap();
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;

        insert_message(&pool, alice, bob, "hi", at(1)).await.unwrap();
        insert_message(&pool, bob, alice, "hey", at(2)).await.unwrap();

        let (updated, messages) = fetch_conversation(&pool, bob, alice).await.unwrap();

        assert_eq!(updated, 1);
        assert!(messages[0].is_read);
        // Bob's own message to Alice is untouched
        assert!(!messages[1].is_read);
    }

    #[tokio::test]
    async fn test_list_peers_with_unread() {
        let pool = connect_in_memory().await.unwrap();
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let carol = user(&pool, "carol").await;

        insert_message(&pool, bob, alice, "1", at(1)).await.unwrap();
        insert_message(&pool, bob, alice, "2", at(2)).await.unwrap();
        insert_message(&pool, alice, carol, "3", at(3)).await.unwrap();

        let peers = list_peers_with_unread(&pool, alice).await.unwrap();
        let summary: Vec<(UserId, i64)> = peers.iter().map(|p| (p.profile.id, p.unread)).collect();

        assert_eq!(summary, vec![(bob, 2), (carol, 0)]);
    }
}

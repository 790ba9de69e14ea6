use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS creators (
            id          TEXT PRIMARY KEY,
            company_id  TEXT NOT NULL UNIQUE,
            handle      TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS messages (
            id               TEXT PRIMARY KEY,
            creator_id       TEXT NOT NULL REFERENCES creators(id),
            text             TEXT NOT NULL,
            tag              TEXT NOT NULL,
            product_category TEXT,
            reviewed         INTEGER NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_creator
            ON messages(creator_id, created_at);

        CREATE TABLE IF NOT EXISTS replies (
            id          TEXT PRIMARY KEY,
            message_id  TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
            text        TEXT NOT NULL,
            is_public   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_replies_message
            ON replies(message_id);

        CREATE TABLE IF NOT EXISTS reactions (
            id          TEXT PRIMARY KEY,
            message_id  TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
            user_hash   TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(message_id, user_hash)
        );

        CREATE INDEX IF NOT EXISTS idx_reactions_message
            ON reactions(message_id);

        CREATE TABLE IF NOT EXISTS creator_feedback (
            id          TEXT PRIMARY KEY,
            creator_id  TEXT NOT NULL REFERENCES creators(id),
            company_id  TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            category    TEXT NOT NULL,
            subject     TEXT,
            message     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

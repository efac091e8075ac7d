use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        -- AUTOINCREMENT keeps a high-water mark in sqlite_sequence, so a
        -- display id is never handed out twice, even after the row holding
        -- the current maximum is deleted.
        CREATE TABLE IF NOT EXISTS confessions (
            display_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            id          TEXT NOT NULL UNIQUE,
            text        TEXT NOT NULL,
            category    TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'pending',
            love        INTEGER NOT NULL DEFAULT 0,
            laugh       INTEGER NOT NULL DEFAULT 0,
            fire        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_confessions_status
            ON confessions(status, created_at);

        CREATE TABLE IF NOT EXISTS admins (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

//! Connection bootstrap for the task database.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Every open attempt emits one `db_open` start event and one outcome event.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a task database file and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    bootstrap("file", || Connection::open(path))
}

/// Opens a throwaway in-memory task database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", Connection::open_in_memory)
}

fn bootstrap<F>(mode: &'static str, open: F) -> DbResult<Connection>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = open().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        err
    })?;

    if let Err(err) = configure(&mut conn) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

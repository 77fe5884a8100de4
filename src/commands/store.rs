use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;

use crate::commands::{lock_session, Session, SharedSession};

const DB_SCHEMA_VERSION: i64 = 1;

const SLOT_DATASET: &str = "dataset";
const SLOT_REGISTRY: &str = "registry";
const SLOT_SERVIS: &str = "servis";
const SLOT_STYLES: &str = "styles";

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS session_state (
                slot TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Future schema; do not fail reads/writes for forward-compatible changes.
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

pub fn get_store_connection(data_dir: &str) -> Result<Connection> {
    let db_path = Path::new(data_dir).join("state.db");
    let conn = Connection::open(db_path)?;
    initialize_schema(&conn)?;
    Ok(conn)
}

fn write_slot(conn: &Connection, slot: &str, payload: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO session_state (slot, payload, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(slot) DO UPDATE SET
             payload = excluded.payload,
             updated_at = excluded.updated_at",
        params![slot, payload, now],
    )?;
    Ok(())
}

fn read_slot(conn: &Connection, slot: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT payload FROM session_state WHERE slot = ?1",
        params![slot],
        |row| row.get(0),
    )
    .optional()
}

pub fn save_session(conn: &Connection, session: &Session) -> std::result::Result<(), String> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| format!("DB error: {e}"))?;

    let slots = [
        (SLOT_DATASET, serde_json::to_string(&session.dataset)),
        (SLOT_REGISTRY, serde_json::to_string(&session.registry)),
        (SLOT_SERVIS, serde_json::to_string(&session.servis)),
        (SLOT_STYLES, serde_json::to_string(&session.styles)),
    ];
    for (slot, payload) in slots {
        let payload = payload.map_err(|e| format!("Serialize error for {slot}: {e}"))?;
        write_slot(&tx, slot, &payload).map_err(|e| format!("Write error for {slot}: {e}"))?;
    }

    tx.commit().map_err(|e| format!("Commit error: {e}"))
}

/// Load whatever slots exist; missing slots keep their defaults so an empty
/// or partially written store loads cleanly.
pub fn load_session(conn: &Connection) -> std::result::Result<Session, String> {
    let mut session = Session::default();

    if let Some(payload) =
        read_slot(conn, SLOT_DATASET).map_err(|e| format!("Read error: {e}"))?
    {
        session.dataset =
            serde_json::from_str(&payload).map_err(|e| format!("Parse error for dataset: {e}"))?;
    }
    if let Some(payload) =
        read_slot(conn, SLOT_REGISTRY).map_err(|e| format!("Read error: {e}"))?
    {
        session.registry =
            serde_json::from_str(&payload).map_err(|e| format!("Parse error for registry: {e}"))?;
    }
    if let Some(payload) = read_slot(conn, SLOT_SERVIS).map_err(|e| format!("Read error: {e}"))? {
        session.servis =
            serde_json::from_str(&payload).map_err(|e| format!("Parse error for servis: {e}"))?;
    }
    if let Some(payload) = read_slot(conn, SLOT_STYLES).map_err(|e| format!("Read error: {e}"))? {
        session.styles =
            serde_json::from_str(&payload).map_err(|e| format!("Parse error for styles: {e}"))?;
    }

    Ok(session)
}

#[tauri::command]
pub async fn store_save(
    data_dir: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<usize, String> {
    store_save_internal(&data_dir, session.inner())
}

pub fn store_save_internal(
    data_dir: &str,
    session: &SharedSession,
) -> std::result::Result<usize, String> {
    std::fs::create_dir_all(data_dir).map_err(|e| format!("Cannot create {data_dir}: {e}"))?;
    let conn = get_store_connection(data_dir).map_err(|e| format!("DB error: {e}"))?;

    let state = lock_session(session)?;
    save_session(&conn, &state)?;
    log::info!(
        "saved session: {} records, {} people",
        state.dataset.records.len(),
        state.registry.people.len()
    );
    Ok(state.dataset.records.len())
}

#[tauri::command]
pub async fn store_load(
    data_dir: String,
    session: tauri::State<'_, SharedSession>,
) -> Result<usize, String> {
    store_load_internal(&data_dir, session.inner())
}

/// Replace the in-memory session from disk. A data dir with no store yet
/// loads an empty session rather than erroring.
pub fn store_load_internal(
    data_dir: &str,
    session: &SharedSession,
) -> std::result::Result<usize, String> {
    if !Path::new(data_dir).join("state.db").exists() {
        let mut state = lock_session(session)?;
        *state = Session::default();
        return Ok(0);
    }

    let conn = get_store_connection(data_dir).map_err(|e| format!("DB error: {e}"))?;
    let loaded = load_session(&conn)?;
    let count = loaded.dataset.records.len();
    log::info!(
        "loaded session: {count} records, {} people",
        loaded.registry.people.len()
    );

    let mut state = lock_session(session)?;
    *state = loaded;
    Ok(count)
}

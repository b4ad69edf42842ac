use rusqlite::Connection;
use std::path::Path;

/// Opens (and if needed creates) the document store under `data_dir`.
///
/// Collections follow one layout rule: fields the API filters on are promoted
/// to columns, nested lists travel as JSON text. Composite natural keys are
/// composite primary keys so upserts can be expressed as
/// `INSERT ... ON CONFLICT ... DO UPDATE` with replace semantics.
pub fn open_db(data_dir: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join("college.sqlite3");
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts(
            id TEXT PRIMARY KEY,
            role TEXT NOT NULL,
            registration TEXT,
            email TEXT,
            phone TEXT,
            branch TEXT,
            section TEXT,
            first_name TEXT,
            password_salt TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            profile TEXT NOT NULL,
            created_at TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_accounts_role ON accounts(role)",
        [],
    )?;
    // A student's registration identifier is the natural key shared with
    // achievements, events and marks. Enforced here, surfaced as a named
    // conflict by the register handler.
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_registration
         ON accounts(registration) WHERE registration IS NOT NULL",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS achievements(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            certification TEXT NOT NULL,
            place TEXT NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            photo TEXT,
            category TEXT NOT NULL,
            student_name TEXT,
            registration TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_achievements_registration
         ON achievements(registration)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            date TEXT,
            end_date TEXT,
            location TEXT,
            description TEXT,
            image TEXT,
            registration_deadline TEXT,
            registered TEXT NOT NULL DEFAULT '[]'
        )",
        [],
    )?;
    ensure_events_registration_deadline(&conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subject_catalogs(
            branch TEXT NOT NULL,
            semester INTEGER NOT NULL,
            subjects TEXT NOT NULL,
            PRIMARY KEY(branch, semester)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS marks(
            registration TEXT NOT NULL,
            branch TEXT NOT NULL,
            semester INTEGER NOT NULL,
            marks TEXT NOT NULL,
            PRIMARY KEY(registration, branch, semester)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_marks_semester ON marks(semester)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions(
            token TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sessions_account ON sessions(account_id)",
        [],
    )?;

    Ok(conn)
}

fn ensure_events_registration_deadline(conn: &Connection) -> anyhow::Result<()> {
    // Early stores were created before events carried a deadline.
    if table_has_column(conn, "events", "registration_deadline")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE events ADD COLUMN registration_deadline TEXT",
        [],
    )?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

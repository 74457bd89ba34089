use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

struct Migration {
    version: i64,
    name: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

/// Ordered schema steps. Append only; a step never changes once released.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "base tables",
        apply: create_base_tables,
    },
    Migration {
        version: 2,
        name: "item image path",
        apply: add_item_image_path,
    },
    Migration {
        version: 3,
        name: "password hash column",
        apply: rename_legacy_password_column,
    },
];

pub const LATEST_VERSION: i64 = 3;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let current = current_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(
            "Running migration v{} ({})",
            migration.version, migration.name
        );
        let tx = conn.unchecked_transaction()?;
        (migration.apply)(&tx)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", LATEST_VERSION);
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

fn create_base_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            role            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS items (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            description     TEXT NOT NULL,
            status          TEXT NOT NULL,
            contact         TEXT NOT NULL,
            image_path      TEXT,
            owner_id        INTEGER REFERENCES users(id)
        );
        ",
    )?;
    Ok(())
}

/// Databases from before photos were supported have no `image_path`.
/// On every other database the column is already there and SQLite rejects
/// the ALTER with "duplicate column name", which is the one failure ignored.
fn add_item_image_path(conn: &Connection) -> Result<()> {
    match conn.execute("ALTER TABLE items ADD COLUMN image_path TEXT", []) {
        Ok(_) => {
            info!("Added items.image_path to existing database");
            Ok(())
        }
        Err(e) if is_duplicate_column(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn rename_legacy_password_column(conn: &Connection) -> Result<()> {
    let columns = table_columns(conn, "users")?;
    let has = |name: &str| columns.iter().any(|c| c == name);

    if has("password") && !has("password_hash") {
        conn.execute_batch("ALTER TABLE users RENAME COLUMN password TO password_hash;")?;
        info!("Renamed users.password to users.password_hash");
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("duplicate column name")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_gets_every_step() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
        assert_eq!(
            table_columns(&conn, "users").unwrap(),
            vec!["id", "username", "password_hash", "role"]
        );
        assert_eq!(
            table_columns(&conn, "items").unwrap(),
            vec!["id", "name", "description", "status", "contact", "image_path", "owner_id"]
        );
    }

    #[test]
    fn rerun_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[test]
    fn upgrades_database_without_image_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL
            );
            CREATE TABLE items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                contact TEXT NOT NULL,
                owner_id INTEGER,
                FOREIGN KEY(owner_id) REFERENCES users(id)
            );
            INSERT INTO users (username, password, role) VALUES ('alice', 'abc', 'User');
            INSERT INTO items (name, description, status, contact, owner_id)
                VALUES ('Keys', 'Near gate', 'Found', 'alice@mail', 1);
            ",
        )
        .unwrap();

        run(&conn).unwrap();

        let items = table_columns(&conn, "items").unwrap();
        assert!(items.contains(&"image_path".to_string()));
        let users = table_columns(&conn, "users").unwrap();
        assert!(users.contains(&"password_hash".to_string()));
        assert!(!users.contains(&"password".to_string()));

        let (hash, image): (String, Option<String>) = conn
            .query_row(
                "SELECT u.password_hash, i.image_path
                 FROM items i JOIN users u ON i.owner_id = u.id",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(hash, "abc");
        assert_eq!(image, None);
    }

    #[test]
    fn tolerates_existing_image_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL
            );
            CREATE TABLE items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                contact TEXT NOT NULL,
                image_path TEXT,
                owner_id INTEGER,
                FOREIGN KEY(owner_id) REFERENCES users(id)
            );
            ",
        )
        .unwrap();

        run(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
    }

    #[test]
    fn other_alter_failures_are_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        // No items table at all: the ALTER fails with "no such table".
        assert!(add_item_image_path(&conn).is_err());
    }
}

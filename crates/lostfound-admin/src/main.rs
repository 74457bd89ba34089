use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};
use tracing::info;

use lostfound_db::{Database, DbConfig, RegisterOutcome};
use lostfound_types::Role;

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Created,
    Cancelled,
    UsernameTaken,
}

fn prompt(input: &mut dyn BufRead, out: &mut dyn Write, label: &str) -> Result<String> {
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Input closed before {} was answered", label.trim_end_matches([':', ' ']));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Interactive admin creation: ask, confirm, register.
fn create_admin(db: &Database, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<Outcome> {
    writeln!(out, "-----------------------------------")?;
    writeln!(out, "   LOST & FOUND ADMIN CREATOR")?;
    writeln!(out, "-----------------------------------")?;

    let username = prompt(input, out, "Enter new Admin Username: ")?;
    let password = prompt(input, out, "Enter new Admin Password: ")?;

    if username.trim().is_empty() || password.is_empty() {
        writeln!(out, "\n[ERROR] Username and password are both required.")?;
        return Ok(Outcome::Cancelled);
    }

    let confirm = prompt(input, out, &format!("Create Admin user '{}'? (y/n): ", username))?;
    if !confirm.trim().eq_ignore_ascii_case("y") {
        writeln!(out, "Cancelled.")?;
        return Ok(Outcome::Cancelled);
    }

    match db.register(&username, &password, Role::Admin)? {
        RegisterOutcome::Created(account) => {
            info!("Admin account {} created ({})", account.username, account.id);
            writeln!(out, "\n[SUCCESS] Admin account created successfully!")?;
            writeln!(out, "You can now login with this account in the main app.")?;
            Ok(Outcome::Created)
        }
        RegisterOutcome::UsernameTaken => {
            writeln!(out, "\n[ERROR] Username already exists. Please try a different one.")?;
            Ok(Outcome::UsernameTaken)
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lostfound_admin=info,lostfound_db=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = DbConfig::from_env()?;
    let db = config.open()?;

    let stdin = io::stdin();
    let outcome = create_admin(&db, &mut stdin.lock(), &mut io::stdout().lock())?;
    db.close()?;

    if outcome == Outcome::UsernameTaken {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(db: &Database, answers: &str) -> (Outcome, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut out = Vec::new();
        let outcome = create_admin(db, &mut input, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn confirmed_admin_is_created() {
        let db = Database::open_in_memory().unwrap();
        let (outcome, out) = run(&db, "root\ns3cret\ny\n");

        assert_eq!(outcome, Outcome::Created);
        assert!(out.contains("Create Admin user 'root'? (y/n): "));
        assert!(out.contains("[SUCCESS]"));

        let account = db.authenticate("root", "s3cret").unwrap().unwrap();
        assert_eq!(account.role, Role::Admin);
    }

    #[test]
    fn anything_but_y_cancels() {
        let db = Database::open_in_memory().unwrap();
        let (outcome, out) = run(&db, "root\ns3cret\nyes\n");

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(out.ends_with("Cancelled.\n"));
        assert!(db.authenticate("root", "s3cret").unwrap().is_none());
    }

    #[test]
    fn taken_username_is_reported() {
        let db = Database::open_in_memory().unwrap();
        db.register("root", "first", Role::User).unwrap();

        let (outcome, out) = run(&db, "root\nsecond\nY\n");
        assert_eq!(outcome, Outcome::UsernameTaken);
        assert!(out.contains("Username already exists"));
        assert!(db.authenticate("root", "second").unwrap().is_none());
    }

    #[test]
    fn closed_input_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let mut input = Cursor::new(b"root\n".to_vec());
        let mut out = Vec::new();
        assert!(create_admin(&db, &mut input, &mut out).is_err());
    }
}

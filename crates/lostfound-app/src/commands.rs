use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use lostfound_db::{Database, DbError, RegisterOutcome, ResolveOutcome};
use lostfound_types::image::has_image_extension;
use lostfound_types::{Account, ItemStatus, NewItem};

use crate::cli::{Command, Credentials};
use crate::render;

/// A request the user has to correct. Printed as-is; the process exits 1.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Rejected(pub String);

fn rejected(message: impl Into<String>) -> anyhow::Error {
    Rejected(message.into()).into()
}

/// Turn the gateway's recoverable outcomes into messages; storage faults
/// pass through untouched.
fn explain(err: DbError, verb: &str) -> anyhow::Error {
    match err {
        DbError::ItemNotFound(id) => rejected(format!("Item {} does not exist.", id)),
        DbError::Forbidden { .. } => rejected(format!("You can only {} your own posts.", verb)),
        DbError::AccountNotFound(id) => rejected(format!("Account {} does not exist.", id)),
        other => other.into(),
    }
}

fn login(db: &Database, auth: &Credentials) -> Result<Account> {
    db.authenticate(&auth.username, &auth.password)?
        .ok_or_else(|| rejected("Invalid username or password"))
}

fn confirm(input: &mut dyn BufRead, out: &mut dyn Write, question: &str) -> Result<bool> {
    write!(out, "{} (y/n): ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Image paths are stored as given, but only after checking they point at a
/// picture that exists now.
fn image_reference(path: &Path) -> Result<String> {
    if !has_image_extension(path) {
        return Err(rejected("Image must be a .png, .jpg, .jpeg or .bmp file"));
    }
    if !path.is_file() {
        return Err(rejected(format!("Image file not found: {}", path.display())));
    }
    Ok(path.to_string_lossy().into_owned())
}

pub fn run(
    command: Command,
    db: &Database,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Register {
            username,
            password,
            role,
        } => {
            if username.trim().is_empty() || password.is_empty() {
                return Err(rejected("All fields are required"));
            }
            match db.register(&username, &password, role)? {
                RegisterOutcome::Created(account) => {
                    writeln!(
                        out,
                        "Account created for {} ({}). Please login.",
                        account.username, account.role
                    )?;
                    Ok(())
                }
                RegisterOutcome::UsernameTaken => Err(rejected("Username already exists")),
            }
        }

        Command::Login(auth) => {
            let account = login(db, &auth)?;
            writeln!(out, "Welcome, {} ({})", account.username, account.role)?;
            Ok(())
        }

        Command::List { json } => {
            let items = db.list_items()?;
            debug!("Listing {} items", items.len());
            if json {
                render::json(&items, out)?;
            } else {
                render::items_table(&items, out)?;
            }
            Ok(())
        }

        Command::Show { id, json } => {
            let item = db
                .get_item(id)?
                .ok_or_else(|| rejected(format!("Item {} does not exist.", id)))?;
            if json {
                render::json(&item, out)?;
            } else {
                render::item_detail(&item, out)?;
            }
            Ok(())
        }

        Command::Post {
            auth,
            status,
            name,
            description,
            contact,
            image,
        } => {
            let account = login(db, &auth)?;

            if name.trim().is_empty() {
                return Err(rejected("Item Name is required"));
            }
            if !status.is_postable() {
                return Err(rejected("New posts must be either Lost or Found"));
            }
            let image_path = image.as_deref().map(image_reference).transpose()?;

            let item = NewItem {
                name,
                description,
                status,
                contact,
                image_path,
                owner_id: account.id,
            };
            let id = db.create_item(&item).map_err(|e| explain(e, "post"))?;
            writeln!(out, "Item Posted! (#{})", id)?;
            Ok(())
        }

        Command::Update {
            id,
            auth,
            name,
            description,
            status,
            contact,
            image,
            clear_image,
            yes,
        } => {
            let account = login(db, &auth)?;
            let current = db
                .get_item(id)?
                .ok_or_else(|| rejected(format!("Item {} does not exist.", id)))?;
            if !account.can_modify(current.owner_id) {
                return Err(rejected("You can only edit your own posts."));
            }

            let mut update = current.to_update();
            if let Some(name) = name {
                if name.trim().is_empty() {
                    return Err(rejected("Item Name is required"));
                }
                update.name = name;
            }
            if let Some(description) = description {
                update.description = description;
            }
            if let Some(status) = status {
                if status == ItemStatus::Returned {
                    return Err(rejected("Use `resolve` to mark an item as returned."));
                }
                update.status = status;
            }
            if let Some(contact) = contact {
                update.contact = contact;
            }
            if let Some(path) = image {
                update.image_path = Some(image_reference(&path)?);
            } else if clear_image {
                update.image_path = None;
            }

            if !yes && !confirm(input, out, "Update this item details?")? {
                writeln!(out, "Cancelled.")?;
                return Ok(());
            }

            db.update_item(&account, id, &update)
                .map_err(|e| explain(e, "edit"))?;
            writeln!(out, "Item #{} updated.", id)?;
            Ok(())
        }

        Command::Resolve { id, auth, yes } => {
            let account = login(db, &auth)?;
            let current = db
                .get_item(id)?
                .ok_or_else(|| rejected(format!("Item {} does not exist.", id)))?;
            if !account.can_modify(current.owner_id) {
                return Err(rejected("You can only update your own posts."));
            }
            if current.status == ItemStatus::Returned {
                writeln!(out, "This item is already marked as returned.")?;
                return Ok(());
            }

            let question = "Has this item been found/returned? This will mark the case as closed.";
            if !yes && !confirm(input, out, question)? {
                writeln!(out, "Cancelled.")?;
                return Ok(());
            }

            match db.mark_returned(&account, id).map_err(|e| explain(e, "update"))? {
                ResolveOutcome::Returned => writeln!(out, "Item marked as Returned!")?,
                ResolveOutcome::AlreadyReturned => {
                    writeln!(out, "This item is already marked as returned.")?
                }
            }
            Ok(())
        }

        Command::Delete { id, auth, yes } => {
            let account = login(db, &auth)?;
            let current = db
                .get_item(id)?
                .ok_or_else(|| rejected(format!("Item {} does not exist.", id)))?;
            if !account.can_modify(current.owner_id) {
                return Err(rejected("You can only delete your own posts."));
            }

            let question = "Are you sure you want to delete this post? This cannot be undone.";
            if !yes && !confirm(input, out, question)? {
                writeln!(out, "Cancelled.")?;
                return Ok(());
            }

            db.delete_item(&account, id).map_err(|e| explain(e, "delete"))?;
            writeln!(out, "Item #{} deleted.", id)?;
            Ok(())
        }
    }
}

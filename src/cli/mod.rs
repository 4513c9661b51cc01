//! CLI command handlers.
//!
//! Each `cmd_*` function runs the access-gate check, forwards the user's
//! intent into the core, and prints the outcome.  No session or task logic
//! lives here — this layer only renders state and relays intents.

use std::io::Write as _;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::api::Credentials;
use crate::gate::{Decision, Route};
use crate::tasks::{TaskCollection, TaskFields, PAGE_SIZE};
use crate::AppContext;

// ─── Auth commands ────────────────────────────────────────────────────────────

/// `taskdeck login` — authenticate and commit the returned token.
pub async fn cmd_login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    if ctx.gate.check(Route::Login) == Decision::RedirectToTasks {
        println!("Already signed in. Run `taskdeck logout` to switch accounts.");
        return Ok(());
    }

    let token = ctx
        .api
        .authenticate(&Credentials {
            email: email.clone(),
            password,
        })
        .await?;
    ctx.session.login(&token);
    println!("Signed in as {email}.");
    Ok(())
}

/// `taskdeck register` — create an account.  The password/confirmation
/// mismatch is rejected locally, before any request goes out.
pub async fn cmd_register(
    ctx: &AppContext,
    email: String,
    password: String,
    confirm: String,
) -> Result<()> {
    if ctx.gate.check(Route::Register) == Decision::RedirectToTasks {
        println!("Already signed in. Run `taskdeck logout` to switch accounts.");
        return Ok(());
    }
    if password != confirm {
        bail!("Passwords do not match");
    }

    ctx.api
        .register(&Credentials { email, password })
        .await?;
    println!("Account created. Sign in with `taskdeck login`.");
    Ok(())
}

/// `taskdeck logout` — discard the session.
pub fn cmd_logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout();
    println!("Signed out.");
    Ok(())
}

/// `taskdeck status` — session state and effective configuration.
pub fn cmd_status(ctx: &AppContext) -> Result<()> {
    if ctx.session.is_authenticated() {
        println!("Signed in.");
    } else {
        println!("Signed out.");
    }
    println!("  Server:   {}", ctx.config.api_base_url);
    println!("  Data dir: {}", ctx.config.data_dir.display());
    Ok(())
}

// ─── Task commands ────────────────────────────────────────────────────────────

/// `taskdeck list` — fetch the snapshot and print one page of it.
pub async fn cmd_list(ctx: &mut AppContext, page: Option<usize>) -> Result<()> {
    ensure_signed_in(ctx)?;
    ctx.tasks.refresh().await?;
    if let Some(n) = page {
        ctx.tasks.set_page(n);
    }
    print_page(&ctx.tasks);
    Ok(())
}

/// `taskdeck add` — create a task, then re-fetch.
pub async fn cmd_add(ctx: &mut AppContext, name: String, desc: String, due: String) -> Result<()> {
    ensure_signed_in(ctx)?;
    let fields = task_fields(name, desc, &due)?;
    ctx.tasks.create(&fields).await?;
    println!("Task created ({} total).", ctx.tasks.len());
    Ok(())
}

/// `taskdeck edit` — update a task by id, then re-fetch.
pub async fn cmd_edit(
    ctx: &mut AppContext,
    id: String,
    name: String,
    desc: String,
    due: String,
) -> Result<()> {
    ensure_signed_in(ctx)?;
    let fields = task_fields(name, desc, &due)?;
    ctx.tasks.update(&id, &fields).await?;
    println!("Task updated.");
    Ok(())
}

/// `taskdeck rm` — delete a task by id, then re-fetch.
///
/// No existence pre-check against the local snapshot: the request always goes
/// out and the server decides.
pub async fn cmd_rm(ctx: &mut AppContext, id: String, yes: bool) -> Result<()> {
    ensure_signed_in(ctx)?;
    if !yes && !confirm_delete(&id)? {
        println!("Cancelled.");
        return Ok(());
    }
    ctx.tasks.delete(&id).await?;
    println!("Task deleted ({} remaining).", ctx.tasks.len());
    Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn ensure_signed_in(ctx: &AppContext) -> Result<()> {
    if ctx.gate.check(Route::Tasks) == Decision::RedirectToLogin {
        bail!("Not signed in. Run `taskdeck login` first.");
    }
    Ok(())
}

fn task_fields(name: String, description: String, due: &str) -> Result<TaskFields> {
    if name.trim().is_empty() {
        bail!("task name must not be empty");
    }
    if description.trim().is_empty() {
        bail!("description must not be empty");
    }
    Ok(TaskFields {
        task_name: name,
        description,
        due_date: parse_due_date(due)?,
    })
}

/// Accepts RFC 3339 (`2025-03-01T09:30:00Z`) or the shorter
/// `YYYY-MM-DDTHH:MM[:SS]` form, which is taken as UTC.
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .with_context(|| {
            format!("unrecognized due date {raw:?} (expected RFC 3339 or YYYY-MM-DDTHH:MM)")
        })?;
    Ok(naive.and_utc())
}

fn confirm_delete(id: &str) -> Result<bool> {
    print!("Delete task {id}? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_page(tasks: &TaskCollection) {
    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }
    let page = tasks.current_page();
    let offset = (page - 1) * PAGE_SIZE;

    println!(
        "{:<4} {:<17} {:<24} {:<32} {}",
        "No", "Due", "Task", "Description", "Id"
    );
    for (i, task) in tasks.page(page).iter().enumerate() {
        println!(
            "{:<4} {:<17} {:<24} {:<32} {}",
            offset + i + 1,
            task.due_date.format("%Y-%m-%d %H:%M"),
            task.task_name,
            task.description,
            task.id
        );
    }
    println!();
    println!("page {} of {}", page, tasks.total_pages());
}

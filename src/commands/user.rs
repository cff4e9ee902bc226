use anyhow::Result;
use chaincal_core::ViewReconciler;
use owo_colors::OwoColorize;

use super::require_user;
use crate::render::Render;
use crate::utils::tui::while_loading;

pub async fn create(view: &ViewReconciler, name: &str) -> Result<()> {
    if let Some(user) = view.snapshot().await.user {
        anyhow::bail!("This account already has a user: {}", user.name);
    }

    while_loading(view.client().loading(), "Creating user", view.create_user(name)).await?;

    match view.snapshot().await.user {
        Some(user) => println!("{} {}", "Created".green(), user.render()),
        None => println!("{}", "Submitted; the ledger has not caught up yet".yellow()),
    }

    Ok(())
}

pub async fn show(view: &ViewReconciler) -> Result<()> {
    let state = view.snapshot().await;
    require_user(&state)?;

    if let Some(user) = &state.user {
        println!("{}", user.render());
        println!("   {}", user.id.dimmed());
        for calendar in &state.calendars {
            println!("   {}", calendar.render());
        }
    }

    Ok(())
}

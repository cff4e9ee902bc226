use anyhow::Result;
use chaincal_core::{Address, ObjectId, ViewReconciler};
use owo_colors::OwoColorize;

use super::require_user;
use crate::render::{Render, pluralize};
use crate::utils::tui::while_loading;

pub async fn list(view: &ViewReconciler) -> Result<()> {
    let state = view.snapshot().await;
    require_user(&state)?;

    if state.calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    for (i, calendar) in state.calendars.iter().enumerate() {
        println!("{}", calendar.render());
        println!(
            "   {}",
            format!("{} {}", calendar.events.len(), pluralize("event", calendar.events.len())).dimmed()
        );
        if !calendar.shared_with.is_empty() {
            let shared: Vec<_> = calendar.shared_with.iter().map(|a| a.to_string()).collect();
            println!("   {} {}", "Shared with".dimmed(), shared.join(", "));
        }

        if i < state.calendars.len() - 1 {
            println!();
        }
    }

    Ok(())
}

pub async fn create(view: &ViewReconciler, name: &str) -> Result<()> {
    require_user(&view.snapshot().await)?;

    while_loading(view.client().loading(), "Creating calendar", view.create_calendar(name)).await?;

    let state = view.snapshot().await;
    match state.calendars_titled(name).last() {
        Some(calendar) => println!("{} {}", "Created".green(), calendar.render()),
        None => println!("{}", "Submitted; the ledger has not caught up yet".yellow()),
    }

    Ok(())
}

pub async fn delete(view: &ViewReconciler, id: &str) -> Result<()> {
    let state = view.snapshot().await;
    require_user(&state)?;

    let id = ObjectId::from(id);
    let Some(calendar) = state.calendar(&id) else {
        anyhow::bail!("Calendar '{}' not found. Run `chaincal calendar list` to see yours.", id);
    };
    let label = calendar.render();

    while_loading(view.client().loading(), "Deleting calendar", view.delete_calendar(&id)).await?;
    println!("{} {}", "Deleted".red(), label);

    Ok(())
}

pub async fn share(view: &ViewReconciler, id: &str, address: &str) -> Result<()> {
    let id = ObjectId::from(id);
    let address = Address::from(address);

    while_loading(
        view.client().loading(),
        "Sharing calendar",
        view.share_calendar(&id, &address),
    )
    .await?;

    println!("{} {} with {}", "Shared".green(), id, address);
    println!("   {}", "They can accept it with: chaincal calendar accept <id>".dimmed());

    Ok(())
}

pub async fn accept(view: &ViewReconciler, id: &str) -> Result<()> {
    let state = view.snapshot().await;
    require_user(&state)?;

    let id = ObjectId::from(id);
    if !state.pending_shares_for_me().iter().any(|s| s.calendar_address == id) {
        anyhow::bail!("No pending invite for calendar '{}'. Run `chaincal invites` to list them.", id);
    }

    while_loading(view.client().loading(), "Accepting calendar", view.accept_share(&id)).await?;

    match view.snapshot().await.calendar(&id) {
        Some(calendar) => println!("{} {}", "Accepted".green(), calendar.render()),
        None => println!("{} {}", "Accepted".green(), id),
    }

    Ok(())
}

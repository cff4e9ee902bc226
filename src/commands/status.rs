use anyhow::Result;
use chaincal_core::ViewReconciler;
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize};

pub async fn run(view: &ViewReconciler) -> Result<()> {
    let state = view.snapshot().await;

    let Some(account) = &state.account else {
        println!("{}", "No wallet account connected".yellow());
        return Ok(());
    };
    println!("{} {}", "Account".bold(), account.address);

    match &state.user {
        Some(user) => println!("{}", user.render()),
        None => {
            println!("{}", "No user yet".dimmed());
            println!("   Create one with: chaincal user create <name>");
        }
    }

    let events: usize = state.calendars.iter().map(|c| c.events.len()).sum();
    if state.user.is_some() {
        println!(
            "   {} {}, {} {}",
            state.calendars.len(),
            pluralize("calendar", state.calendars.len()),
            events,
            pluralize("event", events)
        );
    }

    let invites = state.pending_shares_for_me();
    if !invites.is_empty() {
        println!(
            "   {}",
            format!("{} pending {}", invites.len(), pluralize("invite", invites.len())).cyan()
        );
    }

    if let Some(stats) = &state.stats {
        println!("\n{} {}", "Ledger".bold(), stats.render().dimmed());
    }

    Ok(())
}

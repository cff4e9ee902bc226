use anyhow::Result;
use chaincal_core::ViewReconciler;
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(view: &ViewReconciler) -> Result<()> {
    let state = view.snapshot().await;
    let Some(stats) = &state.stats else {
        anyhow::bail!("Statistics not loaded");
    };

    println!("{}", "Ledger".bold());
    println!("  Users:          {}", stats.user_count);
    println!("  Calendars:      {}", stats.calendar_count);
    println!("  Events:         {}", stats.event_count);
    println!("  Pending shares: {}", stats.pending_calendar_shares.len());

    Ok(())
}

pub async fn invites(view: &ViewReconciler) -> Result<()> {
    let invites = view.snapshot().await.pending_shares_for_me();

    if invites.is_empty() {
        println!("{}", "No pending invites".dimmed());
        return Ok(());
    }

    for invite in &invites {
        println!("{}", invite.render());
    }
    println!(
        "\n{}",
        "Accept one with: chaincal calendar accept <id>".dimmed()
    );

    Ok(())
}

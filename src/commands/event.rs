use anyhow::Result;
use chaincal_core::timestamp::parse_instant;
use chaincal_core::{CalendarEvent, EventId, ObjectId, ViewReconciler};
use chrono::NaiveDate;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use super::require_user;
use crate::render::RenderIn;
use crate::utils::tui::while_loading;

pub async fn create(
    view: &ViewReconciler,
    calendar: &str,
    title: &str,
    start: &str,
    end: &str,
) -> Result<()> {
    let calendar = ObjectId::from(calendar);
    let tz = view.client().timezone();

    while_loading(
        view.client().loading(),
        "Creating event",
        view.create_calendar_event(&calendar, title, start, end),
    )
    .await?;

    let state = view.snapshot().await;
    let created = state
        .calendar(&calendar)
        .and_then(|c| c.events.iter().rev().find(|e| e.title == title));

    match created {
        Some(event) => println!("{} {}", "Created".green(), event.render_in(tz)),
        None => println!("{}", "Submitted; the ledger has not caught up yet".yellow()),
    }

    Ok(())
}

pub async fn delete(view: &ViewReconciler, calendar: &str, event: &str) -> Result<()> {
    let calendar = ObjectId::from(calendar);
    let event = EventId::from(event);

    while_loading(
        view.client().loading(),
        "Deleting event",
        view.delete_calendar_event(&calendar, &event),
    )
    .await?;

    println!("{} {}", "Deleted".red(), event);
    Ok(())
}

pub async fn list(view: &ViewReconciler, on: Option<&str>, hide: &[String]) -> Result<()> {
    let tz = view.client().timezone();

    for id in hide {
        view.hide_calendar(&ObjectId::from(id.as_str())).await;
    }

    let state = view.snapshot().await;
    require_user(&state)?;

    let mut events = match on {
        Some(date) => state.events_on(&parse_instant(date, tz)?, tz),
        None => state.visible_events(),
    };
    events.sort_by_key(|e| e.start);

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let mut current_date: Option<NaiveDate> = None;

    for event in &events {
        let date = event.start.with_timezone(&tz).date_naive();

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, tz).bold());
            current_date = Some(date);
        }

        println!("  {}{}", event.render_in(tz), calendar_tag(event, &state));
    }

    Ok(())
}

fn calendar_tag(event: &CalendarEvent, state: &chaincal_core::ViewState) -> String {
    event
        .calendar_id
        .as_ref()
        .and_then(|id| state.calendar(id))
        .map(|c| format!(" {}", format!("[{}]", c.title).dimmed()))
        .unwrap_or_default()
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, tz: Tz) -> String {
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

//! TUI rendering traits for chaincal types.

use chaincal_core::{Calendar, CalendarEvent, PendingShare, Statistics, User};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for User {
    fn render(&self) -> String {
        format!(
            "👤 {} {}",
            self.name.bold(),
            format!("({} {})", self.calendars.len(), pluralize("calendar", self.calendars.len())).dimmed()
        )
    }
}

impl Render for Calendar {
    fn render(&self) -> String {
        format!("📅 {} {}", self.title, self.id.dimmed())
    }
}

impl Render for PendingShare {
    fn render(&self) -> String {
        format!("{} {}", "→".cyan(), self.calendar_address)
    }
}

impl Render for Statistics {
    fn render(&self) -> String {
        format!(
            "{} {}, {} {}, {} {}",
            self.user_count,
            pluralize("user", self.user_count as usize),
            self.calendar_count,
            pluralize("calendar", self.calendar_count as usize),
            self.event_count,
            pluralize("event", self.event_count as usize),
        )
    }
}

/// Rendering that depends on the display timezone.
pub trait RenderIn {
    fn render_in(&self, tz: Tz) -> String;
}

impl RenderIn for CalendarEvent {
    fn render_in(&self, tz: Tz) -> String {
        format!("{} {} {}", render_event_time(self, tz), self.title, self.id.dimmed())
    }
}

/// "09:00 - 09:30", or with dates when the event ends on another day.
pub fn render_event_time(event: &CalendarEvent, tz: Tz) -> String {
    let start = event.start.with_timezone(&tz);
    let end = event.end.with_timezone(&tz);

    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{} - {}", start.format("%b %-d %H:%M"), end.format("%b %-d %H:%M"))
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

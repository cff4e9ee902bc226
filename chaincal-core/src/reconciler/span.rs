//! Whether an event falls on a given date, for marking days in a calendar view.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::entity::CalendarEvent;

fn same_day(a: &DateTime<Utc>, b: &DateTime<Utc>, tz: Tz) -> bool {
    a.with_timezone(&tz).date_naive() == b.with_timezone(&tz).date_naive()
}

/// True if `at` is on the event's start day or end day (in `tz`), or lies
/// within `[start, end]` by timestamp.
pub fn contains_date(event: &CalendarEvent, at: &DateTime<Utc>, tz: Tz) -> bool {
    same_day(&event.start, at, tz)
        || same_day(&event.end, at, tz)
        || (event.start <= *at && *at <= event.end)
}

/// Day-granularity check: `day` lies between the start day and the end day
/// (in `tz`), inclusive.
pub fn spans_day(event: &CalendarEvent, day: NaiveDate, tz: Tz) -> bool {
    let start = event.start.with_timezone(&tz).date_naive();
    let end = event.end.with_timezone(&tz).date_naive();
    start <= day && day <= end
}

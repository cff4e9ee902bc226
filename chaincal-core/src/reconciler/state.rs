//! View state rebuilt from the ledger on every reconciliation pass.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::entity::{Calendar, CalendarEvent, PendingShare, Statistics, User};
use crate::ids::ObjectId;
use crate::reconciler::span::{contains_date, spans_day};
use crate::wallet::WalletAccount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub readiness: Readiness,
    pub account: Option<WalletAccount>,
    pub user: Option<User>,
    pub calendars: Vec<Calendar>,
    pub stats: Option<Statistics>,
    /// Calendars hidden from the merged event view. Local only.
    pub disabled: HashSet<ObjectId>,
}

impl ViewState {
    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub fn calendar(&self, id: &ObjectId) -> Option<&Calendar> {
        self.calendars.iter().find(|c| &c.id == id)
    }

    pub fn calendars_titled<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a Calendar> {
        self.calendars.iter().filter(move |c| c.title == title)
    }

    /// Events of all calendars that are not disabled, tagged with their calendar.
    pub fn visible_events(&self) -> Vec<CalendarEvent> {
        self.calendars
            .iter()
            .filter(|c| !self.disabled.contains(&c.id))
            .flat_map(|c| c.events.iter().map(|e| e.clone().with_calendar(&c.id)))
            .collect()
    }

    pub fn events_on(&self, at: &DateTime<Utc>, tz: Tz) -> Vec<CalendarEvent> {
        self.visible_events()
            .into_iter()
            .filter(|e| contains_date(e, at, tz))
            .collect()
    }

    pub fn first_event_on(&self, at: &DateTime<Utc>, tz: Tz) -> Option<CalendarEvent> {
        self.visible_events()
            .into_iter()
            .find(|e| contains_date(e, at, tz))
    }

    pub fn events_spanning(&self, day: NaiveDate, tz: Tz) -> Vec<CalendarEvent> {
        self.visible_events()
            .into_iter()
            .filter(|e| spans_day(e, day, tz))
            .collect()
    }

    /// Pending shares addressed to the connected account.
    pub fn pending_shares_for_me(&self) -> Vec<PendingShare> {
        match (&self.stats, &self.account) {
            (Some(stats), Some(account)) => stats
                .pending_shares_for(&account.address)
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Drop everything derived from the ledger; keeps local preferences.
    pub(crate) fn clear_entities(&mut self) {
        self.user = None;
        self.calendars.clear();
        self.stats = None;
    }
}

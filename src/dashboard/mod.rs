//! Near-real-time admin dashboard.
//!
//! The server has no push channel, so the admin side polls the aggregate
//! counts and diffs them against the last snapshot. Every positive delta
//! becomes a [`Notification`] and bumps the unread badge of its tab.

pub mod poller;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use poller::DashboardPoller;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSnapshot {
    pub quotes: i64,
    pub users: i64,
    pub enquiries: i64,
    pub contacts: i64,
}

impl CountSnapshot {
    pub fn get(&self, tab: Tab) -> i64 {
        match tab {
            Tab::Quotes => self.quotes,
            Tab::Users => self.users,
            Tab::Enquiries => self.enquiries,
            Tab::Contacts => self.contacts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Quotes,
    Users,
    Enquiries,
    Contacts,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Quotes, Tab::Users, Tab::Enquiries, Tab::Contacts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Quotes => "quotes",
            Tab::Users => "users",
            Tab::Enquiries => "enquiries",
            Tab::Contacts => "contacts",
        }
    }

    fn noun(&self, count: i64) -> &'static str {
        match (self, count == 1) {
            (Tab::Quotes, true) => "quote request",
            (Tab::Quotes, false) => "quote requests",
            (Tab::Users, true) => "user",
            (Tab::Users, false) => "users",
            (Tab::Enquiries, true) => "enquiry",
            (Tab::Enquiries, false) => "enquiries",
            (Tab::Contacts, true) => "contact message",
            (Tab::Contacts, false) => "contact messages",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub tab: Tab,
    pub delta: i64,
    pub message: String,
}

impl Notification {
    pub fn new(tab: Tab, delta: i64) -> Self {
        Self {
            tab,
            delta,
            message: format!("{delta} new {}", tab.noun(delta)),
        }
    }
}

/// Unread counters per tab. Cleared when the admin opens the tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnreadBadges {
    pub quotes: u64,
    pub users: u64,
    pub enquiries: u64,
    pub contacts: u64,
}

impl UnreadBadges {
    pub fn get(&self, tab: Tab) -> u64 {
        match tab {
            Tab::Quotes => self.quotes,
            Tab::Users => self.users,
            Tab::Enquiries => self.enquiries,
            Tab::Contacts => self.contacts,
        }
    }

    pub fn total(&self) -> u64 {
        self.quotes + self.users + self.enquiries + self.contacts
    }

    fn slot(&mut self, tab: Tab) -> &mut u64 {
        match tab {
            Tab::Quotes => &mut self.quotes,
            Tab::Users => &mut self.users,
            Tab::Enquiries => &mut self.enquiries,
            Tab::Contacts => &mut self.contacts,
        }
    }

    pub(crate) fn add(&mut self, tab: Tab, delta: u64) {
        let slot = self.slot(tab);
        *slot = slot.saturating_add(delta);
    }

    pub(crate) fn clear(&mut self, tab: Tab) {
        *self.slot(tab) = 0;
    }
}

/// Where the poller reads aggregate counts from.
#[async_trait]
pub trait CountSource: Send {
    async fn fetch_counts(&mut self) -> anyhow::Result<CountSnapshot>;
}

/// Notifications for every tab whose count grew between two snapshots.
/// Shrinking counts (deletions) are ignored.
pub fn diff(previous: &CountSnapshot, latest: &CountSnapshot) -> Vec<Notification> {
    Tab::ALL
        .iter()
        .filter_map(|&tab| {
            let delta = latest.get(tab) - previous.get(tab);
            (delta > 0).then(|| Notification::new(tab, delta))
        })
        .collect()
}

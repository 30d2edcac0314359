use std::collections::BTreeSet;

use tracing::trace;

pub type AlertId = u128;

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::EnumIs,
)]
#[strum(serialize_all = "lowercase")]
pub enum AlertKind {
    #[default]
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub message: String,
    pub kind: AlertKind,
    pub expires_at: u128,
}

/// Transient notifications in insertion order.
///
/// Expiry is tracked in one ordered set keyed by `(expires_at, id)` and applied by [`AlertQueue::poll`],
/// so the driver needs a single timer, armed at [`AlertQueue::next_expiry`].
#[derive(Debug, Clone)]
pub struct AlertQueue {
    lifetime_ms: u128,
    alerts: Vec<Alert>,
    expiry: BTreeSet<(u128, AlertId)>,
    last_id: Option<AlertId>,
}

impl AlertQueue {
    pub fn new(lifetime_ms: u64) -> Self {
        Self {
            lifetime_ms: lifetime_ms as u128,
            alerts: Vec::new(),
            expiry: BTreeSet::new(),
            last_id: None,
        }
    }

    /// Ids are derived from `now`, bumped when two alerts land on the same millisecond.
    pub fn push(&mut self, now: u128, message: impl Into<String>, kind: AlertKind) -> AlertId {
        let id = match self.last_id {
            Some(last) if last >= now => last + 1,
            _ => now,
        };
        self.last_id = Some(id);

        let expires_at = now + self.lifetime_ms;
        let alert = Alert {
            id,
            message: message.into(),
            kind,
            expires_at,
        };
        trace!("alert {id} pushed: {} ({kind})", alert.message);
        self.alerts.push(alert);
        self.expiry.insert((expires_at, id));

        id
    }

    pub fn remove(&mut self, id: AlertId) -> bool {
        let Some(index) = self.alerts.iter().position(|alert| alert.id == id) else {
            return false;
        };
        let alert = self.alerts.remove(index);
        self.expiry.remove(&(alert.expires_at, alert.id));
        true
    }

    /// Drops every alert whose expiry is at or before `now`. Returns how many were dropped.
    pub fn poll(&mut self, now: u128) -> usize {
        let mut removed = 0;
        while let Some(&(expires_at, id)) = self.expiry.first() {
            if expires_at > now {
                break;
            }
            self.expiry.pop_first();
            self.alerts.retain(|alert| alert.id != id);
            removed += 1;
        }
        if removed > 0 {
            trace!("{removed} alerts expired at {now}");
        }
        removed
    }

    pub fn next_expiry(&self) -> Option<u128> {
        self.expiry.first().map(|(expires_at, _)| *expires_at)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::Identified;

/// Consider a list stale after 5 minutes.
const LIST_STALE_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct ResourceList<T> {
    items: Vec<T>,
    fetched_at: Option<DateTime<Utc>>,
    invalidated: bool,
}

impl<T> Default for ResourceList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            fetched_at: None,
            invalidated: false,
        }
    }
}

impl<T: Identified> ResourceList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Replace contents with a fresh fetch
    pub fn replace_all(&mut self, items: Vec<T>, now: DateTime<Utc>) {
        self.items = items;
        self.fetched_at = Some(now);
        self.invalidated = false;
    }

    /// Append an item the backend just created. An item with the same id is
    /// replaced instead, so a duplicate confirmation cannot double it.
    pub fn apply_created(&mut self, item: T) {
        match self.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Swap in the backend's copy of an updated item. Returns false if the
    /// item is not in the list (the list is then invalidated).
    pub fn apply_updated(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => {
                self.invalidate();
                false
            }
        }
    }

    /// Drop a deleted item. Returns whether it was present.
    pub fn apply_deleted(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Mark for refresh on next use; contents stay visible meanwhile
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// Forget everything (e.g. after logout)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            None => true,
            Some(_) if self.invalidated => true,
            Some(at) => now - at > Duration::minutes(LIST_STALE_MINUTES),
        }
    }

    pub fn age_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        self.fetched_at.map(|at| (now - at).num_minutes())
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        match self.age_minutes(now) {
            None => "never".to_string(),
            // Clock skew reads as fresh
            Some(minutes) if minutes < 1 => "just now".to_string(),
            Some(minutes) if minutes < 60 => format!("{}m ago", minutes),
            Some(minutes) => {
                let hours = minutes / 60;
                if minutes % 60 >= 30 {
                    format!("{}h ago", hours + 1)
                } else {
                    format!("{}h ago", hours)
                }
            }
        }
    }
}

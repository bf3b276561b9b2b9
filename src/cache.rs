//! Fetched resources keyed by query, invalidated after writes.
//!
//! Each load takes a ticket. A response is kept only if its ticket is newer than
//! both the stored entry and the last invalidation of that key, so a slow,
//! superseded response cannot overwrite fresher data.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ApiError;
use crate::models::BookingStatus;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Booking(i64),
    MyBookings {
        status: Option<BookingStatus>,
        page: u32,
        size: u32,
    },
    RecentBookings(u32),
    Categories,
    FeaturedProviders,
    Service(i64),
}

impl QueryKey {
    pub fn is_booking(&self) -> bool {
        matches!(
            self,
            QueryKey::Booking(_) | QueryKey::MyBookings { .. } | QueryKey::RecentBookings(_)
        )
    }
}

#[derive(Debug, Default)]
struct Slot {
    value: Option<serde_json::Value>,
    issued: u64,
    stored: u64,
    floor: u64,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    slots: Mutex<HashMap<QueryKey, Slot>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<R>(&self, f: impl FnOnce(&mut HashMap<QueryKey, Slot>) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut slots)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.with_slots(|slots| slots.get(key).and_then(|s| s.value.clone()))?;
        serde_json::from_value(value).ok()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.with_slots(|slots| slots.get(key).is_some_and(|s| s.value.is_some()))
    }

    /// Returns the cached value for `key`, loading it on a miss.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, load: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::trace!(?key, "cache hit");
            return Ok(hit);
        }
        self.refetch(key, load).await
    }

    /// Loads `key` regardless of what is cached.
    pub async fn refetch<T, F, Fut>(&self, key: QueryKey, load: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let ticket = self.issue(&key);
        let value = load().await?;
        self.complete(&key, ticket, &value);
        Ok(value)
    }

    fn issue(&self, key: &QueryKey) -> u64 {
        self.with_slots(|slots| {
            let slot = slots.entry(key.clone()).or_default();
            slot.issued += 1;
            slot.issued
        })
    }

    fn complete<T: Serialize>(&self, key: &QueryKey, ticket: u64, value: &T) {
        let Ok(json) = serde_json::to_value(value) else {
            tracing::warn!(?key, "response could not be cached");
            return;
        };
        self.with_slots(|slots| {
            let slot = slots.entry(key.clone()).or_default();
            if ticket > slot.stored && ticket > slot.floor {
                slot.value = Some(json);
                slot.stored = ticket;
            } else {
                tracing::debug!(?key, ticket, "discarding superseded response");
            }
        });
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.with_slots(|slots| {
            if let Some(slot) = slots.get_mut(key) {
                slot.value = None;
                slot.floor = slot.issued;
            }
        });
        tracing::debug!(?key, "invalidated");
    }

    /// Drops every booking detail and list entry.
    pub fn invalidate_bookings(&self) {
        self.with_slots(|slots| {
            for (_, slot) in slots.iter_mut().filter(|(k, _)| k.is_booking()) {
                slot.value = None;
                slot.floor = slot.issued;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_fetch_caches_until_invalidated() {
        let cache = QueryCache::new();
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = || async move {
            Ok::<_, ApiError>(loads.fetch_add(1, Ordering::SeqCst) as i64 + 1)
        };

        assert_eq!(cache.fetch(QueryKey::Booking(1), load).await.unwrap(), 1);
        assert_eq!(cache.fetch(QueryKey::Booking(1), load).await.unwrap(), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.invalidate(&QueryKey::Booking(1));
        assert!(!cache.contains(&QueryKey::Booking(1)));
        assert_eq!(cache.fetch(QueryKey::Booking(1), load).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_value() {
        let cache = QueryCache::new();
        cache
            .fetch(QueryKey::Categories, || async { Ok::<_, ApiError>(vec!["Plumbing".to_string()]) })
            .await
            .unwrap();

        let err = cache
            .refetch(QueryKey::Categories, || async {
                Err::<Vec<String>, _>(ApiError::Transport("offline".into()))
            })
            .await;
        assert!(err.is_err());
        assert_eq!(
            cache.get::<Vec<String>>(&QueryKey::Categories).unwrap(),
            vec!["Plumbing".to_string()]
        );
    }

    #[test]
    fn test_older_response_does_not_overwrite_newer() {
        let cache = QueryCache::new();
        let key = QueryKey::Booking(7);
        let slow = cache.issue(&key);
        let fast = cache.issue(&key);

        cache.complete(&key, fast, &"ACCEPTED");
        cache.complete(&key, slow, &"PENDING");
        assert_eq!(cache.get::<String>(&key).unwrap(), "ACCEPTED");
    }

    #[test]
    fn test_response_started_before_invalidation_is_dropped() {
        let cache = QueryCache::new();
        let key = QueryKey::Booking(7);
        let in_flight = cache.issue(&key);

        cache.invalidate(&key);
        cache.complete(&key, in_flight, &"PENDING");
        assert!(!cache.contains(&key));

        let fresh = cache.issue(&key);
        cache.complete(&key, fresh, &"ACCEPTED");
        assert_eq!(cache.get::<String>(&key).unwrap(), "ACCEPTED");
    }

    #[test]
    fn test_invalidate_bookings_leaves_catalog() {
        let cache = QueryCache::new();
        for key in [
            QueryKey::Booking(1),
            QueryKey::RecentBookings(3),
            QueryKey::MyBookings {
                status: None,
                page: 0,
                size: 20,
            },
            QueryKey::Categories,
        ] {
            let ticket = cache.issue(&key);
            cache.complete(&key, ticket, &1);
        }

        cache.invalidate_bookings();
        assert!(!cache.contains(&QueryKey::Booking(1)));
        assert!(!cache.contains(&QueryKey::RecentBookings(3)));
        assert!(cache.contains(&QueryKey::Categories));
    }
}

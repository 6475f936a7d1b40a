// SPDX-License-Identifier: GPL-3.0-only

//! Bounded single-slot channel between the capture side and the decode worker
//!
//! A one-slot mailbox: the producer overwrites the slot instead of blocking,
//! the consumer takes the newest value or waits for one. At most one frame
//! is ever pending, so a slow decode never builds a queue of stale frames.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

struct SlotInner<T> {
    value: Option<T>,
    overwritten: u64,
    closed: bool,
}

/// Single-slot, latest-only channel.
///
/// Cheap to share: wrap in an [`Arc`] and clone. Publishing never blocks;
/// receiving awaits until a value arrives or the slot is closed.
pub struct FrameSlot<T> {
    inner: Mutex<SlotInner<T>>,
    notify: Notify,
}

impl<T> FrameSlot<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(SlotInner {
                value: None,
                overwritten: 0,
                closed: false,
            }),
            notify: Notify::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner<T>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Put a value into the slot, replacing any undelivered predecessor.
    ///
    /// Returns `false` when the slot is closed (the value is dropped).
    pub fn publish(&self, value: T) -> bool {
        {
            let mut inner = self.lock();
            if inner.closed {
                return false;
            }
            if inner.value.replace(value).is_some() {
                inner.overwritten += 1;
            }
        }
        self.notify.notify_one();
        true
    }

    /// Take the newest value, waiting until one arrives.
    ///
    /// Returns `None` once the slot is closed and empty.
    pub async fn recv(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.lock();
                if let Some(value) = inner.value.take() {
                    return Some(value);
                }
                if inner.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Close the slot. Pending and future publishes are dropped; a waiting
    /// receiver wakes up and drains the slot before observing the close.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }

    /// Number of values that were replaced before delivery.
    pub fn overwritten(&self) -> u64 {
        self.lock().overwritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_published_value() {
        let slot = FrameSlot::new();
        assert!(slot.publish(7u32));
        assert_eq!(slot.recv().await, Some(7));
    }

    #[tokio::test]
    async fn overwrites_keep_only_the_newest() {
        let slot = FrameSlot::new();
        slot.publish(1u32);
        slot.publish(2);
        slot.publish(3);

        assert_eq!(slot.recv().await, Some(3));
        assert_eq!(slot.overwritten(), 2);
    }

    #[tokio::test]
    async fn recv_waits_for_producer() {
        let slot = FrameSlot::new();
        let reader = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.recv().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        slot.publish(42u32);

        assert_eq!(reader.await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn close_wakes_waiting_receiver() {
        let slot: Arc<FrameSlot<u32>> = FrameSlot::new();
        let reader = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.recv().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        slot.close();

        assert_eq!(reader.await.unwrap(), None);
    }

    #[tokio::test]
    async fn close_drains_pending_value_first() {
        let slot = FrameSlot::new();
        slot.publish(9u32);
        slot.close();

        assert_eq!(slot.recv().await, Some(9));
        assert_eq!(slot.recv().await, None);
        assert!(!slot.publish(10));
    }
}

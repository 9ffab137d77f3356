use std::any::Any;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use tracing::trace;

use super::Reference;
use super::ReferencePoolInfo;

/// Free list and counters for one reference type
pub(crate) struct ReferenceCollection {
    type_name: &'static str,
    max_retained: usize,

    free: Mutex<Vec<Box<dyn Any + Send>>>,

    using: AtomicUsize,
    acquire_count: AtomicU64,
    release_count: AtomicU64,
    add_count: AtomicU64,
    remove_count: AtomicU64,
}

impl ReferenceCollection {
    pub(crate) fn new(
        type_name: &'static str,
        max_retained: usize,
    ) -> Self {
        Self {
            type_name,
            max_retained,
            free: Mutex::new(Vec::new()),
            using: AtomicUsize::new(0),
            acquire_count: AtomicU64::new(0),
            release_count: AtomicU64::new(0),
            add_count: AtomicU64::new(0),
            remove_count: AtomicU64::new(0),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn unused(&self) -> usize {
        self.free.lock().len()
    }

    pub(crate) fn acquire<T: Reference>(&self) -> Box<T> {
        self.using.fetch_add(1, Ordering::AcqRel);
        self.acquire_count.fetch_add(1, Ordering::Relaxed);

        let recycled = self.free.lock().pop();
        match recycled.map(|any| any.downcast::<T>()) {
            Some(Ok(value)) => value,
            _ => {
                self.add_count.fetch_add(1, Ordering::Relaxed);
                Box::default()
            }
        }
    }

    /// Returns a value to the free list.
    ///
    /// # Panics
    /// When more values are released than were acquired.
    pub(crate) fn release<T: Reference>(
        &self,
        mut value: Box<T>,
    ) {
        let released = self
            .using
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |using| using.checked_sub(1));
        assert!(
            released.is_ok(),
            "reference pool misuse: released a {} that was never acquired",
            self.type_name
        );
        self.release_count.fetch_add(1, Ordering::Relaxed);

        value.clear();

        let mut free = self.free.lock();
        if free.len() < self.max_retained {
            free.push(value);
        } else {
            self.remove_count.fetch_add(1, Ordering::Relaxed);
            trace!(type_name = self.type_name, "free list full, dropping released value");
        }
    }

    pub(crate) fn add<T: Reference>(
        &self,
        count: usize,
    ) -> usize {
        let mut free = self.free.lock();
        let room = self.max_retained.saturating_sub(free.len());
        let added = count.min(room);
        for _ in 0..added {
            free.push(Box::<T>::default());
        }
        self.add_count.fetch_add(added as u64, Ordering::Relaxed);
        added
    }

    /// Drops up to `count` unused values; returns how many were removed.
    pub(crate) fn remove(
        &self,
        count: usize,
    ) -> usize {
        let mut free = self.free.lock();
        let removed = count.min(free.len());
        let keep = free.len() - removed;
        free.truncate(keep);
        self.remove_count.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub(crate) fn remove_all(&self) -> usize {
        self.remove(usize::MAX)
    }

    pub(crate) fn info(&self) -> ReferencePoolInfo {
        ReferencePoolInfo {
            type_name: self.type_name,
            unused_count: self.unused(),
            using_count: self.using.load(Ordering::Acquire),
            acquire_count: self.acquire_count.load(Ordering::Relaxed),
            release_count: self.release_count.load(Ordering::Relaxed),
            add_count: self.add_count.load(Ordering::Relaxed),
            remove_count: self.remove_count.load(Ordering::Relaxed),
        }
    }
}

//! Reusable-object pool keyed by type.
//!
//! Values are handed out as [`Pooled<T>`] handles. A handle owns its value
//! exclusively and returns it, cleared, to the free list of its type when it
//! is released or dropped, so a value can never be released twice or reused
//! while a handle to it is still alive.

mod collection;

use std::any::type_name;
use std::any::TypeId;
use std::fmt::Debug;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ops::DerefMut;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use self::collection::ReferenceCollection;
use crate::PoolConfig;
use crate::PoolError;
use crate::Result;

/// A value that can live in a [`ReferencePool`].
///
/// `clear` must reset every field so the next `acquire` observes a value
/// equivalent to `Default::default()`.
pub trait Reference: Default + Send + 'static {
    fn clear(&mut self);
}

/// Snapshot of one type's pool counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePoolInfo {
    pub type_name: &'static str,
    pub unused_count: usize,
    pub using_count: usize,
    pub acquire_count: u64,
    pub release_count: u64,
    pub add_count: u64,
    pub remove_count: u64,
}

pub struct ReferencePool {
    collections: DashMap<TypeId, Arc<ReferenceCollection>>,
    config: PoolConfig,
}

impl ReferencePool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            collections: DashMap::new(),
            config,
        }
    }

    /// Hands out a cleared value of type `T`, recycling one when available.
    pub fn acquire<T: Reference>(&self) -> Pooled<T> {
        let collection = self.collection::<T>();
        let value = collection.acquire::<T>();
        Pooled {
            value: ManuallyDrop::new(value),
            collection,
        }
    }

    /// Pre-populates the free list of `T` with `count` fresh values.
    ///
    /// The free list never grows past `max_retained_per_type`.
    pub fn add<T: Reference>(
        &self,
        count: usize,
    ) -> Result<()> {
        self.check_count::<T>(count)?;
        let added = self.collection::<T>().add::<T>(count);
        debug!(type_name = type_name::<T>(), requested = count, added, "reference pool warm-up");
        Ok(())
    }

    /// Drops `count` unused values of `T`.
    pub fn remove<T: Reference>(
        &self,
        count: usize,
    ) -> Result<()> {
        self.check_count::<T>(count)?;
        let collection = self.collection::<T>();
        let unused = collection.unused();
        if count > unused {
            return Err(PoolError::NotEnoughUnused {
                type_name: collection.type_name(),
                requested: count,
                unused,
            }
            .into());
        }
        collection.remove(count);
        Ok(())
    }

    /// Drops every unused value of `T`.
    pub fn remove_all<T: Reference>(&self) {
        if let Some(collection) = self.collections.get(&TypeId::of::<T>()) {
            collection.remove_all();
        }
    }

    /// Drops every unused value of every type. Live handles are unaffected.
    pub fn clear_all(&self) {
        for collection in self.collections.iter() {
            collection.remove_all();
        }
    }

    /// Number of reference types the pool has seen
    pub fn count(&self) -> usize {
        self.collections.len()
    }

    pub fn info(&self) -> Vec<ReferencePoolInfo> {
        let mut infos: Vec<ReferencePoolInfo> = self.collections.iter().map(|c| c.info()).collect();
        infos.sort_by(|a, b| a.type_name.cmp(b.type_name));
        infos
    }

    pub fn info_of<T: Reference>(&self) -> Option<ReferencePoolInfo> {
        self.collections.get(&TypeId::of::<T>()).map(|c| c.info())
    }

    fn collection<T: Reference>(&self) -> Arc<ReferenceCollection> {
        self.collections
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                Arc::new(ReferenceCollection::new(
                    type_name::<T>(),
                    self.config.max_retained_per_type,
                ))
            })
            .clone()
    }

    fn check_count<T: Reference>(
        &self,
        count: usize,
    ) -> Result<()> {
        if self.config.strict_check && count == 0 {
            return Err(PoolError::InvalidCount {
                type_name: type_name::<T>(),
                count,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for ReferencePool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl Debug for ReferencePool {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ReferencePool").field("types", &self.collections.len()).finish()
    }
}

/// Exclusive handle to a pooled value.
///
/// The value goes back to its pool when the handle is dropped.
pub struct Pooled<T: Reference> {
    value: ManuallyDrop<Box<T>>,
    collection: Arc<ReferenceCollection>,
}

impl<T: Reference> Pooled<T> {
    /// Returns the value to its pool now.
    pub fn release(self) {
        drop(self)
    }
}

impl<T: Reference> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Reference> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Reference> Drop for Pooled<T> {
    fn drop(&mut self) {
        // SAFETY: `value` is not accessed again after being taken here.
        let value = unsafe { ManuallyDrop::take(&mut self.value) };
        self.collection.release(value);
    }
}

impl<T: Reference + Debug> Debug for Pooled<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_tuple("Pooled").field(&**self.value).finish()
    }
}

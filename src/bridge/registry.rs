use std::collections::HashMap;

use super::SerialId;

/// Outstanding correlation ids of one bridge, each with its pending record.
///
/// An id enters on operation start and leaves exactly once: on its
/// completion event, on abandonment, or on shutdown.
#[derive(Debug)]
pub struct CorrelationRegistry<P> {
    entries: HashMap<SerialId, P>,
}

impl<P> CorrelationRegistry<P> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Tracks `serial_id`. Returns the record it displaced when the id was
    /// already outstanding.
    pub fn insert(
        &mut self,
        serial_id: SerialId,
        pending: P,
    ) -> Option<P> {
        self.entries.insert(serial_id, pending)
    }

    pub fn remove(
        &mut self,
        serial_id: SerialId,
    ) -> Option<P> {
        self.entries.remove(&serial_id)
    }

    pub fn contains(
        &self,
        serial_id: SerialId,
    ) -> bool {
        self.entries.contains_key(&serial_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outstanding ids in ascending order
    pub fn serial_ids(&self) -> Vec<SerialId> {
        let mut ids: Vec<SerialId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Removes every entry
    pub fn drain(&mut self) -> Vec<(SerialId, P)> {
        self.entries.drain().collect()
    }
}

impl<P> Default for CorrelationRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

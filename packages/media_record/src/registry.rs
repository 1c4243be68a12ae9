//! Per-room recording slots.
//!
//! Starting a recording first claims the room slot with a compare-and-swap, so two start requests
//! handled by this process can never both reach the egress API for the same room.

use std::{collections::HashMap, sync::Arc};

use meet_protocol::{egress::EgressId, room::RoomName};
use spin::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomSlot {
    Starting,
    Active(EgressId),
}

#[derive(Default, Clone)]
pub struct RecordingRegistry {
    slots: Arc<Mutex<HashMap<RoomName, RoomSlot>>>,
}

impl RecordingRegistry {
    /// Marks the room as starting if nothing holds it, otherwise returns the current slot.
    pub fn try_claim(&self, room: &RoomName) -> Result<RecordingClaim, RoomSlot> {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(room) {
            return Err(slot.clone());
        }
        slots.insert(room.clone(), RoomSlot::Starting);
        Ok(RecordingClaim::new(self.clone(), room.clone()))
    }

    /// Takes over a room whose slot still points to `stale`, a job the platform no longer runs.
    pub fn reclaim_stale(&self, room: &RoomName, stale: &EgressId) -> Option<RecordingClaim> {
        let mut slots = self.slots.lock();
        if !matches!(slots.get(room), Some(RoomSlot::Active(id)) if id == stale) {
            return None;
        }
        log::info!("[RecordingRegistry] room {room} reclaimed from stale egress {stale}");
        slots.insert(room.clone(), RoomSlot::Starting);
        Some(RecordingClaim::new(self.clone(), room.clone()))
    }

    pub fn slot(&self, room: &RoomName) -> Option<RoomSlot> {
        self.slots.lock().get(room).cloned()
    }

    /// Frees a room holding an active job. A start still in flight keeps its claim.
    pub fn clear(&self, room: &RoomName) {
        let mut slots = self.slots.lock();
        if let Some(RoomSlot::Active(egress_id)) = slots.get(room) {
            log::info!("[RecordingRegistry] room {room} cleared from egress {egress_id}");
            slots.remove(room);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    fn activate(&self, room: &RoomName, egress_id: EgressId) -> bool {
        let mut slots = self.slots.lock();
        if slots.get(room) != Some(&RoomSlot::Starting) {
            return false;
        }
        slots.insert(room.clone(), RoomSlot::Active(egress_id));
        true
    }

    fn release_starting(&self, room: &RoomName) {
        let mut slots = self.slots.lock();
        if slots.get(room) == Some(&RoomSlot::Starting) {
            slots.remove(room);
        }
    }
}

/// Exclusive right to start a recording in one room. Dropping it without [`RecordingClaim::activate`]
/// frees the room again.
pub struct RecordingClaim {
    registry: RecordingRegistry,
    room: RoomName,
    activated: bool,
}

impl RecordingClaim {
    fn new(registry: RecordingRegistry, room: RoomName) -> Self {
        Self { registry, room, activated: false }
    }

    pub fn activate(mut self, egress_id: EgressId) {
        if !self.registry.activate(&self.room, egress_id) {
            log::warn!("[RecordingRegistry] room {} lost its starting slot", self.room);
        }
        self.activated = true;
    }
}

impl Drop for RecordingClaim {
    fn drop(&mut self) {
        if !self.activated {
            self.registry.release_starting(&self.room);
        }
    }
}

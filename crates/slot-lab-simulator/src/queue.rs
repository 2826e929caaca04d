use std::collections::VecDeque;

use crate::error::SimError;
use crate::ids::QueueId;

/// A packet waiting for service. `arrival_slot` is the first slot in which it
/// can be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub arrival_slot: u64,
}

impl Packet {
    pub fn new(arrival_slot: u64) -> Self {
        Self { arrival_slot }
    }

    /// Slots spent waiting when served in `slot`.
    pub fn finish(&self, slot: u64) -> u64 {
        slot.saturating_sub(self.arrival_slot)
    }
}

#[derive(Debug, Clone)]
pub struct SimQueue {
    id: QueueId,
    connections: u32,
    packets: VecDeque<Packet>,
    total_occupancy: u64,
    delays: Vec<u64>,
}

impl SimQueue {
    pub fn new(id: QueueId) -> Self {
        Self {
            id,
            connections: 0,
            packets: VecDeque::new(),
            total_occupancy: 0,
            delays: Vec::new(),
        }
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn connections(&self) -> u32 {
        self.connections
    }

    pub(crate) fn increment_connections(&mut self) {
        self.connections += 1;
    }

    pub(crate) fn reset_connections(&mut self) {
        self.connections = 0;
    }

    pub fn pending(&self) -> usize {
        self.packets.len()
    }

    pub fn add_packet(&mut self, packet: Packet) {
        self.packets.push_back(packet);
    }

    /// Remove the oldest packet and log its delay. Returns the delay in slots.
    pub fn pop_packet(&mut self, slot: u64) -> Result<u64, SimError> {
        let packet = self.packets.pop_front().ok_or(SimError::EmptyQueue(self.id))?;
        let delay = packet.finish(slot);
        self.delays.push(delay);
        Ok(delay)
    }

    pub fn record_occupancy(&mut self) {
        self.total_occupancy += self.packets.len() as u64;
    }

    pub fn total_occupancy(&self) -> u64 {
        self.total_occupancy
    }

    pub fn average_occupancy(&self, slots: u64) -> Result<f64, SimError> {
        if slots == 0 {
            return Err(SimError::ZeroSlots);
        }
        Ok(self.total_occupancy as f64 / slots as f64)
    }

    pub fn delays(&self) -> &[u64] {
        &self.delays
    }

    pub fn served(&self) -> usize {
        self.delays.len()
    }

    pub fn mean_delay(&self) -> Option<f64> {
        if self.delays.is_empty() {
            return None;
        }
        let total: u64 = self.delays.iter().sum();
        Some(total as f64 / self.delays.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_arrival_order() {
        let mut q = SimQueue::new(QueueId(1));
        q.add_packet(Packet::new(2));
        q.add_packet(Packet::new(5));

        assert_eq!(q.pop_packet(6), Ok(4));
        assert_eq!(q.pending(), 1);
        assert_eq!(q.pop_packet(6), Ok(1));
        assert_eq!(q.pending(), 0);
        assert_eq!(q.delays(), &[4, 1]);
        assert_eq!(q.mean_delay(), Some(2.5));
    }

    #[test]
    fn popping_empty_queue_is_an_error() {
        let mut q = SimQueue::new(QueueId(3));
        assert_eq!(q.pop_packet(1), Err(SimError::EmptyQueue(QueueId(3))));
        assert_eq!(q.served(), 0);
    }

    #[test]
    fn delay_is_never_negative() {
        let mut q = SimQueue::new(QueueId(1));
        q.add_packet(Packet::new(10));
        assert_eq!(q.pop_packet(3), Ok(0));
    }

    #[test]
    fn average_occupancy_over_recorded_slots() {
        let mut q = SimQueue::new(QueueId(1));
        q.add_packet(Packet::new(0));
        q.record_occupancy();
        q.add_packet(Packet::new(1));
        q.record_occupancy();
        q.record_occupancy();

        assert_eq!(q.total_occupancy(), 5);
        assert_eq!(q.average_occupancy(2), Ok(2.5));
        assert_eq!(q.average_occupancy(0), Err(SimError::ZeroSlots));
    }

    #[test]
    fn connections_reset() {
        let mut q = SimQueue::new(QueueId(1));
        q.increment_connections();
        q.increment_connections();
        assert_eq!(q.connections(), 2);
        q.reset_connections();
        assert_eq!(q.connections(), 0);
    }
}

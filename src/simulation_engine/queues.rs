use std::collections::VecDeque;

use crate::simulation_engine::vehicles::{Direction, Vehicle, VehicleId};

/// Waiting vehicles for one approach.
#[derive(Debug, Clone, Default)]
struct Lane {
    /// Vehicles visible to the scorer and the drain, head first.
    waiting: VecDeque<Vehicle>,
    /// Arrivals held back while a drain owns this lane, with their `at_head` flag.
    deferred: Vec<(Vehicle, bool)>,
    /// Set while a drain transaction owns this lane.
    draining: bool,
}

impl Lane {
    fn insert(&mut self, vehicle: Vehicle, at_head: bool) {
        if at_head {
            self.waiting.push_front(vehicle);
        } else {
            self.waiting.push_back(vehicle);
        }
    }
}

/// The four direction queues.
///
/// A drain is a transaction: `begin_drain` sorts the lane and takes ownership of it,
/// `take_next` pops the head, `end_drain` hands the lane back. Pushes that arrive in
/// between are deferred and applied in order when the drain ends, so a drain never
/// sees its sort order disturbed.
#[derive(Debug, Clone, Default)]
pub struct QueueStore {
    lanes: [Lane; 4],
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane(&self, direction: Direction) -> &Lane {
        &self.lanes[direction.index()]
    }

    fn lane_mut(&mut self, direction: Direction) -> &mut Lane {
        &mut self.lanes[direction.index()]
    }

    /// Vehicles currently visible in the queue (deferred arrivals excluded).
    pub fn len(&self, direction: Direction) -> usize {
        self.lane(direction).waiting.len()
    }

    pub fn is_empty(&self, direction: Direction) -> bool {
        self.lane(direction).waiting.is_empty()
    }

    /// Arrivals waiting for a drain on this lane to finish.
    pub fn deferred_len(&self, direction: Direction) -> usize {
        self.lane(direction).deferred.len()
    }

    /// Every vehicle at the intersection, deferred arrivals included.
    pub fn total_len(&self) -> usize {
        self.lanes
            .iter()
            .map(|lane| lane.waiting.len() + lane.deferred.len())
            .sum()
    }

    pub fn lengths(&self) -> [usize; 4] {
        Direction::ALL.map(|d| self.len(d))
    }

    pub fn vehicles(&self, direction: Direction) -> impl Iterator<Item = &Vehicle> {
        self.lane(direction).waiting.iter()
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.lanes.iter().any(|lane| {
            lane.waiting.iter().any(|v| v.id == id) || lane.deferred.iter().any(|(v, _)| v.id == id)
        })
    }

    pub fn is_draining(&self, direction: Direction) -> bool {
        self.lane(direction).draining
    }

    /// Appends (or, for `at_head`, prepends) a vehicle. Returns `false` when the
    /// lane is owned by a drain and the vehicle was deferred instead.
    pub fn push(&mut self, direction: Direction, vehicle: Vehicle, at_head: bool) -> bool {
        let lane = self.lane_mut(direction);
        if lane.draining {
            lane.deferred.push((vehicle, at_head));
            false
        } else {
            lane.insert(vehicle, at_head);
            true
        }
    }

    /// Stable sort by weight descending then arrival ascending, and take ownership.
    pub fn begin_drain(&mut self, direction: Direction) {
        let lane = self.lane_mut(direction);
        lane.waiting
            .make_contiguous()
            .sort_by(|a, b| {
                b.priority_weight()
                    .cmp(&a.priority_weight())
                    .then(a.arrival_ms.cmp(&b.arrival_ms))
            });
        lane.draining = true;
    }

    pub fn take_next(&mut self, direction: Direction) -> Option<Vehicle> {
        self.lane_mut(direction).waiting.pop_front()
    }

    /// Releases the lane and applies deferred pushes. Returns how many were applied.
    pub fn end_drain(&mut self, direction: Direction) -> usize {
        let lane = self.lane_mut(direction);
        lane.draining = false;
        let deferred = std::mem::take(&mut lane.deferred);
        let applied = deferred.len();
        for (vehicle, at_head) in deferred {
            lane.insert(vehicle, at_head);
        }
        applied
    }

    /// Sorts and removes up to `max_count` vehicles from the head in one step.
    pub fn drain_sorted(&mut self, direction: Direction, max_count: usize) -> Vec<Vehicle> {
        self.begin_drain(direction);
        let mut drained = Vec::with_capacity(max_count.min(self.len(direction)));
        while drained.len() < max_count {
            match self.take_next(direction) {
                Some(vehicle) => drained.push(vehicle),
                None => break,
            }
        }
        self.end_drain(direction);
        drained
    }

    /// Empties the lane and drops any drain ownership.
    pub fn clear(&mut self, direction: Direction) {
        let lane = self.lane_mut(direction);
        lane.waiting.clear();
        lane.deferred.clear();
        lane.draining = false;
    }

    pub fn clear_all(&mut self) {
        for direction in Direction::ALL {
            self.clear(direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation_engine::vehicles::{EmergencyKind, VehicleClass};

    fn vehicle(id: u64, class: VehicleClass, arrival_ms: u64) -> Vehicle {
        Vehicle::new(VehicleId(id), class, Direction::North, arrival_ms)
    }

    #[test]
    fn late_emergency_drains_first() {
        let mut store = QueueStore::new();
        for (id, t) in [(1, 0), (2, 1_000), (3, 2_000)] {
            store.push(Direction::North, vehicle(id, VehicleClass::Normal, t), false);
        }
        let ambulance = VehicleClass::Emergency(EmergencyKind::Ambulance);
        store.push(Direction::North, vehicle(4, ambulance, 3_000), false);

        let order: Vec<u64> = store
            .drain_sorted(Direction::North, 4)
            .iter()
            .map(|v| v.id.0)
            .collect();
        assert_eq!(order, vec![4, 1, 2, 3]);
        assert!(store.is_empty(Direction::North));
    }

    #[test]
    fn equal_weights_keep_arrival_order() {
        let mut store = QueueStore::new();
        store.push(Direction::North, vehicle(1, VehicleClass::Priority, 500), false);
        store.push(Direction::North, vehicle(2, VehicleClass::Normal, 100), false);
        store.push(Direction::North, vehicle(3, VehicleClass::Priority, 200), false);
        // pushed to the head but arrived later: sort still puts it after id 3
        store.push(Direction::North, vehicle(4, VehicleClass::Priority, 900), true);

        let drained = store.drain_sorted(Direction::North, 3);
        let ids: Vec<u64> = drained.iter().map(|v| v.id.0).collect();
        assert_eq!(ids, vec![3, 1, 4]);
        assert_eq!(store.len(Direction::North), 1);
    }

    #[test]
    fn head_insert_lands_in_front() {
        let mut store = QueueStore::new();
        store.push(Direction::East, vehicle(1, VehicleClass::Normal, 0), false);
        store.push(Direction::East, vehicle(2, VehicleClass::Normal, 10), true);
        let ids: Vec<u64> = store.vehicles(Direction::East).map(|v| v.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn pushes_during_drain_are_deferred() {
        let mut store = QueueStore::new();
        store.push(Direction::South, vehicle(1, VehicleClass::Normal, 0), false);
        store.push(Direction::South, vehicle(2, VehicleClass::Normal, 5), false);
        store.begin_drain(Direction::South);

        assert!(!store.push(Direction::South, vehicle(3, VehicleClass::Priority, 10), false));
        assert_eq!(store.len(Direction::South), 2);
        assert_eq!(store.deferred_len(Direction::South), 1);
        assert_eq!(store.total_len(), 3);

        assert_eq!(store.take_next(Direction::South).map(|v| v.id.0), Some(1));
        assert_eq!(store.end_drain(Direction::South), 1);
        assert!(!store.is_draining(Direction::South));
        let ids: Vec<u64> = store.vehicles(Direction::South).map(|v| v.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn drain_caps_at_queue_length() {
        let mut store = QueueStore::new();
        store.push(Direction::West, vehicle(1, VehicleClass::Normal, 0), false);
        assert_eq!(store.drain_sorted(Direction::West, 6).len(), 1);
        assert!(store.drain_sorted(Direction::West, 6).is_empty());
    }

    #[test]
    fn clear_drops_deferred_too() {
        let mut store = QueueStore::new();
        store.push(Direction::North, vehicle(1, VehicleClass::Normal, 0), false);
        store.begin_drain(Direction::North);
        store.push(Direction::North, vehicle(2, VehicleClass::Normal, 0), false);
        store.clear(Direction::North);
        assert_eq!(store.total_len(), 0);
        assert!(!store.contains(VehicleId(2)));
    }
}

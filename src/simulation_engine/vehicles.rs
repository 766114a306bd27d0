use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ControlError;

/// One of the four approaches competing for right-of-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Enumeration order used for every deterministic tie-break.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::South => "SOUTH",
            Direction::East => "EAST",
            Direction::West => "WEST",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            _ => Err(ControlError::UnknownDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmergencyKind {
    Ambulance,
    Fire,
    Police,
    Evacuation,
}

impl EmergencyKind {
    pub const ALL: [EmergencyKind; 4] = [
        EmergencyKind::Ambulance,
        EmergencyKind::Fire,
        EmergencyKind::Police,
        EmergencyKind::Evacuation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EmergencyKind::Ambulance => "AMBULANCE",
            EmergencyKind::Fire => "FIRE",
            EmergencyKind::Police => "POLICE",
            EmergencyKind::Evacuation => "EVACUATION",
        }
    }
}

impl fmt::Display for EmergencyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmergencyKind {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ambulance" => Ok(EmergencyKind::Ambulance),
            "fire" => Ok(EmergencyKind::Fire),
            "police" => Ok(EmergencyKind::Police),
            "evacuation" => Ok(EmergencyKind::Evacuation),
            _ => Err(ControlError::UnknownEmergencyKind(s.to_string())),
        }
    }
}

/// Vehicle class; the priority weight is derived from it and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleClass {
    Normal,
    Priority,
    Emergency(EmergencyKind),
}

impl VehicleClass {
    pub fn priority_weight(self) -> u32 {
        match self {
            VehicleClass::Normal => 1,
            VehicleClass::Priority => 3,
            VehicleClass::Emergency(_) => 10,
        }
    }

    pub fn is_emergency(self) -> bool {
        matches!(self, VehicleClass::Emergency(_))
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VehicleClass::Normal => write!(f, "NORMAL"),
            VehicleClass::Priority => write!(f, "PRIORITY"),
            VehicleClass::Emergency(kind) => write!(f, "EMERGENCY/{}", kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vehicle waiting at the intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub class: VehicleClass,
    pub direction: Direction,
    /// Simulated milliseconds at which the vehicle joined its queue.
    pub arrival_ms: u64,
    /// Set exactly once, when the vehicle is drained.
    pub wait_ms: Option<u64>,
}

impl Vehicle {
    pub fn new(id: VehicleId, class: VehicleClass, direction: Direction, arrival_ms: u64) -> Self {
        Self {
            id,
            class,
            direction,
            arrival_ms,
            wait_ms: None,
        }
    }

    pub fn priority_weight(&self) -> u32 {
        self.class.priority_weight()
    }

    pub fn is_emergency(&self) -> bool {
        self.class.is_emergency()
    }

    /// Seconds waited so far, as the scorer sees it.
    pub fn waited_secs(&self, now_ms: u64) -> f64 {
        now_ms.saturating_sub(self.arrival_ms) as f64 / 1000.0
    }

    /// Stamps the wait time at departure and returns it.
    pub fn depart(&mut self, now_ms: u64) -> u64 {
        let wait = now_ms.saturating_sub(self.arrival_ms);
        self.wait_ms = Some(wait);
        wait
    }
}

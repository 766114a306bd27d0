use serde::{Deserialize, Serialize};
use std::fmt;

use crate::communication::LogCategory;
use crate::error::SignalError;
use crate::simulation_engine::simulation::Simulation;
use crate::simulation_engine::vehicles::Direction;

/// The possible states for one direction's signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

/// Whole-intersection signal state. At most one direction can hold right-of-way,
/// which the shape of this enum guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalState {
    #[default]
    AllRed,
    Yellow(Direction),
    Green(Direction),
}

impl SignalState {
    pub fn phase_of(self, direction: Direction) -> LightState {
        match self {
            SignalState::Green(d) if d == direction => LightState::Green,
            SignalState::Yellow(d) if d == direction => LightState::Yellow,
            _ => LightState::Red,
        }
    }

    /// Phases in N, S, E, W order.
    pub fn phases(self) -> [LightState; 4] {
        Direction::ALL.map(|d| self.phase_of(d))
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SignalState::AllRed => write!(f, "ALL RED"),
            SignalState::Yellow(d) => write!(f, "{} YELLOW", d),
            SignalState::Green(d) => write!(f, "{} GREEN", d),
        }
    }
}

/// What it takes to give `target` the green from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPlan {
    /// `target` already has the green.
    Hold,
    /// Another direction is green and must clear through yellow first.
    ViaYellow(Direction),
    /// Nothing is green; go through the all-red buffer and grant.
    FromAllRed,
}

/// Per-direction phase changes produced by one state transition.
pub type PhaseChanges = Vec<(Direction, LightState)>;

/// Signal state machine: `Green(d) -> Yellow(d) -> AllRed -> Green(target)`.
///
/// `force_all_red` is legal from anywhere (pause, emergency preemption). Green can
/// only be granted out of `AllRed`, so every change of right-of-way passes through
/// the all-red buffer.
#[derive(Debug, Clone, Default)]
pub struct SignalController {
    state: SignalState,
    greens_granted: u64,
}

impl SignalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn phase_of(&self, direction: Direction) -> LightState {
        self.state.phase_of(direction)
    }

    pub fn greens_granted(&self) -> u64 {
        self.greens_granted
    }

    pub fn plan_switch(&self, target: Direction) -> SwitchPlan {
        match self.state {
            SignalState::Green(d) if d == target => SwitchPlan::Hold,
            SignalState::Green(d) => SwitchPlan::ViaYellow(d),
            SignalState::Yellow(_) | SignalState::AllRed => SwitchPlan::FromAllRed,
        }
    }

    fn apply(&mut self, next: SignalState) -> PhaseChanges {
        let before = self.state.phases();
        let after = next.phases();
        self.state = next;
        Direction::ALL
            .iter()
            .filter(|d| before[d.index()] != after[d.index()])
            .map(|&d| (d, after[d.index()]))
            .collect()
    }

    /// Green -> Yellow for the direction that currently holds right-of-way.
    pub fn show_yellow(&mut self) -> Result<(Direction, PhaseChanges), SignalError> {
        match self.state {
            SignalState::Green(d) => Ok((d, self.apply(SignalState::Yellow(d)))),
            other => Err(SignalError::NothingGreen(other.to_string())),
        }
    }

    pub fn force_all_red(&mut self) -> PhaseChanges {
        self.apply(SignalState::AllRed)
    }

    pub fn grant_green(&mut self, direction: Direction) -> Result<PhaseChanges, SignalError> {
        match self.state {
            SignalState::AllRed => {
                self.greens_granted += 1;
                Ok(self.apply(SignalState::Green(direction)))
            }
            other => Err(SignalError::NotAllRed {
                requested: direction,
                current: other.to_string(),
            }),
        }
    }
}

impl Simulation {
    /// Runs the yellow -> all-red -> green protocol toward `target`.
    ///
    /// Returns `true` when `target` holds the green afterwards. If the session was
    /// paused or reset during one of the holds the signal is left all-red and
    /// `false` is returned. A pending emergency preemption owns the signal, so the
    /// switch stops without touching the lights and returns `false`.
    pub(crate) async fn change_signal(&self, target: Direction, generation: u64) -> bool {
        let plan = {
            let state = self.state();
            if state.preemptions_pending > 0 {
                return false;
            }
            state.signal.plan_switch(target)
        };
        match plan {
            SwitchPlan::Hold => return true,
            SwitchPlan::ViaYellow(from) => {
                {
                    let mut state = self.state();
                    state.events.log(
                        LogCategory::Traffic,
                        format!("Switching traffic flow: {} -> {}", from, target),
                    );
                    if let Err(e) = state.show_yellow(self.clock().now_ms()) {
                        log::error!("signal transition aborted: {}", e);
                        return false;
                    }
                }
                self.clock().sleep_ms(self.config().yellow_ms).await;
            }
            SwitchPlan::FromAllRed => {}
        }

        {
            let mut state = self.state();
            if !state.is_current(generation) || state.preemptions_pending > 0 {
                return false;
            }
            state.show_all_red(self.clock().now_ms());
        }
        self.clock().sleep_ms(self.config().all_red_ms).await;

        let mut state = self.state();
        if !state.is_active(generation) || state.preemptions_pending > 0 {
            return false;
        }
        match state.show_green(target, self.clock().now_ms()) {
            Ok(()) => {
                state.current_direction = target;
                true
            }
            Err(e) => {
                log::error!("signal transition aborted: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_all_red() {
        let signal = SignalController::new();
        assert_eq!(signal.state(), SignalState::AllRed);
        assert_eq!(signal.state().phases(), [LightState::Red; 4]);
    }

    #[test]
    fn full_switch_sequence() {
        let mut signal = SignalController::new();
        let changes = signal.grant_green(Direction::North).unwrap();
        assert_eq!(changes, vec![(Direction::North, LightState::Green)]);
        assert_eq!(signal.plan_switch(Direction::North), SwitchPlan::Hold);
        assert_eq!(
            signal.plan_switch(Direction::East),
            SwitchPlan::ViaYellow(Direction::North)
        );

        let (from, changes) = signal.show_yellow().unwrap();
        assert_eq!(from, Direction::North);
        assert_eq!(changes, vec![(Direction::North, LightState::Yellow)]);

        let changes = signal.force_all_red();
        assert_eq!(changes, vec![(Direction::North, LightState::Red)]);

        signal.grant_green(Direction::East).unwrap();
        assert_eq!(signal.phase_of(Direction::East), LightState::Green);
        assert_eq!(signal.phase_of(Direction::North), LightState::Red);
        assert_eq!(signal.greens_granted(), 2);
    }

    #[test]
    fn green_requires_all_red() {
        let mut signal = SignalController::new();
        signal.grant_green(Direction::South).unwrap();
        let err = signal.grant_green(Direction::West).unwrap_err();
        assert_eq!(
            err,
            SignalError::NotAllRed {
                requested: Direction::West,
                current: "SOUTH GREEN".to_string(),
            }
        );
        signal.show_yellow().unwrap();
        assert!(signal.grant_green(Direction::West).is_err());
        assert_eq!(signal.state(), SignalState::Yellow(Direction::South));
    }

    #[test]
    fn yellow_requires_green() {
        let mut signal = SignalController::new();
        assert!(matches!(
            signal.show_yellow(),
            Err(SignalError::NothingGreen(_))
        ));
    }

    #[test]
    fn forcing_all_red_twice_reports_nothing() {
        let mut signal = SignalController::new();
        signal.grant_green(Direction::West).unwrap();
        assert_eq!(signal.force_all_red().len(), 1);
        assert!(signal.force_all_red().is_empty());
    }

    #[test]
    fn never_more_than_one_green() {
        for state in [
            SignalState::AllRed,
            SignalState::Yellow(Direction::East),
            SignalState::Green(Direction::West),
        ] {
            let greens = state
                .phases()
                .iter()
                .filter(|p| **p == LightState::Green)
                .count();
            assert!(greens <= 1);
        }
    }
}

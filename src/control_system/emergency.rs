use crate::communication::{LogCategory, SimEvent};
use crate::error::ControlError;
use crate::simulation_engine::simulation::Simulation;
use crate::simulation_engine::vehicle_generator::draw_direction;
use crate::simulation_engine::vehicles::{Direction, EmergencyKind, Vehicle, VehicleClass, VehicleId};

impl Simulation {
    /// Puts an emergency vehicle at the head of a lane and starts preemption.
    /// A random lane is chosen when `direction` is `None`.
    pub fn dispatch_emergency(&self, kind: EmergencyKind, direction: Option<Direction>) -> VehicleId {
        let now = self.clock().now_ms();
        let (id, direction) = {
            let mut state = self.state();
            let direction = direction.unwrap_or_else(|| draw_direction(&mut state.rng));
            let id = state.next_vehicle_id();
            let vehicle = Vehicle::new(id, VehicleClass::Emergency(kind), direction, now);
            state.admit(vehicle, true);
            state.events.log(
                LogCategory::Emergency,
                format!("{} dispatched to {} lane - Emergency protocol activated", kind, direction),
            );
            (id, direction)
        };
        self.trigger_emergency(direction, id);
        id
    }

    /// Text front-end for `dispatch_emergency`. Unknown kinds are logged and
    /// rejected without creating a vehicle.
    pub fn dispatch_emergency_named(
        &self,
        kind: &str,
        direction: Option<Direction>,
    ) -> Result<VehicleId, ControlError> {
        match kind.parse::<EmergencyKind>() {
            Ok(kind) => Ok(self.dispatch_emergency(kind, direction)),
            Err(e) => {
                log::warn!("ignoring emergency dispatch: {}", e);
                self.state()
                    .events
                    .log(LogCategory::Info, format!("Unknown emergency type: {}", kind));
                Err(e)
            }
        }
    }

    /// Raises emergency mode, preempts the cycle when running, and arms the
    /// auto-clear timer.
    ///
    /// The timer clears emergency mode after a fixed delay whether or not the
    /// emergency vehicle has been drained by then, and a later emergency does not
    /// extend an earlier timer.
    pub(crate) fn trigger_emergency(&self, direction: Direction, vehicle: VehicleId) {
        let (running, generation) = {
            let mut state = self.state();
            state.emergency_mode = true;
            state.events.emit(SimEvent::EmergencyTriggered { direction, vehicle });
            if state.running {
                state.preemptions_pending += 1;
            }
            (state.running, state.generation)
        };

        if running {
            tokio::spawn(self.clone().preempt(direction, generation));
        }

        let sim = self.clone();
        tokio::spawn(async move {
            sim.clock().sleep_ms(sim.config().emergency_timeout_ms).await;
            let mut state = sim.state();
            if state.is_current(generation) && state.emergency_mode {
                state.emergency_mode = false;
                state.events.emit(SimEvent::EmergencyCleared);
                state
                    .events
                    .log(LogCategory::Emergency, "Emergency mode cleared");
            }
        });
    }

    async fn preempt(self, direction: Direction, generation: u64) {
        self.run_preemption(direction, generation).await;
        let mut state = self.state();
        if state.is_current(generation) {
            state.preemptions_pending = state.preemptions_pending.saturating_sub(1);
        }
    }

    /// All-red, then a green corridor for `direction`, then an uncapped drain.
    ///
    /// Waits for the right-of-way token, so a cycle drain already under way
    /// finishes first. A cycle that is only switching lights does not hold the
    /// token and gives way as soon as it sees the pending preemption.
    async fn run_preemption(&self, direction: Direction, generation: u64) {
        let _right_of_way = self.acquire_right_of_way().await;
        {
            let mut state = self.state();
            if !state.is_active(generation) {
                return;
            }
            state.current_direction = direction;
            state.show_all_red(self.clock().now_ms());
            state.events.log(
                LogCategory::Emergency,
                format!("Emergency protocol: All lights RED. Clearing {} lane...", direction),
            );
        }

        self.clock().sleep_ms(self.config().emergency_all_red_ms).await;
        {
            let mut state = self.state();
            if !state.is_active(generation) {
                return;
            }
            if let Err(e) = state.show_green(direction, self.clock().now_ms()) {
                log::error!("emergency corridor aborted: {}", e);
                return;
            }
            state.events.log(
                LogCategory::Emergency,
                format!("{} lane cleared for emergency vehicle", direction),
            );
        }

        self.clock().sleep_ms(self.config().emergency_green_lead_ms).await;
        let still_active = self.state().is_active(generation);
        if still_active {
            self.process_cars(direction, true, generation).await;
        }
    }
}

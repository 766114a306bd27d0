use std::str::FromStr;

use crate::communication::LogCategory;
use crate::error::ControlError;
use crate::simulation_engine::simulation::Simulation;
use crate::simulation_engine::vehicles::EmergencyKind;
use crate::simulation_engine::weather::WeatherCondition;

pub const HELP_TEXT: &str =
    "Available commands: status, emergency, reset, stats, weather [clear/rain/fog/storm], help";
pub const STATUS_TEXT: &str = "System operational. All subsystems nominal.";

/// One operator console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    /// `emergency` alone dispatches an ambulance.
    Emergency(EmergencyKind),
    Reset,
    Stats,
    Weather(WeatherCondition),
    Help,
}

impl FromStr for Command {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        let words: Vec<&str> = text.split_whitespace().collect();
        let unknown = || ControlError::UnknownCommand(s.trim().to_string());
        match words.as_slice() {
            ["status"] => Ok(Command::Status),
            ["emergency"] => Ok(Command::Emergency(EmergencyKind::Ambulance)),
            ["emergency", kind] => kind.parse().map(Command::Emergency).map_err(|_| unknown()),
            ["reset"] => Ok(Command::Reset),
            ["stats"] => Ok(Command::Stats),
            ["weather", condition] => condition
                .parse()
                .map(Command::Weather)
                .map_err(|_| unknown()),
            ["help"] => Ok(Command::Help),
            _ => Err(unknown()),
        }
    }
}

impl Simulation {
    /// Runs one console command and returns the operator-facing reply.
    ///
    /// Every input, valid or not, is recorded in the command history.
    pub fn run_command(&self, text: &str) -> String {
        {
            let mut state = self.state();
            state.command_history.push(text.to_string());
            state
                .events
                .log(LogCategory::System, format!("Command executed: {}", text));
        }

        let command = match text.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                log::debug!("{}", e);
                return self.reply(format!("Unknown command: {}", text));
            }
        };

        match command {
            Command::Status => self.reply(STATUS_TEXT.to_string()),
            Command::Emergency(kind) => {
                let id = self.dispatch_emergency(kind, None);
                format!("{} dispatched as vehicle {}", kind, id)
            }
            Command::Reset => {
                self.reset();
                "System reset completed. All subsystems reinitialized.".to_string()
            }
            Command::Stats => {
                let metrics = self.snapshot().metrics;
                self.reply(format!(
                    "Vehicles: {}, Efficiency: {:.0}%, Throughput: {}/min",
                    metrics.total_vehicles, metrics.efficiency, metrics.throughput
                ))
            }
            Command::Weather(weather) => {
                self.set_weather(weather);
                format!("Weather conditions changed to {}.", weather)
            }
            Command::Help => self.reply(HELP_TEXT.to_string()),
        }
    }

    fn reply(&self, response: String) -> String {
        self.state().events.log(LogCategory::Info, response.clone());
        response
    }
}

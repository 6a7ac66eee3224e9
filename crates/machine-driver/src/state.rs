use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-reported machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    /// Machine is being created or booted.
    Starting,
    Running,
    Stopped,
    /// Instance is frozen/archived on the provider side.
    Saved,
    Unknown,
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MachineState::Starting => "starting",
            MachineState::Running => "running",
            MachineState::Stopped => "stopped",
            MachineState::Saved => "saved",
            MachineState::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrewMode {
    Espresso,
    Steam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn from_switch(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// Authoritative snapshot returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub current_temp: Option<f64>,
    pub setpoint: Option<f64>,
    pub mode: BrewMode,
    pub power: bool,
    pub pwm_val: f64,
    pub alarm_time: Option<String>,
    #[serde(default)]
    pub on_interval: bool,
}

impl DeviceState {
    /// The `(temp, setpoint)` pair to plot, if this snapshot came from an
    /// interval poll and both values were measured.
    pub fn chart_sample(&self) -> Option<(f64, f64)> {
        if !self.on_interval {
            return None;
        }
        Some((self.current_temp?, self.setpoint?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidTunings {
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "I")]
    pub i: f64,
    #[serde(rename = "D")]
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeTemps {
    pub espresso: f64,
    pub steam: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingsState {
    #[serde(rename = "PID", alias = "pid")]
    pub pid: PidTunings,
    pub mode_temps: ModeTemps,
}

/// Rolling history kept by the device; `null` marks slots with no reading yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub temp_history: Vec<Option<f64>>,
    #[serde(default)]
    pub setpoint_history: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusQuery {
    pub interval: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerCommand {
    pub power: PowerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeCommand {
    pub mode: BrewMode,
}

/// Schedule request. Both fields `null` cancels the alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRequest {
    pub current_time: Option<String>,
    pub alarm_time: Option<String>,
}

impl AlarmRequest {
    pub fn cancel() -> Self {
        Self {
            current_time: None,
            alarm_time: None,
        }
    }
}

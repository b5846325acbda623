use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{BrewMode, DeviceState};

pub const PLACEHOLDER: &str = "--";

/// Controls the user can operate directly; the poll must not fight them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    PowerSwitch,
    ModeSwitch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusSet(BTreeSet<FieldId>);

impl FocusSet {
    pub fn set(&mut self, field: FieldId, focused: bool) {
        if focused {
            self.0.insert(field);
        } else {
            self.0.remove(&field);
        }
    }

    pub fn is_focused(&self, field: FieldId) -> bool {
        self.0.contains(&field)
    }
}

/// What the page shows for the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceView {
    #[serde(rename = "currentTemp")]
    pub current_temp: String,
    pub setpoint: String,
    pub pwm: String,
    pub alarm: String,
    #[serde(rename = "powerSwitch")]
    pub power_switch: bool,
    #[serde(rename = "modeSwitch")]
    pub mode_switch: BrewMode,
    #[serde(rename = "modeSwitchEnabled")]
    pub mode_switch_enabled: bool,
}

impl Default for DeviceView {
    fn default() -> Self {
        Self {
            current_temp: PLACEHOLDER.to_string(),
            setpoint: PLACEHOLDER.to_string(),
            pwm: PLACEHOLDER.to_string(),
            alarm: PLACEHOLDER.to_string(),
            power_switch: false,
            mode_switch: BrewMode::Espresso,
            mode_switch_enabled: false,
        }
    }
}

impl DeviceView {
    /// Local power flip, shown before the device confirms it.
    pub fn set_power_switch(&mut self, on: bool) {
        self.power_switch = on;
        self.mode_switch_enabled = on;
    }

    pub fn set_alarm(&mut self, alarm: Option<&str>) {
        self.alarm = alarm.unwrap_or(PLACEHOLDER).to_string();
    }
}

/// Merges a fresh snapshot into `previous`. Focused controls keep their
/// current value for this round.
pub fn reconcile(previous: &DeviceView, snapshot: &DeviceState, focus: &FocusSet) -> DeviceView {
    let power_switch = if focus.is_focused(FieldId::PowerSwitch) {
        previous.power_switch
    } else {
        snapshot.power
    };

    let mode_switch = if focus.is_focused(FieldId::ModeSwitch) {
        previous.mode_switch
    } else {
        snapshot.mode
    };

    DeviceView {
        current_temp: format_reading(snapshot.current_temp, 1),
        setpoint: format_reading(snapshot.setpoint, 1),
        pwm: format!("{:.2}", snapshot.pwm_val),
        alarm: snapshot
            .alarm_time
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        power_switch,
        mode_switch,
        mode_switch_enabled: power_switch,
    }
}

fn format_reading(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => PLACEHOLDER.to_string(),
    }
}

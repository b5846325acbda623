pub const ENDPOINT_STATUS: &str = "/status";
pub const ENDPOINT_POWER: &str = "/power";
pub const ENDPOINT_MODE: &str = "/mode";
pub const ENDPOINT_SETTINGS: &str = "/settings";
pub const ENDPOINT_SAVE_SETTINGS: &str = "/save_settings";
pub const ENDPOINT_HISTORY: &str = "/history";
pub const ENDPOINT_SCHEDULE_ALARM: &str = "/schedule_alarm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Status,
    Power,
    Mode,
    Settings,
    SaveSettings,
    History,
    ScheduleAlarm,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Status => ENDPOINT_STATUS,
            Self::Power => ENDPOINT_POWER,
            Self::Mode => ENDPOINT_MODE,
            Self::Settings => ENDPOINT_SETTINGS,
            Self::SaveSettings => ENDPOINT_SAVE_SETTINGS,
            Self::History => ENDPOINT_HISTORY,
            Self::ScheduleAlarm => ENDPOINT_SCHEDULE_ALARM,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

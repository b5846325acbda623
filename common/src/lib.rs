pub mod alarm;
pub mod chart;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod settings;
pub mod types;
pub mod view;

pub use chart::ChartWindow;
pub use config::PanelConfig;
pub use endpoints::*;
pub use error::ValidationError;
pub use settings::SettingsForm;
pub use types::{
    AlarmRequest, BrewMode, DeviceState, HistoryRecord, ModeCommand, ModeTemps, PidTunings,
    PowerCommand, PowerState, SettingsState, StatusQuery,
};
pub use view::{reconcile, DeviceView, FieldId, FocusSet, PLACEHOLDER};

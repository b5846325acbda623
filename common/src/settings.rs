use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    types::{ModeTemps, PidTunings, SettingsState},
};

/// Raw text of the settings dialog fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub p: String,
    pub i: String,
    pub d: String,
    pub espresso: String,
    pub steam: String,
}

impl SettingsForm {
    pub fn from_settings(settings: &SettingsState) -> Self {
        Self {
            p: settings.pid.p.to_string(),
            i: settings.pid.i.to_string(),
            d: settings.pid.d.to_string(),
            espresso: settings.mode_temps.espresso.to_string(),
            steam: settings.mode_temps.steam.to_string(),
        }
    }

    /// Parses every field; the first non-numeric one rejects the whole form.
    pub fn parse(&self) -> Result<SettingsState, ValidationError> {
        Ok(SettingsState {
            pid: PidTunings {
                p: parse_number("P", &self.p)?,
                i: parse_number("I", &self.i)?,
                d: parse_number("D", &self.d)?,
            },
            mode_temps: ModeTemps {
                espresso: parse_number("Espresso temperature", &self.espresso)?,
                steam: parse_number("Steam temperature", &self.steam)?,
            },
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form() -> SettingsForm {
        SettingsForm {
            p: "12.5".to_string(),
            i: " 0.1 ".to_string(),
            d: "3".to_string(),
            espresso: "94".to_string(),
            steam: "140".to_string(),
        }
    }

    #[test]
    fn parses_complete_form() {
        let settings = form().parse().unwrap();

        assert_eq!(
            settings,
            SettingsState {
                pid: PidTunings {
                    p: 12.5,
                    i: 0.1,
                    d: 3.0,
                },
                mode_temps: ModeTemps {
                    espresso: 94.0,
                    steam: 140.0,
                },
            }
        );
    }

    #[test]
    fn rejects_non_numeric_field() {
        let mut bad = form();
        bad.steam = "hot".to_string();

        assert_eq!(
            bad.parse(),
            Err(ValidationError::NotANumber {
                field: "Steam temperature",
                value: "hot".to_string(),
            })
        );

        let mut blank = form();
        blank.i = String::new();
        assert!(blank.parse().is_err());

        let mut infinite = form();
        infinite.p = "inf".to_string();
        assert!(infinite.parse().is_err());
    }

    #[test]
    fn seeded_form_round_trips_settings() {
        let settings = form().parse().unwrap();
        assert_eq!(SettingsForm::from_settings(&settings).parse().unwrap(), settings);
    }
}

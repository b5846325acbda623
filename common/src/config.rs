use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub device_url: String,
    pub http_port: u16,
    pub poll_interval_ms: u64,
    pub chart_lookback_min: f64,
    /// IANA zone used for the alarm clock token; host local time when unset.
    pub timezone: Option<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            device_url: "http://192.168.1.50".to_string(),
            http_port: 8080,
            poll_interval_ms: 1_000,
            chart_lookback_min: 10.0,
            timezone: None,
        }
    }
}

impl PanelConfig {
    pub fn sanitize(&mut self) {
        self.poll_interval_ms = self.poll_interval_ms.clamp(100, 60_000);

        if !self.chart_lookback_min.is_finite() || self.chart_lookback_min <= 0.0 {
            self.chart_lookback_min = 10.0;
        }

        let trimmed = self.device_url.trim().trim_end_matches('/');
        self.device_url = if trimmed.is_empty() {
            Self::default().device_url
        } else {
            trimmed.to_string()
        };

        if self.http_port == 0 {
            self.http_port = 8080;
        }

        if let Some(zone) = &self.timezone {
            if zone.parse::<chrono_tz::Tz>().is_err() {
                self.timezone = None;
            }
        }
    }
}

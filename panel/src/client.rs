use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use silvia_common::{
    AlarmRequest, BrewMode, DeviceState, Endpoint, HistoryRecord, ModeCommand, PowerCommand,
    PowerState, SettingsState, StatusQuery,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },
    #[error("malformed {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode {endpoint} payload: {source}")]
    Encode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Encode { endpoint, .. } => *endpoint,
        }
    }
}

/// One request, one structured response. No retries, no timeout.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    async fn send(&self, endpoint: Endpoint, payload: Option<Value>) -> Result<Value, ClientError>;
}

#[derive(Clone)]
pub struct HttpDeviceClient {
    base_url: String,
    client: Client,
}

impl HttpDeviceClient {
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl DeviceClient for HttpDeviceClient {
    async fn send(&self, endpoint: Endpoint, payload: Option<Value>) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!("POST {url} {payload:?}");

        let mut request = self.client.post(&url);
        if let Some(body) = &payload {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { endpoint, source })
    }
}

async fn call<T: DeserializeOwned>(
    client: &dyn DeviceClient,
    endpoint: Endpoint,
    payload: Option<impl Serialize>,
) -> Result<T, ClientError> {
    let payload = payload
        .map(serde_json::to_value)
        .transpose()
        .map_err(|source| ClientError::Encode { endpoint, source })?;
    let value = client.send(endpoint, payload).await?;
    serde_json::from_value(value).map_err(|source| ClientError::Decode { endpoint, source })
}

pub async fn query_status(
    client: &dyn DeviceClient,
    interval: bool,
) -> Result<DeviceState, ClientError> {
    call(client, Endpoint::Status, Some(StatusQuery { interval })).await
}

pub async fn send_power(client: &dyn DeviceClient, on: bool) -> Result<Value, ClientError> {
    let command = PowerCommand {
        power: PowerState::from_switch(on),
    };
    call(client, Endpoint::Power, Some(command)).await
}

pub async fn send_mode(client: &dyn DeviceClient, mode: BrewMode) -> Result<Value, ClientError> {
    call(client, Endpoint::Mode, Some(ModeCommand { mode })).await
}

pub async fn fetch_settings(client: &dyn DeviceClient) -> Result<SettingsState, ClientError> {
    call(client, Endpoint::Settings, None::<()>).await
}

pub async fn save_settings(
    client: &dyn DeviceClient,
    settings: &SettingsState,
) -> Result<Value, ClientError> {
    call(client, Endpoint::SaveSettings, Some(settings)).await
}

pub async fn fetch_history(client: &dyn DeviceClient) -> Result<HistoryRecord, ClientError> {
    call(client, Endpoint::History, None::<()>).await
}

pub async fn schedule_alarm(
    client: &dyn DeviceClient,
    request: &AlarmRequest,
) -> Result<Value, ClientError> {
    call(client, Endpoint::ScheduleAlarm, Some(request)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn status_query_posts_interval_flag() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/status")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"interval": true})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "power": true,
                    "current_temp": 92.4,
                    "setpoint": null,
                    "mode": "steam",
                    "on_interval": true,
                    "pwm_val": 12.5,
                    "alarm_time": "06:45"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = HttpDeviceClient::new(server.url()).unwrap();
        let state = query_status(&client, true).await.unwrap();

        assert_eq!(state.current_temp, Some(92.4));
        assert_eq!(state.setpoint, None);
        assert_eq!(state.mode, BrewMode::Steam);
        assert_eq!(state.alarm_time.as_deref(), Some("06:45"));
        assert!(state.on_interval);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn settings_fetch_sends_no_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/settings")
            .match_body("")
            .with_status(200)
            .with_body(
                json!({
                    "mode_temps": {"espresso": 94.0, "steam": 140.0},
                    "PID": {"P": 10.0, "I": 0.2, "D": 1.5}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = HttpDeviceClient::new(server.url()).unwrap();
        let settings = fetch_settings(&client).await.unwrap();

        assert_eq!(settings.pid.i, 0.2);
        assert_eq!(settings.mode_temps.steam, 140.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn power_command_uses_payload_convention() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/power")
            .match_body(Matcher::Json(json!({"power": "off"})))
            .with_status(200)
            .with_body("\"Power set off\"")
            .create_async()
            .await;

        let client = HttpDeviceClient::new(server.url()).unwrap();
        let ack = send_power(&client, false).await.unwrap();

        assert_eq!(ack, json!("Power set off"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_a_failure_with_endpoint() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/history")
            .with_status(500)
            .create_async()
            .await;

        let client = HttpDeviceClient::new(server.url()).unwrap();
        let err = fetch_history(&client).await.unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 500, .. }));
        assert_eq!(err.endpoint(), Endpoint::History);
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/status")
            .with_status(200)
            .with_body("<html>busy</html>")
            .create_async()
            .await;

        let client = HttpDeviceClient::new(server.url()).unwrap();
        let err = query_status(&client, false).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Decode {
                endpoint: Endpoint::Status,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_device_is_a_transport_failure() {
        let client = HttpDeviceClient::new("http://127.0.0.1:1").unwrap();
        let err = send_mode(&client, BrewMode::Espresso).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Transport {
                endpoint: Endpoint::Mode,
                ..
            }
        ));
    }
}

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{sync::Mutex, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use silvia_common::{
    alarm, reconcile, AlarmRequest, BrewMode, ChartWindow, DeviceState, DeviceView, FieldId,
    FocusSet, PanelConfig, SettingsForm, SettingsState, ValidationError,
};

use crate::client::{self, DeviceClient};

/// Closed set of things a user can do on the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum UserIntent {
    PowerToggled { on: bool },
    ModeToggled { mode: BrewMode },
    SettingsOpened,
    SettingsCommitted { form: SettingsForm },
    SettingsCancelled,
    AlarmScheduled { time: String },
    AlarmCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Stopped,
    Live,
    Editing,
}

enum Session {
    Stopped,
    Live(CancellationToken),
    /// `id` tells one editing session from the next, so late responses
    /// belonging to a closed session can be dropped.
    Editing { id: u64, form: SettingsForm },
}

impl Session {
    fn mode(&self) -> SessionMode {
        match self {
            Self::Stopped => SessionMode::Stopped,
            Self::Live(_) => SessionMode::Live,
            Self::Editing { .. } => SessionMode::Editing,
        }
    }

    fn is_editing(&self, session_id: u64) -> bool {
        matches!(self, Self::Editing { id, .. } if *id == session_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub session: SessionMode,
    pub device: DeviceView,
    #[serde(rename = "settingsForm")]
    pub settings_form: Option<SettingsForm>,
    pub notice: Option<String>,
}

struct PanelState {
    session: Session,
    view: DeviceView,
    focus: FocusSet,
    chart: ChartWindow,
    last_status: Option<DeviceState>,
    settings: Option<SettingsState>,
    notice: Option<String>,
    next_edit_id: u64,
}

impl PanelState {
    fn apply_status(&mut self, snapshot: DeviceState) {
        self.view = reconcile(&self.view, &snapshot, &self.focus);
        if let Some((temp, setpoint)) = snapshot.chart_sample() {
            self.chart.push(temp, setpoint);
        }
        self.last_status = Some(snapshot);
    }

    fn keep_form(&mut self, session_id: u64, form: SettingsForm) {
        if let Session::Editing { id, form: current } = &mut self.session {
            if *id == session_id {
                *current = form;
            }
        }
    }
}

/// Keeps the displayed view in step with the device and routes user intent
/// back to it.
#[derive(Clone)]
pub struct Panel {
    client: Arc<dyn DeviceClient>,
    state: Arc<Mutex<PanelState>>,
    poll_period: Duration,
    chart_lookback_min: f64,
    timezone: Option<String>,
}

impl Panel {
    pub fn new(client: Arc<dyn DeviceClient>, config: &PanelConfig) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(PanelState {
                session: Session::Stopped,
                view: DeviceView::default(),
                focus: FocusSet::default(),
                chart: ChartWindow::default(),
                last_status: None,
                settings: None,
                notice: None,
                next_edit_id: 0,
            })),
            poll_period: Duration::from_millis(config.poll_interval_ms),
            chart_lookback_min: config.chart_lookback_min,
            timezone: config.timezone.clone(),
        }
    }

    /// Seeds the chart and settings, then enters the live view.
    pub async fn start(&self) {
        match client::fetch_history(self.client.as_ref()).await {
            Ok(history) => {
                let chart = ChartWindow::seed(&history, self.chart_lookback_min);
                info!("chart seeded with {} points", chart.capacity());
                self.state.lock().await.chart = chart;
            }
            Err(err) => warn!("history fetch failed, chart starts empty: {err}"),
        }

        match client::fetch_settings(self.client.as_ref()).await {
            Ok(settings) => self.state.lock().await.settings = Some(settings),
            Err(err) => warn!("settings fetch failed: {err}"),
        }

        let mut state = self.state.lock().await;
        if let Session::Stopped = state.session {
            self.go_live(&mut state);
        }
    }

    /// Page teardown: stops the poll timer. Later intents are ignored.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if let Session::Live(token) = &state.session {
            token.cancel();
        }
        state.session = Session::Stopped;
        info!("panel stopped");
    }

    pub async fn set_focus(&self, field: FieldId, focused: bool) {
        self.state.lock().await.focus.set(field, focused);
    }

    pub async fn snapshot(&self) -> PanelSnapshot {
        let state = self.state.lock().await;
        PanelSnapshot {
            session: state.session.mode(),
            device: state.view.clone(),
            settings_form: match &state.session {
                Session::Editing { form, .. } => Some(form.clone()),
                _ => None,
            },
            notice: state.notice.clone(),
        }
    }

    pub async fn chart(&self) -> ChartWindow {
        self.state.lock().await.chart.clone()
    }

    pub async fn last_status(&self) -> Option<DeviceState> {
        self.state.lock().await.last_status.clone()
    }

    /// Routes one user intent. Only local validation failures are returned;
    /// device failures are logged and left for the next poll to correct.
    pub async fn dispatch(&self, intent: UserIntent) -> Result<(), ValidationError> {
        if self.state.lock().await.session.mode() == SessionMode::Stopped {
            debug!("ignoring {intent:?} while stopped");
            return Ok(());
        }

        match intent {
            UserIntent::PowerToggled { on } => {
                self.toggle_power(on).await;
                Ok(())
            }
            UserIntent::ModeToggled { mode } => {
                self.toggle_mode(mode).await;
                Ok(())
            }
            UserIntent::SettingsOpened => {
                self.open_settings().await;
                Ok(())
            }
            UserIntent::SettingsCommitted { form } => self.commit_settings(form).await,
            UserIntent::SettingsCancelled => {
                self.cancel_settings().await;
                Ok(())
            }
            UserIntent::AlarmScheduled { time } => self.schedule_alarm(&time).await,
            UserIntent::AlarmCancelled => {
                self.cancel_alarm().await;
                Ok(())
            }
        }
    }

    async fn toggle_power(&self, on: bool) {
        self.state.lock().await.view.set_power_switch(on);

        if let Err(err) = client::send_power(self.client.as_ref(), on).await {
            warn!("power command failed: {err}");
        }
        self.refresh().await;
    }

    async fn toggle_mode(&self, mode: BrewMode) {
        {
            let mut state = self.state.lock().await;
            if !state.view.mode_switch_enabled {
                info!("mode switch ignored while power is off");
                return;
            }
            state.view.mode_switch = mode;
        }

        if let Err(err) = client::send_mode(self.client.as_ref(), mode).await {
            warn!("mode command failed: {err}");
        }
        self.refresh().await;
    }

    /// Out-of-band status query; never feeds the chart.
    async fn refresh(&self) {
        match client::query_status(self.client.as_ref(), false).await {
            Ok(snapshot) => {
                let mut state = self.state.lock().await;
                if state.session.mode() != SessionMode::Stopped {
                    state.apply_status(snapshot);
                }
            }
            Err(err) => warn!("status refresh failed: {err}"),
        }
    }

    async fn open_settings(&self) {
        let session_id = {
            let mut state = self.state.lock().await;
            match &state.session {
                Session::Live(token) => token.cancel(),
                Session::Editing { .. } | Session::Stopped => return,
            }
            let form = state
                .settings
                .as_ref()
                .map(SettingsForm::from_settings)
                .unwrap_or_default();
            let id = state.next_edit_id;
            state.next_edit_id += 1;
            state.session = Session::Editing { id, form };
            state.notice = None;
            id
        };
        info!("settings session {session_id} opened, polling suspended");

        match client::fetch_settings(self.client.as_ref()).await {
            Ok(settings) => {
                let mut state = self.state.lock().await;
                if !state.session.is_editing(session_id) {
                    debug!("dropping settings fetched for closed session {session_id}");
                    return;
                }
                state.keep_form(session_id, SettingsForm::from_settings(&settings));
                state.settings = Some(settings);
            }
            Err(err) => warn!("settings fetch failed, editing last known values: {err}"),
        }
    }

    async fn commit_settings(&self, form: SettingsForm) -> Result<(), ValidationError> {
        let session_id = match &self.state.lock().await.session {
            Session::Editing { id, .. } => *id,
            _ => {
                debug!("settings commit outside an editing session ignored");
                return Ok(());
            }
        };

        let settings = match form.parse() {
            Ok(settings) => settings,
            Err(err) => {
                info!("settings rejected: {err}");
                let mut state = self.state.lock().await;
                state.notice = Some(err.to_string());
                state.keep_form(session_id, form);
                return Err(err);
            }
        };

        let outcome = client::save_settings(self.client.as_ref(), &settings).await;

        let mut state = self.state.lock().await;
        if !state.session.is_editing(session_id) {
            debug!("dropping settings ack for closed session {session_id}: {outcome:?}");
            return Ok(());
        }
        match outcome {
            Ok(ack) if is_rejection(&ack) => {
                warn!("device rejected settings: {ack}");
                state.notice = Some(format!("Device rejected settings: {ack}"));
                state.keep_form(session_id, form);
            }
            Ok(_) => {
                state.settings = Some(settings);
                state.notice = None;
                info!("settings saved, resuming live view");
                self.go_live(&mut state);
            }
            Err(err) => {
                warn!("settings save failed: {err}");
                state.notice = Some(format!("Could not save settings: {err}"));
                state.keep_form(session_id, form);
            }
        }
        Ok(())
    }

    async fn cancel_settings(&self) {
        let mut state = self.state.lock().await;
        if state.session.mode() == SessionMode::Editing {
            state.notice = None;
            info!("settings discarded, resuming live view");
            self.go_live(&mut state);
        }
    }

    async fn schedule_alarm(&self, time: &str) -> Result<(), ValidationError> {
        let now = alarm::wall_clock(self.timezone.as_deref());
        let request = match alarm::schedule_request(time, &now) {
            Ok(request) => request,
            Err(err) => {
                info!("alarm rejected: {err}");
                self.state.lock().await.notice = Some(err.to_string());
                return Err(err);
            }
        };

        match client::schedule_alarm(self.client.as_ref(), &request).await {
            Ok(_) => {
                let mut state = self.state.lock().await;
                state.view.set_alarm(request.alarm_time.as_deref());
                state.notice = None;
            }
            Err(err) => warn!("alarm schedule failed: {err}"),
        }
        Ok(())
    }

    async fn cancel_alarm(&self) {
        match client::schedule_alarm(self.client.as_ref(), &AlarmRequest::cancel()).await {
            Ok(_) => self.state.lock().await.view.set_alarm(None),
            Err(err) => warn!("alarm cancel failed: {err}"),
        }
    }

    fn go_live(&self, state: &mut PanelState) {
        let token = CancellationToken::new();
        state.session = Session::Live(token.clone());
        tokio::spawn(self.clone().run_poll_timer(token));
    }

    async fn run_poll_timer(self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("poll timer started ({:?})", self.poll_period);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    // Each tick owns its request; a stalled one never holds up the next.
                    tokio::spawn(self.clone().poll_once(token.clone()));
                }
            }
        }
        debug!("poll timer stopped");
    }

    async fn poll_once(self, token: CancellationToken) {
        match client::query_status(self.client.as_ref(), true).await {
            Ok(snapshot) => {
                let mut state = self.state.lock().await;
                if token.is_cancelled() {
                    debug!("dropping poll response that resolved after the live view ended");
                    return;
                }
                state.apply_status(snapshot);
            }
            Err(err) => warn!(endpoint = %err.endpoint(), "status poll failed: {err}"),
        }
    }
}

fn is_rejection(ack: &Value) -> bool {
    ack.as_str()
        .map(|message| message.starts_with("Failed"))
        .unwrap_or(false)
}

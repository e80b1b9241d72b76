//! Host runtime: one input at a time through decode, reduce, dispatch, save.

use crate::actions::{Action, UiAction};
use crate::config::{PanelConfig, ReconcileSettings};
use crate::dispatch::{Dispatcher, HostChannel, JsonLinesChannel};
use crate::error::PanelError;
use crate::persistence::{FileStore, KeyValueStore, PersistenceBridge};
use crate::state::PanelState;
use crate::telemetry::init_tracing;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;

/// One line from the host, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    /// Backend envelope text, decoded by the runtime.
    Envelope(String),
    Ui(UiAction),
}

/// Classify a host line. Objects with an `action` key are UI actions;
/// everything else is handed to the envelope decoder.
///
/// Blank lines and unreadable UI actions yield `None`.
pub fn parse_host_line(line: &str) -> Option<HostInput> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Some(HostInput::Envelope(line.to_string()));
    };
    if value.get("action").is_none() {
        return Some(HostInput::Envelope(line.to_string()));
    }
    match UiAction::deserialize(value) {
        Ok(action) => Some(HostInput::Ui(action)),
        Err(e) => {
            tracing::debug!(error = %e, "Dropping malformed UI action");
            None
        }
    }
}

pub struct PanelRuntime<C: HostChannel, S: KeyValueStore> {
    state: PanelState,
    settings: ReconcileSettings,
    dispatcher: Dispatcher<C>,
    persistence: PersistenceBridge<S>,
}

impl<C: HostChannel, S: KeyValueStore> PanelRuntime<C, S> {
    /// Build a runtime, restoring the last saved snapshot when there is one.
    pub fn new(settings: ReconcileSettings, channel: C, store: S, snapshot_key: &str) -> Self {
        let mut persistence = PersistenceBridge::new(store, snapshot_key);
        let state = match persistence.restore() {
            Some(snapshot) => {
                tracing::info!(
                    agents = snapshot.agents.len(),
                    messages = snapshot.messages.len(),
                    "Restored panel snapshot"
                );
                PanelState::from_snapshot(snapshot, &settings)
            }
            None => PanelState::new(),
        };
        Self {
            state,
            settings,
            dispatcher: Dispatcher::new(channel),
            persistence,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    pub fn persistence(&self) -> &PersistenceBridge<S> {
        &self.persistence
    }

    pub fn handle(&mut self, input: HostInput) {
        let action = match input {
            HostInput::Envelope(text) => match conclave_events::decode(&text) {
                Ok(event) => Action::Inbound(event),
                Err(e) => {
                    tracing::debug!(error = %e, "Dropping malformed envelope");
                    return;
                }
            },
            HostInput::Ui(action) => Action::Ui(action),
        };
        self.apply(action);
    }

    /// Reduce `action`, dispatch what it produced, and feed send failures
    /// back in before saving.
    pub fn apply(&mut self, action: Action) {
        let mut pending = VecDeque::from([action]);
        while let Some(action) = pending.pop_front() {
            let intents = self.state.reduce(action, &self.settings);
            let failed = self.dispatcher.dispatch(intents);
            pending.extend(
                failed
                    .into_iter()
                    .map(|intent| Action::DispatchFailed(Box::new(intent))),
            );
        }
        self.save();
    }

    fn save(&mut self) {
        let snapshot = self.state.snapshot();
        match self.persistence.save_if_changed(&snapshot) {
            Ok(true) => tracing::trace!("Snapshot saved"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to save snapshot"),
        }
    }
}

/// Drain `rx` until every sender is gone, then hand the runtime back.
pub async fn run<C, S>(
    mut runtime: PanelRuntime<C, S>,
    mut rx: mpsc::Receiver<HostInput>,
) -> PanelRuntime<C, S>
where
    C: HostChannel,
    S: KeyValueStore,
{
    while let Some(input) = rx.recv().await {
        runtime.handle(input);
    }
    tracing::info!("Host input closed");
    runtime
}

/// Read host lines on a dedicated thread and forward them to the runtime.
pub fn spawn_line_reader<R>(reader: R, sender: mpsc::Sender<HostInput>) -> std::thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read host input");
                    break;
                }
            };
            let Some(input) = parse_host_line(&line) else {
                continue;
            };
            if sender.blocking_send(input).is_err() {
                break;
            }
        }
    })
}

/// Load and validate the configuration, then install the subscriber.
pub fn bootstrap() -> Result<PanelConfig, PanelError> {
    let config = PanelConfig::load()?;
    init_tracing(&config.logging)?;
    Ok(config)
}

/// Run the panel over `input` and `output` until input closes or Ctrl-C.
///
/// The state directory is created up front so an unusable one fails the
/// start instead of every later save.
pub async fn serve<R, W>(config: &PanelConfig, input: R, output: W) -> Result<(), PanelError>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    std::fs::create_dir_all(&config.persistence.state_dir)?;
    let runtime = PanelRuntime::new(
        config.reconcile.clone(),
        JsonLinesChannel::new(output),
        FileStore::new(&config.persistence.state_dir),
        &config.persistence.snapshot_key,
    );

    let (input_tx, input_rx) = mpsc::channel(config.channel.inbound_buffer);
    spawn_line_reader(input, input_tx);

    tokio::select! {
        _ = run(runtime, input_rx) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupted");
        }
    }
    Ok(())
}

//! KeyboardEngine: the facade the UI (or the script driver) talks to.
//!
//! It owns the per-session state (held flags, modifier latch, debounce
//! clock) and wires on-screen controls and physical key events to the
//! dispatcher. Each piece of state sits behind its own mutex; none of them is
//! held while another is taken or while the transport is called.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use btkb_core::{ControlId, ControlKind, ControlLayout, KeyLabel};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::connection_guard::{
    ConnectionGuard, DeviceConnectionState, DeviceDirectory, HidTransport, ProfileEvent,
    ProfileHandle, ProfileListener, TransportError,
};
use super::debounce::DEFAULT_DEBOUNCE;
use super::dispatch::{DispatchOutcome, FeedbackCue, KeyDispatcher, KeySender, SharedLatch};
use super::modifier_latch::LatchPolicy;
use super::repeat::{RepeatController, REGULAR_REPEAT_INTERVAL, SPECIAL_REPEAT_INTERVAL};
use super::route_physical::{PhysicalKeyEvent, PhysicalKeyRouter, RouteOutcome};

/// Error type for engine operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no control {0} in the active layout")]
    UnknownControl(ControlId),

    #[error("profile events are already being consumed")]
    PumpAlreadyRunning,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Session parameters for a [`KeyboardEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Name of the bonded host to (re)connect to.
    pub target_device_name: String,
    pub regular_repeat: Duration,
    pub special_repeat: Duration,
    pub debounce: Duration,
    pub latch_policy: LatchPolicy,
}

impl EngineConfig {
    pub fn new(target_device_name: impl Into<String>) -> Self {
        Self {
            target_device_name: target_device_name.into(),
            regular_repeat: REGULAR_REPEAT_INTERVAL,
            special_repeat: SPECIAL_REPEAT_INTERVAL,
            debounce: DEFAULT_DEBOUNCE,
            latch_policy: LatchPolicy::default(),
        }
    }
}

/// The collaborators an engine is built from.
pub struct EnginePorts {
    pub transport: Arc<dyn HidTransport>,
    pub directory: Arc<dyn DeviceDirectory>,
    pub sender: Arc<dyn KeySender>,
    pub feedback: Arc<dyn FeedbackCue>,
}

/// Key-event to HID-report translation engine.
pub struct KeyboardEngine {
    config: EngineConfig,
    layout: ControlLayout,
    transport: Arc<dyn HidTransport>,
    feedback: Arc<dyn FeedbackCue>,
    dispatcher: KeyDispatcher,
    repeat: RepeatController,
    router: PhysicalKeyRouter,
    listener: ProfileListener,
    events: Mutex<Option<mpsc::UnboundedReceiver<ProfileEvent>>>,
}

impl KeyboardEngine {
    pub fn new(config: EngineConfig, layout: ControlLayout, ports: EnginePorts) -> Self {
        let (listener, events) = mpsc::unbounded_channel();
        let guard = Arc::new(ConnectionGuard::new(
            config.target_device_name.clone(),
            Arc::clone(&ports.transport),
            ports.directory,
            listener.clone(),
        ));
        let latch: SharedLatch = Arc::new(Mutex::new(config.latch_policy.build()));
        let dispatcher = KeyDispatcher::new(ports.sender, guard, latch);
        let router = PhysicalKeyRouter::new(dispatcher.clone(), config.debounce);

        Self {
            config,
            layout,
            transport: ports.transport,
            feedback: ports.feedback,
            dispatcher,
            repeat: RepeatController::new(),
            router,
            listener,
            events: Mutex::new(Some(events)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &ControlLayout {
        &self.layout
    }

    pub fn dispatcher(&self) -> &KeyDispatcher {
        &self.dispatcher
    }

    /// Registers the keyboard app with the transport at session start.
    pub fn register(&self) -> Result<ProfileHandle, EngineError> {
        let handle = self.transport.register(self.listener.clone())?;
        info!(target = %self.config.target_device_name, ?handle, "HID device profile registered");
        Ok(handle)
    }

    /// Handles a touch-down on an on-screen control.
    ///
    /// Regular and special controls start repeating and return the loop's
    /// handle. Modifier controls latch once and return `None`.
    pub fn press_control(&self, id: ControlId) -> Result<Option<JoinHandle<()>>, EngineError> {
        let binding = *self.layout.get(id).ok_or(EngineError::UnknownControl(id))?;
        debug!(control = binding.name, "press");

        let interval = match binding.kind {
            ControlKind::Regular => self.config.regular_repeat,
            ControlKind::Special => self.config.special_repeat,
            ControlKind::Modifier => {
                self.repeat.set_held(id, true);
                self.dispatcher.send_label(binding.label);
                self.feedback.click(id);
                return Ok(None);
            }
        };

        let dispatcher = self.dispatcher.clone();
        let feedback = Arc::clone(&self.feedback);
        let label = binding.label;
        let handle = self.repeat.press_start(id, interval, move || {
            if let DispatchOutcome::NotConnected(outcome) = dispatcher.send_label(label) {
                debug!(%label, ?outcome, "tick dropped while disconnected");
            }
            feedback.click(id);
        });
        Ok(Some(handle))
    }

    /// Handles a touch-up on an on-screen control.
    pub fn release_control(&self, id: ControlId) -> Result<(), EngineError> {
        let binding = self.layout.get(id).ok_or(EngineError::UnknownControl(id))?;
        debug!(control = binding.name, "release");
        self.repeat.press_end(id);
        if let KeyLabel::Modifier(m) = binding.label {
            self.dispatcher.release_modifier(m);
        }
        Ok(())
    }

    /// Returns `true` while a control's held flag is set.
    pub fn is_held(&self, id: ControlId) -> bool {
        self.repeat.is_held(id)
    }

    /// Routes a physical key event, timestamped with the runtime clock.
    pub fn handle_physical_key(&self, event: PhysicalKeyEvent) -> RouteOutcome {
        let now = tokio::time::Instant::now().into_std();
        let outcome = self.router.route(event, now);
        debug!(keycode = event.keycode, meta = event.meta.0, ?outcome, "physical key");
        outcome
    }

    /// Reacts to one transport lifecycle notification.
    pub fn handle_profile_event(&self, event: ProfileEvent) {
        match event {
            ProfileEvent::DeviceStateChanged { device, state } => {
                let state_str = match state {
                    DeviceConnectionState::Disconnected => "disconnected",
                    DeviceConnectionState::Connecting => "connecting",
                    DeviceConnectionState::Connected => "connected",
                };
                info!("device {device} {state_str}");
            }
            ProfileEvent::AppUnregistered => {
                info!("HID device profile unregistered");
                if let Err(e) = self.transport.unregister() {
                    warn!("unregister after app-unregistered notice failed: {e}");
                }
            }
            ProfileEvent::ServiceStateChanged { proxy } => {
                info!("HID service state changed: {proxy}");
            }
        }
    }

    /// Consumes profile events for the life of the engine.
    ///
    /// The engine keeps a listener of its own, so the channel never closes
    /// while the engine exists; stop the pump by aborting its task. Only one
    /// pump may run per engine.
    pub async fn run_profile_pump(&self) -> Result<(), EngineError> {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(EngineError::PumpAlreadyRunning)?;

        while let Some(event) = events.recv().await {
            self.handle_profile_event(event);
        }
        Ok(())
    }
}

//! Scripted input for the headless driver.
//!
//! Stands in for the touch screen and the physical keyboard: each script
//! line becomes a control press/release, a physical key event, a pause, a
//! simulated host connect/disconnect, or a dropped profile registration.

pub mod script;

use std::collections::HashMap;

use btkb_core::ControlId;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::application::connection_guard::BondedDevice;
use crate::application::route_physical::PhysicalKeyEvent;
use crate::infrastructure::transport::LoggingTransport;
use crate::KeyboardEngine;

pub use script::{Script, ScriptCommand, ScriptError, ScriptLine};

/// Plays a [`Script`] against an engine.
pub struct ScriptRunner<'a> {
    engine: &'a KeyboardEngine,
    transport: &'a LoggingTransport,
    host: BondedDevice,
    loops: HashMap<ControlId, JoinHandle<()>>,
}

impl<'a> ScriptRunner<'a> {
    /// `host` is the device that `connect` lines pretend connected.
    pub fn new(engine: &'a KeyboardEngine, transport: &'a LoggingTransport, host: BondedDevice) -> Self {
        Self {
            engine,
            transport,
            host,
            loops: HashMap::new(),
        }
    }

    /// Runs every line in order, then releases anything still held.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownControl`] for a control name the active
    /// layout does not have. Lines before it have already run.
    pub async fn run(mut self, script: &Script) -> Result<(), ScriptError> {
        for line in &script.lines {
            self.step(line).await?;
        }
        for (id, handle) in self.loops.drain() {
            if self.engine.is_held(id) {
                let _ = self.engine.release_control(id);
            }
            let _ = handle.await;
        }
        info!("script finished");
        Ok(())
    }

    async fn step(&mut self, line: &ScriptLine) -> Result<(), ScriptError> {
        debug!(line = line.line, command = ?line.command, "script step");
        match &line.command {
            ScriptCommand::Press(name) => {
                let id = self.control(line.line, name)?;
                self.press(id);
            }
            ScriptCommand::Release(name) => {
                let id = self.control(line.line, name)?;
                self.release(id);
            }
            ScriptCommand::Tap(name, hold) => {
                let id = self.control(line.line, name)?;
                self.press(id);
                tokio::time::sleep(*hold).await;
                self.release(id);
            }
            ScriptCommand::KeyDown { keycode, meta } => {
                self.engine
                    .handle_physical_key(PhysicalKeyEvent::down(*keycode, *meta));
            }
            ScriptCommand::KeyUp(keycode) => {
                self.engine.handle_physical_key(PhysicalKeyEvent::up(*keycode));
            }
            ScriptCommand::Wait(duration) => tokio::time::sleep(*duration).await,
            ScriptCommand::Connect => self.transport.simulate_connect(self.host.clone()),
            ScriptCommand::Disconnect => self.transport.simulate_disconnect(),
            ScriptCommand::AppUnregistered => self.transport.simulate_app_unregistered(),
        }
        Ok(())
    }

    fn control(&self, line: usize, name: &str) -> Result<ControlId, ScriptError> {
        self.engine
            .layout()
            .find(name)
            .map(|c| c.id)
            .ok_or_else(|| ScriptError::UnknownControl {
                line,
                name: name.to_string(),
            })
    }

    fn press(&mut self, id: ControlId) {
        // Ids come from the layout, so the engine knows them.
        if let Ok(Some(handle)) = self.engine.press_control(id) {
            // On a re-press the previous loop is detached and winds down alone.
            self.loops.insert(id, handle);
        }
    }

    fn release(&mut self, id: ControlId) {
        let _ = self.engine.release_control(id);
    }
}

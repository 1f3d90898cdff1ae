//! Render loop gating and session ownership.
//!
//! The browser side drives frames with `request_animation_frame`; this
//! module holds the decisions it makes so they can run on the host:
//! whether a start arms the loop, when a frame may run, and how a new
//! preset tears down the one before it.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info};

use crate::config::VisualizerVariables;

/// Render loop state. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Armed,
    Running,
    Stopped,
}

/// Shared cancellation flag, checked once per frame.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Rc<Cell<bool>>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

/// What preset start does with the media element.
///
/// A paused element is played and the loop armed. An element that is
/// already playing is paused and nothing is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAction {
    Play,
    Pause,
}

impl StartAction {
    pub fn from_paused(paused: bool) -> Self {
        if paused {
            Self::Play
        } else {
            Self::Pause
        }
    }

    pub fn arms_loop(&self) -> bool {
        matches!(self, Self::Play)
    }
}

/// Converts animation-frame timestamps into the shader's `u_time`.
#[derive(Debug, Clone, Copy)]
pub struct LoopClock {
    start_ms: f64,
    time_scale: f32,
}

impl LoopClock {
    pub fn new(start_ms: f64, time_scale: f32) -> Self {
        Self { start_ms, time_scale }
    }

    pub fn elapsed(&self, now_ms: f64) -> f32 {
        ((now_ms - self.start_ms) / 1000.0) as f32 * self.time_scale
    }
}

/// Per-loop state machine.
#[derive(Debug)]
pub struct FrameGate {
    state: LoopState,
    token: StopToken,
    frames: u64,
}

impl FrameGate {
    pub fn new(token: StopToken) -> Self {
        Self {
            state: LoopState::Idle,
            token,
            frames: 0,
        }
    }

    pub fn arm(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Armed;
        }
    }

    /// Whether this tick may render and reschedule.
    pub fn begin_frame(&mut self) -> bool {
        if self.token.is_stopped() {
            if self.state != LoopState::Stopped {
                debug!("frame loop stopped after {} frames", self.frames);
            }
            self.state = LoopState::Stopped;
            return false;
        }
        match self.state {
            LoopState::Armed | LoopState::Running => {
                self.state = LoopState::Running;
                self.frames += 1;
                true
            }
            LoopState::Idle | LoopState::Stopped => false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Something a session can shut down.
pub trait Stoppable {
    fn stop(&self);
    fn is_stopped(&self) -> bool;
}

impl Stoppable for StopToken {
    fn stop(&self) {
        StopToken::stop(self)
    }

    fn is_stopped(&self) -> bool {
        StopToken::is_stopped(self)
    }
}

/// Issued by [`Session::begin`]; a start may only commit with the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Owns the running preset and the loaded variables.
///
/// At most one handle is live: beginning a new start stops the current
/// handle, and a start that was overtaken while awaiting is discarded on
/// commit.
#[derive(Debug)]
pub struct Session<H: Stoppable> {
    current: Option<H>,
    vars: Option<VisualizerVariables>,
    generation: u64,
}

impl<H: Stoppable> Default for Session<H> {
    fn default() -> Self {
        Self {
            current: None,
            vars: None,
            generation: 0,
        }
    }
}

impl<H: Stoppable> Session<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop whatever is running and hand out a ticket for the next start.
    pub fn begin(&mut self) -> Ticket {
        self.stop();
        self.generation += 1;
        Ticket(self.generation)
    }

    /// Install `handle` if `ticket` is still current; otherwise stop it.
    pub fn commit(&mut self, ticket: Ticket, handle: H) -> bool {
        if ticket.0 != self.generation {
            info!("discarding superseded preset start");
            handle.stop();
            return false;
        }
        if let Some(old) = self.current.replace(handle) {
            old.stop();
        }
        true
    }

    /// Stop the current handle, keeping the variables.
    pub fn stop(&mut self) -> bool {
        match self.current.take() {
            Some(h) => {
                h.stop();
                info!("preset stopped");
                true
            }
            None => false,
        }
    }

    /// Drop everything tied to the current audio: the handle, the
    /// variables and any start still in flight.
    pub fn invalidate(&mut self) {
        self.stop();
        self.vars = None;
        self.generation += 1;
    }

    pub fn set_vars(&mut self, vars: VisualizerVariables) {
        self.vars = Some(vars);
    }

    pub fn vars(&self) -> Option<&VisualizerVariables> {
        self.vars.as_ref()
    }

    pub fn current(&self) -> Option<&H> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_stopped())
    }
}

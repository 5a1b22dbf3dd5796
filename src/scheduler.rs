//! Timer-driven frame advance.

use std::time::Duration;

use tracing::debug;

use crate::engine::AnimationEngine;
use crate::texture::TextureBackend;

/// Periodic timer owned by the window that receives the ticks.
pub trait FrameTimer {
    /// Start ticking every `period`, replacing any running timer.
    fn arm(&mut self, period: Duration);

    fn disarm(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing loaded, no timer running.
    Idle,
    Playing { period: Duration },
}

/// Drives an [`AnimationEngine`] from timer ticks.
pub struct FrameScheduler<T: FrameTimer> {
    timer: T,
    state: SchedulerState,
}

impl<T: FrameTimer> FrameScheduler<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            state: SchedulerState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// A new animation was installed. The timer is (re-)armed with its
    /// delay so the first frame gets a full period on screen.
    pub fn on_loaded(&mut self, delay: Duration) {
        if let SchedulerState::Playing { period } = self.state {
            debug!("re-arming frame timer: {period:?} -> {delay:?}");
        }
        self.timer.arm(delay);
        self.state = SchedulerState::Playing { period: delay };
    }

    /// Handle one timer tick. Returns the new frame index when the caller
    /// should repaint, or `None` for a tick that arrived while idle.
    pub fn on_tick<B: TextureBackend>(&mut self, engine: &mut AnimationEngine<B>) -> Option<usize> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::Playing { .. } => Some(engine.tick()),
        }
    }

    pub fn stop(&mut self) {
        if self.state != SchedulerState::Idle {
            self.timer.disarm();
            self.state = SchedulerState::Idle;
        }
    }

    #[cfg(test)]
    pub fn timer(&self) -> &T {
        &self.timer
    }
}

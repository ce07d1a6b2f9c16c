// Decider - threshold + debounce turning probabilities into discrete taps
//
// Rising-edge trigger with a minimum-duration pulse:
// - A probability at or below the threshold arms the trigger.
// - An armed decider with no active pulse fires when probability > threshold,
//   starts a pulse of `pulse_duration` seconds and disarms.
// - While the pulse is active no trigger is reported; the pulse counts down
//   by each tick's dt.
// - A dip that re-arms during a pulse is a deferred trigger: if the
//   probability is still above threshold on the tick the pulse expires, that
//   tick reports the tap even though it carries no rising edge of its own.
// Confidence always mirrors the current probability so a meter stays live
// while the discrete trigger is suppressed.

use serde::{Deserialize, Serialize};

/// Per-tick output for the feedback collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Current probability clamped to [0, 1]
    pub confidence: f32,
    /// True on the single tick a tap is reported
    pub triggered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceState {
    pub pulse_active: bool,
    /// Seconds left in the active pulse
    pub pulse_remaining: f32,
    /// Probability has been at or below threshold since the last trigger
    pub armed: bool,
}

impl Default for DebounceState {
    fn default() -> Self {
        Self {
            pulse_active: false,
            pulse_remaining: 0.0,
            armed: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventDecider {
    threshold: f32,
    pulse_duration: f32,
    state: DebounceState,
}

impl EventDecider {
    pub fn new(threshold: f32, pulse_duration: f32) -> Self {
        Self {
            threshold,
            pulse_duration,
            state: DebounceState::default(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = DebounceState::default();
    }

    /// Advance the pulse countdown without a new probability
    ///
    /// Used on ticks that skip inference so the pulse still ends on time.
    pub fn elapse(&mut self, dt: f32) {
        if !self.state.pulse_active || !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.state.pulse_remaining -= dt;
        if self.state.pulse_remaining <= 0.0 {
            self.state.pulse_active = false;
            self.state.pulse_remaining = 0.0;
        }
    }

    /// Decide whether `probability` observed `dt` seconds after the previous
    /// tick reports a tap
    pub fn decide(&mut self, probability: f32, dt: f32) -> DetectionEvent {
        self.elapse(dt);

        let above = probability > self.threshold;
        if !above {
            self.state.armed = true;
        }

        let triggered = above && self.state.armed && !self.state.pulse_active;
        if triggered {
            self.state.armed = false;
            if self.pulse_duration > 0.0 {
                self.state.pulse_active = true;
                self.state.pulse_remaining = self.pulse_duration;
            }
        }

        DetectionEvent {
            confidence: probability.clamp(0.0, 1.0),
            triggered,
        }
    }
}

//! Gesture recognizers layered on raw key events
//!
//! - Double-tap forward to sprint (release required between taps)
//! - Alternating two keys quickly for a cadence speed boost
//! - Jump buffering so an early press still jumps on landing
//!
//! Timestamps are seconds on the host clock; only differences matter.

use bevy::prelude::*;

use crate::settings::{CadenceSettings, JumpSettings, SprintSettings};

/// Discrete triggers for cosmetic consumers (hand animation and the like).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// A cadence key went down
    HandTap(CadenceKey),
    /// A press counted as one alternation
    Alternation,
    /// Double-tap sprint engaged
    SprintEngaged,
    /// Double-tap sprint ended
    SprintEnded,
}

// =============================================================================
// SPRINT DOUBLE-TAP
// =============================================================================

/// Observable sprint gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintState {
    Idle,
    AwaitingSecondTap,
    Sprinting,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SprintPhase {
    Idle,
    AwaitingSecondTap { first_tap_at: f64, released: bool },
    Sprinting,
}

/// Double-tap-to-sprint state machine for the forward key.
#[derive(Debug, Clone)]
pub struct SprintGesture {
    phase: SprintPhase,
    cooldown: f32,
}

impl Default for SprintGesture {
    fn default() -> Self {
        Self {
            phase: SprintPhase::Idle,
            cooldown: 0.0,
        }
    }
}

impl SprintGesture {
    pub fn state(&self) -> SprintState {
        match self.phase {
            SprintPhase::Sprinting => SprintState::Sprinting,
            SprintPhase::AwaitingSecondTap { .. } => SprintState::AwaitingSecondTap,
            SprintPhase::Idle if self.cooldown > 0.0 => SprintState::Cooldown,
            SprintPhase::Idle => SprintState::Idle,
        }
    }

    pub fn is_sprinting(&self) -> bool {
        self.phase == SprintPhase::Sprinting
    }

    /// Initial (non-repeat) press of the forward key. Returns true when sprint engages.
    pub fn press(&mut self, now: f64, settings: &SprintSettings) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }
        match self.phase {
            SprintPhase::AwaitingSecondTap {
                first_tap_at,
                released: true,
            } if now - first_tap_at <= settings.double_tap_window as f64 => {
                self.phase = SprintPhase::Sprinting;
                true
            }
            SprintPhase::Sprinting => false,
            _ => {
                self.phase = SprintPhase::AwaitingSecondTap {
                    first_tap_at: now,
                    released: false,
                };
                false
            }
        }
    }

    /// Forward key released. Returns true when this ended a sprint.
    pub fn release(&mut self, settings: &SprintSettings) -> bool {
        match &mut self.phase {
            SprintPhase::Sprinting => {
                self.phase = SprintPhase::Idle;
                self.cooldown = settings.cooldown;
                true
            }
            SprintPhase::AwaitingSecondTap { released, .. } => {
                *released = true;
                false
            }
            SprintPhase::Idle => false,
        }
    }

    /// Sprint intent lost without a key release. Returns true when this ended a sprint.
    pub fn disengage(&mut self, settings: &SprintSettings) -> bool {
        if self.phase == SprintPhase::Sprinting {
            self.phase = SprintPhase::Idle;
            self.cooldown = settings.cooldown;
            return true;
        }
        false
    }

    /// Per-frame: expire a stale first tap and run down the cooldown.
    pub fn tick(&mut self, now: f64, dt: f32, settings: &SprintSettings) {
        if let SprintPhase::AwaitingSecondTap { first_tap_at, .. } = self.phase {
            if now - first_tap_at > settings.double_tap_window as f64 {
                self.phase = SprintPhase::Idle;
            }
        }
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }
}

// =============================================================================
// CADENCE (ALTERNATING KEYS)
// =============================================================================

/// Slots in the alternation ring. One slot stays free to tell full from empty.
pub const CADENCE_RING_CAPACITY: usize = 256;

/// The two keys whose alternation is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CadenceKey {
    Left,
    Right,
}

impl CadenceKey {
    pub fn other(self) -> Self {
        match self {
            CadenceKey::Left => CadenceKey::Right,
            CadenceKey::Right => CadenceKey::Left,
        }
    }
}

/// Fixed-size ring of event timestamps, live range is [tail, head).
#[derive(Debug, Clone)]
pub struct EventRing {
    times: [f64; CADENCE_RING_CAPACITY],
    head: usize,
    tail: usize,
}

impl Default for EventRing {
    fn default() -> Self {
        Self {
            times: [0.0; CADENCE_RING_CAPACITY],
            head: 0,
            tail: 0,
        }
    }
}

impl EventRing {
    /// Append, overwriting the oldest entry when full.
    pub fn push(&mut self, t: f64) {
        self.times[self.head] = t;
        self.head = (self.head + 1) % CADENCE_RING_CAPACITY;
        if self.head == self.tail {
            self.tail = (self.tail + 1) % CADENCE_RING_CAPACITY;
        }
    }

    /// Drop entries older than `window` seconds.
    pub fn evict_older_than(&mut self, now: f64, window: f64) {
        while self.tail != self.head && now - self.times[self.tail] > window {
            self.tail = (self.tail + 1) % CADENCE_RING_CAPACITY;
        }
    }

    pub fn len(&self) -> usize {
        if self.head >= self.tail {
            self.head - self.tail
        } else {
            CADENCE_RING_CAPACITY - (self.tail - self.head)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn clear(&mut self) {
        self.tail = self.head;
    }
}

/// Measures how fast two keys are being alternated.
#[derive(Debug, Clone, Default)]
pub struct CadenceGesture {
    events: EventRing,
    last_key: Option<CadenceKey>,
    last_time: f64,
}

impl CadenceGesture {
    /// Key press. Returns true if it counted as an alternation.
    pub fn press(&mut self, key: CadenceKey, now: f64, settings: &CadenceSettings) -> bool {
        let gap = now - self.last_time;
        let counted = settings.enabled
            && self.last_key == Some(key.other())
            && gap >= settings.min_interval as f64
            && gap <= settings.max_interval as f64;
        if counted {
            self.events.push(now);
        }
        self.last_key = Some(key);
        self.last_time = now;
        counted
    }

    /// Boost fraction in [0, 1] from the alternation rate over the window.
    pub fn boost(&mut self, now: f64, settings: &CadenceSettings) -> f32 {
        self.events.evict_older_than(now, settings.window as f64);
        let rate = self.events.len() as f32 / settings.window;
        (rate / settings.target_rate).clamp(0.0, 1.0)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Forget everything; events never carry across sprint intents.
    pub fn reset(&mut self) {
        self.events.clear();
        self.last_key = None;
    }
}

// =============================================================================
// JUMP BUFFER
// =============================================================================

/// Countdown armed by a jump press and consumed by the jump it produces.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpBuffer {
    remaining: f32,
}

impl JumpBuffer {
    pub fn arm(&mut self, settings: &JumpSettings) {
        self.remaining = settings.buffer_time;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn consume(&mut self) {
        self.remaining = 0.0;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

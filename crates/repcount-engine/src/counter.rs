//! Repetition state machines.
//!
//! ```text
//! Hysteresis (push-ups, sit-ups)
//!
//!            signal > down_threshold
//!     ┌─────────┐ ─────────────────────▶ ┌────────┐
//!     │ Neutral │                        │ Active │
//!     └─────────┘ ◀───────────────────── └────────┘
//!            signal < up_threshold (count += 1)
//!
//! Jump
//!
//!            hip_y < baseline - jump_threshold
//!     ┌──────────┐ ────────────────────▶ ┌──────────────────────┐
//!     │ Grounded │                       │ Airborne { min_hip } │
//!     └──────────┘ ◀──────────────────── └──────────────────────┘
//!            hip_y >= baseline (record baseline - min_hip)
//! ```
//!
//! The shuttle counter has no neutral state: it counts a reversal of lateral
//! direction whenever the bend gate is open at the same sample.

use tracing::{trace, warn};

use crate::calibration::Baseline;

// =============================================================================
// Hysteresis
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HysteresisState {
    Neutral,
    Active,
}

/// Two-threshold counter for push-ups and sit-ups.
#[derive(Debug, Clone)]
pub struct HysteresisCounter {
    down_threshold: f64,
    up_threshold: f64,
    state: HysteresisState,
    count: u32,
    degenerate: bool,
}

impl HysteresisCounter {
    /// Create a counter.
    ///
    /// When `down_threshold <= up_threshold` the signal range was too narrow to
    /// separate the two phases, and the counter never counts.
    pub fn new(down_threshold: f64, up_threshold: f64) -> Self {
        let degenerate = down_threshold <= up_threshold;
        if degenerate {
            warn!(
                down_threshold,
                up_threshold, "Signal range narrower than twice the margin; no repetitions will be counted"
            );
        }

        Self {
            down_threshold,
            up_threshold,
            state: HysteresisState::Neutral,
            count: 0,
            degenerate,
        }
    }

    /// Feed one smoothed sample. Returns true if it completed a repetition.
    pub fn update(&mut self, value: f64) -> bool {
        if self.degenerate {
            return false;
        }

        match self.state {
            HysteresisState::Neutral if value > self.down_threshold => {
                self.state = HysteresisState::Active;
                false
            }
            HysteresisState::Active if value < self.up_threshold => {
                self.state = HysteresisState::Neutral;
                self.count += 1;
                trace!(count = self.count, "Repetition completed");
                true
            }
            _ => false,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns true if a repetition has started but not completed.
    pub fn in_progress(&self) -> bool {
        self.state == HysteresisState::Active
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

// =============================================================================
// Jump
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum JumpState {
    Grounded,
    Airborne { min_hip: f64 },
}

/// Grounded/airborne counter that records jump heights.
#[derive(Debug, Clone)]
pub struct JumpCounter {
    state: JumpState,
    heights: Vec<f64>,
}

impl Default for JumpCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl JumpCounter {
    pub fn new() -> Self {
        Self {
            state: JumpState::Grounded,
            heights: Vec::new(),
        }
    }

    /// Feed one smoothed hip height. Returns the jump height when a jump ends.
    pub fn update(&mut self, hip_y: f64, baseline: Baseline) -> Option<f64> {
        match self.state {
            JumpState::Grounded => {
                if hip_y < baseline.value - baseline.threshold {
                    self.state = JumpState::Airborne { min_hip: hip_y };
                }
                None
            }
            JumpState::Airborne { min_hip } => {
                let min_hip = min_hip.min(hip_y);
                if hip_y >= baseline.value {
                    let height = baseline.value - min_hip;
                    self.heights.push(height);
                    self.state = JumpState::Grounded;
                    trace!(height, count = self.heights.len(), "Jump completed");
                    Some(height)
                } else {
                    self.state = JumpState::Airborne { min_hip };
                    None
                }
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.heights.len() as u32
    }

    /// Recorded heights in jump order.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn into_heights(self) -> Vec<f64> {
        self.heights
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self.state, JumpState::Airborne { .. })
    }
}

// =============================================================================
// Shuttle
// =============================================================================

/// Lateral direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Edge-triggered counter for touch-and-turn reversals.
#[derive(Debug, Clone)]
pub struct ShuttleCounter {
    velocity_threshold: f64,
    prev_x: Option<f64>,
    prev_direction: Option<Direction>,
    count: u32,
}

impl ShuttleCounter {
    pub fn new(velocity_threshold: f64) -> Self {
        Self {
            velocity_threshold,
            prev_x: None,
            prev_direction: None,
            count: 0,
        }
    }

    /// Feed smoothed hip x and hand offset. Returns true if a shuttle was counted.
    ///
    /// A direction registers only when the lateral speed exceeds the threshold.
    /// Every registered direction becomes the new reference, whether or not the
    /// bend gate was open.
    pub fn update(&mut self, hip_x: f64, hand_rel: f64, baseline: Baseline) -> bool {
        let bending = hand_rel > baseline.value + baseline.threshold;
        let mut counted = false;

        if let Some(prev_x) = self.prev_x {
            let velocity = hip_x - prev_x;
            if velocity.abs() > self.velocity_threshold {
                let direction = if velocity > 0.0 {
                    Direction::Right
                } else {
                    Direction::Left
                };

                if bending && self.prev_direction.is_some_and(|prev| prev != direction) {
                    self.count += 1;
                    counted = true;
                    trace!(?direction, count = self.count, "Shuttle completed");
                }
                self.prev_direction = Some(direction);
            }
        }

        self.prev_x = Some(hip_x);
        counted
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn direction(&self) -> Option<Direction> {
        self.prev_direction
    }
}

// =============================================================================
// Tests
// =============================================================================

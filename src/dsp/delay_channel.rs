//! # Delay Channel
//!
//! One channel's delay line: a fixed-capacity buffer sized for the longest
//! delay we allow, of which only the first `active_delay_samples` slots
//! are used as a ring for the current delay setting.
//!
//! ## The cursor
//!
//! A single signed index drives everything:
//!
//! ```text
//!  cursor:  -D  -D+1  ...  -1 │  0   1  ...  D-1 │  0   1  ...
//!           └── priming ─────┘ └──── steady ────┘ └── steady ...
//!           output = 0           output = buffer[cursor] * gain
//!           buffer[cursor + D]   buffer[cursor] = input
//!             = input
//! ```
//!
//! When the delay length changes, the cursor is re-seeded to `-D` and the
//! channel spends exactly `D` samples **priming**: outputting silence
//! while it fills `buffer[0..D]` with fresh input. From then on it is
//! **steady**: each sample reads the slot under the cursor (written
//! exactly `D` samples ago) and overwrites it with the new input, and the
//! cursor wraps from `D` back to `0`.
//!
//! A change of delay length never crossfades. The old window is discarded
//! and the output goes silent for the new delay length before the delayed
//! signal resumes. Slots past the active window are left alone; they are
//! not cleared when the window shrinks.
//!
//! A delay of `0` samples bypasses the buffer entirely: the output is the
//! input times the gain.

use nih_plug::nih_debug_assert;

use crate::error::ChannelDelayError;

/// The longest delay a channel can be set to, in milliseconds. Buffers
/// are sized for this at construction.
pub const MAX_DELAY_MS: f32 = 2000.0;

/// Convert milliseconds to a whole number of samples, rounding half up.
///
/// At 48 kHz: `10 ms → 480`, `2000 ms → 96000`.
pub fn delay_ms_to_samples(sample_rate: f64, delay_ms: f32) -> usize {
    ((sample_rate / 1000.0) * f64::from(delay_ms) + 0.5).floor() as usize
}

/// Clamp a raw control value into `[0, MAX_DELAY_MS]`. NaN maps to `0`.
pub fn clamp_delay_ms(raw_ms: f32) -> f32 {
    if raw_ms.is_nan() {
        0.0
    } else {
        raw_ms.clamp(0.0, MAX_DELAY_MS)
    }
}

/// A single channel's delay line and its indexing state.
///
/// All memory is allocated in [`DelayChannel::new`]. Nothing after that
/// allocates, so the channel is safe to drive from the audio thread.
pub struct DelayChannel {
    /// Sample rate the buffer was sized for. Fixed for the channel's
    /// lifetime.
    sample_rate: f64,

    /// `capacity_samples` slots, zero-initialized. Never resized.
    buffer: Vec<f32>,

    /// The last clamped delay in milliseconds seen from the control input.
    /// `None` until the first frame, so the first frame always primes.
    requested_delay_ms: Option<f32>,

    /// Length of the active window in samples. Always
    /// `<= buffer.len()`.
    active_delay_samples: usize,

    /// Running position in the active window. Negative while priming.
    cursor: isize,
}

impl DelayChannel {
    /// Allocate a channel able to delay up to [`MAX_DELAY_MS`] at
    /// `sample_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelDelayError::InvalidSampleRate`] if the rate is not
    /// a positive finite number, or [`ChannelDelayError::AllocationFailed`]
    /// if the buffer cannot be reserved.
    pub fn new(sample_rate: f64) -> Result<Self, ChannelDelayError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ChannelDelayError::InvalidSampleRate(sample_rate));
        }

        let capacity = delay_ms_to_samples(sample_rate, MAX_DELAY_MS);
        if capacity == 0 {
            return Err(ChannelDelayError::InvalidSampleRate(sample_rate));
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| ChannelDelayError::AllocationFailed { samples: capacity })?;
        buffer.resize(capacity, 0.0);

        Ok(Self {
            sample_rate,
            buffer,
            requested_delay_ms: None,
            active_delay_samples: 0,
            cursor: 0,
        })
    }

    /// Feed this frame's delay control value.
    ///
    /// The value is clamped to `[0, MAX_DELAY_MS]` and compared exactly
    /// against the previous frame's value. On a change the active window
    /// is recomputed and the cursor re-seeded to `-active_delay_samples`,
    /// which puts the channel back into priming.
    ///
    /// Returns `true` if the channel re-primed.
    pub fn set_delay_ms(&mut self, raw_ms: f32) -> bool {
        let delay_ms = clamp_delay_ms(raw_ms);
        if self.requested_delay_ms == Some(delay_ms) {
            return false;
        }

        self.requested_delay_ms = Some(delay_ms);
        self.active_delay_samples = delay_ms_to_samples(self.sample_rate, delay_ms);
        nih_debug_assert!(self.active_delay_samples <= self.buffer.len());
        self.cursor = -(self.active_delay_samples as isize);

        true
    }

    /// Run one sample through the channel.
    ///
    /// `gain` is the linear coefficient for the current frame (see
    /// [`db_to_coefficient`](super::gain::db_to_coefficient)). Priming
    /// samples are exactly `0.0` regardless of gain.
    #[inline]
    pub fn process_sample(&mut self, input: f32, gain: f32) -> f32 {
        let active = self.active_delay_samples as isize;

        // Ring wrap.
        if self.cursor >= active {
            self.cursor = 0;
        }

        let output = if self.cursor < 0 {
            self.buffer[(self.cursor + active) as usize] = input;
            0.0
        } else if active == 0 {
            input * gain
        } else {
            let slot = self.cursor as usize;
            let delayed = self.buffer[slot];
            self.buffer[slot] = input;
            delayed * gain
        };

        self.cursor += 1;
        output
    }

    /// Forget the cached delay and silence the whole buffer.
    ///
    /// The next [`set_delay_ms`](Self::set_delay_ms) call re-primes, just
    /// like the first frame after construction.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.requested_delay_ms = None;
        self.active_delay_samples = 0;
        self.cursor = 0;
    }

    /// Number of slots allocated at construction.
    pub fn capacity_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Length of the window currently in use.
    pub fn active_delay_samples(&self) -> usize {
        self.active_delay_samples
    }

    /// The last clamped delay value observed, if any frame has run yet.
    pub fn requested_delay_ms(&self) -> Option<f32> {
        self.requested_delay_ms
    }

    /// `true` while the channel is still filling its window after a
    /// delay change.
    pub fn is_priming(&self) -> bool {
        self.cursor < 0
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

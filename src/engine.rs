//! # Stereo Delay Engine
//!
//! Drives the left and right [`DelayChannel`]s for one audio frame.
//!
//! For each channel, once per frame:
//!
//! 1. Feed the delay control to the channel (clamp + change detection).
//! 2. Convert the gain control from dB to a linear coefficient.
//! 3. Run every sample of the frame through the channel.
//!
//! The channels share nothing but the sample rate, so they run as two
//! independent passes.

use crate::dsp::delay_channel::DelayChannel;
use crate::dsp::gain::db_to_coefficient;
use crate::error::ChannelDelayError;

/// Control values for one channel, held constant for a whole frame.
///
/// The default is unity gain and no delay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelControls {
    /// Gain applied to the delayed signal, in dB.
    pub gain_db: f32,
    /// Requested delay in milliseconds. Clamped to `[0, 2000]`.
    pub delay_ms: f32,
}

/// Control values for both channels for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameControls {
    pub left: ChannelControls,
    pub right: ChannelControls,
}

/// Two independent delay channels driven by the same per-frame call.
pub struct StereoDelay {
    left: DelayChannel,
    right: DelayChannel,
}

impl StereoDelay {
    /// Allocate both channels for `sample_rate`. This is the only place
    /// the engine allocates.
    pub fn new(sample_rate: f64) -> Result<Self, ChannelDelayError> {
        Ok(Self {
            left: DelayChannel::new(sample_rate)?,
            right: DelayChannel::new(sample_rate)?,
        })
    }

    /// Process one frame from separate input and output buffers.
    ///
    /// Every output sample is overwritten. If an input is shorter than its
    /// output, only the common length is processed.
    pub fn process(
        &mut self,
        inputs: [&[f32]; 2],
        outputs: [&mut [f32]; 2],
        controls: &FrameControls,
    ) {
        let [input_l, input_r] = inputs;
        let [output_l, output_r] = outputs;

        run_channel(&mut self.left, &controls.left, input_l, output_l);
        run_channel(&mut self.right, &controls.right, input_r, output_r);
    }

    /// Process one frame in place, as the host hands it to us.
    ///
    /// Channel 0 is left, channel 1 is right. Any further channels are
    /// left untouched.
    pub fn process_in_place(&mut self, channels: &mut [&mut [f32]], controls: &FrameControls) {
        if let Some(samples) = channels.get_mut(0) {
            run_channel_in_place(&mut self.left, &controls.left, samples);
        }
        if let Some(samples) = channels.get_mut(1) {
            run_channel_in_place(&mut self.right, &controls.right, samples);
        }
    }

    /// Silence both channels and forget their delay settings.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    /// How many samples of output are still owed once input goes silent:
    /// the longer of the two active delays.
    pub fn tail_samples(&self) -> usize {
        self.left
            .active_delay_samples()
            .max(self.right.active_delay_samples())
    }

    pub fn left(&self) -> &DelayChannel {
        &self.left
    }

    pub fn right(&self) -> &DelayChannel {
        &self.right
    }
}

fn run_channel(
    channel: &mut DelayChannel,
    controls: &ChannelControls,
    input: &[f32],
    output: &mut [f32],
) {
    channel.set_delay_ms(controls.delay_ms);
    let gain = db_to_coefficient(controls.gain_db);

    for (out, &sample) in output.iter_mut().zip(input) {
        *out = channel.process_sample(sample, gain);
    }
}

fn run_channel_in_place(
    channel: &mut DelayChannel,
    controls: &ChannelControls,
    samples: &mut [f32],
) {
    channel.set_delay_ms(controls.delay_ms);
    let gain = db_to_coefficient(controls.gain_db);

    for sample in samples.iter_mut() {
        *sample = channel.process_sample(*sample, gain);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controls(left: (f32, f32), right: (f32, f32)) -> FrameControls {
        FrameControls {
            left: ChannelControls {
                gain_db: left.0,
                delay_ms: left.1,
            },
            right: ChannelControls {
                gain_db: right.0,
                delay_ms: right.1,
            },
        }
    }

    /// Left and right delays and gains are fully independent.
    #[test]
    fn test_channels_are_independent() {
        let mut engine = StereoDelay::new(1000.0).unwrap();
        let input_l = [1.0, 0.0, 0.0, 0.0, 0.0];
        let input_r = [1.0, 0.0, 0.0, 0.0, 0.0];
        let mut out_l = [9.0; 5];
        let mut out_r = [9.0; 5];

        engine.process(
            [&input_l[..], &input_r[..]],
            [&mut out_l[..], &mut out_r[..]],
            &controls((0.0, 1.0), (-20.0, 3.0)),
        );

        assert_eq!(out_l, [0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&out_r[..3], &[0.0, 0.0, 0.0]);
        assert_relative_eq!(out_r[3], 0.1, epsilon = 1e-6);
        assert_eq!(out_r[4], 0.0);
    }

    #[test]
    fn test_in_place_matches_separate_buffers() {
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.37).sin()).collect();
        let frame = controls((-6.0, 5.0), (3.0, 11.0));

        let mut separate = StereoDelay::new(1000.0).unwrap();
        let mut out_l = vec![0.0; input.len()];
        let mut out_r = vec![0.0; input.len()];
        separate.process(
            [&input[..], &input[..]],
            [&mut out_l[..], &mut out_r[..]],
            &frame,
        );

        let mut in_place = StereoDelay::new(1000.0).unwrap();
        let mut l = input.clone();
        let mut r = input.clone();
        {
            let mut channels: [&mut [f32]; 2] = [&mut l[..], &mut r[..]];
            in_place.process_in_place(&mut channels, &frame);
        }

        assert_eq!(l, out_l);
        assert_eq!(r, out_r);
    }

    #[test]
    fn test_in_place_ignores_extra_channels() {
        let mut engine = StereoDelay::new(1000.0).unwrap();
        let mut l = [1.0, 2.0];
        let mut r = [3.0, 4.0];
        let mut extra = [5.0, 6.0];
        {
            let mut channels: [&mut [f32]; 3] = [&mut l[..], &mut r[..], &mut extra[..]];
            engine.process_in_place(&mut channels, &FrameControls::default());
        }

        assert_eq!(l, [1.0, 2.0]);
        assert_eq!(r, [3.0, 4.0]);
        assert_eq!(extra, [5.0, 6.0]);
    }

    #[test]
    fn test_muted_gain_silences_output() {
        let mut engine = StereoDelay::new(1000.0).unwrap();
        let mut l = [1.0; 4];
        let mut r = [1.0; 4];
        {
            let mut channels: [&mut [f32]; 2] = [&mut l[..], &mut r[..]];
            engine.process_in_place(&mut channels, &controls((-90.0, 0.0), (-200.0, 1.0)));
        }

        assert_eq!(l, [0.0; 4]);
        assert_eq!(r, [0.0; 4]);
    }

    #[test]
    fn test_tail_is_longest_active_delay() {
        let mut engine = StereoDelay::new(48000.0).unwrap();
        assert_eq!(engine.tail_samples(), 0);

        let mut l = [0.0; 8];
        let mut r = [0.0; 8];
        {
            let mut channels: [&mut [f32]; 2] = [&mut l[..], &mut r[..]];
            engine.process_in_place(&mut channels, &controls((0.0, 10.0), (0.0, 250.0)));
        }
        assert_eq!(engine.tail_samples(), 12000);

        engine.reset();
        assert_eq!(engine.tail_samples(), 0);
        assert_eq!(engine.left().requested_delay_ms(), None);
        assert_eq!(engine.right().requested_delay_ms(), None);
    }

    /// The whole processing path, including delay changes, runs without
    /// touching the allocator.
    #[test]
    fn test_process_does_not_allocate() {
        let mut engine = StereoDelay::new(48000.0).unwrap();
        let input = vec![0.5; 512];
        let mut out_l = vec![0.0; 512];
        let mut out_r = vec![0.0; 512];

        assert_no_alloc::assert_no_alloc(|| {
            for delay in [0.0, 10.0, 10.0, 2000.0, 3.3] {
                let frame = controls((0.0, delay), (-12.0, delay * 0.5));
                engine.process(
                    [&input[..], &input[..]],
                    [&mut out_l[..], &mut out_r[..]],
                    &frame,
                );
            }
            engine.reset();
        });
    }

    #[test]
    fn test_invalid_sample_rate_propagates() {
        assert_eq!(
            StereoDelay::new(0.0).err(),
            Some(ChannelDelayError::InvalidSampleRate(0.0))
        );
    }
}

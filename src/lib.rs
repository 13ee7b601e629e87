//! # Channel Delay: Per-Channel Delay and Gain for Stereo Signals
//!
//! A stereo utility plugin built with [nih-plug](https://github.com/robbert-vdh/nih-plug):
//! the left and right channels each get their own delay (0 to 2000 ms)
//! and their own gain. Typical uses are aligning microphones, Haas-style
//! widening, and compensating a speaker that sits closer than the other.
//!
//! ## Signal Flow
//!
//! ```text
//! Left In  ──► [Delay Channel L] ──► × gain L ──► Left Out
//!                 (delay L ms)
//!
//! Right In ──► [Delay Channel R] ──► × gain R ──► Right Out
//!                 (delay R ms)
//! ```
//!
//! There is no feedback, no dry/wet mix, and no interaction between the
//! channels. Changing a delay re-primes that channel: it goes silent for
//! the new delay length and then plays the delayed signal again. There is
//! no crossfade between the old and new delay.

pub mod dsp;
pub mod engine;
pub mod error;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;
use nih_plug::{nih_error, nih_log};

pub use engine::{ChannelControls, FrameControls, StereoDelay};
pub use error::ChannelDelayError;
use params::ChannelDelayParams;

/// The plugin: shared parameters plus the audio-thread-owned engine.
///
/// The engine can't exist before `initialize()` because its buffers are
/// sized from the sample rate, so it starts out as `None`.
struct ChannelDelay {
    params: Arc<ChannelDelayParams>,
    engine: Option<StereoDelay>,
}

impl Default for ChannelDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(ChannelDelayParams::default()),
            engine: None,
        }
    }
}

impl Plugin for ChannelDelay {
    const NAME: &'static str = "Channel Delay";
    const VENDOR: &'static str = "Channel Delay";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo only: the engine is exactly two independent channels.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Controls are read once per block. Splitting blocks at automation
    // points would turn one delay move into several re-primes.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate both delay buffers for the negotiated sample rate.
    ///
    /// Returning `false` tells the host the instance can't run. That only
    /// happens if the sample rate is unusable or the buffers can't be
    /// allocated.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = f64::from(buffer_config.sample_rate);

        match StereoDelay::new(sample_rate) {
            Ok(engine) => {
                nih_log!(
                    "Sample rate: {sample_rate} Hz, delay capacity: {} samples per channel",
                    engine.left().capacity_samples()
                );
                self.engine = Some(engine);
                true
            }
            Err(err) => {
                nih_error!("Could not initialize channel delay: {err}");
                self.engine = None;
                false
            }
        }
    }

    /// Transport stopped or plugin bypassed: drop the buffered audio so it
    /// doesn't come back on the next play, and re-prime on the next block.
    fn reset(&mut self) {
        if let Some(engine) = &mut self.engine {
            engine.reset();
        }
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let Some(engine) = &mut self.engine else {
            return ProcessStatus::Normal;
        };

        let controls = self.params.frame_controls();
        engine.process_in_place(buffer.as_slice(), &controls);

        // Keep being called after the input stops until the last delayed
        // sample has come out.
        ProcessStatus::Tail(engine.tail_samples() as u32)
    }
}

impl ClapPlugin for ChannelDelay {
    const CLAP_ID: &'static str = "com.channel-delay.channel-delay-stereo";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Independent delay and gain for the left and right channels");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Delay,
        ClapFeature::Utility,
    ];
}

impl Vst3Plugin for ChannelDelay {
    const VST3_CLASS_ID: [u8; 16] = *b"ChanDelayStereo1";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(ChannelDelay);
nih_export_vst3!(ChannelDelay);

// AUv2 entry point for hosts that only load Audio Units.
clap_wrapper::export_auv2!();

// The sound-edge tracker: diffs the two sound-latch ports against their
// previous values and turns 0->1 (or, for the UFO loop, 1->0) transitions
// into calls against a `SampleSlot` sink. The crate ships one concrete
// adapter over rodio + basic_waves, synthesizing placeholder tones in lieu
// of the original cabinet's sample WAVs (out of scope, like ROM files).

use basic_waves::{SawtoothWave, SineWave, SquareWave};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::time::Duration;

pub const UFO_CHANNEL: u8 = 0;

/// Accepts "play sample N, optionally looping" and "halt channel N" commands.
pub trait SampleSlot {
    fn play(&mut self, sample_id: u8, looping: bool);
    fn halt(&mut self, channel: u8);
}

pub struct SoundTracker {
    prev_out_port3: u8,
    prev_out_port5: u8,
}

impl SoundTracker {
    pub fn new() -> Self {
        SoundTracker { prev_out_port3: 0, prev_out_port5: 0 }
    }

    /// Compares both latches against the values seen on the previous call.
    /// Idempotent: calling twice with the same pair triggers nothing the
    /// second time.
    pub fn update(&mut self, out_port3: u8, out_port5: u8, sink: &mut dyn SampleSlot) {
        for bit in 0..4u8 {
            let was_set = self.prev_out_port3 & (1 << bit) != 0;
            let is_set = out_port3 & (1 << bit) != 0;
            if !was_set && is_set {
                sink.play(bit, bit == UFO_CHANNEL);
            } else if bit == UFO_CHANNEL && was_set && !is_set {
                sink.halt(UFO_CHANNEL);
            }
        }
        for bit in 0..5u8 {
            let was_set = self.prev_out_port5 & (1 << bit) != 0;
            let is_set = out_port5 & (1 << bit) != 0;
            if !was_set && is_set {
                sink.play(4 + bit, false);
            }
        }
        self.prev_out_port3 = out_port3;
        self.prev_out_port5 = out_port5;
    }
}

impl Default for SoundTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// A placeholder tone bank: each sample id is given a short synthesized
/// waveform rather than a sampled WAV, since shipping the original arcade's
/// sound assets is out of scope. Looping samples (the UFO) use an
/// indefinitely repeating `Sink`; one-shots fire and are dropped.
pub struct RodioSampleSlot {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    ufo_sink: Option<Sink>,
}

impl RodioSampleSlot {
    pub fn new() -> anyhow::Result<Self> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| anyhow::anyhow!("failed to open audio output: {}", e))?;
        Ok(RodioSampleSlot { _stream: stream, handle, ufo_sink: None })
    }

    fn tone_for(sample_id: u8) -> Box<dyn Source<Item = f32> + Send> {
        let duration = Duration::from_millis(120);
        match sample_id {
            0 => Box::new(SineWave::new(220.0).take_duration(duration)),
            1 => Box::new(SquareWave::new(660.0).take_duration(Duration::from_millis(60))),
            2 => Box::new(SawtoothWave::new(140.0).take_duration(Duration::from_millis(400))),
            3 => Box::new(SineWave::new(90.0).take_duration(Duration::from_millis(300))),
            n => Box::new(SquareWave::new(300.0 + 40.0 * n as f32).take_duration(Duration::from_millis(80))),
        }
    }
}

impl SampleSlot for RodioSampleSlot {
    fn play(&mut self, sample_id: u8, looping: bool) {
        if looping {
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    log::error!("failed to create audio sink: {}", e);
                    return;
                }
            };
            sink.append(Self::tone_for(sample_id).repeat_infinite());
            self.ufo_sink = Some(sink);
        } else if let Ok(sink) = Sink::try_new(&self.handle) {
            sink.append(Self::tone_for(sample_id));
            sink.detach();
        }
    }

    fn halt(&mut self, channel: u8) {
        if channel == UFO_CHANNEL {
            if let Some(sink) = self.ufo_sink.take() {
                sink.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSlot {
        played: Vec<(u8, bool)>,
        halted: Vec<u8>,
    }

    impl SampleSlot for RecordingSlot {
        fn play(&mut self, sample_id: u8, looping: bool) {
            self.played.push((sample_id, looping));
        }
        fn halt(&mut self, channel: u8) {
            self.halted.push(channel);
        }
    }

    #[test]
    fn repeated_identical_ports_trigger_nothing_further() {
        let mut tracker = SoundTracker::new();
        let mut sink = RecordingSlot::default();
        tracker.update(0b0001, 0, &mut sink);
        assert_eq!(sink.played.len(), 1);
        tracker.update(0b0001, 0, &mut sink);
        assert_eq!(sink.played.len(), 1, "idempotent on repeated identical latch values");
    }

    #[test]
    fn ufo_loops_and_halts_on_falling_edge() {
        let mut tracker = SoundTracker::new();
        let mut sink = RecordingSlot::default();
        tracker.update(0b0001, 0, &mut sink);
        assert_eq!(sink.played, vec![(0, true)]);
        tracker.update(0b0000, 0, &mut sink);
        assert_eq!(sink.halted, vec![0]);
    }

    #[test]
    fn port5_fleet_move_bits_map_to_samples_4_through_7() {
        let mut tracker = SoundTracker::new();
        let mut sink = RecordingSlot::default();
        tracker.update(0, 0b0000_0100, &mut sink);
        assert_eq!(sink.played, vec![(6, false)]);
    }
}

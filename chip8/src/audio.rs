use log::debug;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

const SAMPLE_RATE: i32 = 44_100;
const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.2;

/// Something that can play the buzzer tone
pub trait Tone {
    fn start(&mut self);
    fn stop(&mut self);

    fn set_playing(&mut self, playing: bool) {
        if playing {
            self.start()
        } else {
            self.stop()
        }
    }
}

/// Used with `--mute` and wherever no audio device is wanted
pub struct Mute;

impl Tone for Mute {
    fn start(&mut self) {}
    fn stop(&mut self) {}
}

struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// A square wave on the default playback device
pub struct Buzzer {
    device: AudioDevice<SquareWave>,
    playing: bool,
}

impl Buzzer {
    pub fn new(sdl: &sdl2::Sdl) -> Result<Self, String> {
        let audio = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(SAMPLE_RATE),
            channels: Some(1),
            samples: None,
        };
        let device = audio.open_playback(None, &desired, |spec| {
            debug!("opened audio device at {} Hz", spec.freq);
            SquareWave {
                phase_inc: TONE_HZ / spec.freq as f32,
                phase: 0.0,
                volume: VOLUME,
            }
        })?;
        Ok(Buzzer {
            device,
            playing: false,
        })
    }
}

impl Tone for Buzzer {
    fn start(&mut self) {
        if !self.playing {
            self.device.resume();
            self.playing = true;
        }
    }

    fn stop(&mut self) {
        if self.playing {
            self.device.pause();
            self.playing = false;
        }
    }
}

//! Bridge between scenes and a background audio thread.
//!
//! Scenes only hold a `Sender<AudioCmd>`. [`setup_audio`] spawns the thread
//! that owns the receiving end; [`shutdown_audio`] asks it to exit and joins
//! it. The built-in thread has no audio device: it tracks which sounds would
//! be playing and logs every command, which is enough for headless runs.

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::Vec3;
use log::{debug, warn};
use rustc_hash::FxHashSet;

use crate::components::guid::Guid;
use crate::events::audio::AudioCmd;

/// What the audio thread saw before it exited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioStats {
    pub commands: u32,
    pub sounds_started: u32,
    pub one_shots: u32,
    pub listener_updates: u32,
    pub listener: Option<Vec3>,
    /// Entity sounds still playing at exit.
    pub playing: usize,
}

pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (scene -> audio thread).
    pub tx_cmd: Sender<AudioCmd>,
    /// Join handle for the background audio thread.
    pub handle: std::thread::JoinHandle<AudioStats>,
}

impl AudioBridge {
    pub fn sender(&self) -> Sender<AudioCmd> {
        self.tx_cmd.clone()
    }
}

/// Spawn the audio thread.
pub fn setup_audio() -> AudioBridge {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let handle = std::thread::spawn(move || audio_thread(rx_cmd));
    AudioBridge { tx_cmd, handle }
}

/// Request shutdown and join the thread.
pub fn shutdown_audio(bridge: AudioBridge) -> AudioStats {
    let _ = bridge.tx_cmd.send(AudioCmd::Shutdown);
    match bridge.handle.join() {
        Ok(stats) => stats,
        Err(_) => {
            warn!("Audio thread panicked");
            AudioStats::default()
        }
    }
}

/// Entry point of the audio thread. Runs until [`AudioCmd::Shutdown`] or
/// until every sender is dropped.
pub fn audio_thread(rx_cmd: Receiver<AudioCmd>) -> AudioStats {
    let mut stats = AudioStats::default();
    let mut playing: FxHashSet<Guid> = FxHashSet::default();

    for cmd in rx_cmd.iter() {
        stats.commands += 1;
        match cmd {
            AudioCmd::Play {
                guid,
                sound,
                location,
                volume,
                looping,
            } => {
                debug!(
                    "[audio] play '{}' for {} at {:?} (volume {}, looping {})",
                    sound, guid, location, volume, looping
                );
                playing.insert(guid);
                stats.sounds_started += 1;
            }
            AudioCmd::PlayOneShot { sound, location } => {
                debug!("[audio] one-shot '{}' at {:?}", sound, location);
                stats.one_shots += 1;
            }
            AudioCmd::SetListener { location, .. } => {
                stats.listener = Some(location);
                stats.listener_updates += 1;
            }
            AudioCmd::StopAll => {
                debug!("[audio] stop all ({} playing)", playing.len());
                playing.clear();
            }
            AudioCmd::Shutdown => break,
        }
    }

    stats.playing = playing.len();
    stats
}

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;

use super::thread::{Inbox, spawn_audio_thread};
use super::types::{AudioCmd, AudioEvent, AudioOutput, PlayError, PlaybackHandle, PlaybackInfo};

/// Handle to the rodio-backed audio thread.
///
/// Commands are fire-and-forget; the thread reports back through
/// [`AudioPlayer::poll_events`] and the shared [`PlaybackHandle`].
pub struct AudioPlayer {
    tx: Sender<Inbox>,
    events: Receiver<AudioEvent>,
    playback: PlaybackHandle,
    source: Option<String>,
    volume: f32,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<Inbox>();
        let (event_tx, event_rx) = mpsc::channel::<AudioEvent>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));
        let volume = audio_settings.initial_volume.clamp(0.0, 1.0);

        let audio_handle = spawn_audio_thread(
            rx,
            tx.clone(),
            event_tx,
            playback_info.clone(),
            audio_settings,
        );

        Self {
            tx,
            events: event_rx,
            playback: playback_info,
            source: None,
            volume,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: AudioCmd) {
        if self.tx.send(Inbox::Command(cmd)).is_err() {
            warn!("audio thread is no longer running");
        }
    }

    /// Drain the events emitted since the last call.
    pub fn poll_events(&self) -> Vec<AudioEvent> {
        self.events.try_iter().collect()
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }

    fn info(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }
}

impl AudioOutput for AudioPlayer {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, url: String) {
        self.source = Some(url.clone());
        self.send(AudioCmd::Load(url));
    }

    fn clear_source(&mut self) {
        self.source = None;
        self.send(AudioCmd::Clear);
    }

    fn play(&mut self) -> Result<(), PlayError> {
        match self.source.as_deref() {
            None | Some("") => Err(PlayError::NoSource),
            Some(_) => {
                self.send(AudioCmd::Play);
                Ok(())
            }
        }
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.send(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.send(AudioCmd::SetVolume(self.volume));
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn position(&self) -> Duration {
        self.info().elapsed
    }

    fn duration(&self) -> Option<Duration> {
        self.info().duration
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        // The thread keeps a sender for its download workers, so it only stops
        // when told to.
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = self.tx.send(Inbox::Command(AudioCmd::Quit { fade_out_ms: 0 }));
                let _ = h.join();
            }
        }
    }
}

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::config::AudioSettings;

use super::fetch::{Fetched, spawn_fetch};
use super::sink::create_sink_at;
use super::types::{AudioCmd, AudioEvent, PlayError, PlaybackHandle};

/// Everything the audio thread can receive: user commands and finished downloads.
pub(super) enum Inbox {
    Command(AudioCmd),
    Fetched(Fetched),
}

impl From<Fetched> for Inbox {
    fn from(f: Fetched) -> Self {
        Self::Fetched(f)
    }
}

/// Where the current source is in its lifecycle.
enum SourceState {
    Empty,
    Fetching,
    Ready {
        bytes: Arc<[u8]>,
        sink: Sink,
        duration: Option<Duration>,
    },
    Failed(PlayError),
}

struct AudioThread {
    stream: Option<OutputStream>,
    client: Client,
    tx: Sender<Inbox>,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,

    url: Option<String>,
    // Bumped on every load/clear; downloads tagged with an older value are stale.
    generation: u64,
    source: SourceState,
    // A play request waiting for the download to finish.
    pending_play: bool,
    playing: bool,

    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
    volume: f32,
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<Inbox>,
    tx: Sender<Inbox>,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped, which would
                // scribble over the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device");
                None
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(audio_settings.fetch_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client for audio");
                Client::new()
            });

        let mut state = AudioThread {
            stream,
            client,
            tx,
            events,
            playback_info,
            url: None,
            generation: 0,
            source: SourceState::Empty,
            pending_play: false,
            playing: false,
            started_at: None,
            accumulated: Duration::ZERO,
            volume: audio_settings.initial_volume.clamp(0.0, 1.0),
        };

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(Inbox::Command(cmd)) => match cmd {
                    AudioCmd::Load(url) => state.load(url),
                    AudioCmd::Clear => state.clear(),
                    AudioCmd::Play => state.play(),
                    AudioCmd::Pause => state.pause(),
                    AudioCmd::Seek(pos) => state.seek(pos),
                    AudioCmd::SetVolume(v) => state.set_volume(v),
                    AudioCmd::Quit { fade_out_ms } => {
                        state.quit(fade_out_ms);
                        break;
                    }
                },
                Ok(Inbox::Fetched(fetched)) => state.on_fetched(fetched),
                // periodic check for end-of-media and elapsed time
                Err(RecvTimeoutError::Timeout) => state.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

impl AudioThread {
    fn emit(&self, event: AudioEvent) {
        let _ = self.events.send(event);
    }

    fn current_url(&self) -> String {
        self.url.clone().unwrap_or_default()
    }

    /// Report a failed play request for the current source.
    fn fail(&self, error: PlayError) {
        self.emit(AudioEvent::PlayFailed {
            source: self.current_url(),
            error,
        });
    }

    fn elapsed(&self) -> Duration {
        let elapsed = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.duration() {
            Some(total) => elapsed.min(total),
            None => elapsed,
        }
    }

    fn duration(&self) -> Option<Duration> {
        match &self.source {
            SourceState::Ready { duration, .. } => *duration,
            _ => None,
        }
    }

    fn publish(&self) {
        if let Ok(mut info) = self.playback_info.lock() {
            info.source = self.url.clone();
            info.elapsed = self.elapsed();
            info.duration = self.duration();
            info.playing = self.playing;
            info.loading = matches!(self.source, SourceState::Fetching);
        }
    }

    /// A pending play that will never start is reported as superseded.
    fn supersede_pending(&mut self) {
        if self.pending_play {
            self.pending_play = false;
            self.fail(PlayError::Superseded);
        }
    }

    fn reset_clock(&mut self) {
        self.playing = false;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    fn drop_source(&mut self) {
        if let SourceState::Ready { sink, .. } = &self.source {
            sink.stop();
        }
        self.source = SourceState::Empty;
        self.generation += 1;
        self.reset_clock();
    }

    fn start_fetch(&mut self) {
        let Some(url) = self.url.clone() else {
            return;
        };
        self.source = SourceState::Fetching;
        spawn_fetch(&self.client, url, self.generation, self.tx.clone());
    }

    fn load(&mut self, url: String) {
        self.supersede_pending();
        self.drop_source();

        if url.is_empty() {
            self.url = None;
        } else {
            self.url = Some(url);
            self.start_fetch();
        }
        self.publish();
    }

    fn clear(&mut self) {
        self.supersede_pending();
        self.drop_source();
        self.url = None;
        self.publish();
    }

    fn play(&mut self) {
        match &self.source {
            SourceState::Empty => self.fail(PlayError::NoSource),
            SourceState::Fetching => self.pending_play = true,
            SourceState::Failed(e) => {
                debug!(error = %e, "retrying failed source");
                self.generation += 1;
                self.pending_play = true;
                self.start_fetch();
            }
            SourceState::Ready { .. } => self.start_playback(),
        }
        self.publish();
    }

    fn start_playback(&mut self) {
        let Some(stream) = self.stream.as_ref() else {
            self.fail(PlayError::Output("no audio output device".to_string()));
            return;
        };
        let SourceState::Ready { bytes, sink, .. } = &mut self.source else {
            return;
        };

        // Played to the end: start over, like a media element does.
        if sink.empty() {
            match create_sink_at(stream, bytes, Duration::ZERO, self.volume) {
                Ok((fresh, _)) => *sink = fresh,
                Err(e) => {
                    self.fail(e);
                    return;
                }
            }
            self.accumulated = Duration::ZERO;
        }

        sink.play();
        if !self.playing {
            self.started_at = Some(Instant::now());
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.supersede_pending();
        if let SourceState::Ready { sink, .. } = &self.source {
            sink.pause();
        }
        if self.playing {
            if let Some(st) = self.started_at {
                self.accumulated += st.elapsed();
            }
            self.started_at = None;
            self.playing = false;
        }
        self.publish();
    }

    fn seek(&mut self, position: Duration) {
        let Some(stream) = self.stream.as_ref() else {
            return;
        };
        let SourceState::Ready {
            bytes,
            sink,
            duration,
        } = &mut self.source
        else {
            return;
        };

        let position = match duration {
            Some(total) => position.min(*total),
            None => position,
        };

        // Rebuild the sink and skip into the source.
        match create_sink_at(stream, bytes, position, self.volume) {
            Ok((fresh, _)) => {
                sink.stop();
                if self.playing {
                    fresh.play();
                    self.started_at = Some(Instant::now());
                }
                *sink = fresh;
                self.accumulated = position;
            }
            Err(e) => warn!(error = %e, "seek failed"),
        }
        self.publish();
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let SourceState::Ready { sink, .. } = &self.source {
            sink.set_volume(self.volume);
        }
    }

    fn on_fetched(&mut self, fetched: Fetched) {
        if fetched.generation != self.generation {
            debug!(generation = fetched.generation, "discarding superseded download");
            return;
        }

        let prepared = match (fetched.result, self.stream.as_ref()) {
            (Ok(bytes), Some(stream)) => create_sink_at(stream, &bytes, Duration::ZERO, self.volume)
                .map(|(sink, duration)| (bytes, sink, duration)),
            (Ok(_), None) => Err(PlayError::Output("no audio output device".to_string())),
            (Err(e), _) => Err(e),
        };

        match prepared {
            Ok((bytes, sink, duration)) => {
                self.source = SourceState::Ready {
                    bytes,
                    sink,
                    duration,
                };
                self.emit(AudioEvent::MetadataLoaded {
                    source: self.current_url(),
                    duration,
                });
                if self.pending_play {
                    self.pending_play = false;
                    self.start_playback();
                }
            }
            Err(e) => {
                warn!(url = ?self.url, error = %e, "audio source failed to load");
                self.source = SourceState::Failed(e.clone());
                if self.pending_play {
                    self.pending_play = false;
                    self.fail(e);
                }
            }
        }
        self.publish();
    }

    fn tick(&mut self) {
        if self.playing {
            if let SourceState::Ready { sink, .. } = &self.source {
                if sink.empty() {
                    self.accumulated = self.elapsed();
                    self.started_at = None;
                    self.playing = false;
                    self.emit(AudioEvent::Ended {
                        source: self.current_url(),
                    });
                }
            }
        }
        self.publish();
    }

    fn quit(&mut self, fade_out_ms: u64) {
        self.pending_play = false;
        if let SourceState::Ready { sink, .. } = &self.source {
            if self.playing {
                // Fade out gently before stopping.
                fade_out_sink(sink, self.volume, fade_out_ms);
            }
            sink.stop();
        }
        self.playing = false;
        // Update shared state so the UI doesn't keep showing Playing.
        self.publish();
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::blobs::BlobStore;
use super::sink::{create_sink_at, probe_duration};
use super::types::{MediaError, MediaEvent, MediaSource, PlayRejection};

/// How often the audio thread reports position while playing.
const TICK: Duration = Duration::from_millis(250);

/// Element state shared between the handle and the audio thread.
#[derive(Debug, Clone)]
pub(super) struct ElementState {
    /// Source assigned by `set_src`, picked up by the next load.
    pub src: Option<MediaSource>,
    pub paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub looping: bool,
    pub error: Option<MediaError>,
    /// Bumped by every `load()`; a play request issued under an older
    /// generation is aborted.
    pub generation: u64,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            src: None,
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            looping: false,
            error: None,
            generation: 0,
        }
    }
}

pub(super) type StateHandle = Arc<Mutex<ElementState>>;

#[derive(Debug)]
pub(super) enum ElementCmd {
    /// Drop the current sink and load the given source.
    Load(Option<MediaSource>),
    /// Start playback; carries the load generation the request was made under.
    Play(u64),
    Pause,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Apply a volume fraction to the live sink.
    Volume(f64),
    Quit,
}

struct Worker {
    stream: Option<OutputStream>,
    state: StateHandle,
    events: Sender<MediaEvent>,
    blobs: BlobStore,
    src: Option<MediaSource>,
    sink: Option<Sink>,
    // Position the current sink started at; `Sink::get_pos` counts from there.
    offset: Duration,
    playing: bool,
}

impl Worker {
    fn new(
        stream: Option<OutputStream>,
        state: StateHandle,
        events: Sender<MediaEvent>,
        blobs: BlobStore,
    ) -> Self {
        Self {
            stream,
            state,
            events,
            blobs,
            src: None,
            sink: None,
            offset: Duration::ZERO,
            playing: false,
        }
    }

    fn emit(&self, event: MediaEvent) {
        let _ = self.events.send(event);
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ElementState) -> T) -> Option<T> {
        self.state.lock().ok().map(|mut st| f(&mut st))
    }

    fn position(&self) -> Duration {
        match &self.sink {
            Some(s) => self.offset + s.get_pos(),
            None => self.offset,
        }
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.offset = Duration::ZERO;
        self.playing = false;
    }

    fn fail(&mut self, err: MediaError) {
        tracing::warn!(code = err.code, message = %err.message, "media element error");
        self.drop_sink();
        self.with_state(|st| {
            st.error = Some(err);
            st.paused = true;
        });
        self.emit(MediaEvent::Error);
    }

    fn load(&mut self, src: Option<MediaSource>) {
        self.drop_sink();
        self.with_state(|st| {
            st.error = None;
            st.paused = true;
            st.current_time = 0.0;
            st.duration = f64::NAN;
        });

        self.src = src;
        let Some(src) = self.src.clone() else {
            return;
        };

        match probe_duration(&src, &self.blobs) {
            Ok(duration) => {
                tracing::debug!(?src, duration, "media loaded");
                self.with_state(|st| st.duration = duration);
                self.emit(MediaEvent::LoadedMetadata);
                self.emit(MediaEvent::TimeUpdate);
            }
            Err(err) => self.fail(err),
        }
    }

    fn build_sink(&mut self, start_at: Duration) -> Result<(), PlayRejection> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(PlayRejection::not_allowed("no audio output device"));
        };
        let Some(src) = self.src.clone() else {
            return Err(PlayRejection::not_supported("no source assigned"));
        };
        let (has_error, volume) = self
            .with_state(|st| (st.error.is_some(), st.volume))
            .unwrap_or((false, 1.0));
        if has_error {
            return Err(PlayRejection::not_supported(
                "The element has no supported sources.",
            ));
        }

        match create_sink_at(stream, &src, &self.blobs, start_at, volume as f32) {
            Ok(sink) => {
                if let Some(old) = self.sink.replace(sink) {
                    old.stop();
                }
                self.offset = start_at;
                Ok(())
            }
            Err(err) => {
                let rejection = PlayRejection::not_supported(err.message.clone());
                self.fail(err);
                Err(rejection)
            }
        }
    }

    fn superseded(&self, generation: u64) -> bool {
        self.with_state(|st| st.generation != generation).unwrap_or(false)
    }

    fn abort_play(&self) {
        tracing::debug!("play request interrupted by a newer load");
        self.emit(MediaEvent::PlayRejected(PlayRejection::aborted(
            "The play() request was interrupted by a new load request.",
        )));
    }

    fn play(&mut self, generation: u64) {
        if self.superseded(generation) {
            self.abort_play();
            return;
        }
        if self.playing {
            self.emit(MediaEvent::PlayResolved);
            return;
        }

        let ended = self.sink.as_ref().map(Sink::empty).unwrap_or(true);
        if ended {
            self.emit(MediaEvent::Waiting);
            let (current, duration) = self
                .with_state(|st| (st.current_time, st.duration))
                .unwrap_or((0.0, f64::NAN));
            // Playing from the end restarts the track.
            let start = if duration.is_finite() && current >= duration {
                0.0
            } else {
                current.max(0.0)
            };
            if let Err(rejection) = self.build_sink(Duration::from_secs_f64(start)) {
                self.emit(MediaEvent::PlayRejected(rejection));
                return;
            }
        }

        // A load issued while the sink was built wins over this request.
        let committed = self
            .with_state(|st| {
                let current = st.generation == generation;
                if current {
                    st.paused = false;
                }
                current
            })
            .unwrap_or(true);
        if !committed {
            self.abort_play();
            return;
        }

        if let Some(s) = &self.sink {
            s.play();
        }
        self.playing = true;
        self.emit(MediaEvent::PlayResolved);
        self.emit(MediaEvent::Playing);
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
        }
        let pos = self.position().as_secs_f64();
        self.with_state(|st| {
            st.paused = true;
            if self.sink.is_some() {
                st.current_time = pos;
            }
        });
        if self.playing {
            self.playing = false;
            self.emit(MediaEvent::Pause);
        }
    }

    fn seek(&mut self, secs: f64) {
        let duration = self.with_state(|st| st.duration).unwrap_or(f64::NAN);
        let mut target = secs.max(0.0);
        if duration.is_finite() {
            target = target.min(duration);
        }
        let target_dur = Duration::from_secs_f64(target);

        let live = self.sink.as_ref().map(|s| !s.empty()).unwrap_or(false);
        if live {
            let seeked = self
                .sink
                .as_ref()
                .map(|s| s.try_seek(target_dur).is_ok())
                .unwrap_or(false);
            if seeked {
                self.offset = Duration::ZERO;
            } else {
                // Not every decoder seeks; rebuild the sink and skip into the source instead.
                let resume = self.playing;
                if self.build_sink(target_dur).is_ok() && resume {
                    if let Some(s) = &self.sink {
                        s.play();
                    }
                }
            }
        }

        self.with_state(|st| st.current_time = target);
        self.emit(MediaEvent::TimeUpdate);
    }

    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(empty) = self.sink.as_ref().map(Sink::empty) else {
            return;
        };

        if !empty {
            let pos = self.position().as_secs_f64();
            self.with_state(|st| {
                // Container durations can undercount the decoded stream.
                st.current_time = if st.duration.is_finite() {
                    pos.min(st.duration)
                } else {
                    pos
                };
            });
            self.emit(MediaEvent::TimeUpdate);
            return;
        }

        let looping = self.with_state(|st| st.looping).unwrap_or(false);
        if looping && self.build_sink(Duration::ZERO).is_ok() {
            if let Some(s) = &self.sink {
                s.play();
            }
            self.with_state(|st| st.current_time = 0.0);
            self.emit(MediaEvent::TimeUpdate);
            return;
        }

        self.playing = false;
        self.with_state(|st| {
            st.paused = true;
            if st.duration.is_finite() {
                st.current_time = st.duration;
            }
        });
        self.emit(MediaEvent::TimeUpdate);
        self.emit(MediaEvent::Pause);
        self.emit(MediaEvent::Ended);
    }

    fn handle(&mut self, cmd: ElementCmd) {
        match cmd {
            ElementCmd::Load(src) => self.load(src),
            ElementCmd::Play(generation) => self.play(generation),
            ElementCmd::Pause => self.pause(),
            ElementCmd::Seek(secs) => self.seek(secs),
            ElementCmd::Volume(v) => {
                if let Some(s) = &self.sink {
                    s.set_volume(v as f32);
                }
            }
            ElementCmd::Quit => self.drop_sink(),
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<ElementCmd>,
    state: StateHandle,
    events: Sender<MediaEvent>,
    blobs: BlobStore,
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
                tracing::error!(error = %e, "no audio output device");
                None
            }
        };

        let mut worker = Worker::new(stream, state, events, blobs);

        loop {
            match rx.recv_timeout(TICK) {
                Ok(ElementCmd::Quit) => {
                    worker.handle(ElementCmd::Quit);
                    break;
                }
                Ok(cmd) => worker.handle(cmd),
                Err(RecvTimeoutError::Timeout) => worker.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::blobs::BlobStore;
use super::element::MediaElement;
use super::thread::{ElementCmd, ElementState, StateHandle, spawn_audio_thread};
use super::types::{CanPlay, MediaError, MediaEvent, MediaSource, ObjectUrl};

/// Format support of the rodio backend, keyed by MIME type without parameters.
pub(crate) fn support_for(mime: &str) -> CanPlay {
    let base = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match base.as_str() {
        "audio/mpeg" | "audio/mp3" | "audio/flac" | "audio/x-flac" | "audio/wav"
        | "audio/wave" | "audio/x-wav" | "audio/ogg" | "audio/vorbis" => CanPlay::Probably,
        "audio/mp4" | "audio/x-m4a" | "audio/aac" => CanPlay::Maybe,
        _ => CanPlay::No,
    }
}

/// `MediaElement` backed by a rodio audio thread.
///
/// Queries read the shared state directly; commands are forwarded to the
/// thread, which answers with `MediaEvent`s on the receiver returned by `new`.
pub struct AudioElement {
    tx: Sender<ElementCmd>,
    state: StateHandle,
    blobs: BlobStore,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioElement {
    pub fn new() -> (Self, Receiver<MediaEvent>) {
        let (tx, rx) = mpsc::channel::<ElementCmd>();
        let (event_tx, event_rx) = mpsc::channel::<MediaEvent>();
        let state: StateHandle = Arc::new(Mutex::new(ElementState::default()));
        let blobs = BlobStore::default();

        let join = spawn_audio_thread(rx, state.clone(), event_tx, blobs.clone());

        let element = Self {
            tx,
            state,
            blobs,
            join: Mutex::new(Some(join)),
        };
        (element, event_rx)
    }

    fn send(&self, cmd: ElementCmd) {
        let _ = self.tx.send(cmd);
    }

    fn read<T>(&self, f: impl FnOnce(&ElementState) -> T, fallback: T) -> T {
        self.state.lock().map(|st| f(&st)).unwrap_or(fallback)
    }

    fn write(&self, f: impl FnOnce(&mut ElementState)) {
        if let Ok(mut st) = self.state.lock() {
            f(&mut st);
        }
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn shutdown(&self) {
        self.send(ElementCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for AudioElement {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl MediaElement for AudioElement {
    fn set_src(&mut self, src: MediaSource) {
        self.write(|st| st.src = Some(src));
    }

    fn load(&mut self) {
        let src = self.read(|st| st.src.clone(), None);
        self.write(|st| {
            st.paused = true;
            st.current_time = 0.0;
            st.duration = f64::NAN;
            st.error = None;
            st.generation += 1;
        });
        self.send(ElementCmd::Load(src));
    }

    fn play(&mut self) {
        let generation = self.read(|st| st.generation, 0);
        self.send(ElementCmd::Play(generation));
    }

    fn pause(&mut self) {
        self.write(|st| st.paused = true);
        self.send(ElementCmd::Pause);
    }

    fn paused(&self) -> bool {
        self.read(|st| st.paused, true)
    }

    fn current_time(&self) -> f64 {
        self.read(|st| st.current_time, 0.0)
    }

    fn set_current_time(&mut self, secs: f64) {
        self.write(|st| st.current_time = secs.max(0.0));
        self.send(ElementCmd::Seek(secs));
    }

    fn duration(&self) -> f64 {
        self.read(|st| st.duration, f64::NAN)
    }

    fn volume(&self) -> f64 {
        self.read(|st| st.volume, 1.0)
    }

    fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        self.write(|st| st.volume = volume);
        self.send(ElementCmd::Volume(volume));
    }

    fn is_loop(&self) -> bool {
        self.read(|st| st.looping, false)
    }

    fn set_loop(&mut self, looping: bool) {
        self.write(|st| st.looping = looping);
    }

    fn can_play_type(&self, mime: &str) -> CanPlay {
        support_for(mime)
    }

    fn error(&self) -> Option<MediaError> {
        self.read(|st| st.error.clone(), None)
    }

    fn create_object_url(&mut self, bytes: Vec<u8>) -> ObjectUrl {
        self.blobs.create(bytes)
    }

    fn revoke_object_url(&mut self, url: &ObjectUrl) {
        if !self.blobs.revoke(url) {
            tracing::debug!(%url, "revoking unknown object url");
        }
    }
}

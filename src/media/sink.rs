//! Opening media sources and turning them into `rodio` sinks.
//!
//! Every sink starts paused at the requested position; the audio thread
//! decides when to start it.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::blobs::BlobStore;
use super::types::{
    MEDIA_ERR_DECODE, MEDIA_ERR_NETWORK, MEDIA_ERR_SRC_NOT_SUPPORTED, MediaError, MediaSource,
};

enum Opened {
    File(BufReader<File>),
    Memory(Cursor<Arc<[u8]>>),
}

fn open(src: &MediaSource, blobs: &BlobStore) -> Result<Opened, MediaError> {
    match src {
        MediaSource::File(path) => File::open(path)
            .map(|f| Opened::File(BufReader::new(f)))
            .map_err(|e| MediaError::new(MEDIA_ERR_NETWORK, format!("{}: {e}", path.display()))),
        MediaSource::Object(url) => blobs
            .get(url)
            .map(|bytes| Opened::Memory(Cursor::new(bytes)))
            .ok_or_else(|| MediaError::new(MEDIA_ERR_NETWORK, format!("{url} was revoked"))),
    }
}

fn decoder_error(e: DecoderError) -> MediaError {
    match e {
        DecoderError::UnrecognizedFormat => {
            MediaError::new(MEDIA_ERR_SRC_NOT_SUPPORTED, "unrecognized format")
        }
        other => MediaError::new(MEDIA_ERR_DECODE, other.to_string()),
    }
}

fn sink_from_reader<R>(
    stream: &OutputStream,
    reader: R,
    start_at: Duration,
    volume: f32,
) -> Result<Sink, MediaError>
where
    R: Read + Seek + Send + Sync + 'static,
{
    let source = Decoder::new(reader)
        .map_err(decoder_error)?
        // `skip_duration` doubles as the fallback seek; Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// Create a paused `Sink` for `src` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    src: &MediaSource,
    blobs: &BlobStore,
    start_at: Duration,
    volume: f32,
) -> Result<Sink, MediaError> {
    match open(src, blobs)? {
        Opened::File(r) => sink_from_reader(stream, r, start_at, volume),
        Opened::Memory(r) => sink_from_reader(stream, r, start_at, volume),
    }
}

fn decoded_duration<R>(reader: R) -> Result<Option<Duration>, MediaError>
where
    R: Read + Seek + Send + Sync + 'static,
{
    let decoder = Decoder::new(reader).map_err(decoder_error)?;
    Ok(decoder.total_duration())
}

/// Check that `src` decodes and work out its duration in seconds.
///
/// Container metadata (via `lofty`) is preferred; the decoder's own estimate
/// is the fallback. Unknown durations come back as NaN.
pub(super) fn probe_duration(src: &MediaSource, blobs: &BlobStore) -> Result<f64, MediaError> {
    let (decoded, tagged) = match open(src, blobs)? {
        Opened::File(r) => {
            let decoded = decoded_duration(r)?;
            let tagged = match src {
                MediaSource::File(path) => lofty::read_from_path(path)
                    .ok()
                    .map(|t| t.properties().duration()),
                MediaSource::Object(_) => None,
            };
            (decoded, tagged)
        }
        Opened::Memory(r) => {
            let bytes = r.get_ref().clone();
            let decoded = decoded_duration(r)?;
            let tagged = Probe::new(Cursor::new(bytes))
                .guess_file_type()
                .ok()
                .and_then(|p| p.read().ok())
                .map(|t| t.properties().duration());
            (decoded, tagged)
        }
    };

    let secs = tagged
        .filter(|d| !d.is_zero())
        .or(decoded)
        .map(|d| d.as_secs_f64())
        .unwrap_or(f64::NAN);
    Ok(secs)
}

use super::blobs::BlobStore;
use super::player::support_for;
use super::types::*;

#[test]
fn error_status_uses_fixed_table_and_code() {
    let err = MediaError::new(MEDIA_ERR_DECODE, "");
    assert_eq!(
        err.status_text(),
        "Audio error: Decoding error — possibly unsupported format or corrupted file. (code 3)"
    );

    let err = MediaError::new(MEDIA_ERR_NETWORK, "connection reset");
    assert_eq!(
        err.status_text(),
        "Audio error: Network error while fetching media. (connection reset) (code 2)"
    );
}

#[test]
fn error_descriptions_cover_all_codes_with_fallback() {
    assert_eq!(MediaError::new(1, "").description(), "Media playback aborted.");
    assert_eq!(
        MediaError::new(4, "").description(),
        "Media format not supported by the browser."
    );
    assert_eq!(MediaError::new(0, "").description(), "Unknown media error.");
    assert_eq!(MediaError::new(42, "").description(), "Unknown media error.");
}

#[test]
fn mime_for_name_maps_known_extensions_case_insensitive() {
    assert_eq!(mime_for_name("song.m4a"), Some("audio/mp4"));
    assert_eq!(mime_for_name("clip.MP4"), Some("audio/mp4"));
    assert_eq!(mime_for_name("raw.aac"), Some("audio/aac"));
    assert_eq!(mime_for_name("Track.Mp3"), Some("audio/mpeg"));
    assert_eq!(mime_for_name("lossless.flac"), None);
    assert_eq!(mime_for_name("noext"), None);
}

#[test]
fn support_table_ignores_parameters_and_case() {
    assert_eq!(support_for("audio/mpeg"), CanPlay::Probably);
    assert_eq!(support_for("Audio/MPEG"), CanPlay::Probably);
    assert_eq!(support_for("audio/mp4; codecs=\"mp4a.40.2\""), CanPlay::Maybe);
    assert_eq!(support_for("audio/aac"), CanPlay::Maybe);
    assert_eq!(support_for("video/webm"), CanPlay::No);
    assert_eq!(CanPlay::No.as_str(), "");
}

#[test]
fn blob_store_creates_unique_urls_and_revokes() {
    let store = BlobStore::default();
    let a = store.create(vec![1, 2, 3]);
    let b = store.create(vec![4]);
    assert_ne!(a, b);
    assert!(a.to_string().starts_with("blob:"));
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&a).as_deref(), Some(&[1u8, 2, 3][..]));

    assert!(store.revoke(&a));
    assert!(!store.revoke(&a));
    assert!(store.get(&a).is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn play_rejection_display_includes_name() {
    let r = PlayRejection::not_allowed("autoplay blocked");
    assert_eq!(r.to_string(), "NotAllowedError: autoplay blocked");
}

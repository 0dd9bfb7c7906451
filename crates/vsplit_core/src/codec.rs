//! Output codec registry.
//!
//! Maps an output format name (`wav`, `flac`, ...) to the ffmpeg encoder,
//! encoder-specific arguments and the MIME type served for the file.
//!
//! Unknown format names never fail: they resolve to the `wav` descriptor.
//! Callers that need strict validation check [`is_supported`] first.

use std::path::Path;

use serde::Serialize;

/// Format used whenever a requested format is unknown.
pub const FALLBACK_FORMAT: &str = WAV.format;

/// Encoder settings for one output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecDescriptor {
    /// Lowercase format token, also used as the file extension.
    pub format: &'static str,
    /// ffmpeg encoder passed to `-c:a`.
    pub encoder: &'static str,
    /// Extra encoder arguments appended after the encoder.
    pub extra_args: &'static [&'static str],
    /// MIME type of the encoded file.
    pub mime: &'static str,
}

/// Fallback descriptor, also the first registered codec.
const WAV: CodecDescriptor = CodecDescriptor {
    format: "wav",
    encoder: "pcm_s16le",
    extra_args: &[],
    mime: "audio/wav",
};

/// Registered codecs, in registration order.
static CODECS: &[CodecDescriptor] = &[
    WAV,
    CodecDescriptor {
        format: "flac",
        encoder: "flac",
        extra_args: &[],
        mime: "audio/flac",
    },
    CodecDescriptor {
        format: "mp3",
        encoder: "libmp3lame",
        extra_args: &["-b:a", "192k"],
        mime: "audio/mpeg",
    },
    CodecDescriptor {
        format: "ogg",
        encoder: "libvorbis",
        extra_args: &["-q:a", "5"],
        mime: "audio/ogg",
    },
    CodecDescriptor {
        format: "aac",
        encoder: "aac",
        extra_args: &["-b:a", "192k"],
        mime: "audio/aac",
    },
    CodecDescriptor {
        format: "m4a",
        encoder: "aac",
        extra_args: &["-b:a", "192k"],
        mime: "audio/mp4",
    },
];

/// Find the descriptor registered under `format`, without fallback.
fn find(format: &str) -> Option<&'static CodecDescriptor> {
    CODECS.iter().find(|c| c.format == format)
}

/// Resolve a format name to its codec descriptor.
///
/// Unknown names resolve to the `wav` descriptor.
pub fn lookup(format: &str) -> &'static CodecDescriptor {
    find(format).unwrap_or(&WAV)
}

/// Check whether `format` is registered.
pub fn is_supported(format: &str) -> bool {
    find(format).is_some()
}

/// Supported format names in registration order.
pub fn formats() -> impl Iterator<Item = &'static str> {
    CODECS.iter().map(|c| c.format)
}

/// MIME type for a file, derived from its extension.
///
/// Files without a known extension are served as `audio/wav`.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    lookup(ext).mime
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_format_has_encoder_and_mime() {
        for format in formats() {
            let codec = lookup(format);
            assert_eq!(codec.format, format);
            assert!(!codec.encoder.is_empty(), "{} has no encoder", format);
            assert!(codec.mime.starts_with("audio/"), "{} has no mime", format);
        }
    }

    #[test]
    fn keys_are_unique_and_lowercase() {
        let keys: Vec<_> = formats().collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert!(keys.iter().all(|k| k.chars().all(|c| !c.is_ascii_uppercase())));
        assert!(keys.contains(&FALLBACK_FORMAT));
    }

    #[test]
    fn unknown_format_falls_back_to_wav() {
        assert_eq!(lookup("xyz"), lookup("wav"));
        assert_eq!(lookup(""), lookup("wav"));
        assert!(!is_supported("xyz"));
    }

    #[test]
    fn fallback_is_the_registered_wav_entry() {
        let registered = find(FALLBACK_FORMAT).unwrap();
        assert_eq!(lookup("xyz"), registered);
        assert_eq!(registered.encoder, "pcm_s16le");
        assert_eq!(registered.mime, "audio/wav");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(lookup("FLAC").format, "wav");
        assert!(is_supported("flac"));
    }

    #[test]
    fn formats_keep_registration_order() {
        let keys: Vec<_> = formats().collect();
        assert_eq!(keys, vec!["wav", "flac", "mp3", "ogg", "aac", "m4a"]);
    }

    #[test]
    fn lossy_codecs_carry_extra_args() {
        assert_eq!(lookup("mp3").extra_args, &["-b:a", "192k"]);
        assert_eq!(lookup("ogg").extra_args, &["-q:a", "5"]);
        assert!(lookup("flac").extra_args.is_empty());
        assert_eq!(lookup("m4a").encoder, "aac");
        assert_eq!(lookup("m4a").mime, "audio/mp4");
    }

    #[test]
    fn mime_follows_file_extension() {
        assert_eq!(mime_for_path(Path::new("song_vocals.mp3")), "audio/mpeg");
        assert_eq!(mime_for_path(Path::new("out/song_instrumental.flac")), "audio/flac");
        assert_eq!(mime_for_path(Path::new("no_extension")), "audio/wav");
        assert_eq!(mime_for_path(Path::new("weird.xyz")), "audio/wav");
    }
}

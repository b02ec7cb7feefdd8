use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use lewton::inside_ogg::OggStreamReader;
use log::debug;

use crate::audio::assets::AudioClip;
use crate::error::AudioLoadError;

/// Decodes a whole Ogg Vorbis file into memory.
pub fn decode_file(path: &Path) -> Result<AudioClip, AudioLoadError> {
    let is_ogg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ogg"));
    if !is_ogg {
        return Err(AudioLoadError::Unsupported { path: path.to_path_buf() });
    }

    let file = File::open(path).map_err(|source| AudioLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decode_err = |e: lewton::VorbisError| AudioLoadError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut ogg = OggStreamReader::new(BufReader::new(file)).map_err(decode_err)?;
    let channels = ogg.ident_hdr.audio_channels as usize;
    let sample_rate = ogg.ident_hdr.audio_sample_rate;

    let mut samples = Vec::new();
    while let Some(pkt) = ogg.read_dec_packet_itl().map_err(decode_err)? {
        samples.extend(pkt.into_iter().map(|s| s as f32 / i16::MAX as f32));
    }

    if samples.is_empty() {
        return Err(AudioLoadError::Empty { path: path.to_path_buf() });
    }

    debug!(
        "decoded {}: {} samples, {} ch @ {} Hz",
        path.display(),
        samples.len(),
        channels,
        sample_rate
    );

    AudioClip::new(samples, channels, sample_rate).map_err(|e| AudioLoadError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

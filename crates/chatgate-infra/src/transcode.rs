//! Voice-note transcoding via ffmpeg.
//!
//! Arbitrary uploaded audio is re-encoded to opus in an Ogg container
//! before being sent as a voice note, since the receiving side only
//! renders opus/ogg with the voice-note player. Requires an `ffmpeg`
//! binary on PATH.

use std::path::Path;

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("failed to run ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffmpeg failed: {0}")]
    Ffmpeg(String),
}

/// Transcode an audio file to opus-in-ogg, returning the output as a
/// named temp file that is deleted on drop.
pub async fn transcode_to_voice(input: &Path) -> Result<NamedTempFile, TranscodeError> {
    let output = tempfile::Builder::new().suffix(".ogg").tempfile()?;

    debug!(input = %input.display(), output = %output.path().display(), "transcoding voice note");

    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-c:a")
        .arg("libopus")
        .arg("-f")
        .arg("ogg")
        .arg(output.path())
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let tail: String = stderr.lines().last().unwrap_or("unknown error").to_string();
        return Err(TranscodeError::Ffmpeg(tail));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tolerates a missing ffmpeg binary: both a spawn failure and a
    // decode failure on garbage input are Errs.
    #[tokio::test]
    async fn test_garbage_input_fails() {
        let mut input = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut input, b"not audio at all").unwrap();

        let result = transcode_to_voice(input.path()).await;
        assert!(result.is_err());
    }
}

//! Serving policy for cached media: content type, disposition, byte ranges.
//!
//! Pure functions -- the HTTP layer applies the result to a response.
//! Only video is range-capable; a single `bytes=start-end` range is
//! honored, `end` defaulting to the last byte. Multiple or malformed
//! ranges yield [`RangeError`], which maps to 416.

use std::path::Path;

use chatgate_types::message::MessageType;

/// How a cached media file should be presented to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPolicy {
    pub content_type: String,
    pub disposition: Disposition,
    /// Whether `Range` requests are honored for this type.
    pub range_capable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment { filename: String },
}

/// Decide content type and disposition for a message's cached media.
pub fn policy_for(kind: MessageType, media_path: &Path) -> StreamPolicy {
    let filename = media_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match kind {
        // Voice notes are stored as opus-in-ogg regardless of origin.
        MessageType::Audio | MessageType::Ptt => StreamPolicy {
            content_type: "audio/ogg".to_string(),
            disposition: Disposition::Inline,
            range_capable: false,
        },
        MessageType::Image => StreamPolicy {
            content_type: mime_from_path(media_path, "image/jpeg"),
            disposition: Disposition::Inline,
            range_capable: false,
        },
        MessageType::Video => StreamPolicy {
            content_type: "video/mp4".to_string(),
            disposition: Disposition::Inline,
            range_capable: true,
        },
        MessageType::Document => StreamPolicy {
            content_type: mime_from_path(media_path, "application/octet-stream"),
            disposition: Disposition::Attachment { filename },
            range_capable: false,
        },
        MessageType::Chat | MessageType::Other => StreamPolicy {
            content_type: "application/octet-stream".to_string(),
            disposition: Disposition::Attachment { filename },
            range_capable: false,
        },
    }
}

fn mime_from_path(path: &Path, default: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(default)
        .to_string()
}

/// A resolved byte span within a file of known length. Inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the span (`Content-Length` of a 206 response).
    pub fn byte_len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a file of `file_size` bytes.
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Syntax we do not handle: non-byte units, suffix ranges, multiple
    /// ranges, or unparseable numbers.
    Malformed,
    /// Well-formed but outside the file.
    Unsatisfiable,
}

/// Parse a single `bytes=start-end` range header against a file size.
///
/// `end` defaults to `file_size - 1` when omitted and is clamped to the
/// last byte when it overshoots.
pub fn parse_range(header: &str, file_size: u64) -> Result<ByteRange, RangeError> {
    let spec = header
        .trim()
        .strip_prefix("bytes=")
        .ok_or(RangeError::Malformed)?;

    if spec.contains(',') {
        return Err(RangeError::Malformed);
    }

    let (start, end) = spec.split_once('-').ok_or(RangeError::Malformed)?;
    let start: u64 = start.trim().parse().map_err(|_| RangeError::Malformed)?;
    let end: u64 = if end.trim().is_empty() {
        file_size.saturating_sub(1)
    } else {
        end.trim().parse().map_err(|_| RangeError::Malformed)?
    };

    if file_size == 0 || start >= file_size || end < start {
        return Err(RangeError::Unsatisfiable);
    }

    Ok(ByteRange {
        start,
        end: end.min(file_size - 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bounded_range() {
        let r = parse_range("bytes=0-99", 1000).unwrap();
        assert_eq!(r, ByteRange { start: 0, end: 99 });
        assert_eq!(r.byte_len(), 100);
        assert_eq!(r.content_range(1000), "bytes 0-99/1000");
    }

    #[test]
    fn open_ended_range_defaults_to_last_byte() {
        let r = parse_range("bytes=500-", 1000).unwrap();
        assert_eq!(r, ByteRange { start: 500, end: 999 });
        assert_eq!(r.byte_len(), 500);
    }

    #[test]
    fn overshooting_end_clamps() {
        let r = parse_range("bytes=900-5000", 1000).unwrap();
        assert_eq!(r.end, 999);
    }

    #[test]
    fn malformed_ranges_rejected() {
        assert_eq!(parse_range("items=0-9", 1000), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=abc-", 1000), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=-500", 1000), Err(RangeError::Malformed));
        assert_eq!(
            parse_range("bytes=0-9,20-29", 1000),
            Err(RangeError::Malformed)
        );
    }

    #[test]
    fn out_of_file_ranges_unsatisfiable() {
        assert_eq!(
            parse_range("bytes=1000-", 1000),
            Err(RangeError::Unsatisfiable)
        );
        assert_eq!(
            parse_range("bytes=50-10", 1000),
            Err(RangeError::Unsatisfiable)
        );
        assert_eq!(parse_range("bytes=0-", 0), Err(RangeError::Unsatisfiable));
    }

    #[test]
    fn policy_table() {
        let ogg = PathBuf::from("/media/M1.ogg");
        let p = policy_for(MessageType::Ptt, &ogg);
        assert_eq!(p.content_type, "audio/ogg");
        assert_eq!(p.disposition, Disposition::Inline);
        assert!(!p.range_capable);

        let png = PathBuf::from("/media/M2.png");
        let p = policy_for(MessageType::Image, &png);
        assert_eq!(p.content_type, "image/png");

        let unknown = PathBuf::from("/media/M3.wexf");
        let p = policy_for(MessageType::Image, &unknown);
        assert_eq!(p.content_type, "image/jpeg");

        let mp4 = PathBuf::from("/media/M4.mp4");
        let p = policy_for(MessageType::Video, &mp4);
        assert_eq!(p.content_type, "video/mp4");
        assert!(p.range_capable);

        let pdf = PathBuf::from("/media/M5.pdf");
        let p = policy_for(MessageType::Document, &pdf);
        assert_eq!(p.content_type, "application/pdf");
        assert_eq!(
            p.disposition,
            Disposition::Attachment {
                filename: "M5.pdf".to_string()
            }
        );

        let bin = PathBuf::from("/media/M6.bin");
        let p = policy_for(MessageType::Other, &bin);
        assert_eq!(p.content_type, "application/octet-stream");
        assert!(matches!(p.disposition, Disposition::Attachment { .. }));
    }
}

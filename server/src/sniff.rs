//! Media type detection from file content.
//!
//! The file name and its extension are never looked at. Binary formats are
//! recognized by their magic numbers, anything that decodes as UTF-8 without
//! NUL bytes is plain text and everything else is an opaque byte stream.

/// How many leading bytes of a file are inspected.
pub const SNIFF_LEN: usize = 8 * 1024;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain";

#[must_use]
pub fn detect_media_type(head: &[u8]) -> &'static str {
    if head.is_empty() {
        return OCTET_STREAM;
    }
    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    if looks_like_text(head) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        // a multibyte sequence cut off by the sniff window is still text,
        // a file that simply ends mid-sequence is not
        Err(e) => e.error_len().is_none() && head.len() == SNIFF_LEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

    #[rstest]
    #[case(b"hello file", "text/plain")]
    #[case("파일 업로드".as_bytes(), "text/plain")]
    #[case(JPEG, "image/jpeg")]
    #[case(PNG, "image/png")]
    #[case(b"%PDF-1.7\n", "application/pdf")]
    #[case(&[0x00, 0x01, 0x02, 0x03], "application/octet-stream")]
    #[case(&[0xC3, 0x28, 0x41], "application/octet-stream")]
    #[case(b"", "application/octet-stream")]
    #[trace]
    fn detect_media_type_tests(#[case] head: &[u8], #[case] expected: &str) {
        // Act
        let media_type = detect_media_type(head);

        // Assert
        assert_eq!(media_type, expected);
    }

    #[test]
    fn truncated_multibyte_tail_is_text() {
        // Arrange
        let mut head = vec![b'a'; SNIFF_LEN - 1];
        head.push(0xEC);

        // Act
        let media_type = detect_media_type(&head);

        // Assert
        assert_eq!(media_type, TEXT_PLAIN);
    }

    #[test]
    fn short_file_ending_mid_sequence_is_binary() {
        // Arrange
        let head = [b'a', 0xEC];

        // Act
        let media_type = detect_media_type(&head);

        // Assert
        assert_eq!(media_type, OCTET_STREAM);
    }
}

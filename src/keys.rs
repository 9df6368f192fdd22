//! Object key conventions for the variant pipeline.
//!
//! Pure string functions with no AWS SDK dependency. These define how
//! notification keys are decoded, which keys are processable source
//! images, and where derived variants live.

/// Final extensions (lowercased) accepted as source images.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extension of generated variants. Variants land in the same bucket and
/// re-trigger the notification, so this extension is always skipped.
pub const VARIANT_EXTENSION: &str = "webp";

/// Classification of a decoded object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Process,
    Skip,
}

/// Decode a notification object key: `+` denotes space, percent-escapes
/// denote other characters. A key that fails percent-decoding (invalid
/// UTF-8) falls back to its plus-decoded form so classification stays
/// total.
pub fn decode_notification_key(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}

/// Decide whether a decoded key denotes a processable source image.
pub fn classify(key: &str) -> KeyClass {
    match final_extension(key) {
        Some(ext) if SOURCE_EXTENSIONS.contains(&ext.as_str()) => KeyClass::Process,
        _ => KeyClass::Skip,
    }
}

/// The key with its final extension removed. Only the final extension is
/// stripped (`a.b.c.jpeg` → `a.b.c`); keys without an extension in their
/// last path segment are returned unchanged.
pub fn strip_last_extension(key: &str) -> &str {
    let segment_start = key.rfind('/').map_or(0, |idx| idx + 1);
    match key.rfind('.') {
        Some(idx) if idx > segment_start => &key[..idx],
        _ => key,
    }
}

/// Storage key of the variant at `width` derived from `source_key`.
pub fn variant_key(source_key: &str, width: u32) -> String {
    format!(
        "{}/{}w.{}",
        strip_last_extension(source_key),
        width,
        VARIANT_EXTENSION
    )
}

fn final_extension(key: &str) -> Option<String> {
    let stem = strip_last_extension(key);
    if stem.len() == key.len() {
        None
    } else {
        Some(key[stem.len() + 1..].to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plus_and_percent_escapes() {
        assert_eq!(
            decode_notification_key("uploads/my+artwork%282%29.jpg"),
            "uploads/my artwork(2).jpg"
        );
        assert_eq!(decode_notification_key("plain/key.png"), "plain/key.png");
    }

    #[test]
    fn test_classify_source_extensions_case_insensitive() {
        assert_eq!(classify("uploads/a.jpg"), KeyClass::Process);
        assert_eq!(classify("uploads/a.JPEG"), KeyClass::Process);
        assert_eq!(classify("uploads/a.Png"), KeyClass::Process);
    }

    #[test]
    fn test_classify_skips_non_images() {
        assert_eq!(classify("uploads/notes.txt"), KeyClass::Skip);
        assert_eq!(classify("uploads/portfolio.pdf"), KeyClass::Skip);
        assert_eq!(classify("uploads/no-extension"), KeyClass::Skip);
    }

    #[test]
    fn test_classify_skips_generated_variants() {
        assert_eq!(classify("uploads/photo/400w.webp"), KeyClass::Skip);
        assert_eq!(classify("uploads/photo.WEBP"), KeyClass::Skip);
    }

    #[test]
    fn test_strip_last_extension_only_strips_final() {
        assert_eq!(strip_last_extension("my.complex.name.jpeg"), "my.complex.name");
        assert_eq!(strip_last_extension("uploads/photo.jpg"), "uploads/photo");
    }

    #[test]
    fn test_strip_last_extension_ignores_dots_in_directories() {
        assert_eq!(strip_last_extension("dir.v2/file"), "dir.v2/file");
        assert_eq!(strip_last_extension("dir/.hidden"), "dir/.hidden");
    }

    #[test]
    fn test_variant_key_derivation() {
        assert_eq!(
            variant_key("uploads/artists/7/photo.jpg", 400),
            "uploads/artists/7/photo/400w.webp"
        );
        assert_eq!(
            variant_key("my.complex.name.jpeg", 1200),
            "my.complex.name/1200w.webp"
        );
    }
}

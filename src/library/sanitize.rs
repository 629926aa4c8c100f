/// Title used when a raw name has no usable characters at all.
pub(super) const FALLBACK_TITLE: &str = "track";

/// Reduce an untrusted download name to a track title.
///
/// Only ASCII letters and digits survive, so the result never contains
/// whitespace, path separators or quotes. A name with nothing left becomes
/// `"track"`.
pub fn sanitize_title(raw: &str) -> String {
    let title: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

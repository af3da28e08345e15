//! Linux-safe path segment sanitization.

/// Maximum bytes in one path component (Linux NAME_MAX).
const NAME_MAX: usize = 255;

/// Sanitizes one decoded URL path segment for use as a directory or file name.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Limits length to 255 bytes, cutting on a char boundary
///
/// Dot segments are handled by the caller; this never produces `/`.
pub fn sanitize_segment_for_linux(segment: &str) -> String {
    let out: String = segment
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if out.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out[..take].to_string()
    } else {
        out
    }
}

/// Characters no filename may contain on any of the platforms we write to.
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const PLACEHOLDER: &str = "untitled";

/// Turns a snippet title into a name safe to use as a file stem.
///
/// Forbidden characters and control characters are dropped, spaces become
/// underscores. A title with nothing usable left maps to `"untitled"`.
pub fn sanitize(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !FORBIDDEN.contains(c) && !c.is_control())
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();

    if cleaned.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        cleaned
    }
}

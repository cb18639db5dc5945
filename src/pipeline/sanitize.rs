//! Removal of characters that are illegal in file names on common filesystems.

/// Characters stripped from every metadata field.
pub const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Remove every forbidden character, keeping all others in order.
pub fn sanitize(field: &str) -> String {
    field.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect()
}

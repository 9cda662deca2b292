//! Product handle (URL slug) generation

/// Derives a URL-safe handle from a product title.
///
/// Lower-cases the title, drops every character outside `[a-z0-9-]` and
/// whitespace, turns whitespace runs into a single `-`, collapses repeated
/// hyphens and trims hyphens from both ends. The function is pure: the same
/// title always yields the same handle.
pub fn generate_handle(title: &str) -> String {
    let mut handle = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !handle.is_empty() {
                handle.push('-');
            }
            pending_hyphen = false;
            handle.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
    }

    handle
}

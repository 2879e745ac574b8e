//! Filesystem-safe names.

/// Strip every character outside `[A-Za-z0-9]`.
///
/// Two different names may clean to the same token; callers add the
/// snapshot id to keep file names apart.
pub fn clean_name(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}

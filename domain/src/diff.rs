//! Helpers over unified diff text.

/// Paths of the files a unified diff touches, from its `+++ b/<path>` lines.
///
/// Deleted files (`+++ /dev/null`) are not listed.
pub fn extract_changed_files(diff: &str) -> Vec<String> {
    diff.lines()
        .filter_map(|line| line.strip_prefix("+++ b/"))
        .filter(|path| *path != "/dev/null")
        .map(str::to_string)
        .collect()
}

use regex::Regex;
use std::sync::LazyLock;

static PROJECT_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+$").expect("project name pattern is valid")
});

/// Project names become directory names under the memory bank, so anything
/// that could step outside of it is refused.
pub fn is_valid_project_name(name: &str) -> bool {
    PROJECT_NAME_REGEX.is_match(name)
}

//! Utility modules.

pub mod exec;
pub mod html;

/// Return "s" suffix for plural counts
///
/// - `plural_s(0)` -> `"s"` (0 urls)
/// - `plural_s(1)` -> `""` (1 url)
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, handling pluralization
///
/// - `plural_count(1, "action")` -> `"1 action"`
/// - `plural_count(5, "action")` -> `"5 actions"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}

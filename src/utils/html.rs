// src/utils/html.rs

/// Escapes user-controlled text for interpolation into an HTML page.
///
/// Every character with meaning in HTML is entity-encoded, so submitted
/// answers such as `<b>Paris</b>` render literally.
pub fn escape_text(input: &str) -> String {
    ammonia::clean_text(input)
}

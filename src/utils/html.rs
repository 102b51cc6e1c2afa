use ammonia;

/// Whitelist-based sanitization of admin-entered rich text (subject
/// descriptions). Strips script/iframe tags and event-handler attributes
/// while keeping basic formatting.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

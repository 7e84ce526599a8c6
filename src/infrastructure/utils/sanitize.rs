use std::collections::HashSet;

use ammonia::Builder;

/// Escapes a value for insertion into an HTML body. Every `<`, `>`, `&` and
/// quote is turned into an entity, so nothing the submitter typed can become markup.
pub fn escape_html(value: &str) -> String {
    ammonia::clean_text(value)
}

/// Removes all tags from a value while keeping its text, for plain-text bodies.
pub fn strip_markup(value: &str) -> String {
    let mut builder = Builder::empty();
    builder.clean_content_tags(HashSet::from(["script", "style"]));
    let cleaned = builder.clean(value).to_string();
    decode_basic_entities(&cleaned)
}

/// Undo the entity escaping ammonia applies when it serializes text nodes.
fn decode_basic_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

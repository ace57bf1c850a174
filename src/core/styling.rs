/// Rich-text styling applied to a node's body before it is revealed.

use crate::core::store::VariableStore;
use crate::schema::settings::DialogueSettings;

/// Wrap `text` in the tags its settings ask for.
///
/// Order, innermost first: bold, italic, underline, color, font. The
/// boolean styles apply when they resolve true (whether or not they are
/// active); color and font apply only when active.
pub fn styled_text(text: &str, settings: &DialogueSettings, store: &VariableStore) -> String {
    let mut out = text.to_string();

    if settings.bold.resolve(store) {
        out = format!("<b>{}</b>", out);
    }
    if settings.italic.resolve(store) {
        out = format!("<i>{}</i>", out);
    }
    if settings.underline.resolve(store) {
        out = format!("<u>{}</u>", out);
    }
    if let Some(color) = settings.color.resolve_active(store) {
        out = format!("<color=#{}>{}</color>", color.to_hex(), out);
    }
    if let Some(font) = settings.font.resolve_active(store) {
        out = format!("<font=\"{}\">{}</font>", font, out);
    }

    out
}

/// Remove color tags, for hosts drawing a text shadow under colored text.
pub fn strip_color_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find('>') {
            Some(end) if is_color_tag(&tail[1..end]) => rest = &tail[end + 1..],
            _ => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_color_tag(inner: &str) -> bool {
    let name = inner.strip_prefix('/').unwrap_or(inner);
    let lower = name.to_ascii_lowercase();
    lower == "color" || lower.starts_with("color=")
}

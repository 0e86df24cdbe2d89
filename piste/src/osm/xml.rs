//! Just enough XML to pull attributes out of single OSM element
//! lines such as `<tag k="piste:type" v="downhill"/>`.

use std::borrow::Cow;

/// Returns the value of attribute `key` on `line`, if present.
///
/// Both quote styles are accepted, as JOSM writes single quotes and
/// osmium/Overpass write double quotes.
pub fn attr<'l>(line: &'l str, key: &str) -> Option<Cow<'l, str>> {
    let mut offset = 0;
    while let Some(idx) = line[offset..].find(key) {
        let start = offset + idx;
        let end = start + key.len();
        offset = end;

        let preceded_by_space = line[..start]
            .chars()
            .next_back()
            .map_or(false, char::is_whitespace);
        if !preceded_by_space {
            continue;
        }
        let Some(after_eq) = line[end..].strip_prefix('=') else {
            continue;
        };
        let quote = match after_eq.chars().next() {
            Some(quote @ ('"' | '\'')) => quote,
            _ => continue,
        };
        let value = &after_eq[1..];
        let close = value.find(quote)?;
        return Some(unescape(&value[..close]));
    }
    None
}

/// Returns true if `line` opens element `name`, e.g. `<way id=...>`.
pub fn opens(line: &str, name: &str) -> bool {
    line.strip_prefix('<')
        .and_then(|rest| rest.strip_prefix(name))
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_whitespace() || c == '>' || c == '/')
}

/// Returns true if `line` closes element `name`, e.g. `</way>`.
pub fn closes(line: &str, name: &str) -> bool {
    line.strip_prefix("</")
        .and_then(|rest| rest.strip_prefix(name))
        .map_or(false, |rest| rest.trim_start().starts_with('>'))
}

/// Returns true if the element on `line` has no body.
pub fn self_closing(line: &str) -> bool {
    line.trim_end().ends_with("/>")
}

fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&"),
    )
}

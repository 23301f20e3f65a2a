//! Legacy Animation Markup
//!
//! Older tilesets store animation as one `ANIM` property whose value is an
//! escaped element: `<anim ms="50" nextx="1" nexty="0" tileset=""/>`.
//! This adapter turns it into the same fields the current schema uses.

use crate::tile::error::PropertyError;

/// Fields carried by a legacy `<anim/>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimMarkup {
    pub ms: u32,
    pub next_x: i32,
    pub next_y: i32,
    /// Target tileset; `None` when empty (same tileset)
    pub tileset: Option<String>,
}

/// Parse a legacy `<anim .../>` value, escaped or not.
pub fn parse_anim_markup(raw: &str) -> Result<AnimMarkup, PropertyError> {
    let malformed = |why: &str| PropertyError::MalformedAnimMarkup(format!("{why}: {raw}"));

    let text = unescape(raw);
    let body = text
        .trim()
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| malformed("not an element"))?;
    let body = body.strip_suffix('/').unwrap_or(body).trim();

    let (tag, mut rest) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], &body[split..]),
        None => (body, ""),
    };
    if !tag.eq_ignore_ascii_case("anim") {
        return Err(malformed("expected <anim>"));
    }

    let mut markup = AnimMarkup::default();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let eq = rest.find('=').ok_or_else(|| malformed("attribute without value"))?;
        let key = rest[..eq].trim().to_ascii_lowercase();
        rest = rest[eq + 1..].trim_start();

        let quote = rest
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| malformed("unquoted attribute"))?;
        rest = &rest[1..];
        let close = rest.find(quote).ok_or_else(|| malformed("unterminated attribute"))?;
        let value = &rest[..close];
        rest = &rest[close + 1..];

        let int = |v: &str| v.trim().parse::<i64>().map_err(|_| malformed("non-integer attribute"));
        match key.as_str() {
            "ms" => {
                markup.ms = u32::try_from(int(value)?).map_err(|_| malformed("negative duration"))?
            }
            "nextx" => markup.next_x = offset(&key, value, int(value)?)?,
            "nexty" => markup.next_y = offset(&key, value, int(value)?)?,
            "tileset" => {
                let value = value.trim();
                markup.tileset = (!value.is_empty()).then(|| value.to_string());
            }
            // Unknown attributes are ignored; the element is otherwise usable.
            _ => {}
        }
    }

    Ok(markup)
}

/// Frame offsets must fit the same range the current schema accepts.
fn offset(key: &str, raw: &str, value: i64) -> Result<i32, PropertyError> {
    i32::try_from(value).map_err(|_| PropertyError::InvalidInteger {
        name: key.to_string(),
        value: raw.trim().to_string(),
    })
}

/// Decode the handful of XML entities legacy exports produce.
fn unescape(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_escaped_markup() {
        let raw = "&lt;anim ms=&quot;50&quot; nextx=&quot;-4&quot; nexty=&quot;0&quot; tileset=&quot;&quot;/&gt;";
        let markup = parse_anim_markup(raw).unwrap();
        assert_eq!(
            markup,
            AnimMarkup { ms: 50, next_x: -4, next_y: 0, tileset: None }
        );
    }

    #[test]
    fn test_parse_plain_markup() {
        let markup = parse_anim_markup(r#"<ANIM ms="120" nexty='1' tileset="water"/>"#).unwrap();
        assert_eq!(markup.ms, 120);
        assert_eq!(markup.next_x, 0);
        assert_eq!(markup.next_y, 1);
        assert_eq!(markup.tileset.as_deref(), Some("water"));
    }

    #[test]
    fn test_reject_malformed() {
        assert!(parse_anim_markup("anim ms=50").is_err());
        assert!(parse_anim_markup(r#"<frame ms="50"/>"#).is_err());
        assert!(parse_anim_markup(r#"<anim ms="fast"/>"#).is_err());
        assert!(parse_anim_markup(r#"<anim ms="50/>"#).is_err());
        assert!(parse_anim_markup(r#"<anim ms=50/>"#).is_err());
    }

    #[test]
    fn test_out_of_range_offset_is_reported() {
        let error = parse_anim_markup(r#"<anim ms="50" nextx="4294967297" nexty="0"/>"#).unwrap_err();
        assert_eq!(
            error,
            PropertyError::InvalidInteger { name: "nextx".into(), value: "4294967297".into() }
        );
        assert!(parse_anim_markup(r#"<anim ms="50" nexty="-2147483649"/>"#).is_err());
        assert_eq!(parse_anim_markup(r#"<anim ms="50" nexty="-2147483648"/>"#).unwrap().next_y, i32::MIN);
    }
}

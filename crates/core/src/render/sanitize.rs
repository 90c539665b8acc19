//! Allow-list HTML sanitizer for the markup render path.
//!
//! Workflow outputs are untrusted; this is the one place their content
//! reaches a rendering surface as markup, so neutralization happens here,
//! inside the engine, not in the caller. Script-executing constructs,
//! event-handler attributes, and non-allow-listed tags are stripped before
//! a [`Markup`](super::plan::RenderPlan::Markup) plan is ever built.

use std::sync::LazyLock;

use regex::Regex;

/// Tags that survive sanitization. Everything else is dropped (the tag
/// only; its inner text is kept).
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "strong", "i", "em", "u", "s", "p", "br", "hr", "ul", "ol", "li", "h1", "h2", "h3",
    "h4", "h5", "h6", "table", "thead", "tbody", "tr", "th", "td", "code", "pre", "blockquote",
    "span", "div", "img",
];

/// Attributes that survive on allowed tags. Event handlers (`on*`) are
/// rejected by name prefix before this list is even consulted.
const ALLOWED_ATTRS: &[&str] = &["href", "src", "alt", "title", "colspan", "rowspan"];

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_][a-zA-Z0-9_:.-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#)
        .expect("valid regex")
});

/// Sanitize an untrusted HTML fragment.
///
/// - `<script>` and `<style>` blocks are removed wholesale, content
///   included.
/// - Tags outside [`ALLOWED_TAGS`] are stripped; their text content stays.
/// - `on*` attributes and attributes outside [`ALLOWED_ATTRS`] are
///   dropped; `href`/`src` values with a `javascript:` scheme are dropped.
/// - A `<` that does not open a tag (comparisons, emoticons, comments) is
///   escaped to `&lt;`.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let Some(offset) = input[i..].find('<') else {
            out.push_str(&input[i..]);
            break;
        };
        out.push_str(&input[i..i + offset]);
        let tag_start = i + offset;
        let rest = &input[tag_start..];

        // Script and style blocks are dangerous as a whole, not just as
        // tags; drop everything through the matching close tag.
        if let Some(next) = skip_block(rest, "script").or_else(|| skip_block(rest, "style")) {
            i = tag_start + next;
            continue;
        }

        let Some(gt) = rest.find('>') else {
            out.push_str("&lt;");
            i = tag_start + 1;
            continue;
        };
        let body = &rest[1..gt];
        let closing = body.starts_with('/');
        let name_part = if closing { &body[1..] } else { body };
        let name: String = name_part
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        // Tag names start with a letter; "<3" or "<-" is plain text.
        if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            // Not a tag (comparison operator, emoticon, comment); escape
            // the bracket and keep scanning after it.
            out.push_str("&lt;");
            i = tag_start + 1;
            continue;
        }

        i = tag_start + gt + 1;
        if !ALLOWED_TAGS.contains(&name.as_str()) {
            continue; // tag dropped; scanning resumes at its inner text
        }

        if closing {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        } else {
            out.push('<');
            out.push_str(&name);
            let attrs = &name_part[name.len()..];
            write_attributes(&mut out, attrs);
            if attrs.trim_end().ends_with('/') {
                out.push_str(" /");
            }
            out.push('>');
        }
    }

    out
}

/// If `rest` opens the named block tag, return the offset just past its
/// closing tag (or the end of input when unterminated).
fn skip_block(rest: &str, tag: &str) -> Option<usize> {
    let open = format!("<{tag}");
    if !starts_with_ci(rest, &open) {
        return None;
    }
    // The tag name must end here; "<scripty>" is not a script block.
    let delimited = rest
        .as_bytes()
        .get(open.len())
        .is_some_and(|b| matches!(b, b'>' | b'/') || b.is_ascii_whitespace());
    if !delimited {
        return None;
    }
    let close = format!("</{tag}");
    let lower = rest.to_ascii_lowercase();
    match lower.find(&close) {
        Some(pos) => match lower[pos..].find('>') {
            Some(end) => Some(pos + end + 1),
            None => Some(rest.len()),
        },
        None => Some(rest.len()),
    }
}

fn starts_with_ci(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Parse and re-emit the attribute list, keeping only safe entries.
fn write_attributes(out: &mut String, attrs: &str) {
    for capture in ATTR_RE.captures_iter(attrs) {
        let attr_name = capture[1].to_ascii_lowercase();
        if attr_name.starts_with("on") || !ALLOWED_ATTRS.contains(&attr_name.as_str()) {
            continue;
        }
        let value = capture
            .get(2)
            .or_else(|| capture.get(3))
            .or_else(|| capture.get(4))
            .map(|m| m.as_str());

        match value {
            Some(v) => {
                if (attr_name == "href" || attr_name == "src") && has_script_scheme(v) {
                    continue;
                }
                out.push(' ');
                out.push_str(&attr_name);
                out.push_str("=\"");
                out.push_str(&v.replace('"', "&quot;"));
                out.push('"');
            }
            None => {
                out.push(' ');
                out.push_str(&attr_name);
            }
        }
    }
}

/// Scheme check resilient to embedded whitespace/control characters
/// (`java\nscript:` tricks) and HTML character references
/// (`&#106;avascript:`), which browsers decode in attribute values.
fn has_script_scheme(value: &str) -> bool {
    let compact: String = decode_char_refs(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:") || compact.starts_with("vbscript:") || compact.starts_with("data:text/html")
}

/// Decode the character references that matter for scheme smuggling:
/// numeric references (with or without the trailing semicolon, as
/// browsers accept both in attribute values) and the handful of named
/// references that yield scheme-relevant characters. Unrecognized
/// references pass through untouched.
fn decode_char_refs(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        if let Some(after_hash) = rest.strip_prefix('#') {
            let (radix, body) = match after_hash.strip_prefix(['x', 'X']) {
                Some(hex) => (16u32, hex),
                None => (10u32, after_hash),
            };
            let digits = body
                .bytes()
                .take_while(|b| (*b as char).is_digit(radix))
                .count();
            if digits == 0 {
                out.push('&');
                continue;
            }
            if let Some(c) = u32::from_str_radix(&body[..digits], radix)
                .ok()
                .and_then(char::from_u32)
            {
                out.push(c);
            }
            rest = body[digits..].strip_prefix(';').unwrap_or(&body[digits..]);
        } else {
            // Named references only decode with a semicolon.
            let named = rest.find(';').filter(|&s| s > 0).and_then(|s| {
                let c = match rest[..s].to_ascii_lowercase().as_str() {
                    "colon" => ':',
                    "tab" => '\t',
                    "newline" => '\n',
                    "sol" => '/',
                    _ => return None,
                };
                Some((c, s))
            });
            match named {
                Some((c, s)) => {
                    out.push(c);
                    rest = &rest[s + 1..];
                }
                None => out.push('&'),
            }
        }
    }

    out.push_str(rest);
    out
}

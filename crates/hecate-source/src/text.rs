/// Longest entity name (between `&` and `;`) worth looking at
const MAX_ENTITY_LEN: usize = 10;

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "hellip" => '\u{2026}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "euro" => '\u{20AC}',
        "pound" => '\u{00A3}',
        "deg" => '\u{00B0}',
        "times" => '\u{00D7}',
        _ => return None,
    })
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity.strip_prefix('#') {
        Some(num) => {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
        None => named_entity(entity),
    }
}

/// Undo the HTML entity escaping the source applies to post text
///
/// Decodes numeric references (`&#8217;`, `&#x27;`) and common named ones in
/// a single pass, so `&amp;lt;` decodes to `&lt;` and not `<`. Anything
/// unrecognized is kept as is.
pub fn unescape_html(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        ret.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];

        let decoded = tail
            .char_indices()
            .take(MAX_ENTITY_LEN + 1)
            .find(|(_, c)| *c == ';')
            .and_then(|(semi, _)| Some((decode_entity(&tail[..semi])?, semi)));

        match decoded {
            Some((c, semi)) => {
                ret.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                ret.push('&');
                rest = tail;
            }
        }
    }
    ret.push_str(rest);
    ret
}

/// At most `max_chars` characters of `s`, never splitting a character
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_handles_common_entities() {
        assert_eq!(
            unescape_html("Tom &amp; Jerry &lt;3 &quot;hi&quot; it&#39;s it&#x27;s&nbsp;ok"),
            "Tom & Jerry <3 \"hi\" it's it's ok"
        );
    }

    #[test]
    fn unescape_does_not_double_decode() {
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn unescape_decodes_numeric_references() {
        assert_eq!(unescape_html("It&#8217;s"), "It\u{2019}s");
        assert_eq!(unescape_html("&#x1F600; &#X41;"), "\u{1F600} A");
        assert_eq!(unescape_html("a &mdash; b&hellip;"), "a \u{2014} b\u{2026}");
    }

    #[test]
    fn unescape_keeps_unrecognized_text() {
        assert_eq!(unescape_html("AT&T"), "AT&T");
        assert_eq!(unescape_html("a & b; c"), "a & b; c");
        assert_eq!(unescape_html("&bogus; &#xD800; &#;"), "&bogus; &#xD800; &#;");
        assert_eq!(unescape_html("trailing &"), "trailing &");
        assert_eq!(unescape_html("&&amp;"), "&&");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("żółw", 2), "żó");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }
}

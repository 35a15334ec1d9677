//! # Markup Tokenizer
//!
//! Tolerant tokenizer for the HTML fragments a storefront page and its
//! reply endpoints produce. Tokens borrow their source text so the page
//! model can write untouched tags back out byte-for-byte.

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is text up to the matching close tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// A single lexical unit of markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
        source: &'a str,
    },
    EndTag {
        name: String,
        source: &'a str,
    },
    /// Raw text, entities still encoded
    Text(&'a str),
    /// Comments, doctype and processing instructions, kept verbatim
    Comment(&'a str),
}

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// Split markup into tokens. Never fails: anything that does not form a
/// tag is kept as text.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map_or(rest.len(), |i| i + 3);
            tokens.push(Token::Comment(&rest[..end]));
            pos += end;
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').map_or(rest.len(), |i| i + 1);
            tokens.push(Token::Comment(&rest[..end]));
            pos += end;
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            if let Some(end) = after.find('>') {
                let name = after[..end].trim();
                if is_tag_name(name) {
                    tokens.push(Token::EndTag {
                        name: name.to_ascii_lowercase(),
                        source: &rest[..end + 3],
                    });
                    pos += end + 3;
                    continue;
                }
            }
        }

        if rest.len() > 1 && rest.starts_with('<') && rest.as_bytes()[1].is_ascii_alphabetic() {
            if let Some((token, consumed)) = start_tag(rest) {
                let raw_text = match &token {
                    Token::StartTag {
                        name, self_closing, ..
                    } if !*self_closing && is_raw_text_element(name) => Some(name.clone()),
                    _ => None,
                };
                tokens.push(token);
                pos += consumed;

                if let Some(name) = raw_text {
                    let body = &input[pos..];
                    let close = format!("</{name}");
                    let end = body
                        .to_ascii_lowercase()
                        .find(&close)
                        .unwrap_or(body.len());
                    if end > 0 {
                        tokens.push(Token::Text(&body[..end]));
                    }
                    pos += end;
                }
                continue;
            }
        }

        let first = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
        tokens.push(Token::Text(&rest[..end]));
        pos += end;
    }

    tokens
}

fn is_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name.as_bytes()[0].is_ascii_alphabetic()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b':')
}

/// Parse a start tag at the beginning of `input`. Returns the token and the
/// number of bytes consumed, or `None` when the tag is unterminated.
fn start_tag(input: &str) -> Option<(Token<'_>, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 1;

    while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':') {
        i += 1;
    }
    let name = input[1..i].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            return None;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                i += 2;
                break;
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < len
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if name_start == i {
            i += 1;
            continue;
        }
        let attr_name = input[name_start..i].to_ascii_lowercase();

        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= len {
                return None;
            }
            if bytes[i] == b'"' || bytes[i] == b'\'' {
                let quote = bytes[i] as char;
                let close = input[i + 1..].find(quote)?;
                value = unescape(&input[i + 1..i + 1 + close]);
                i += close + 2;
            } else {
                let value_start = i;
                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = unescape(&input[value_start..i]);
            }
        }

        attributes.push((attr_name, value));
    }

    Some((
        Token::StartTag {
            name,
            attributes,
            self_closing,
            source: &input[..i],
        },
        i,
    ))
}

/// Decode character references in text or attribute values
pub fn unescape(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Escape text content for inclusion in markup
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a value for a double-quoted attribute
pub fn escape_attribute(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attributes: &[(&str, &str)], source: &'static str) -> Token<'static> {
        Token::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing: false,
            source,
        }
    }

    #[test]
    fn tokenize_should_split_tags_and_text() {
        let tokens = tokenize(r#"<div class="a">hi</div>"#);

        assert_eq!(
            tokens,
            vec![
                start("div", &[("class", "a")], r#"<div class="a">"#),
                Token::Text("hi"),
                Token::EndTag {
                    name: "div".to_string(),
                    source: "</div>",
                },
            ]
        );
    }

    #[test]
    fn tokenize_should_accept_unquoted_and_bare_attributes() {
        let tokens = tokenize("<textarea id=r1 required></textarea>");

        assert_eq!(
            tokens[0],
            start(
                "textarea",
                &[("id", "r1"), ("required", "")],
                "<textarea id=r1 required>"
            )
        );
    }

    #[test]
    fn tokenize_should_keep_raw_text_element_content_as_text() {
        let tokens = tokenize("<textarea>a <b>bold</b> claim</textarea>");

        assert_eq!(tokens[1], Token::Text("a <b>bold</b> claim"));
        assert_eq!(
            tokens[2],
            Token::EndTag {
                name: "textarea".to_string(),
                source: "</textarea>",
            }
        );
    }

    #[test]
    fn tokenize_should_treat_stray_angle_brackets_as_text() {
        let tokens = tokenize("1 < 2 and </ 3");

        let text: String = tokens
            .iter()
            .map(|t| match t {
                Token::Text(s) => *s,
                _ => "",
            })
            .collect();
        assert_eq!(text, "1 < 2 and </ 3");
    }

    #[test]
    fn tokenize_should_keep_comments_verbatim() {
        let tokens = tokenize("<!-- note --><br/>");

        assert_eq!(tokens[0], Token::Comment("<!-- note -->"));
        assert!(matches!(
            tokens[1],
            Token::StartTag {
                self_closing: true,
                ..
            }
        ));
    }

    #[test]
    fn tokenize_should_split_text_on_char_boundaries() {
        let tokens = tokenize("<p>¡Gracias!</p>");
        assert_eq!(tokens[1], Token::Text("¡Gracias!"));

        let tokens = tokenize("感谢 <b>x</b>");
        assert_eq!(tokens[0], Token::Text("感谢 "));

        assert_eq!(tokenize("é"), vec![Token::Text("é")]);
    }

    #[test]
    fn tokenize_should_keep_end_tag_source() {
        let tokens = tokenize("<P>Hi</P >");

        assert_eq!(
            tokens[2],
            Token::EndTag {
                name: "p".to_string(),
                source: "</P >",
            }
        );
    }

    #[test]
    fn unescape_should_decode_named_and_numeric_references() {
        assert_eq!(unescape("a &amp; b &lt;c&gt; &#39;d&#x27;"), "a & b <c> 'd'");
        assert_eq!(unescape("AT&T & friends"), "AT&T & friends");
    }

    #[test]
    fn escape_should_be_reversible() {
        let text = r#"<script>alert("x") & more</script>"#;

        assert_eq!(unescape(&escape_text(text)), text);
        assert_eq!(unescape(&escape_attribute(text)), text);
        assert!(!escape_attribute(text).contains('"'));
    }
}

//! Greedy word wrap for text blocks.

/// Break marker emitted between wrapped lines and paragraphs.
pub const LINE_BREAK: &str = "\n";

/// Wraps `text` so no line exceeds `max_chars_per_line` characters.
///
/// Existing breaks (`\n`, `\r\n` and `<br>` markup) split the input into
/// paragraphs which are wrapped independently and joined again with
/// [`LINE_BREAK`]; empty paragraphs are kept. Words are never split, so a
/// word longer than the limit ends up alone on an overlong line. Width is
/// counted in characters, not bytes.
pub fn wrap_text(text: &str, max_chars_per_line: usize) -> String {
    normalize_breaks(text)
        .split('\n')
        .map(|paragraph| wrap_paragraph(paragraph, max_chars_per_line))
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

fn wrap_paragraph(paragraph: &str, max: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in paragraph.split(' ') {
        let word_len = word.chars().count();
        let test_len = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if test_len > max && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = test_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join(LINE_BREAK)
}

/// Rewrites `\r\n` and `<br>`, `<br/>`, `<br />` (any case) as `\n`.
fn normalize_breaks(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match break_tag_len(tail) {
            Some(len) => {
                out.push('\n');
                rest = &tail[len..];
            }
            None => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte length of a `<br>` tag at the start of `s`, if there is one.
fn break_tag_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() < 4 || !bytes[1].eq_ignore_ascii_case(&b'b') || !bytes[2].eq_ignore_ascii_case(&b'r') {
        return None;
    }
    let mut i = 3;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'/' {
        i += 1;
    }
    (i < bytes.len() && bytes[i] == b'>').then_some(i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(wrap_text("aaaa bbbb cccc dddd", 9), "aaaa bbbb\ncccc dddd");
    }

    #[test]
    fn never_splits_a_word() {
        assert_eq!(
            wrap_text("supercalifragilisticexpialidocious", 10),
            "supercalifragilisticexpialidocious"
        );
        assert_eq!(wrap_text("ab supercalifragilistic cd", 10), "ab\nsupercalifragilistic\ncd");
    }

    #[test]
    fn no_line_exceeds_limit_unless_single_word() {
        let text = "El presidente anunció hoy nuevas medidas económicas para la región andina";
        for line in wrap_text(text, 20).split(LINE_BREAK) {
            assert!(line.chars().count() <= 20 || !line.contains(' '), "{line:?}");
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(wrap_text("ñañá ñoño", 9), "ñañá ñoño");
    }

    #[test]
    fn keeps_empty_paragraphs() {
        assert_eq!(wrap_text("uno\n\ndos", 80), "uno\n\ndos");
        assert_eq!(wrap_text("\n", 80), "\n");
    }

    #[test]
    fn break_markup_splits_paragraphs() {
        assert_eq!(wrap_text("uno<br>dos<BR/>tres<br />cuatro", 80), "uno\ndos\ntres\ncuatro");
        assert_eq!(wrap_text("a\r\nb", 80), "a\nb");
        assert_eq!(wrap_text("a <b>c</b>", 80), "a <b>c</b>");
    }

    #[test]
    fn wrapping_is_idempotent() {
        let once = wrap_text("aaaa bbbb cccc dddd eeee", 9);
        assert_eq!(wrap_text(&once, 9), once);
    }
}

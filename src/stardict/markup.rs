//! Markup stripping for HTML, Pango and XDXF entries.

/// Removes `<...>` tags from `text`.
///
/// A `<br` tag followed by a space or `>` becomes a newline, matched without
/// regard to case. Everything between `<` and `>` is dropped; there is no
/// entity decoding.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    // Progress through "<br": 1 after '<', 2 after 'b', 3 after 'r'.
    let mut br = 0u8;

    for ch in text.chars() {
        if in_tag {
            br = match (br, ch) {
                (1, 'b' | 'B') => 2,
                (2, 'r' | 'R') => 3,
                (3, ' ' | '>') => {
                    out.push('\n');
                    0
                }
                _ => 0,
            };
        }

        match ch {
            '<' => {
                in_tag = true;
                br = 1;
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    out
}

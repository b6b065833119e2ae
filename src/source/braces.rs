/// Find the `}` matching the `{` at byte offset `open`.
///
/// Depth starts at 1 on the opening brace and is adjusted for every brace
/// that follows. Returns `None` if `open` is not a `{` or the text ends
/// before the depth returns to zero.
///
/// Braces inside string literals and comments are counted like any other;
/// generated Android sources do not put unbalanced braces there.
pub fn match_delimiter(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 1usize;
    for (i, b) in bytes.iter().enumerate().skip(open + 1) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

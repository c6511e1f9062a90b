/// Unicode space separators (Zs, Zl, Zp). Control whitespace such as tab is not a word break.
fn is_space_separator(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' | '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

// One char in, one char out: a mapping with no single-char form keeps the original.
fn upper(c: char) -> char {
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn lower(c: char) -> char { c.to_lowercase().next().unwrap_or(c) }

/// Upper-case the first letter of every space-separated word, lower-case the rest.
pub fn initcap(val: &str) -> String {
    let mut out = String::with_capacity(val.len());
    let mut word_starts = true;
    for c in val.chars() {
        if is_space_separator(c) {
            out.push(c);
            word_starts = true;
        } else if word_starts {
            out.push(upper(c));
            word_starts = false;
        } else {
            out.push(lower(c));
        }
    }
    out
}

/*!
 * Text measurement and encoding for the built-in Helvetica font.
 *
 * The renderer only uses the standard Type1 Helvetica with WinAnsiEncoding, so
 * no font file is embedded. Widths are the Helvetica AFM advance widths in
 * 1/1000 em; characters without a WinAnsi code are drawn as '?'.
 */

const FALLBACK_WIDTH: u16 = 556;

// Advance widths for the printable ASCII range 0x20..=0x7E
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

// WinAnsi code points 0x80..=0x9F that differ from Latin-1
const WIN_ANSI_SPECIALS: &[(char, u8)] = &[
    ('€', 0x80), ('‚', 0x82), ('ƒ', 0x83), ('„', 0x84), ('…', 0x85), ('†', 0x86),
    ('‡', 0x87), ('ˆ', 0x88), ('‰', 0x89), ('Š', 0x8A), ('‹', 0x8B), ('Œ', 0x8C),
    ('Ž', 0x8E), ('‘', 0x91), ('’', 0x92), ('“', 0x93), ('”', 0x94), ('•', 0x95),
    ('–', 0x96), ('—', 0x97), ('˜', 0x98), ('™', 0x99), ('š', 0x9A), ('›', 0x9B),
    ('œ', 0x9C), ('ž', 0x9E), ('Ÿ', 0x9F),
];

/// WinAnsi byte for a character, if the font can draw it
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{A0}'..='\u{FF}' => Some(c as u32 as u8),
        _ => WIN_ANSI_SPECIALS.iter().find(|(special, _)| *special == c).map(|(_, b)| *b),
    }
}

/// Encode text for a WinAnsi string operand, replacing unsupported characters with '?'
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

/// Advance width of a character in points
pub fn char_width(c: char, font_size: f32) -> f32 {
    let units = match c {
        ' '..='~' => HELVETICA_ASCII_WIDTHS[(c as usize) - 0x20],
        _ => FALLBACK_WIDTH,
    };
    f32::from(units) * font_size / 1000.0
}

/// Width of a single-line string in points
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font_size)).sum()
}

/// Replace tabs with spaces and drop control characters other than newlines
pub fn sanitize_text(text: &str) -> String {
    let mut clean = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => clean.push_str("    "),
            '\n' => clean.push('\n'),
            c if c.is_control() => {}
            c => clean.push(c),
        }
    }
    clean
}

/// Wrap text into lines no wider than `max_width`.
///
/// Newlines start a new line, blank lines are kept, and a word wider than a
/// whole line is broken between characters. Blank text yields no line at all.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let text = sanitize_text(text);
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font_size) <= max_width {
                current = word.to_string();
                continue;
            }

            // Break the oversized word, keeping the tail as the start of the next line
            for c in word.chars() {
                if !current.is_empty() && text_width(&current, font_size) + char_width(c, font_size) > max_width {
                    lines.push(std::mem::take(&mut current));
                }
                current.push(c);
            }
        }
        lines.push(current);
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Heuristic token count for arbitrary text.
///
/// CJK characters count one token each, every three ASCII letters one token, every two other
/// characters one token. Each class is floored on its own. The result is the larger of that sum
/// and the whitespace word count, so neither dense non-Latin prose nor word-heavy code is
/// underestimated.
pub fn estimate_tokens(text: &str) -> usize {
    let mut cjk = 0usize;
    let mut ascii_letters = 0usize;
    let mut other = 0usize;

    for c in text.chars() {
        if is_cjk(c) {
            cjk += 1;
        } else if c.is_ascii_alphabetic() {
            ascii_letters += 1;
        } else {
            other += 1;
        }
    }

    let weighted = cjk + ascii_letters / 3 + other / 2;
    let words = text.split_whitespace().count();

    weighted.max(words)
}

/// Characters whose Unicode script is Hiragana, Katakana or Han (Unicode 15.0 script tables).
///
/// Shared marks such as the prolonged sound mark U+30FC, the middle dot U+30FB and the combining
/// voiced marks U+3099..U+309C are Common/Inherited and count as "other".
fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        // Hiragana
        0x3041..=0x3096
            | 0x309D..=0x309F
            | 0x1B132
            | 0x1B150..=0x1B152
            | 0x1F200
            // Katakana
            | 0x30A1..=0x30FA
            | 0x30FD..=0x30FF
            | 0x31F0..=0x31FF
            | 0x32D0..=0x32FE
            | 0x3300..=0x3357
            | 0xFF66..=0xFF6F
            | 0xFF71..=0xFF9D
            | 0x1AFF0..=0x1AFF3
            | 0x1AFF5..=0x1AFFB
            | 0x1AFFD..=0x1AFFE
            | 0x1B000..=0x1B11F
            | 0x1B120..=0x1B122
            | 0x1B155
            | 0x1B164..=0x1B167
            // Han
            | 0x2E80..=0x2E99
            | 0x2E9B..=0x2EF3
            | 0x2F00..=0x2FD5
            | 0x3005
            | 0x3007
            | 0x3021..=0x3029
            | 0x3038..=0x303B
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xF900..=0xFA6D
            | 0xFA70..=0xFAD9
            | 0x16FE2..=0x16FE3
            | 0x16FF0..=0x16FF1
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2B739
            | 0x2B740..=0x2B81D
            | 0x2B820..=0x2CEA1
            | 0x2CEB0..=0x2EBE0
            | 0x2F800..=0x2FA1D
            | 0x30000..=0x3134A
            | 0x31350..=0x323AF
    )
}

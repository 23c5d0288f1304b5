//! Helvetica metrics and greedy word wrapping.
//!
//! Both sinks draw with the built-in Helvetica faces, which ship no metrics
//! of their own. Widths come from the standard Adobe font metrics for
//! printable ASCII; accented Latin letters measure as their base letter and
//! anything else as a full em.

const MM_PER_PT: f32 = 25.4 / 72.0;
const LINE_SPACING: f32 = 1.15;
const FALLBACK_WIDTH: u16 = 1000;

/// Glyph widths in 1/1000 em for `' '..='~'`, Helvetica.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Glyph widths in 1/1000 em for `' '..='~'`, Helvetica-Bold.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Font weight for a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Size and weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_pt: f32,
    pub weight: FontWeight,
}

impl TextStyle {
    pub fn regular(size_pt: f32) -> Self {
        Self {
            size_pt,
            weight: FontWeight::Regular,
        }
    }

    pub fn bold(size_pt: f32) -> Self {
        Self {
            size_pt,
            weight: FontWeight::Bold,
        }
    }

    /// Baseline-to-baseline distance in millimetres.
    pub fn line_height_mm(&self) -> f32 {
        self.size_pt * LINE_SPACING * MM_PER_PT
    }
}

/// Base letter of an accented Latin letter; other characters are returned
/// unchanged.
pub fn fold_accent(ch: char) -> char {
    match ch {
        'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ç' | 'ć' | 'č' => 'c',
        'Ď' | 'Đ' => 'D',
        'ď' | 'đ' => 'd',
        'È'..='Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'Ğ' => 'G',
        'ğ' => 'g',
        'Ì'..='Ï' | 'Ī' | 'İ' => 'I',
        'ì'..='ï' | 'ī' | 'ı' => 'i',
        'Ł' => 'L',
        'ł' => 'l',
        'Ñ' | 'Ń' | 'Ň' => 'N',
        'ñ' | 'ń' | 'ň' => 'n',
        'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ő' => 'O',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'Ř' => 'R',
        'ř' => 'r',
        'Ś' | 'Ş' | 'Š' => 'S',
        'ś' | 'ş' | 'š' => 's',
        'Ť' => 'T',
        'ť' => 't',
        'Ù'..='Ü' | 'Ū' | 'Ů' | 'Ű' => 'U',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'Ý' | 'Ÿ' => 'Y',
        'ý' | 'ÿ' => 'y',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

fn char_width(ch: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    match fold_accent(ch) {
        ch @ ' '..='~' => table[ch as usize - ' ' as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in millimetres when set in `style`.
pub fn text_width_mm(text: &str, style: TextStyle) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(char_width(ch, style.weight))).sum();
    units as f32 / 1000.0 * style.size_pt * MM_PER_PT
}

/// Break `text` into lines no wider than `max_width_mm`.
///
/// Lines break at whitespace; a word that is wider than the limit on its own
/// is split between characters. Nothing is dropped.
pub fn wrap_text(text: &str, max_width_mm: f32, style: TextStyle) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, style) <= max_width_mm {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width_mm(word, style) <= max_width_mm {
            current = word.to_string();
        } else {
            let mut pieces = split_word(word, max_width_mm, style);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_word(word: &str, max_width_mm: f32, style: TextStyle) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && text_width_mm(&piece, style) > max_width_mm {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Largest size not above `style.size_pt` at which `text` fits on one line.
pub fn fit_size(text: &str, max_width_mm: f32, style: TextStyle) -> f32 {
    let width = text_width_mm(text, style);
    if width <= max_width_mm || width == 0.0 {
        style.size_pt
    } else {
        style.size_pt * max_width_mm / width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("The Beatles", 52.0, TextStyle::regular(14.0));
        assert_eq!(lines, vec!["The Beatles".to_string()]);
    }

    #[test]
    fn long_text_wraps_without_loss() {
        let title = "Ob-La-Di, Ob-La-Da (Remastered 2009 Stereo Version With Extra Words)";
        let style = TextStyle::regular(14.0);
        let lines = wrap_text(title, 52.0, style);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, style) <= 52.0, "{line} overflows");
        }
        assert_eq!(lines.join(" "), title);
    }

    #[test]
    fn oversized_word_is_split() {
        let word = "Supercalifragilisticexpialidocious-and-then-some";
        let style = TextStyle::regular(14.0);
        let lines = wrap_text(word, 30.0, style);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width_mm(line, style) <= 30.0);
        }
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("   ", 52.0, TextStyle::regular(14.0)).is_empty());
    }

    #[test]
    fn digits_share_one_width_in_both_weights() {
        // Four 556-unit figures at 42pt: 2.224em * 42pt * 25.4/72.
        let expected = 2.224 * 42.0 * 25.4 / 72.0;
        for style in [TextStyle::regular(42.0), TextStyle::bold(42.0)] {
            assert!((text_width_mm("1965", style) - expected).abs() < 1e-3);
        }
        assert!(
            text_width_mm("Beatles", TextStyle::bold(14.0))
                > text_width_mm("Beatles", TextStyle::regular(14.0))
        );
    }

    #[test]
    fn widths_follow_helvetica_metrics() {
        let style = TextStyle::regular(1000.0 * 72.0 / 25.4);
        assert!((text_width_mm("W", style) - 944.0).abs() < 0.01);
        assert!((text_width_mm("il", style) - 444.0).abs() < 0.01);
        assert!((text_width_mm(" ", style) - 278.0).abs() < 0.01);
    }

    #[test]
    fn accented_letters_measure_as_their_base() {
        let style = TextStyle::regular(14.0);
        assert_eq!(text_width_mm("Beyoncé", style), text_width_mm("Beyonce", style));
        assert_eq!(text_width_mm("Sigur Rós", style), text_width_mm("Sigur Ros", style));
        assert_eq!(fold_accent('Ø'), 'O');
        assert_eq!(fold_accent('ž'), 'z');
        assert_eq!(fold_accent('?'), '?');
        assert!(text_width_mm("東", style) > text_width_mm("W", style));
    }

    #[test]
    fn fit_size_shrinks_only_when_needed() {
        let style = TextStyle::bold(42.0);
        assert_eq!(fit_size("1965", 52.0, style), 42.0);
        let shrunk = fit_size("Unknown", 52.0, style);
        assert!(shrunk < 42.0);
        assert!(text_width_mm("Unknown", TextStyle::bold(shrunk)) <= 52.0 + 1e-3);
    }
}

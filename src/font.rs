use crate::types::Pt;

/// Base-14 Helvetica family. These fonts are never embedded; every conforming
/// PDF reader ships them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    pub fn name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique
        )
    }

    pub fn is_italic(self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaOblique | StandardFont::HelveticaBoldOblique
        )
    }

    /// Resolves the face for an inline run. Markup only ever adds weight or slant.
    pub fn variant(self, bold: bool, italic: bool) -> StandardFont {
        match (self.is_bold() || bold, self.is_italic() || italic) {
            (true, true) => StandardFont::HelveticaBoldOblique,
            (true, false) => StandardFont::HelveticaBold,
            (false, true) => StandardFont::HelveticaOblique,
            (false, false) => StandardFont::Helvetica,
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::HelveticaBold => "F2",
            StandardFont::HelveticaOblique => "F3",
            StandardFont::HelveticaBoldOblique => "F4",
        }
    }

    /// Advance width of one WinAnsi code in 1/1000 em.
    pub fn glyph_width(self, code: u8) -> u16 {
        let table = if self.is_bold() {
            &HELVETICA_BOLD_ASCII
        } else {
            &HELVETICA_ASCII
        };
        match code {
            0x20..=0x7E => table[(code - 0x20) as usize],
            _ => extended_width(code, self.is_bold()),
        }
    }

    /// Width of `text` at `size`, after the same substitutions applied when rendering.
    pub fn measure(self, text: &str, size: Pt) -> Pt {
        let units: i64 = text
            .chars()
            .filter_map(winansi_code)
            .map(|code| self.glyph_width(code) as i64)
            .sum();
        Pt::from_milli_i64(size.to_milli_i64() * units / 1000)
    }
}

// AFM advance widths for codes 0x20..=0x7E.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // sp - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    278, 278, 584, 584, 584, 556, 1015, // : - @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    278, 278, 278, 469, 556, 333, // [ - `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
    334, 260, 334, 584, // { - ~
];

const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // sp - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
    333, 333, 584, 584, 584, 611, 975, // : - @
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A - M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
    333, 278, 333, 584, 556, 333, // [ - `
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a - m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n - z
    389, 280, 389, 584, // { - ~
];

// AFM advance widths for codes 0xA0..=0xFF.
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp - macron
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // degree - questiondown
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // Agrave - Idieresis
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Eth - germandbls
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // agrave - idieresis
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // eth - ydieresis
];

const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp - macron
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // degree - questiondown
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // Agrave - Idieresis
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Eth - germandbls
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // agrave - idieresis
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // eth - ydieresis
];

fn extended_width(code: u8, bold: bool) -> u16 {
    if code >= 0xA0 {
        let table = if bold {
            &HELVETICA_BOLD_LATIN1
        } else {
            &HELVETICA_LATIN1
        };
        return table[(code - 0xA0) as usize];
    }
    match (code, bold) {
        (0x82 | 0x91 | 0x92, false) => 222,
        (0x82 | 0x91 | 0x92, true) => 278,
        (0x84 | 0x93 | 0x94, false) => 333,
        (0x84 | 0x93 | 0x94, true) => 500,
        (0x88 | 0x8B | 0x98 | 0x9B, _) => 333,
        (0x8A | 0x9F, _) => 667,
        (0x8C, _) => 1000,
        (0x8E, _) => 611,
        (0x95, _) => 350,
        (0x9A | 0x9E, false) => 500,
        (0x9A | 0x9E, true) => 556,
        (0x9C, _) => 944,
        (0x85 | 0x89 | 0x97 | 0x99, _) => 1000,
        // Euro, florin, daggers and en dash.
        _ => 556,
    }
}

/// Pictographs and joiners that have no glyph in any base-14 font.
pub fn is_pictograph(ch: char) -> bool {
    matches!(
        ch as u32,
        0x200D
            | 0x2300..=0x23FF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0xFE00..=0xFE0F
            | 0x1F000..=0x1FAFF
            | 0xE0020..=0xE007F
    )
}

/// Maps a character onto the WinAnsi (cp1252) code drawn for it. Pictographs map
/// to `None` and are dropped; other characters outside the repertoire become `?`.
pub fn winansi_code(ch: char) -> Option<u8> {
    if is_pictograph(ch) {
        return None;
    }
    let code = match ch {
        '\u{0020}'..='\u{007E}' => ch as u8,
        '\u{00A0}'..='\u{00FF}' => ch as u8,
        // Hyphen variants (non-breaking, figure) render as a plain hyphen.
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2043}' => b'-',
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        '\t' | '\n' | '\r' => b' ',
        _ => b'?',
    };
    Some(code)
}

/// Outcome of encoding text for a base-14 font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinAnsiText {
    pub bytes: Vec<u8>,
    pub dropped: usize,
    pub replaced: usize,
}

impl WinAnsiText {
    pub fn is_lossy(&self) -> bool {
        self.dropped > 0 || self.replaced > 0
    }
}

pub fn encode_winansi(text: &str) -> WinAnsiText {
    let mut out = WinAnsiText::default();
    for ch in text.chars() {
        match winansi_code(ch) {
            None => out.dropped += 1,
            Some(b'?') if ch != '?' => {
                out.replaced += 1;
                out.bytes.push(b'?');
            }
            Some(code) => out.bytes.push(code),
        }
    }
    out
}

/// The text that actually reaches the page once pictographs are dropped and
/// hyphen variants folded.
pub fn renderable_text(text: &str) -> String {
    text.chars()
        .filter(|ch| !is_pictograph(*ch))
        .map(|ch| match ch {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2043}' => '-',
            other => other,
        })
        .collect()
}

//! Deterministic word cloud placement and SVG output

use std::fmt::Write as _;

const RELATIVE_SCALING: f64 = 0.5;
const MIN_FONT_SIZE: f64 = 4.0;
const FONT_STEP: f64 = 2.0;
/// Largest font as a fraction of canvas height
const MAX_FONT_RATIO: f64 = 0.2;
/// Approximate glyph width as a fraction of font size
const CHAR_WIDTH: f64 = 0.6;
/// Side of one occupancy cell in pixels
const CELL: f64 = 4.0;

/// Viridis, from dark (rare) to bright (frequent)
const PALETTE: [&str; 8] = [
    "#440154", "#46327e", "#365c8d", "#277f8e", "#1fa187", "#4ac16d", "#a0da39", "#fde725",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    /// Top-left corner of the word's bounding box
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub color: &'static str,
}

impl PlacedWord {
    fn width(&self) -> f64 {
        box_width(&self.text, self.font_size)
    }

    fn overlaps(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        x < self.x + self.width() && self.x < x + w && y < self.y + self.font_size && self.y < y + h
    }
}

fn box_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * CHAR_WIDTH
}

fn color_for(frequency: f64) -> &'static str {
    let idx = (frequency.clamp(0.0, 1.0) * (PALETTE.len() - 1) as f64).round() as usize;
    PALETTE[idx]
}

/// Coarse occupancy grid with a summed-area table for O(1) box checks
struct Occupancy {
    cols: usize,
    rows: usize,
    filled: Vec<bool>,
    sums: Vec<u32>,
    /// Cells ordered from the centre outwards, ties by row then column
    order: Vec<(usize, usize)>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let cols = (width as f64 / CELL) as usize;
        let rows = (height as f64 / CELL) as usize;

        let (cc, rc) = (cols as i64 / 2, rows as i64 / 2);
        let mut order: Vec<(usize, usize)> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (c, r)))
            .collect();
        order.sort_by_key(|&(c, r)| {
            let (dc, dr) = (c as i64 - cc, r as i64 - rc);
            (dc * dc + dr * dr, r, c)
        });

        Self {
            cols,
            rows,
            filled: vec![false; cols * rows],
            sums: vec![0; (cols + 1) * (rows + 1)],
            order,
        }
    }

    fn rebuild(&mut self) {
        let stride = self.cols + 1;
        for r in 0..self.rows {
            for c in 0..self.cols {
                let cell = self.filled[r * self.cols + c] as u32;
                self.sums[(r + 1) * stride + c + 1] = cell + self.sums[r * stride + c + 1]
                    + self.sums[(r + 1) * stride + c]
                    - self.sums[r * stride + c];
            }
        }
    }

    fn is_free(&self, c0: usize, r0: usize, cw: usize, ch: usize) -> bool {
        let stride = self.cols + 1;
        let (c1, r1) = (c0 + cw, r0 + ch);
        self.sums[r1 * stride + c1] + self.sums[r0 * stride + c0]
            == self.sums[r0 * stride + c1] + self.sums[r1 * stride + c0]
    }

    fn mark(&mut self, c0: usize, r0: usize, cw: usize, ch: usize) {
        for r in r0..r0 + ch {
            for c in c0..c0 + cw {
                self.filled[r * self.cols + c] = true;
            }
        }
        self.rebuild();
    }

    /// Top-left cell of the free `cw x ch` box whose centre is nearest the
    /// canvas centre
    fn find_slot(&self, cw: usize, ch: usize) -> Option<(usize, usize)> {
        if cw == 0 || ch == 0 || cw > self.cols || ch > self.rows {
            return None;
        }
        self.order.iter().find_map(|&(c, r)| {
            let c0 = c.checked_sub(cw / 2)?;
            let r0 = r.checked_sub(ch / 2)?;
            let fits = c0 + cw <= self.cols && r0 + ch <= self.rows;
            (fits && self.is_free(c0, r0, cw, ch)).then_some((c0, r0))
        })
    }
}

fn cells(pixels: f64) -> usize {
    (pixels / CELL).ceil() as usize
}

/// Place words (most frequent first, frequencies in (0, 1]) on a canvas.
///
/// A word never starts larger than the one before it, and shrinks until it
/// fits. Words that cannot fit even at the minimum font size are left out.
pub fn place_words(frequencies: &[(String, f64)], width: u32, height: u32) -> Vec<PlacedWord> {
    let max_font = (height as f64 * MAX_FONT_RATIO).round().max(MIN_FONT_SIZE);
    let mut grid = Occupancy::new(width, height);
    let mut placed: Vec<PlacedWord> = Vec::with_capacity(frequencies.len());
    let mut ceiling = max_font;

    for (text, frequency) in frequencies {
        let mut font_size = (max_font * (RELATIVE_SCALING * frequency + (1.0 - RELATIVE_SCALING)))
            .round()
            .min(ceiling);

        while font_size >= MIN_FONT_SIZE {
            let (cw, ch) = (cells(box_width(text, font_size)), cells(font_size));
            if let Some((c0, r0)) = grid.find_slot(cw, ch) {
                grid.mark(c0, r0, cw, ch);
                placed.push(PlacedWord {
                    text: text.clone(),
                    x: c0 as f64 * CELL,
                    y: r0 as f64 * CELL,
                    font_size,
                    color: color_for(*frequency),
                });
                ceiling = font_size;
                break;
            }
            font_size -= FONT_STEP;
        }
    }

    placed
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_svg(words: &[PlacedWord], width: u32, height: u32) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);
    for word in words {
        // SVG positions text by baseline
        let baseline = word.y + word.font_size * 0.8;
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="{:.0}" fill="{}">{}</text>"#,
            word.x,
            baseline,
            word.font_size,
            word.color,
            escape_xml(&word.text)
        );
    }
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs(words: &[(&str, f64)]) -> Vec<(String, f64)> {
        words.iter().map(|(w, f)| (w.to_string(), *f)).collect()
    }

    #[test]
    fn test_placements_stay_inside_and_do_not_overlap() {
        let input = freqs(&[
            ("work", 1.0),
            ("sleep", 0.8),
            ("family", 0.6),
            ("running", 0.5),
            ("deadline", 0.4),
            ("coffee", 0.3),
            ("friends", 0.2),
        ]);
        let placed = place_words(&input, 800, 400);
        assert_eq!(placed.len(), input.len());

        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 0.0 && a.y >= 0.0);
            assert!(a.x + a.width() <= 800.0 && a.y + a.font_size <= 400.0);
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b.x, b.y, b.width(), b.font_size), "{} overlaps {}", a.text, b.text);
            }
        }
        // Biggest word first, at full size, in the brightest colour
        assert_eq!(placed[0].text, "work");
        assert_eq!(placed[0].color, PALETTE[7]);
        assert!(placed[0].font_size > placed[6].font_size);
    }

    #[test]
    fn test_large_vocabulary_fills_canvas() {
        let input: Vec<(String, f64)> = (0..200)
            .map(|i| (format!("theme{:03}", i), 1.0 / (i as f64 + 1.0)))
            .collect();
        let placed = place_words(&input, 800, 400);

        assert!(placed.len() >= 120, "only {} of 200 words placed", placed.len());
        assert!(placed.windows(2).all(|w| w[0].font_size >= w[1].font_size));
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x + a.width() <= 800.0 && a.y + a.font_size <= 400.0);
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b.x, b.y, b.width(), b.font_size));
            }
        }
    }

    #[test]
    fn test_word_too_wide_is_dropped() {
        let placed = place_words(&freqs(&[("supercalifragilistic", 1.0)]), 20, 10);
        assert!(placed.is_empty());
    }

    #[test]
    fn test_svg_escapes_text() {
        let words = vec![PlacedWord {
            text: "rock&roll".to_string(),
            x: 1.0,
            y: 2.0,
            font_size: 10.0,
            color: PALETTE[0],
        }];
        let svg = render_svg(&words, 100, 50);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("rock&amp;roll"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}

//! Lays report blocks out on A4 pages and writes them with printpdf.
//!
//! Layout is a pure pass that produces positioned lines; drawing is a thin
//! loop over those lines. Coordinates are millimetres from the bottom-left
//! corner, matching PDF user space.

use anyhow::{anyhow, Context, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::font_metrics::{FontMetricTable, HELVETICA, HELVETICA_BOLD};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
const MM_PER_PT: f32 = 25.4 / 72.0;
const LINE_SPACING: f32 = 1.35;
const BULLET_INDENT_MM: f32 = 5.0;
const FOOTER_Y_MM: f32 = 10.0;

/// One logical element of a report.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Subheading(String),
    Paragraph(String),
    Bullet(String),
    /// Vertical gap in millimetres.
    Spacer(f32),
}

struct Style {
    size_pt: f32,
    bold: bool,
    space_before_mm: f32,
}

impl Block {
    fn style(&self) -> Style {
        match self {
            Block::Title(_) => Style { size_pt: 20.0, bold: true, space_before_mm: 0.0 },
            Block::Heading(_) => Style { size_pt: 14.0, bold: true, space_before_mm: 6.0 },
            Block::Subheading(_) => Style { size_pt: 11.5, bold: true, space_before_mm: 4.0 },
            Block::Paragraph(_) | Block::Bullet(_) | Block::Spacer(_) => {
                Style { size_pt: 10.0, bold: false, space_before_mm: 0.0 }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub page: usize,
    pub x_mm: f32,
    /// Baseline.
    pub y_mm: f32,
    pub text: String,
    pub size_pt: f32,
    pub bold: bool,
}

/// Replaces characters the base-14 fonts cannot encode.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c,
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c if c.is_whitespace() => ' ',
            _ => '?',
        })
        .collect()
}

struct Cursor {
    page: usize,
    y_mm: f32,
}

impl Cursor {
    fn top() -> f32 {
        PAGE_HEIGHT_MM - MARGIN_MM
    }

    /// Moves down one line, breaking to a new page at the bottom margin.
    fn advance(&mut self, line_height_mm: f32) -> f32 {
        if self.y_mm - line_height_mm < MARGIN_MM {
            self.page += 1;
            self.y_mm = Self::top();
        }
        self.y_mm -= line_height_mm;
        self.y_mm
    }

    fn skip(&mut self, gap_mm: f32) {
        // A gap never forces a page break; at the top of a page it is dropped.
        if self.y_mm < Self::top() {
            self.y_mm = (self.y_mm - gap_mm).max(MARGIN_MM);
        }
    }
}

/// Positions every line of every block.
pub fn layout(blocks: &[Block]) -> Vec<PlacedLine> {
    let text_width_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let mut cursor = Cursor {
        page: 0,
        y_mm: Cursor::top(),
    };
    let mut placed = Vec::new();

    for block in blocks {
        let style = block.style();
        let (text, indent_mm) = match block {
            Block::Spacer(gap) => {
                cursor.skip(*gap);
                continue;
            }
            Block::Bullet(text) => (text, BULLET_INDENT_MM),
            Block::Title(text)
            | Block::Heading(text)
            | Block::Subheading(text)
            | Block::Paragraph(text) => (text, 0.0),
        };

        cursor.skip(style.space_before_mm);
        let metrics: &FontMetricTable = if style.bold { &HELVETICA_BOLD } else { &HELVETICA };
        let size_mm = style.size_pt * MM_PER_PT;
        let max_width_em = (text_width_mm - indent_mm) / size_mm;
        let line_height_mm = size_mm * LINE_SPACING;

        for (i, line) in metrics.wrap(&sanitize(text), max_width_em).into_iter().enumerate() {
            let y_mm = cursor.advance(line_height_mm);
            if indent_mm > 0.0 && i == 0 {
                placed.push(PlacedLine {
                    page: cursor.page,
                    x_mm: MARGIN_MM + 1.0,
                    y_mm,
                    text: "-".to_string(),
                    size_pt: style.size_pt,
                    bold: style.bold,
                });
            }
            placed.push(PlacedLine {
                page: cursor.page,
                x_mm: MARGIN_MM + indent_mm,
                y_mm,
                text: line,
                size_pt: style.size_pt,
                bold: style.bold,
            });
        }
    }
    placed
}

/// Renders `blocks` into PDF bytes with a page-number footer.
pub fn render_pdf(title: &str, blocks: &[Block]) -> Result<Vec<u8>> {
    let lines = layout(blocks);
    let page_count = lines.last().map_or(1, |l| l.page + 1);

    let (doc, first_page, first_layer) =
        PdfDocument::new(sanitize(title), Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Failed to load Helvetica: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("Failed to load Helvetica-Bold: {e}"))?;

    let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
    for _ in 1..page_count {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for line in &lines {
        let font = if line.bold { &bold } else { &regular };
        layers[line.page].use_text(line.text.clone(), line.size_pt, Mm(line.x_mm), Mm(line.y_mm), font);
    }

    for (i, layer) in layers.iter().enumerate() {
        let footer = format!("Page {} of {page_count}", i + 1);
        let width_mm = HELVETICA.measure_str(&footer) * 8.0 * MM_PER_PT;
        layer.use_text(
            footer,
            8.0,
            Mm((PAGE_WIDTH_MM - width_mm) / 2.0),
            Mm(FOOTER_Y_MM),
            &regular,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("{e}"))
        .context("Failed to serialise PDF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_unencodable_characters() {
        assert_eq!(sanitize("it\u{2019}s \u{201c}hot\u{201d}\tnow"), "it's \"hot\" now");
        assert_eq!(sanitize("caf\u{e9} \u{1f680}"), "caf? ?");
    }

    #[test]
    fn test_layout_stays_inside_margins() {
        let blocks = vec![
            Block::Title("Report".to_string()),
            Block::Paragraph("word ".repeat(200)),
            Block::Bullet("a bullet point ".repeat(20)),
        ];
        let lines = layout(&blocks);
        assert!(!lines.is_empty());
        for line in &lines {
            assert!(line.y_mm >= MARGIN_MM - 1e-3, "{line:?}");
            assert!(line.y_mm <= PAGE_HEIGHT_MM - MARGIN_MM);
            let metrics = if line.bold { &HELVETICA_BOLD } else { &HELVETICA };
            let right = line.x_mm + metrics.measure_str(&line.text) * line.size_pt * MM_PER_PT;
            assert!(right <= PAGE_WIDTH_MM - MARGIN_MM + 1e-3, "{line:?}");
        }
    }

    #[test]
    fn test_layout_breaks_pages() {
        let blocks: Vec<Block> = (0..120)
            .map(|i| Block::Paragraph(format!("Line number {i}")))
            .collect();
        let lines = layout(&blocks);
        let last = lines.last().unwrap();
        assert!(last.page >= 1);
        // Each new page starts back at the top.
        let first_on_second = lines.iter().find(|l| l.page == 1).unwrap();
        assert!(first_on_second.y_mm > PAGE_HEIGHT_MM - MARGIN_MM - 10.0);
    }

    #[test]
    fn test_bullets_get_a_marker_once() {
        let lines = layout(&[Block::Bullet("short".to_string())]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "-");
        assert!(lines[1].x_mm > lines[0].x_mm);
    }

    #[test]
    fn test_render_pdf_produces_a_pdf() {
        let blocks = vec![
            Block::Title("Trending Topics Report".to_string()),
            Block::Spacer(4.0),
            Block::Paragraph("Hello".to_string()),
        ];
        let bytes = render_pdf("Trending Topics Report", &blocks).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

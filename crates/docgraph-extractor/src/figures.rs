//! Figure, table and image records for a page

use regex::Regex;

use crate::compile_pattern;
use docgraph_core::{Figure, FigureKind, PageInput, Result};

/// Caption patterns: group 1 is the number, group 2 the caption
const CAPTION_PATTERNS: &[&str] = &[
    r"(?:Figure|Fig\.?)\s+(\d+)[:.]?\s*([^\n]{10,200})",
    r"(?:Table)\s+(\d+)[:.]?\s*([^\n]{10,200})",
    r"(?:Diagram|Chart|Graph)\s+(\d+)[:.]?\s*([^\n]{10,200})",
];

const TABLE_SAMPLE_ROWS: usize = 5;

pub struct FigureExtractor {
    captions: Vec<Regex>,
}

impl FigureExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            captions: CAPTION_PATTERNS
                .iter()
                .map(|p| compile_pattern(&format!("(?im){p}")))
                .collect::<Result<_>>()?,
        })
    }

    /// Tables, images and caption-only figures of one page, in that order
    pub fn extract_page(&self, page: &PageInput) -> Vec<Figure> {
        let mut figures: Vec<Figure> = Vec::new();

        for (i, table) in page.tables.iter().enumerate() {
            if table.rows.len() <= 1 {
                continue;
            }
            figures.push(Figure {
                number: (i + 1).to_string(),
                caption: format!("Table {} on page {}", i + 1, page.number),
                page: page.number,
                kind: FigureKind::Table {
                    rows: table.rows.len(),
                    columns: table.rows.first().map_or(0, Vec::len),
                    sample: table.rows.iter().take(TABLE_SAMPLE_ROWS).cloned().collect(),
                },
            });
        }

        for (i, image) in page.images.iter().enumerate() {
            figures.push(Figure {
                number: (i + 1).to_string(),
                caption: format!("Image {} on page {}", i + 1, page.number),
                page: page.number,
                kind: FigureKind::Image {
                    width: image.width,
                    height: image.height,
                    format: image.format.clone(),
                    size_bytes: image.size_bytes,
                },
            });
        }

        for regex in &self.captions {
            for caps in regex.captures_iter(&page.text) {
                let (Some(number), Some(caption)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let number = number.as_str();
                let caption = caption.as_str().trim().to_string();

                match figures.iter_mut().find(|f| f.number == number) {
                    Some(existing) => existing.caption = caption,
                    None => figures.push(Figure {
                        number: number.to_string(),
                        caption,
                        page: page.number,
                        kind: FigureKind::Figure,
                    }),
                }
            }
        }

        figures
    }
}

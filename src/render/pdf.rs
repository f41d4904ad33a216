//! PDF encoding of a laid-out document.
//!
//! Text is set in the built-in Helvetica faces, so no font is embedded and
//! `printpdf` writes every string in WinAnsi encoding.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::layout::{Document, Page, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::{PlannerError, Result};

const LAYER: &str = "text";

/// Encode a laid-out document as PDF bytes. An empty document gets one blank page.
pub fn encode(document: &Document) -> Result<Vec<u8>> {
    let title = document.file_name.trim_end_matches(".pdf");
    let (pdf, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), LAYER);
    let fonts = Fonts {
        regular: pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| render_error("regular font", err))?,
        bold: pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| render_error("bold font", err))?,
    };

    let blank = Page::default();
    let mut pages = document.pages.iter();
    let first = pages.next().unwrap_or(&blank);
    fonts.write(&pdf.get_page(first_page).get_layer(first_layer), first);

    for page in pages {
        let (page_index, layer_index) =
            pdf.add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), LAYER);
        fonts.write(&pdf.get_page(page_index).get_layer(layer_index), page);
    }

    pdf.save_to_bytes()
        .map_err(|err| render_error("document", err))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn write(&self, layer: &PdfLayerReference, page: &Page) {
        for line in &page.lines {
            let font = if line.style.is_bold() { &self.bold } else { &self.regular };
            // Layout measures down from the top edge; PDF measures up from the bottom.
            layer.use_text(
                single_line(&line.text),
                line.style.font_size() as f32,
                Mm(line.x as f32),
                Mm((PAGE_HEIGHT - line.y) as f32),
                font,
            );
        }
    }
}

fn single_line(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

fn render_error(what: &str, err: printpdf::Error) -> PlannerError {
    PlannerError::Render(format!("failed to encode PDF {}: {:?}", what, err))
}

//! Deterministic page layout for a trip.
//!
//! Units are millimetres on an A4 page. A vertical cursor walks down the page;
//! before each block is written its full height is compared with the bottom
//! threshold for that kind of block, and a new page is started when it would
//! not fit. A block that fits on a page is never split, but consecutive blocks
//! of one day may land on different pages. A block taller than a whole page
//! flows line by line across pages. Section headings are held back and written
//! together with the block that follows them.

use serde::Serialize;
use tracing::debug;

use crate::types::Trip;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const MARGIN: f64 = 20.0;
pub const LINE_HEIGHT: f64 = 7.0;
pub const CONTENT_WIDTH: f64 = 170.0;
pub const INDENT: f64 = 8.0;
/// Lowest cursor position a day header block may extend to.
pub const HEADER_LIMIT: f64 = 270.0;
/// Lowest cursor position any other block may extend to.
pub const DETAIL_LIMIT: f64 = 280.0;
/// Space above a section heading, except at the top of a page.
pub const SECTION_GAP: f64 = LINE_HEIGHT / 2.0;
/// Average glyph advance at body size, used for word wrapping.
const CHAR_WIDTH: f64 = 2.0;

const TITLE: &str = "Trip Itinerary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Title,
    Heading,
    Body,
}

impl TextStyle {
    pub fn font_size(&self) -> f64 {
        match self {
            TextStyle::Title => 20.0,
            TextStyle::Heading => 14.0,
            TextStyle::Body => 11.0,
        }
    }

    pub fn is_bold(&self) -> bool {
        !matches!(self, TextStyle::Body)
    }
}

/// One line of text placed on a page; `y` is measured from the top edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

/// A laid-out trip, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub file_name: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index of the first page holding a line with exactly this text.
    pub fn page_of(&self, text: &str) -> Option<usize> {
        self.pages
            .iter()
            .position(|page| page.lines.iter().any(|line| line.text == text))
    }
}

/// Lays out the sections of a trip in a fixed order.
pub fn layout(trip: &Trip) -> Document {
    let mut cursor = Cursor::new();

    cursor.block(&[TITLE.to_string()], MARGIN, TextStyle::Title, DETAIL_LIMIT);

    if let Some(destination) = trip.destination.as_deref().filter(|d| !d.trim().is_empty()) {
        cursor.block(
            &[format!("Destination: {}", destination.trim())],
            MARGIN,
            TextStyle::Body,
            DETAIL_LIMIT,
        );
    }

    cursor.heading("Summary");
    cursor.block(
        &wrap(&trip.summary, CONTENT_WIDTH),
        MARGIN,
        TextStyle::Body,
        DETAIL_LIMIT,
    );

    cursor.heading("Budget Breakdown");
    for (category, amount) in &trip.budget_breakdown {
        cursor.block(
            &[format!("{}: {:.2}", category, amount)],
            MARGIN + INDENT,
            TextStyle::Body,
            DETAIL_LIMIT,
        );
    }
    cursor.block(
        &[format!("Total: {:.2}", trip.total_budget())],
        MARGIN + INDENT,
        TextStyle::Body,
        DETAIL_LIMIT,
    );

    let accommodation = &trip.accommodation;
    if !accommodation.name.trim().is_empty() {
        cursor.heading("Accommodation");
        cursor.block(
            &wrap(
                &format!(
                    "{} ({:.2} per night)",
                    accommodation.name.trim(),
                    accommodation.price_per_night
                ),
                CONTENT_WIDTH - INDENT,
            ),
            MARGIN + INDENT,
            TextStyle::Body,
            DETAIL_LIMIT,
        );
        if !accommodation.description.trim().is_empty() {
            cursor.block(
                &wrap(&accommodation.description, CONTENT_WIDTH - INDENT),
                MARGIN + INDENT,
                TextStyle::Body,
                DETAIL_LIMIT,
            );
        }
    }

    if !trip.itinerary.is_empty() {
        cursor.heading("Itinerary");
    }
    for day in &trip.itinerary {
        let header = day_header(day.day, &day.summary, day.estimated_cost);
        let details: Vec<Vec<String>> = day
            .details
            .iter()
            .map(|entry| {
                let line = if entry.time.trim().is_empty() {
                    entry.activity.trim().to_string()
                } else {
                    format!("{}: {}", entry.time.trim(), entry.activity.trim())
                };
                wrap(&line, CONTENT_WIDTH - 2.0 * INDENT)
            })
            .collect();

        let day_lines = 1 + details.iter().map(Vec::len).sum::<usize>();
        cursor.keep_together(day_lines as f64 * LINE_HEIGHT, HEADER_LIMIT);
        cursor.block(&[header], MARGIN + INDENT, TextStyle::Heading, HEADER_LIMIT);

        for lines in &details {
            cursor.block(lines, MARGIN + 2.0 * INDENT, TextStyle::Body, DETAIL_LIMIT);
        }
    }

    let pages = cursor.finish();
    debug!(
        target: "trip_planner::render",
        pages = pages.len(),
        days = trip.itinerary.len(),
        "layout complete"
    );

    Document {
        file_name: file_name_for(trip.destination.as_deref()),
        pages,
    }
}

fn day_header(day: u32, summary: &str, estimated_cost: f64) -> String {
    let summary = summary.trim();
    if summary.is_empty() {
        format!("Day {} (est. {:.2})", day, estimated_cost)
    } else {
        format!("Day {}: {} (est. {:.2})", day, summary, estimated_cost)
    }
}

struct Cursor {
    done: Vec<Page>,
    page: Page,
    y: f64,
    heading: Option<String>,
}

impl Cursor {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            page: Page::default(),
            y: MARGIN,
            heading: None,
        }
    }

    fn at_top(&self) -> bool {
        self.y <= MARGIN
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.page));
        self.y = MARGIN;
    }

    /// Queue a section heading for the next block.
    fn heading(&mut self, text: &str) {
        self.flush_heading();
        self.heading = Some(text.to_string());
    }

    fn heading_extent(&self) -> f64 {
        match self.heading {
            None => 0.0,
            Some(_) if self.at_top() => LINE_HEIGHT,
            Some(_) => SECTION_GAP + LINE_HEIGHT,
        }
    }

    fn flush_heading(&mut self) {
        if let Some(text) = self.heading.take() {
            if !self.at_top() {
                self.y += SECTION_GAP;
            }
            self.push(text, MARGIN, TextStyle::Heading);
        }
    }

    /// Start a new page unless `extent` and any queued heading fit above `limit`.
    fn keep_together(&mut self, extent: f64, limit: f64) {
        if self.y + self.heading_extent() + extent > limit && !self.at_top() {
            self.new_page();
        }
        self.flush_heading();
    }

    fn block(&mut self, lines: &[String], x: f64, style: TextStyle, limit: f64) {
        if lines.is_empty() {
            return;
        }
        let extent = lines.len() as f64 * LINE_HEIGHT;
        let heading_line = if self.heading.is_some() { LINE_HEIGHT } else { 0.0 };

        if MARGIN + heading_line + extent <= limit {
            self.keep_together(extent, limit);
        } else {
            self.keep_together(LINE_HEIGHT, limit);
        }

        for text in lines {
            if self.y + LINE_HEIGHT > limit && !self.at_top() {
                self.new_page();
            }
            self.push(text.clone(), x, style);
        }
    }

    fn push(&mut self, text: String, x: f64, style: TextStyle) {
        self.page.lines.push(TextLine {
            x,
            y: self.y,
            text,
            style,
        });
        self.y += LINE_HEIGHT;
    }

    fn finish(mut self) -> Vec<Page> {
        self.keep_together(0.0, DETAIL_LIMIT);
        self.done.push(self.page);
        self.done
    }
}

/// Greedy word wrap to roughly `width` units at body size.
pub fn wrap(text: &str, width: f64) -> Vec<String> {
    let max_chars = ((width / CHAR_WIDTH).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}

/// File name for the exported document.
pub fn file_name_for(destination: Option<&str>) -> String {
    let slug = destination
        .unwrap_or_default()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "trip-plan.pdf".to_string()
    } else {
        format!("{}-trip-plan.pdf", slug)
    }
}

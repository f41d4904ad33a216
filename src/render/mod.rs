//! Paginated document export.

pub mod layout;
pub mod pdf;
pub mod sink;

pub use layout::{file_name_for, layout, Document, Page, TextLine, TextStyle};
pub use sink::{DirectorySink, DocumentSink};

use crate::{error::Result, types::Trip};

/// A trip laid out and encoded, ready for a sink.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub document: Document,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn file_name(&self) -> &str {
        &self.document.file_name
    }
}

/// Lay out and encode a trip.
pub fn render(trip: &Trip) -> Result<RenderedDocument> {
    let document = layout(trip);
    let bytes = pdf::encode(&document)?;
    Ok(RenderedDocument { document, bytes })
}

/// Render a trip and hand it to `sink`, returning the sink's location.
pub async fn export(trip: &Trip, sink: &dyn DocumentSink) -> Result<String> {
    let rendered = render(trip)?;
    sink.deliver(rendered.file_name(), &rendered.bytes).await
}

//! Tagged result of decoding one attachment's content.

/// What the content extractor recovered from an attachment payload.
///
/// This type never carries an `Err`: decoding failures are a *value*
/// ([`ExtractedContent::Error`]) so a single corrupt attachment cannot abort
/// the report that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// Free-form text (PDF text, decoded plain-text files, placeholders).
    Text(String),

    /// A single table: rows of cell strings, first row rendered as header.
    Table(Vec<Vec<String>>),

    /// Sectioned content (one section per sheet or slide).
    MixedOutline(Vec<OutlineSection>),

    /// Decoding failed; the message is a short human-readable diagnostic.
    Error(String),
}

/// One titled section of a [`ExtractedContent::MixedOutline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSection {
    /// Section title (e.g. `"Sheet: Sales"`, `"Slide 3"`).
    pub title: String,

    /// Ordered blocks within the section.
    pub blocks: Vec<OutlineBlock>,
}

/// A block within an outline section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineBlock {
    /// A run of text (one paragraph or placeholder line).
    Paragraph(String),

    /// A table with the first row as header.
    Table(Vec<Vec<String>>),

    /// A speaker note, rendered as a blockquote.
    Note(String),
}

impl OutlineSection {
    /// Construct a section with no blocks yet.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }
}

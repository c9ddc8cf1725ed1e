use std::{io::BufWriter, mem};

use lopdf::{
    content::{Content, Operation},
    Object, StringFormat,
};
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization as _;

use crate::error::ReportError;

/// The typefaces the encoder can write text with. All of them belong to the
/// fourteen standard fonts every conforming PDF viewer ships, so no font
/// program is ever embedded into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl BuiltinFont {
    /// The `BaseFont` name under which the PDF specification knows the face.
    fn base_name(self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
        }
    }
}

/// One page of the document under construction: its size in PDF user units and
/// the drawing operations accumulated for its content stream, in the order they
/// were issued.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page width in PDF user units (1/72 of an inch).
    pub width: f32,
    /// Page height in PDF user units.
    pub height: f32,
    operations: Vec<Operation>,
}

/// This struct represents the PDF document on a high-level: an ordered command
/// sink the layout algorithms emit text, lines and filled rectangles into, page
/// by page. Calling `save_to_bytes` assembles the accumulated pages, fonts and
/// metadata into the final byte sequence through the underlying `lopdf`
/// document, which is exposed for the rare case where low-level manipulation is
/// needed.
pub struct PdfDocument {
    /// The underlying PDF document: this is a low-level interface and shouldn't
    /// be directly interacted with unless strictly necessary.
    pub inner_document: lopdf::Document,
    /// The identifier of the document, used for the title and the PDF `ID` tag.
    pub identifier: String,
    pages: Vec<PdfPage>,
    fonts: Vec<BuiltinFont>,
}

impl PdfDocument {
    /// Create a new `PdfDocument` with no pages, defaulting the underlying
    /// document to version 1.5 of the PDF specification.
    pub fn new(identifier: String) -> Self {
        PdfDocument {
            inner_document: lopdf::Document::with_version("1.5"),
            identifier,
            pages: Vec::new(),
            fonts: Vec::new(),
        }
    }

    /// Appends a new empty page of the given size and returns its index, which
    /// the drawing functions take to address the page. Pages are assembled in
    /// the order they were added.
    pub fn add_page(&mut self, page_width: f32, page_height: f32) -> usize {
        self.pages.push(PdfPage {
            width: page_width,
            height: page_height,
            operations: Vec::new(),
        });
        self.pages.len() - 1
    }

    /// Registers one of the builtin faces with the document and returns the
    /// font index to be passed to `set_font`. Registering the same face twice
    /// yields the index it already has.
    pub fn add_builtin_font(&mut self, font: BuiltinFont) -> usize {
        if let Some(font_index) = self.fonts.iter().position(|registered| *registered == font) {
            return font_index;
        }
        self.fonts.push(font);
        self.fonts.len() - 1
    }

    /// Opens a text object on the given page. Every text operation up to the
    /// matching `end_text` call shares one text cursor, which `set_text_position`
    /// places and `next_line` advances by the current leading.
    pub fn begin_text(&mut self, page_index: usize) -> Result<(), ReportError> {
        self.add_operations(page_index, vec![Operation::new("BT", vec![])])
    }

    /// Closes the text object opened by `begin_text`.
    pub fn end_text(&mut self, page_index: usize) -> Result<(), ReportError> {
        self.add_operations(page_index, vec![Operation::new("ET", vec![])])
    }

    /// Selects a previously registered font at the given size for the following
    /// text on the page.
    pub fn set_font(
        &mut self,
        page_index: usize,
        font_index: usize,
        font_size: f32,
    ) -> Result<(), ReportError> {
        if font_index >= self.fonts.len() {
            return Err(ReportError::with_context(format!(
                "Failed to find the font with index {} among the registered fonts",
                font_index
            )));
        }
        self.add_operations(
            page_index,
            vec![Operation::new(
                "Tf",
                vec![
                    Object::Name(format!("F{font_index}").into_bytes()),
                    font_size.into(),
                ],
            )],
        )
    }

    /// Sets the distance the text cursor drops on each `next_line` call.
    pub fn set_text_leading(&mut self, page_index: usize, leading: f32) -> Result<(), ReportError> {
        self.add_operations(
            page_index,
            vec![Operation::new("TL", vec![leading.into()])],
        )
    }

    /// Places the text cursor of the current text object at the given position,
    /// expressed in user units from the bottom-left corner of the page.
    pub fn set_text_position(
        &mut self,
        page_index: usize,
        x: f32,
        y: f32,
    ) -> Result<(), ReportError> {
        self.add_operations(
            page_index,
            vec![Operation::new("Td", vec![x.into(), y.into()])],
        )
    }

    /// Shows the given text at the text cursor in the currently selected font.
    /// The text is NFC-normalized and encoded into the single-byte WinAnsi
    /// encoding the builtin fonts are declared with.
    pub fn show_text(&mut self, page_index: usize, text: &str) -> Result<(), ReportError> {
        let encoded_text = encode_win_ansi(text);
        self.add_operations(
            page_index,
            vec![Operation::new(
                "Tj",
                vec![Object::String(encoded_text, StringFormat::Literal)],
            )],
        )
    }

    /// Moves the text cursor to the beginning of the next line, one leading
    /// below the current one.
    pub fn next_line(&mut self, page_index: usize) -> Result<(), ReportError> {
        self.add_operations(page_index, vec![Operation::new("T*", vec![])])
    }

    /// Writes a single run of text at an absolute position, wrapping the whole
    /// text object handling. The layout code uses this for table cells, where
    /// every run is positioned independently.
    pub fn write_text(
        &mut self,
        page_index: usize,
        font_index: usize,
        font_size: f32,
        position: [f32; 2],
        text: &str,
    ) -> Result<(), ReportError> {
        self.begin_text(page_index)?;
        self.set_font(page_index, font_index, font_size)?;
        self.set_text_position(page_index, position[0], position[1])?;
        self.show_text(page_index, text)?;
        self.end_text(page_index)
    }

    /// Starts a path at the given position.
    pub fn move_to(&mut self, page_index: usize, x: f32, y: f32) -> Result<(), ReportError> {
        self.add_operations(
            page_index,
            vec![Operation::new("m", vec![x.into(), y.into()])],
        )
    }

    /// Extends the current path with a straight segment to the given position.
    pub fn line_to(&mut self, page_index: usize, x: f32, y: f32) -> Result<(), ReportError> {
        self.add_operations(
            page_index,
            vec![Operation::new("l", vec![x.into(), y.into()])],
        )
    }

    /// Strokes the current path with the stroking color, which this encoder
    /// leaves at its default of black.
    pub fn stroke(&mut self, page_index: usize) -> Result<(), ReportError> {
        self.add_operations(page_index, vec![Operation::new("S", vec![])])
    }

    /// Sets the color used for filling rectangles and text, as RGB components
    /// between zero and one.
    pub fn set_fill_color(
        &mut self,
        page_index: usize,
        color: [f32; 3],
    ) -> Result<(), ReportError> {
        self.add_operations(
            page_index,
            vec![Operation::new(
                "rg",
                color.into_iter().map(Object::Real).collect(),
            )],
        )
    }

    /// Fills the axis-aligned rectangle with the current fill color. The
    /// position addresses the bottom-left corner of the rectangle.
    pub fn fill_rect(
        &mut self,
        page_index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), ReportError> {
        self.add_operations(
            page_index,
            vec![
                Operation::new(
                    "re",
                    vec![x.into(), y.into(), width.into(), height.into()],
                ),
                Operation::new("f", vec![]),
            ],
        )
    }

    /// Assembles the accumulated pages into the underlying document and
    /// serializes it, returning the complete byte sequence. The content stream
    /// of each page is written uncompressed.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, ReportError> {
        use lopdf::Object::*;
        use lopdf::StringFormat::*;

        let timestamp = to_pdf_timestamp_format(&OffsetDateTime::now_utc());
        let document_info = lopdf::Dictionary::from_iter(vec![
            (
                "Title",
                String(self.identifier.clone().into_bytes(), Literal),
            ),
            (
                "Producer",
                String(
                    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
                        .as_bytes()
                        .to_vec(),
                    Literal,
                ),
            ),
            (
                "CreationDate",
                String(timestamp.clone().into_bytes(), Literal),
            ),
            ("ModDate", String(timestamp.into_bytes(), Literal)),
        ]);
        let document_info_id = self.inner_document.add_object(Dictionary(document_info));

        // The catalog and the pages tree reference each other, so the object ID
        // of the pages tree is reserved upfront and the dictionary itself is
        // inserted last, once every page is known.
        let pages_id = self.inner_document.new_object_id();
        let catalog = lopdf::Dictionary::from_iter(vec![
            ("Type", "Catalog".into()),
            ("PageLayout", "OneColumn".into()),
            ("PageMode", "UseNone".into()),
            ("Pages", Reference(pages_id)),
        ]);
        let catalog_id = self.inner_document.add_object(Dictionary(catalog));

        self.inner_document
            .trailer
            .set("Root", Reference(catalog_id));
        self.inner_document
            .trailer
            .set("Info", Reference(document_info_id));
        self.inner_document.trailer.set(
            "ID",
            Array(vec![
                String(self.identifier.clone().into_bytes(), Literal),
                String(self.identifier.clone().into_bytes(), Literal),
            ]),
        );

        let fonts_dictionary = self.insert_fonts_into_document();
        let fonts_dictionary_id = self.inner_document.add_object(Dictionary(fonts_dictionary));

        let mut page_ids = Vec::<lopdf::Object>::new();
        for page in self.pages.iter() {
            let page_content = Content {
                operations: page.operations.clone(),
            };
            let content_bytes = page_content.encode().map_err(|error| {
                ReportError::with_error("Failed to encode a page content stream", &error)
            })?;
            // Page contents are left uncompressed so that the produced documents
            // remain inspectable by the tests and by external tooling.
            let content_stream = lopdf::Stream::new(lopdf::Dictionary::new(), content_bytes)
                .with_compression(false);
            let page_content_id = self.inner_document.add_object(content_stream);

            let page_resources =
                lopdf::Dictionary::from_iter(vec![("Font", Reference(fonts_dictionary_id))]);
            let page_resources_id = self.inner_document.add_object(Dictionary(page_resources));

            let page_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", "Page".into()),
                ("Rotate", Integer(0)),
                (
                    "MediaBox",
                    vec![0.into(), 0.into(), page.width.into(), page.height.into()].into(),
                ),
                ("Parent", Reference(pages_id)),
                ("Resources", Reference(page_resources_id)),
                ("Contents", Reference(page_content_id)),
            ]);
            page_ids.push(Reference(self.inner_document.add_object(Dictionary(page_dictionary))));
        }

        let pages = lopdf::Dictionary::from_iter(vec![
            ("Type", "Pages".into()),
            ("Count", Integer(self.pages.len() as i64)),
            ("Kids", Array(page_ids)),
        ]);
        self.inner_document
            .objects
            .insert(pages_id, Dictionary(pages));

        let mut pdf_document_bytes = Vec::new();
        let mut writer = BufWriter::new(&mut pdf_document_bytes);
        self.inner_document.save_to(&mut writer).map_err(|error| {
            ReportError::with_error("Error while saving the PDF document to bytes", &error)
        })?;
        mem::drop(writer);

        Ok(pdf_document_bytes)
    }

    /// Converts the registered fonts into dictionaries, inserts them into the
    /// document and returns the font resources dictionary referencing them.
    fn insert_fonts_into_document(&mut self) -> lopdf::Dictionary {
        let mut fonts_dictionary = lopdf::Dictionary::new();
        for (font_index, font) in self.fonts.iter().enumerate() {
            let font_dictionary = lopdf::Dictionary::from_iter(vec![
                ("Type", Object::Name("Font".into())),
                ("Subtype", Object::Name("Type1".into())),
                ("BaseFont", Object::Name(font.base_name().into())),
                ("Encoding", Object::Name("WinAnsiEncoding".into())),
            ]);
            let font_id = self
                .inner_document
                .add_object(Object::Dictionary(font_dictionary));
            fonts_dictionary.set(format!("F{font_index}"), Object::Reference(font_id));
        }
        fonts_dictionary
    }

    /// Appends the given operations to the content of the specified page.
    fn add_operations(
        &mut self,
        page_index: usize,
        operations: Vec<Operation>,
    ) -> Result<(), ReportError> {
        let page = self
            .pages
            .get_mut(page_index)
            .ok_or(ReportError::with_context(format!(
                "Failed to find the page with index {}",
                page_index
            )))?;
        page.operations.extend(operations);

        Ok(())
    }
}

/// Maps the text onto the WinAnsi single-byte encoding declared for the builtin
/// fonts, after normalizing it to the NFC form. Characters without a WinAnsi
/// slot are logged and skipped.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut encoded_text = Vec::with_capacity(text.len());
    for character in text.nfc() {
        match character {
            ' '..='~' | '\u{a0}'..='\u{ff}' => encoded_text.push(character as u8),
            '\u{20ac}' => encoded_text.push(0x80), // Euro sign
            '\u{2018}' => encoded_text.push(0x91),
            '\u{2019}' => encoded_text.push(0x92),
            '\u{201c}' => encoded_text.push(0x93),
            '\u{201d}' => encoded_text.push(0x94),
            '\u{2013}' => encoded_text.push(0x96), // En and em dashes
            '\u{2014}' => encoded_text.push(0x97),
            _ => log::warn!(
                "Unable to encode the character {:?} in WinAnsi, skipping it",
                character
            ),
        }
    }
    encoded_text
}

/// Formats the given time so that it matches what the PDF specification expects
/// for the document information dictionary, for example D:20240305150224+00'00'.
fn to_pdf_timestamp_format(date: &OffsetDateTime) -> String {
    let offset = date.offset();
    let offset_sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "D:{:04}{:02}{:02}{:02}{:02}{:02}{offset_sign}{:02}'{:02}'",
        date.year(),
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second(),
        offset.whole_hours().abs(),
        offset.minutes_past_hour().abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_the_same_face_twice_reuses_the_index() {
        let mut document = PdfDocument::new("test".to_string());
        let first_index = document.add_builtin_font(BuiltinFont::Helvetica);
        let second_index = document.add_builtin_font(BuiltinFont::HelveticaBold);
        assert_eq!(document.add_builtin_font(BuiltinFont::Helvetica), first_index);
        assert_ne!(first_index, second_index);
    }

    #[test]
    fn drawing_on_a_missing_page_is_an_error() {
        let mut document = PdfDocument::new("test".to_string());
        let error = document.begin_text(7).unwrap_err();
        assert!(error.to_string().contains("index 7"));
    }

    #[test]
    fn selecting_an_unregistered_font_is_an_error() {
        let mut document = PdfDocument::new("test".to_string());
        let page_index = document.add_page(612.0, 792.0);
        assert!(document.set_font(page_index, 0, 12.0).is_err());
    }

    #[test]
    fn win_ansi_keeps_ascii_and_latin_text() {
        assert_eq!(encode_win_ansi("Report: $150.75"), b"Report: $150.75");
        assert_eq!(encode_win_ansi("r\u{e9}sum\u{e9}"), b"r\xe9sum\xe9");
        // Characters outside of the encoding are dropped rather than mangled.
        assert_eq!(encode_win_ansi("\u{65e5}ACC"), b"ACC");
    }

    #[test]
    fn saved_documents_round_trip_through_lopdf() {
        let mut document = PdfDocument::new("test".to_string());
        let font_index = document.add_builtin_font(BuiltinFont::Helvetica);
        let page_index = document.add_page(612.0, 792.0);
        document
            .write_text(page_index, font_index, 12.0, [40.0, 750.0], "Hello")
            .unwrap();
        let document_bytes = document.save_to_bytes().unwrap();

        let parsed_document = lopdf::Document::load_mem(&document_bytes).unwrap();
        assert_eq!(parsed_document.get_pages().len(), 1);
    }
}

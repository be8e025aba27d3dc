//! Builders for creating test PDFs programmatically.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Builder for creating PDFs page by page.
pub struct PdfBuilder {
    pages: Vec<BuilderPage>,
}

struct BuilderPage {
    lines: Vec<String>,
    with_image: bool,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Add a page with extractable text and no images.
    pub fn text_page(mut self, text: &str) -> Self {
        self.pages.push(BuilderPage {
            lines: vec![text.to_string()],
            with_image: false,
        });
        self
    }

    /// Add a page with several lines of extractable text.
    pub fn text_lines(mut self, lines: &[&str]) -> Self {
        self.pages.push(BuilderPage {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            with_image: false,
        });
        self
    }

    /// Add a page with an embedded image and no text, like a scan.
    pub fn scanned_page(mut self) -> Self {
        self.pages.push(BuilderPage {
            lines: Vec::new(),
            with_image: true,
        });
        self
    }

    /// Add a page with both text and an embedded image.
    pub fn mixed_page(mut self, text: &str) -> Self {
        self.pages.push(BuilderPage {
            lines: vec![text.to_string()],
            with_image: true,
        });
        self
    }

    /// Add a page with no content at all.
    pub fn blank_page(mut self) -> Self {
        self.pages.push(BuilderPage {
            lines: Vec::new(),
            with_image: false,
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let image_id = add_image(&mut doc);

        let kids: Vec<Object> = self
            .pages
            .iter()
            .map(|page| add_page(&mut doc, pages_id, font_id, image_id, page).into())
            .collect();

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn add_image(doc: &mut Document) -> ObjectId {
    // 2x2 grey
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![128, 128, 128, 128],
    ))
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    image_id: ObjectId,
    page: &BuilderPage,
) -> ObjectId {
    let mut operations = Vec::new();

    // One text object per line so each comes out on its own line
    for (i, line) in page.lines.iter().enumerate() {
        let y = 740 - 16 * i as i64;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
        operations.push(Operation::new("Td", vec![50.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.as_str())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    if page.with_image {
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                400.into(),
                0.into(),
                0.into(),
                300.into(),
                100.into(),
                100.into(),
            ],
        ));
        operations.push(Operation::new("Do", vec!["Im1".into()]));
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let mut resources = dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    };
    if page.with_image {
        resources.set("XObject", dictionary! { "Im1" => image_id });
    }

    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources,
    })
}

//! In-memory PDFs for unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImagePlacement {
    None,
    OnPage,
    /// Image XObject declared on the parent `Pages` node only.
    Inherited,
    /// A form XObject with no image inside.
    FormOnly,
}

pub(crate) struct FixturePage {
    text: Option<String>,
    image: ImagePlacement,
}

impl FixturePage {
    pub(crate) fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            image: ImagePlacement::None,
        }
    }

    pub(crate) fn text_with_image(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            image: ImagePlacement::OnPage,
        }
    }

    pub(crate) fn scanned() -> Self {
        Self {
            text: None,
            image: ImagePlacement::OnPage,
        }
    }

    pub(crate) fn scanned_inherited() -> Self {
        Self {
            text: None,
            image: ImagePlacement::Inherited,
        }
    }

    pub(crate) fn form_only() -> Self {
        Self {
            text: None,
            image: ImagePlacement::FormOnly,
        }
    }

    pub(crate) fn blank() -> Self {
        Self {
            text: None,
            image: ImagePlacement::None,
        }
    }
}

pub(crate) fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    // 1x1 white pixel
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        vec![255, 255, 255],
    ));

    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        },
        Vec::new(),
    ));

    let mut kids: Vec<Object> = Vec::new();
    let mut inherit_images = false;

    for page in pages {
        let mut operations = Vec::new();

        if let Some(text) = &page.text {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text.as_str())]),
                Operation::new("ET", vec![]),
            ]);
        }

        let xobject_name = match page.image {
            ImagePlacement::OnPage | ImagePlacement::Inherited => Some("Im1"),
            ImagePlacement::FormOnly => Some("Fm1"),
            ImagePlacement::None => None,
        };
        if let Some(name) = xobject_name {
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        500.into(),
                        0.into(),
                        0.into(),
                        500.into(),
                        50.into(),
                        100.into(),
                    ],
                ),
                Operation::new("Do", vec![name.into()]),
                Operation::new("Q", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        };

        match page.image {
            ImagePlacement::None => {
                page_dict.set("Resources", dictionary! { "Font" => dictionary! { "F1" => font_id } });
            }
            ImagePlacement::OnPage => {
                page_dict.set(
                    "Resources",
                    dictionary! {
                        "Font" => dictionary! { "F1" => font_id },
                        "XObject" => dictionary! { "Im1" => image_id },
                    },
                );
            }
            ImagePlacement::FormOnly => {
                page_dict.set(
                    "Resources",
                    dictionary! {
                        "Font" => dictionary! { "F1" => font_id },
                        "XObject" => dictionary! { "Fm1" => form_id },
                    },
                );
            }
            ImagePlacement::Inherited => inherit_images = true,
        }

        kids.push(doc.add_object(page_dict).into());
    }

    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => pages.len() as i64,
        "Kids" => kids,
    };
    if inherit_images {
        pages_dict.set(
            "Resources",
            dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => dictionary! { "Im1" => image_id },
            },
        );
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut pdf_bytes = Vec::new();
    doc.save_to(&mut pdf_bytes).unwrap();
    pdf_bytes
}

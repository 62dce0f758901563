use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use tendersift::application::ports::{PageExtractor, PageExtractorError};
use tendersift::infrastructure::text_processing::LopdfExtractor;

/// Builds a minimal one-font PDF with one content stream per page.
fn make_test_pdf(page_texts: &[&str], title: Option<Object>) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    let mut page_ids = Vec::new();
    for text in page_texts {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
        page_ids.push(page_id);
    }

    let page_count = page_texts.len() as i64;
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
    });

    for page_id in page_ids {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! { "Title" => title });
        doc.trailer.set("Info", info_id);
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

#[tokio::test]
async fn given_single_page_pdf_when_extracting_then_text_recovered() {
    let data = make_test_pdf(&["Tender Notice 2025"], None);
    let extractor = LopdfExtractor::new();

    let pages = extractor.extract_pages(&data).await.unwrap();

    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains("Tender Notice 2025"));
}

#[tokio::test]
async fn given_multi_page_pdf_when_extracting_then_pages_in_document_order() {
    let data = make_test_pdf(&["first page words", "second page words"], None);
    let extractor = LopdfExtractor::new();

    let pages = extractor.extract_pages(&data).await.unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("first page words"));
    assert!(pages[1].contains("second page words"));
}

#[tokio::test]
async fn given_pdf_without_pages_when_extracting_then_empty_vec() {
    let data = make_test_pdf(&[], None);
    let extractor = LopdfExtractor::new();

    let pages = extractor.extract_pages(&data).await.unwrap();

    assert!(pages.is_empty());
}

#[tokio::test]
async fn given_garbage_bytes_when_extracting_then_invalid_document() {
    let extractor = LopdfExtractor::new();

    let result = extractor.extract_pages(b"definitely not a pdf").await;

    assert!(matches!(result, Err(PageExtractorError::InvalidDocument(_))));
}

#[tokio::test]
async fn given_pdf_with_info_title_when_reading_metadata_then_title_returned() {
    let data = make_test_pdf(
        &["body text"],
        Some(Object::string_literal("Road Works Tender")),
    );
    let extractor = LopdfExtractor::new();

    let metadata = extractor.extract_metadata(&data).await.unwrap();

    assert_eq!(metadata.page_count, 1);
    assert_eq!(metadata.title.as_deref(), Some("Road Works Tender"));
    assert_eq!(metadata.author, None);
}

#[tokio::test]
async fn given_utf16_title_when_reading_metadata_then_decoded() {
    let mut title_bytes = vec![0xFE, 0xFF];
    for unit in "Überführung".encode_utf16() {
        title_bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let data = make_test_pdf(
        &["body text"],
        Some(Object::String(title_bytes, StringFormat::Hexadecimal)),
    );
    let extractor = LopdfExtractor::new();

    let metadata = extractor.extract_metadata(&data).await.unwrap();

    assert_eq!(metadata.title.as_deref(), Some("Überführung"));
}

#[tokio::test]
async fn given_garbage_bytes_when_reading_metadata_then_invalid_document() {
    let extractor = LopdfExtractor::new();

    let result = extractor.extract_metadata(b"definitely not a pdf").await;

    assert!(matches!(result, Err(PageExtractorError::InvalidDocument(_))));
}

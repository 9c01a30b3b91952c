//! Rendering tests for the local report
//!
//! Reports are rendered to bytes and inspected with lopdf.

use chrono::NaiveDate;
use lopdf::{Document, Object};
use pretty_assertions::assert_eq;
use report::{
    EventMeta, ExportRequest, Item, LocalRenderer, PageContent, QrRasterizer, ReportError,
    ReportSettings,
};

fn renderer() -> LocalRenderer {
    LocalRenderer::new(ReportSettings::default())
        .with_generated_on(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
}

fn request(event_id: Option<&str>, referees: &[&str], titles: &[&str]) -> ExportRequest {
    ExportRequest {
        event: EventMeta {
            event_id: event_id.map(str::to_string),
            ..EventMeta::default()
        },
        items: titles
            .iter()
            .enumerate()
            .map(|(id, title)| Item::new(id as u32, *title))
            .collect(),
        referees: referees.iter().map(|r| r.to_string()).collect(),
    }
}

fn page_contents(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

fn link_uris(bytes: &[u8], page: u32) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let id = doc.get_pages()[&page];
    let dict = doc.get_object(id).unwrap().as_dict().unwrap();
    let Ok(annots) = dict.get(b"Annots") else {
        return Vec::new();
    };
    annots
        .as_array()
        .unwrap()
        .iter()
        .map(|annot| {
            let action = annot.as_dict().unwrap().get(b"A").unwrap().as_dict().unwrap();
            match action.get(b"URI").unwrap() {
                Object::String(bytes, _) => String::from_utf8(bytes.clone()).unwrap(),
                other => panic!("unexpected URI object: {other:?}"),
            }
        })
        .collect()
}

fn tj(text: &str) -> String {
    format!("({text}) Tj")
}

#[test]
fn test_two_referees_three_posters() {
    let request = request(Some("42"), &["a@x.com", "b@y.com"], &["P1", "P2", "P3"]);
    let rendered = renderer().render(&request).unwrap();

    assert_eq!(rendered.filename, "EventRate-Pro-Export-42.pdf");
    assert_eq!(rendered.document.page_count(), 3);
    assert_eq!(rendered.document.pages[0].content, PageContent::Cover { referees: 0..2 });

    let pages = page_contents(&rendered.bytes);
    assert_eq!(pages.len(), 3);

    let cover = &pages[0];
    for text in ["Event Export Report", "Referee List", "1.", "a@x.com", "2.", "b@y.com"] {
        assert!(cover.contains(&tj(text)), "cover is missing {text}");
    }

    assert!(pages[1].contains(&tj("QR Codes")));
    assert!(pages[1].contains(&tj("P1")));
    assert!(pages[1].contains(&tj("P2")));
    assert!(!pages[1].contains(&tj("P3")));
    assert!(pages[2].contains(&tj("P3")));

    for (index, page) in pages.iter().enumerate() {
        assert!(page.contains(&tj(&format!("Page {} of 3", index + 1))));
        assert!(page.contains(&tj("EventRate Pro")));
    }
}

#[test]
fn test_cover_event_information_and_counts() {
    let request = request(Some("42"), &["a@x.com", "b@y.com"], &["P1", "P2", "P3"]);
    let pages = page_contents(&renderer().render(&request).unwrap().bytes);
    let cover = &pages[0];

    assert!(cover.contains(&tj("Event ID: 42")));
    assert!(cover.contains(&tj("Status: Pending")));
    assert!(cover.contains(&tj("Generated: 2026-10-17")));
    assert!(cover.contains(&tj("QR Codes")));
    assert!(cover.contains(&tj("Referees")));
    assert!(cover.contains(&tj("3")));
    assert!(cover.contains(&tj("2")));
}

#[test]
fn test_missing_event_id() {
    let rendered = renderer().render(&request(None, &["a@x.com"], &["P1"])).unwrap();

    assert_eq!(rendered.filename, "EventRate-Pro-Export-report.pdf");
    assert!(page_contents(&rendered.bytes)[0].contains(&tj("Event ID: N/A")));
}

#[test]
fn test_referee_overflow_adds_continuation_pages() {
    let emails: Vec<String> = (1..=40).map(|n| format!("referee{n}@example.com")).collect();
    let emails: Vec<&str> = emails.iter().map(String::as_str).collect();
    let rendered = renderer().render(&request(Some("7"), &emails, &["P1"])).unwrap();

    // Cover holds 7 rows, continuation pages 28
    assert_eq!(rendered.document.page_count(), 4);
    let pages = page_contents(&rendered.bytes);

    assert!(pages[0].contains(&tj("referee7@example.com")));
    assert!(!pages[0].contains(&tj("referee8@example.com")));

    let continued = tj(r"Referee List \(continued\)");
    assert!(pages[1].contains(&continued));
    assert!(pages[1].contains(&tj("8.")));
    assert!(pages[1].contains(&tj("referee35@example.com")));
    assert!(pages[2].contains(&continued));
    assert!(pages[2].contains(&tj("referee40@example.com")));
    assert!(pages[3].contains(&tj("P1")));
    assert!(pages[3].contains(&tj("Page 4 of 4")));
}

#[test]
fn test_empty_referee_list_placeholder() {
    let rendered = renderer().render(&request(Some("1"), &[], &["P1"])).unwrap();
    let pages = page_contents(&rendered.bytes);

    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains(&tj("No referees have been added to this event.")));
    assert!(pages[0].contains(&tj("0")));
}

#[test]
fn test_poster_links_and_fallback_title() {
    let mut request = request(Some("1"), &["a@x.com"], &["P1", "P2"]);
    request.items[0].link = Some("https://vote.example.com/choose-role/q/0".to_string());
    request.items[1].title = None;

    let rendered = renderer().render(&request).unwrap();
    let pages = page_contents(&rendered.bytes);

    assert!(pages[1].contains(&tj("Poster 2")));
    assert!(pages[1].contains(&tj("Scan this QR code to access the questionnaire")));
    assert!(pages[1].contains(&tj("URL:")));
    assert!(pages[1].contains(&tj("https://vote.example.com/choose-role/q/0")));
    assert_eq!(pages[1].matches(" Do").count(), 2);

    assert_eq!(
        link_uris(&rendered.bytes, 2),
        vec![
            "https://vote.example.com/choose-role/q/0".to_string(),
            "https://event-rate-pro.vercel.app/questionnaire/1".to_string(),
        ]
    );
    assert!(link_uris(&rendered.bytes, 1).is_empty());
}

#[test]
fn test_custom_settings() {
    let mut settings = ReportSettings::default();
    settings.product_label = "Poster Night".to_string();
    settings.filename_template = "votes-{event_id}.pdf".to_string();
    settings.layout.items_per_page = 3;
    settings.compress = false;

    let rendered = LocalRenderer::new(settings)
        .render(&request(Some("9"), &["a@x.com"], &["A", "B", "C", "D"]))
        .unwrap();

    assert_eq!(rendered.filename, "votes-9.pdf");
    assert_eq!(rendered.document.page_count(), 3);
    assert_eq!(rendered.document.pages[1].content, PageContent::Items { items: 0..3 });
    assert!(page_contents(&rendered.bytes)[2].contains(&tj("Poster Night")));
}

struct FailingRasterizer;

impl QrRasterizer for FailingRasterizer {
    fn rasterize(&self, _data: &str) -> report::Result<Vec<u8>> {
        Err(ReportError::QrCodeError("encoder unavailable".to_string()))
    }
}

#[test]
fn test_rasterizer_failure_aborts_render() {
    let result = renderer()
        .with_rasterizer(FailingRasterizer)
        .render(&request(Some("1"), &["a@x.com"], &["P1"]));

    match result {
        Err(ReportError::QrCodeError(message)) => assert_eq!(message, "encoder unavailable"),
        other => panic!("expected QR failure, got {other:?}"),
    }
}

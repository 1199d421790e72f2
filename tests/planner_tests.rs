// File: tests/planner_tests.rs
use chrono::{NaiveDate, NaiveDateTime};
use paperplan::PlannerError;
use paperplan::aggregate::{AggregatorSettings, DataAggregator};
use paperplan::client::MemorySource;
use paperplan::context::TestContext;
use paperplan::document::SealedDocument;
use paperplan::model::{CalendarEvent, Task};
use paperplan::page::Bookmark;
use paperplan::planner::{PlannerOptions, build_month_document, generate_year, planner_file_name};
use paperplan::writer::PdfWriter;
use std::fs;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
    date.and_hms_opt(h, min, 0).unwrap()
}

fn sample_source() -> MemorySource {
    let d = day(2026, 7, 14);
    MemorySource::new()
        .with_event(CalendarEvent::timed("Team Sync", at(d, 10, 0), at(d, 10, 30)))
        .with_event(
            CalendarEvent::timed("Launch", at(day(2026, 7, 20), 9, 0), at(day(2026, 7, 20), 11, 0))
                .with_description("@headline"),
        )
        .with_task(Task::new("Team Sync").due_on(d))
        .with_task(Task::new("Pack for trip").due_on(d).with_labels(&["headline"]))
        .with_calendar_event(
            "en.usa#holiday@group.v.calendar.google.com",
            CalendarEvent::all_day("Independence Day", day(2026, 7, 4)),
        )
}

fn aggregator(source: MemorySource) -> DataAggregator<MemorySource, MemorySource> {
    DataAggregator::new(source.clone(), source, AggregatorSettings::default())
}

async fn month(year: i32, month: u32) -> SealedDocument {
    let agg = aggregator(sample_source());
    let items = agg.yearly_headline_items(year).await.unwrap();
    build_month_document(&agg, year, month, &items, &PlannerOptions::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn july_has_every_page_in_order() {
    let document = month(2026, 7).await;

    // 4 quarters + month + 5 weeks + 31 * 2 days + 10 notes
    assert_eq!(document.page_count(), 82);
    assert_eq!(document.title(), Some("July 2026 Planner"));

    let labels: Vec<&str> = document.pages().iter().map(|p| p.label.as_str()).collect();
    assert_eq!(&labels[..4], &["yearly overview"; 4]);
    assert_eq!(labels[4], "monthly overview");
    assert_eq!(&labels[5..10], &["weekly"; 5]);
    assert_eq!(labels[10], "daily schedule");
    assert_eq!(labels[11], "daily tasks");
    assert_eq!(labels[72], "notes");

    assert_eq!(document.ordinal_of(&Bookmark::year_quarter(2026, 1)), Some(1));
    assert_eq!(document.ordinal_of(&Bookmark::month(2026, 7)), Some(5));
    assert_eq!(document.ordinal_of(&Bookmark::week(2026, 27)), Some(6));
    assert_eq!(document.ordinal_of(&Bookmark::day_schedule(day(2026, 7, 1))), Some(11));
    assert_eq!(document.ordinal_of(&Bookmark::day_tasks(day(2026, 7, 31))), Some(72));
    assert_eq!(document.ordinal_of(&Bookmark::notes()), Some(73));
}

#[tokio::test]
async fn every_link_in_a_month_resolves() {
    for m in [1, 2, 7, 12] {
        let document = month(2026, m).await;
        assert_eq!(document.dropped_links(), 0, "month {}", m);
        assert!(document.link_count() > 0);
    }
}

#[tokio::test]
async fn rebuilding_a_month_gives_the_same_document() {
    let first = month(2026, 7).await;
    let second = month(2026, 7).await;

    let anchors = |doc: &SealedDocument| -> Vec<(usize, Option<Bookmark>)> {
        doc.pages().iter().map(|p| (p.ordinal, p.anchor.clone())).collect()
    };
    let links = |doc: &SealedDocument| {
        doc.pages()
            .iter()
            .flat_map(|p| p.links.iter().map(move |l| (p.ordinal, l.bookmark.clone(), l.destination, l.rect)))
            .collect::<Vec<_>>()
    };

    assert_eq!(anchors(&first), anchors(&second));
    assert_eq!(links(&first), links(&second));
    assert_eq!(first.dropped_links(), second.dropped_links());
    assert_eq!(first, second);

    let writer = PdfWriter::new();
    assert_eq!(writer.render(&first), writer.render(&second));
}

#[tokio::test]
async fn independence_day_header_points_into_the_document() {
    let document = month(2026, 7).await;
    let ordinal = document
        .ordinal_of(&Bookmark::day_schedule(day(2026, 7, 4)))
        .unwrap();
    let page = document.page(ordinal).unwrap();

    let target = |bookmark: Bookmark| {
        page.links
            .iter()
            .find(|l| l.bookmark == bookmark)
            .map(|l| l.destination)
    };
    assert_eq!(target(Bookmark::month(2026, 7)), Some(5));
    assert_eq!(target(Bookmark::year_quarter(2026, 3)), Some(3));
    assert_eq!(target(Bookmark::week(2026, 27)), Some(6));
    assert_eq!(target(Bookmark::day_tasks(day(2026, 7, 4))), Some(ordinal + 1));
}

#[tokio::test]
async fn without_notes_pages_the_notes_links_are_dropped() {
    let agg = aggregator(MemorySource::new());
    let options = PlannerOptions {
        notes_pages: 0,
        ..PlannerOptions::default()
    };
    let document = build_month_document(&agg, 2026, 2, &[], &options)
        .await
        .unwrap();

    assert!(document.ordinal_of(&Bookmark::notes()).is_none());
    // One notes shortcut per weekly and daily page; February has 5 weeks.
    assert_eq!(document.dropped_links(), 5 + 28 * 2);
}

#[tokio::test]
async fn pdf_output_has_one_annotation_per_link() {
    let document = month(2026, 7).await;
    let bytes = PdfWriter::new().render(&document);
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.starts_with("%PDF-1.4"));
    assert!(text.trim_end().ends_with("%%EOF"));
    assert!(text.contains("/Count 82"));
    assert!(text.contains("/Title (July 2026 Planner)"));
    assert!(text.contains("/day_2026_07_04_schedule ["));
    assert_eq!(text.matches("/Subtype /Link").count(), document.link_count());
}

#[tokio::test]
async fn generate_year_writes_one_file_per_month() {
    let ctx = TestContext::new();
    let output = ctx.root.join("planner_2026");
    let agg = aggregator(sample_source());

    let written = generate_year(
        &agg,
        2026,
        &[6, 7],
        &PlannerOptions::default(),
        &PdfWriter::new(),
        &output,
    )
    .await
    .unwrap();

    assert_eq!(
        written,
        vec![output.join("2026_06_June.pdf"), output.join("2026_07_July.pdf")]
    );
    for path in &written {
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
    }
}

#[tokio::test]
async fn invalid_month_fails_before_writing() {
    let ctx = TestContext::new();
    let output = ctx.root.join("out");
    let agg = aggregator(sample_source());

    let err = generate_year(
        &agg,
        2026,
        &[1, 13],
        &PlannerOptions::default(),
        &PdfWriter::new(),
        &output,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PlannerError::Config(_)), "got {:?}", err);
    assert!(!output.exists());
}

#[tokio::test]
async fn upstream_failure_aborts_generation() {
    let ctx = TestContext::new();
    let agg = aggregator(sample_source().with_failing_tasks());

    let err = generate_year(
        &agg,
        2026,
        &[7],
        &PlannerOptions::default(),
        &PdfWriter::new(),
        &ctx.root,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PlannerError::Upstream { .. }));
}

#[test]
fn file_names_carry_year_month_and_name() {
    assert_eq!(planner_file_name(2026, 7), "2026_07_July.pdf");
    assert_eq!(planner_file_name(2027, 12), "2027_12_December.pdf");
}

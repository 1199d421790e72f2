// File: tests/aggregate_tests.rs
use chrono::{NaiveDate, NaiveDateTime};
use paperplan::PlannerError;
use paperplan::aggregate::{AggregatorSettings, DataAggregator, merge_headlines};
use paperplan::client::MemorySource;
use paperplan::model::{CalendarEvent, HeadlineKind, Task};

const HOLIDAYS: &str = "en.usa#holiday@group.v.calendar.google.com";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
    date.and_hms_opt(h, min, 0).unwrap()
}

fn aggregator(source: MemorySource) -> DataAggregator<MemorySource, MemorySource> {
    DataAggregator::new(source.clone(), source, AggregatorSettings::default())
}

#[tokio::test]
async fn task_matching_an_event_is_dropped() {
    let d = day(2026, 3, 5);
    let source = MemorySource::new()
        .with_task(Task::new("Team Sync").due_on(d))
        .with_task(Task::new("Write report").due_on(d).with_labels(&["work", "30min"]))
        .with_event(CalendarEvent::timed("team sync", at(d, 10, 0), at(d, 10, 30)));

    let tasks = aggregator(source).daily_tasks(d).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "Write report @30min @work");
}

#[tokio::test]
async fn near_match_is_not_a_duplicate() {
    let d = day(2026, 3, 5);
    let source = MemorySource::new()
        .with_task(Task::new("Team sync call").due_on(d))
        .with_event(CalendarEvent::timed("Team sync", at(d, 10, 0), at(d, 11, 0)));

    let tasks = aggregator(source).daily_tasks(d).await.unwrap();
    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn daily_tasks_are_idempotent() {
    let d = day(2026, 3, 5);
    let source = MemorySource::new()
        .with_task(Task::new("A").due_on(d))
        .with_task(Task::new("B").due_on(d));
    let agg = aggregator(source);

    let first = agg.daily_tasks(d).await.unwrap();
    let second = agg.daily_tasks(d).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].text, "A", "source order is kept");
}

#[tokio::test]
async fn headline_items_merge_and_sort_by_date() {
    let source = MemorySource::new()
        .with_event(
            CalendarEvent::timed("Launch", at(day(2026, 5, 2), 9, 0), at(day(2026, 5, 2), 10, 0))
                .with_description("big day @HEADLINE"),
        )
        .with_event(CalendarEvent::timed(
            "Routine",
            at(day(2026, 1, 7), 9, 0),
            at(day(2026, 1, 7), 10, 0),
        ))
        .with_calendar_event(HOLIDAYS, CalendarEvent::all_day("Independence Day", day(2026, 7, 4)))
        .with_calendar_event(HOLIDAYS, CalendarEvent::all_day("Labor Day", day(2026, 5, 2)))
        .with_task(Task::new("File taxes").due_on(day(2026, 4, 15)).with_labels(&["Headline"]))
        .with_task(Task::new("Ordinary").due_on(day(2026, 4, 16)))
        .with_task(Task::new("Undated headline").with_labels(&["headline"]));

    let items = aggregator(source).yearly_headline_items(2026).await.unwrap();
    let summary: Vec<(NaiveDate, &str, HeadlineKind)> = items
        .iter()
        .map(|i| (i.date, i.text.as_str(), i.kind))
        .collect();

    assert_eq!(
        summary,
        vec![
            (day(2026, 4, 15), "File taxes", HeadlineKind::Task),
            (day(2026, 5, 2), "Launch", HeadlineKind::Event),
            (day(2026, 5, 2), "Labor Day", HeadlineKind::Holiday),
            (day(2026, 7, 4), "Independence Day", HeadlineKind::Holiday),
        ]
    );
}

#[tokio::test]
async fn holiday_failure_degrades_to_events_and_tasks() {
    let source = MemorySource::new()
        .with_event(
            CalendarEvent::timed("Offsite", at(day(2026, 6, 1), 9, 0), at(day(2026, 6, 1), 17, 0))
                .with_description("@headline"),
        )
        .with_task(Task::new("Renew passport").due_on(day(2026, 2, 1)).with_labels(&["headline"]))
        .with_failing_calendar(HOLIDAYS);

    let items = aggregator(source).yearly_headline_items(2026).await.unwrap();

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.kind != HeadlineKind::Holiday));
}

#[tokio::test]
async fn primary_calendar_failure_propagates() {
    let source = MemorySource::new().with_failing_calendar("primary");
    let err = aggregator(source)
        .weekly_events(day(2026, 3, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::Upstream { .. }));
}

#[tokio::test]
async fn task_failure_propagates() {
    let source = MemorySource::new().with_failing_tasks();
    let err = aggregator(source).daily_tasks(day(2026, 3, 5)).await.unwrap_err();
    assert!(matches!(err, PlannerError::Upstream { .. }));
}

#[tokio::test]
async fn weekly_events_cover_seven_days() {
    let monday = day(2026, 3, 2);
    let source = MemorySource::new()
        .with_event(CalendarEvent::timed("Sun", at(day(2026, 3, 8), 9, 0), at(day(2026, 3, 8), 10, 0)))
        .with_event(CalendarEvent::timed("Next Mon", at(day(2026, 3, 9), 9, 0), at(day(2026, 3, 9), 10, 0)))
        .with_event(CalendarEvent::timed("Mon", at(monday, 8, 0), at(monday, 9, 0)));

    let events = aggregator(source).weekly_events(monday).await.unwrap();
    let labels: Vec<&str> = events.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Mon", "Sun"]);
}

#[tokio::test]
async fn overnight_event_belongs_to_both_days() {
    let source = MemorySource::new()
        .with_event(CalendarEvent::timed("Red-eye", at(day(2026, 7, 3), 22, 0), at(day(2026, 7, 4), 6, 0)))
        .with_event(CalendarEvent::timed("Ends at midnight", at(day(2026, 7, 3), 20, 0), at(day(2026, 7, 4), 0, 0)));
    let agg = aggregator(source);

    let labels = |events: Vec<paperplan::model::EventView>| -> Vec<String> {
        events.into_iter().map(|e| e.label).collect()
    };
    assert_eq!(
        labels(agg.daily_events(day(2026, 7, 3)).await.unwrap()),
        vec!["Ends at midnight", "Red-eye"]
    );
    assert_eq!(labels(agg.daily_events(day(2026, 7, 4)).await.unwrap()), vec!["Red-eye"]);
}

#[tokio::test]
async fn day_view_matches_individual_queries() {
    let d = day(2026, 3, 5);
    let source = MemorySource::new()
        .with_task(Task::new("Team Sync").due_on(d))
        .with_task(Task::new("Call mom").due_on(d))
        .with_event(
            CalendarEvent::timed("Team Sync", at(d, 10, 0), at(d, 11, 0)).with_description("@headline"),
        );
    let agg = aggregator(source);

    let view = agg.day_view(d).await.unwrap();
    assert_eq!(view.events, agg.daily_events(d).await.unwrap());
    assert_eq!(view.tasks, agg.daily_tasks(d).await.unwrap());
    assert_eq!(view.headlines, agg.headline_events_for_day(d).await.unwrap());
    assert_eq!(view.headlines.len(), 1);
}

#[tokio::test]
async fn untitled_events_are_labelled_by_calendar() {
    let d = day(2026, 11, 26);
    let source = MemorySource::new()
        .with_event(CalendarEvent::timed("", at(d, 9, 0), at(d, 10, 0)).with_description("@headline"))
        .with_calendar_event(HOLIDAYS, CalendarEvent::all_day("  ", d));
    let agg = aggregator(source);

    let events = agg.daily_events(d).await.unwrap();
    assert_eq!(events[0].label, "Untitled");

    let items = agg.yearly_headline_items(2026).await.unwrap();
    let summary: Vec<(&str, HeadlineKind)> = items.iter().map(|i| (i.text.as_str(), i.kind)).collect();
    assert!(summary.contains(&("Holiday", HeadlineKind::Holiday)));
    assert!(summary.contains(&("Untitled", HeadlineKind::Event)));
}

#[test]
fn merge_ignores_items_outside_range() {
    let range = day(2026, 1, 1)..=day(2026, 12, 31);
    let holidays = vec![
        CalendarEvent::all_day("New Year", day(2027, 1, 1)),
        CalendarEvent::all_day("", day(2026, 12, 25)),
    ];
    let items = merge_headlines(&[], &holidays, &[], &range, "@headline", "headline");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "Holiday", "untitled holidays get a placeholder");
}

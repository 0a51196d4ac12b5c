mod common;

use common::{TestPage, TestResult};
use readnav::traits::{HeadingSpec, IntersectionEntry, ScrollBehavior};
use readnav::types::{HeadingId, HeadingLevel};
use readnav::{OutlineConfig, OutlineTracker, RetryPolicy, SlugStyle, TrackerStatus};
use std::collections::HashSet;
use std::time::Duration;

fn ids(tracker: &OutlineTracker) -> Vec<String> {
    tracker.outline().ids().map(|id| id.to_string()).collect()
}

#[test]
fn test_lesson_headings_get_positional_ids() -> TestResult {
    let page = TestPage::new();
    let keys = page.mount_lesson();
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());

    tracker.start()?;

    assert_eq!(ids(&tracker), vec!["intro-0", "setup-1", "details-2"]);
    let levels: Vec<HeadingLevel> = tracker.outline().iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![HeadingLevel::H2, HeadingLevel::H2, HeadingLevel::H3]);
    for (key, id) in keys.iter().zip(ids(&tracker)) {
        assert_eq!(page.document.attribute(*key, "id"), Some(id));
    }
    Ok(())
}

#[test]
fn test_duplicate_text_yields_distinct_ids_in_order() -> TestResult {
    let page = TestPage::new();
    let texts = ["Example", "Example", "Notes", "Example", "", "Notes"];
    page.mount_content(texts.iter().map(|t| HeadingSpec::h2(*t)));
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());

    tracker.start()?;

    let outline = tracker.outline();
    assert_eq!(outline.len(), texts.len());
    let unique: HashSet<&str> = outline.ids().map(HeadingId::as_str).collect();
    assert_eq!(unique.len(), texts.len());
    let in_order: Vec<&str> = outline.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(in_order, texts);
    assert!(
        outline
            .ids()
            .all(|id| id.as_str().chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'))
    );
    Ok(())
}

#[test]
fn test_rebuilding_assigned_outline_keeps_ids() -> TestResult {
    let page = TestPage::new();
    page.mount_content([
        HeadingSpec::h2("Intro"),
        HeadingSpec::h2("Intro").with_id("faq"),
        HeadingSpec::h3("Deep dive").with_id("faq"),
    ]);
    let first = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    first.start()?;
    let writes = page.document.write_count();

    let second = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    second.start()?;

    assert_eq!(ids(&first), ids(&second));
    assert_eq!(page.document.write_count(), writes);
    Ok(())
}

#[test]
fn test_transliterated_slugs() -> TestResult {
    let page = TestPage::new();
    page.mount_content([HeadingSpec::h2("Café Menü")]);
    let config = OutlineConfig {
        slug_style: SlugStyle::Transliterate,
        ..OutlineConfig::default()
    };
    let tracker = OutlineTracker::new(&page.platform(), config);

    tracker.start()?;

    assert_eq!(ids(&tracker), vec!["cafe-menu-0"]);
    Ok(())
}

#[test]
fn test_late_content_is_picked_up_by_retry() -> TestResult {
    let page = TestPage::new();
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    tracker.start()?;

    page.scheduler.advance(Duration::from_millis(150));
    assert_eq!(tracker.status(), TrackerStatus::Waiting { attempt: 4 });

    page.mount_lesson();
    page.scheduler.advance(Duration::from_millis(50));

    assert_eq!(tracker.status(), TrackerStatus::Ready);
    assert_eq!(tracker.outline().len(), 3);
    assert_eq!(page.intersections.connected(), 1);
    Ok(())
}

#[test]
fn test_retry_exhaustion_degrades_to_empty_outline() -> TestResult {
    let page = TestPage::new();
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    tracker.start()?;

    let fired = page.scheduler.advance(Duration::from_secs(60));

    assert_eq!(fired, 19);
    assert_eq!(tracker.status(), TrackerStatus::Abandoned);
    assert!(tracker.outline().is_empty());
    assert!(tracker.outline_view().is_empty());
    assert_eq!(page.live_registrations(), 0);
    Ok(())
}

#[test]
fn test_band_matches_sticky_header() -> TestResult {
    let page = TestPage::new();
    page.mount_lesson();
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    tracker.start()?;

    assert_eq!(page.intersections.connected(), 1);
    let targets = page.intersections.observed_targets();
    assert_eq!(targets.len(), 3);
    Ok(())
}

#[test]
fn test_active_heading_follows_batches() -> TestResult {
    let page = TestPage::new();
    let keys = page.mount_lesson();
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    tracker.start()?;

    // The initial delivery reports everything; only the intersecting one counts.
    page.intersections.deliver(&[
        IntersectionEntry::entering(keys[0], 200.0),
        IntersectionEntry::leaving(keys[1], 900.0),
        IntersectionEntry::leaving(keys[2], 1600.0),
    ]);
    assert_eq!(tracker.active_id(), Some(HeadingId::new("intro-0")));

    page.intersections.deliver(&[
        IntersectionEntry::leaving(keys[0], 60.0),
        IntersectionEntry::entering(keys[1], 120.0),
    ]);
    assert_eq!(tracker.active_id(), Some(HeadingId::new("setup-1")));

    // Scrolling back up past everything leaves the last active heading.
    page.intersections.deliver(&[IntersectionEntry::leaving(keys[1], 400.0)]);
    assert_eq!(tracker.active_id(), Some(HeadingId::new("setup-1")));
    Ok(())
}

#[test]
fn test_scroll_to_lands_below_header() -> TestResult {
    let page = TestPage::new();
    page.mount_lesson();
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    tracker.start()?;

    tracker.scroll_to(&HeadingId::new("details-2"))?;

    assert_eq!(
        page.viewport.scroll_requests(),
        vec![(1504.0, ScrollBehavior::Smooth)]
    );
    assert_eq!(page.viewport.fragment().as_deref(), Some("#details-2"));
    assert_eq!(tracker.active_id(), Some(HeadingId::new("details-2")));
    Ok(())
}

#[test]
fn test_teardown_twice_cancels_once() -> TestResult {
    let page = TestPage::new();
    let config = OutlineConfig {
        retry: RetryPolicy::fixed(5, 100),
        ..OutlineConfig::default()
    };
    let tracker = OutlineTracker::new(&page.platform(), config);
    tracker.start()?;

    tracker.teardown();
    tracker.teardown();

    assert_eq!(page.scheduler.cancelled(), 1);
    assert_eq!(page.live_registrations(), 0);
    assert_eq!(tracker.status(), TrackerStatus::TornDown);
    Ok(())
}

#[test]
fn test_teardown_without_root_is_safe() {
    let page = TestPage::new();
    let tracker = OutlineTracker::new(&page.platform(), OutlineConfig::default());
    tracker.teardown();
    assert_eq!(page.scheduler.cancelled(), 0);
    assert_eq!(page.live_registrations(), 0);
}

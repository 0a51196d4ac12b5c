#![allow(dead_code)]

use readnav::traits::{
    HeadingSpec, InMemoryDocument, InMemoryViewport, ManualEventHub, ManualIntersections,
    ManualScheduler,
};
use readnav::types::NodeKey;
use readnav::{NavigatorElements, Platform};
use std::rc::Rc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A page served entirely by in-memory providers.
pub struct TestPage {
    pub document: Rc<InMemoryDocument>,
    pub viewport: Rc<InMemoryViewport>,
    pub scheduler: Rc<ManualScheduler>,
    pub intersections: Rc<ManualIntersections>,
    pub events: Rc<ManualEventHub>,
    pub trigger: NodeKey,
    pub panel: NodeKey,
    pub panel_link: NodeKey,
    pub fill: NodeKey,
    pub body: NodeKey,
}

impl TestPage {
    /// An empty page, 3000px tall in a 1000px viewport, with header and
    /// progress elements but no content root yet.
    pub fn new() -> Self {
        init_logging();
        let document = Rc::new(InMemoryDocument::new());
        let body = document.add_element();
        let trigger = document.add_element();
        let panel = document.add_element();
        let panel_link = document.add_element();
        let fill = document.add_element();
        Self {
            document,
            viewport: Rc::new(InMemoryViewport::new(3000.0, 1000.0)),
            scheduler: Rc::new(ManualScheduler::new()),
            intersections: Rc::new(ManualIntersections::new()),
            events: Rc::new(ManualEventHub::new()),
            trigger,
            panel,
            panel_link,
            fill,
            body,
        }
    }

    pub fn platform(&self) -> Platform {
        Platform::new(
            self.document.clone(),
            self.viewport.clone(),
            self.scheduler.clone(),
            self.intersections.clone(),
            self.events.clone(),
        )
    }

    pub fn elements(&self) -> NavigatorElements {
        NavigatorElements {
            menu: Some((self.trigger, self.panel)),
            progress_fill: Some(self.fill),
        }
    }

    /// Mounts `#content` with the given headings.
    pub fn mount_content(&self, headings: impl IntoIterator<Item = HeadingSpec>) -> Vec<NodeKey> {
        self.document.mount_root("content", headings)
    }

    /// The three-heading lesson used across tests.
    pub fn mount_lesson(&self) -> Vec<NodeKey> {
        self.mount_content([
            HeadingSpec::h2("Intro").at(200.0),
            HeadingSpec::h2("Setup").at(900.0),
            HeadingSpec::h3("Details").at(1600.0),
        ])
    }

    /// Listeners, timers, frames and observers still held by anything.
    pub fn live_registrations(&self) -> usize {
        self.events.total_listeners()
            + self.scheduler.pending_timers()
            + self.scheduler.pending_frames()
            + self.intersections.connected()
    }
}

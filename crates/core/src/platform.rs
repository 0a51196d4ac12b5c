use readnav_traits::{DocumentSurface, EventHub, IntersectionSource, Scheduler, Viewport};
use std::rc::Rc;

/// The platform seams the components run against.
///
/// Cloning shares the same underlying providers.
#[derive(Clone)]
pub struct Platform {
    pub document: Rc<dyn DocumentSurface>,
    pub viewport: Rc<dyn Viewport>,
    pub scheduler: Rc<dyn Scheduler>,
    pub intersections: Rc<dyn IntersectionSource>,
    pub events: Rc<dyn EventHub>,
}

impl Platform {
    pub fn new(
        document: Rc<dyn DocumentSurface>,
        viewport: Rc<dyn Viewport>,
        scheduler: Rc<dyn Scheduler>,
        intersections: Rc<dyn IntersectionSource>,
        events: Rc<dyn EventHub>,
    ) -> Self {
        Self {
            document,
            viewport,
            scheduler,
            intersections,
            events,
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("document", &self.document.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::Platform;
    use readnav_traits::{
        InMemoryDocument, InMemoryViewport, ManualEventHub, ManualIntersections, ManualScheduler,
    };
    use std::rc::Rc;

    /// In-memory providers with handles kept for driving and inspection.
    pub(crate) struct Fixture {
        pub document: Rc<InMemoryDocument>,
        pub viewport: Rc<InMemoryViewport>,
        pub scheduler: Rc<ManualScheduler>,
        pub intersections: Rc<ManualIntersections>,
        pub events: Rc<ManualEventHub>,
    }

    impl Fixture {
        pub fn new() -> Self {
            let _ = env_logger::builder().is_test(true).try_init();
            Self {
                document: Rc::new(InMemoryDocument::new()),
                viewport: Rc::new(InMemoryViewport::new(3000.0, 1000.0)),
                scheduler: Rc::new(ManualScheduler::new()),
                intersections: Rc::new(ManualIntersections::new()),
                events: Rc::new(ManualEventHub::new()),
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
    }
}

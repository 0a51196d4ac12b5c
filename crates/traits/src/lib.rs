pub mod error;
pub mod events;
pub mod observer;
pub mod scheduler;
pub mod surface;

pub use error::SurfaceError;
pub use events::{EventHub, EventKind, Listener, ListenerId, ManualEventHub, UiEvent};
pub use observer::{
    IntersectionCallback, IntersectionEntry, IntersectionSource, ManualIntersections,
    ObserverHandle,
};
pub use scheduler::{FrameTask, ManualScheduler, Scheduler, TaskHandle, TimerTask};
pub use surface::{
    DocumentSurface, HeadingNode, HeadingSpec, InMemoryDocument, InMemoryViewport,
    ScrollBehavior, Viewport,
};

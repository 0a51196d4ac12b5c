//! Timers and animation frames on top of `gloo`.
//!
//! gloo handles cancel when dropped, so a pending task lives exactly as long
//! as its entry in the table.

use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;
use readnav_traits::{FrameTask, Scheduler, TaskHandle, TimerTask};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

enum Pending {
    Timer { _timeout: Timeout },
    Frame { _frame: AnimationFrame },
}

type PendingTable = Rc<RefCell<HashMap<TaskHandle, Pending>>>;

#[derive(Default)]
pub struct BrowserScheduler {
    next: Cell<u64>,
    pending: PendingTable,
}

impl BrowserScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    fn issue(&self) -> TaskHandle {
        let raw = self.next.get() + 1;
        self.next.set(raw);
        TaskHandle::new(raw)
    }
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay: Duration, task: TimerTask) -> TaskHandle {
        let handle = self.issue();
        let table = Rc::downgrade(&self.pending);
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, move || {
            // Drop the entry before running so the task may schedule again.
            let entry = table
                .upgrade()
                .and_then(|table| table.borrow_mut().remove(&handle));
            if entry.is_some() {
                task();
            }
        });
        self.pending
            .borrow_mut()
            .insert(handle, Pending::Timer { _timeout: timeout });
        handle
    }

    fn request_frame(&self, task: FrameTask) -> TaskHandle {
        let handle = self.issue();
        let table = Rc::downgrade(&self.pending);
        let frame = request_animation_frame(move |timestamp| {
            let entry = table
                .upgrade()
                .and_then(|table| table.borrow_mut().remove(&handle));
            if entry.is_some() {
                task(timestamp);
            }
        });
        self.pending
            .borrow_mut()
            .insert(handle, Pending::Frame { _frame: frame });
        handle
    }

    fn cancel(&self, handle: TaskHandle) -> bool {
        let removed = self.pending.borrow_mut().remove(&handle);
        removed.is_some()
    }
}

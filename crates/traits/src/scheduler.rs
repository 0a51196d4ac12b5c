//! Scheduler trait for deferred work on the UI thread.
//!
//! Nothing in the navigation components blocks; every wait is a task handed
//! to a scheduler and identified by a [`TaskHandle`] that can be cancelled.

use std::cell::RefCell;
use std::time::Duration;

/// Identifies a scheduled timer or frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub type TimerTask = Box<dyn FnOnce()>;

/// Frame callbacks receive the frame timestamp in milliseconds.
pub type FrameTask = Box<dyn FnOnce(f64)>;

pub trait Scheduler {
    /// Runs `task` once after `delay`.
    fn set_timeout(&self, delay: Duration, task: TimerTask) -> TaskHandle;

    /// Runs `task` once before the next display refresh.
    fn request_frame(&self, task: FrameTask) -> TaskHandle;

    /// Cancels a pending task. Returns `false` if the handle already ran, was
    /// already cancelled, or was never issued.
    fn cancel(&self, handle: TaskHandle) -> bool;
}

const FRAME_INTERVAL_MS: u64 = 16;

struct PendingTimer {
    handle: TaskHandle,
    due_ms: u64,
    task: TimerTask,
}

#[derive(Default)]
struct ManualState {
    now_ms: u64,
    next_handle: u64,
    timers: Vec<PendingTimer>,
    frames: Vec<(TaskHandle, FrameTask)>,
    cancelled: usize,
}

impl ManualState {
    fn issue(&mut self) -> TaskHandle {
        self.next_handle += 1;
        TaskHandle(self.next_handle)
    }
}

/// A scheduler driven explicitly by the caller with a virtual clock.
///
/// Timers fire from [`ManualScheduler::advance`], frame callbacks from
/// [`ManualScheduler::run_frame`]. Frames requested while frames run wait for the
/// next frame; timers that come due within one `advance` all fire.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// Number of successful cancellations so far.
    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }

    /// Moves the clock forward, firing due timers in due order. Returns the
    /// number of timers that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now_ms() + by.as_millis() as u64;
        let mut ran = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due_ms <= target)
                    .min_by_key(|(_, timer)| (timer.due_ms, timer.handle))
                    .map(|(index, _)| index);
                match due {
                    Some(index) => {
                        let timer = state.timers.remove(index);
                        state.now_ms = state.now_ms.max(timer.due_ms);
                        Some(timer.task)
                    }
                    None => {
                        state.now_ms = target;
                        None
                    }
                }
            };
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Runs every frame callback registered before this call, then advances
    /// the clock by one frame interval. Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let (frames, timestamp) = {
            let mut state = self.state.borrow_mut();
            (std::mem::take(&mut state.frames), state.now_ms as f64)
        };
        let count = frames.len();
        for (_, task) in frames {
            task(timestamp);
        }
        self.state.borrow_mut().now_ms += FRAME_INTERVAL_MS;
        count
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration, task: TimerTask) -> TaskHandle {
        let mut state = self.state.borrow_mut();
        let handle = state.issue();
        let due_ms = state.now_ms + delay.as_millis() as u64;
        state.timers.push(PendingTimer {
            handle,
            due_ms,
            task,
        });
        handle
    }

    fn request_frame(&self, task: FrameTask) -> TaskHandle {
        let mut state = self.state.borrow_mut();
        let handle = state.issue();
        state.frames.push((handle, task));
        handle
    }

    fn cancel(&self, handle: TaskHandle) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.timers.len() + state.frames.len();
        state.timers.retain(|timer| timer.handle != handle);
        state.frames.retain(|(pending, _)| *pending != handle);
        let removed = before != state.timers.len() + state.frames.len();
        if removed {
            state.cancelled += 1;
        }
        removed
    }
}

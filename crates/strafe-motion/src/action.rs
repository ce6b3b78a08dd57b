//! Cooperative actions and the combinators that compose them.
//!
//! An action is advanced by calling [`Action::tick`] once per loop iteration.
//! It returns `Ok(true)` while it wants more ticks and `Ok(false)` exactly
//! once, on the tick it finishes. Ticking it again afterwards is an error.

use std::time::{Duration, Instant};

use crate::error::{MotionError, Result};

pub trait Action {
    /// Advance one step. `now` is the loop's timestamp for this iteration.
    fn tick(&mut self, now: Instant) -> Result<bool>;

    fn boxed(self) -> BoxedAction
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

pub type BoxedAction = Box<dyn Action>;

impl<A: Action + ?Sized> Action for Box<A> {
    fn tick(&mut self, now: Instant) -> Result<bool> {
        (**self).tick(now)
    }
}

/// Runs children one after another.
///
/// Only the current child is ticked. When it finishes, the next child gets
/// its first tick on the following iteration, and the sequence reports
/// completion on the iteration after its last child finished.
pub struct Sequential {
    children: Vec<BoxedAction>,
    cursor: usize,
    finished: bool,
}

impl Sequential {
    pub fn new(children: Vec<BoxedAction>) -> Self {
        Sequential { children, cursor: 0, finished: false }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Action for Sequential {
    fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.finished {
            return Err(MotionError::ActionMisuse("sequential ticked after completion"));
        }
        let Some(current) = self.children.get_mut(self.cursor) else {
            self.finished = true;
            return Ok(false);
        };
        if !current.tick(now)? {
            self.cursor += 1;
        }
        Ok(true)
    }
}

/// Runs children side by side.
///
/// Every live child is ticked each iteration in construction order; a child
/// that finishes is dropped from the live set and never ticked again.
pub struct Parallel {
    live: Vec<BoxedAction>,
    finished: bool,
}

impl Parallel {
    pub fn new(children: Vec<BoxedAction>) -> Self {
        Parallel { live: children, finished: false }
    }

    /// Children still running.
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl Action for Parallel {
    fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.finished {
            return Err(MotionError::ActionMisuse("parallel ticked after completion"));
        }
        let mut i = 0;
        while i < self.live.len() {
            if self.live[i].tick(now)? {
                i += 1;
            } else {
                self.live.remove(i);
            }
        }
        if self.live.is_empty() {
            self.finished = true;
            Ok(false)
        } else {
            Ok(true)
        }
    }
}

/// Waits for a fixed time measured from its own first tick.
#[derive(Debug, Clone)]
pub struct Sleep {
    duration: Duration,
    begin: Option<Instant>,
    finished: bool,
}

impl Sleep {
    pub fn new(duration: Duration) -> Self {
        Sleep { duration, begin: None, finished: false }
    }

    /// # Errors
    ///
    /// Returns `Err(MotionError::InvalidParameter)` for a negative or
    /// non-finite duration.
    pub fn from_secs(seconds: f64) -> Result<Self> {
        Duration::try_from_secs_f64(seconds)
            .map(Sleep::new)
            .map_err(|_| MotionError::InvalidParameter("sleep duration must be non-negative and finite"))
    }
}

impl Action for Sleep {
    fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.finished {
            return Err(MotionError::ActionMisuse("sleep ticked after completion"));
        }
        let begin = *self.begin.get_or_insert(now);
        if now.saturating_duration_since(begin) >= self.duration {
            self.finished = true;
            Ok(false)
        } else {
            Ok(true)
        }
    }
}

/// A one-shot side effect that completes on its first tick.
pub struct InstantAction<F> {
    f: F,
    fired: bool,
}

impl<F: FnMut() -> Result<()>> InstantAction<F> {
    pub fn new(f: F) -> Self {
        InstantAction { f, fired: false }
    }
}

impl<F: FnMut() -> Result<()>> Action for InstantAction<F> {
    fn tick(&mut self, _now: Instant) -> Result<bool> {
        if self.fired {
            return Err(MotionError::ActionMisuse("instant action ticked after completion"));
        }
        self.fired = true;
        (self.f)()?;
        Ok(false)
    }
}

/// A leaf driven by a closure that says whether it needs more ticks.
pub struct FnAction<F> {
    f: F,
    finished: bool,
}

impl<F: FnMut(Instant) -> Result<bool>> FnAction<F> {
    pub fn new(f: F) -> Self {
        FnAction { f, finished: false }
    }
}

impl<F: FnMut(Instant) -> Result<bool>> Action for FnAction<F> {
    fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.finished {
            return Err(MotionError::ActionMisuse("action ticked after completion"));
        }
        let more = (self.f)(now)?;
        self.finished = !more;
        Ok(more)
    }
}

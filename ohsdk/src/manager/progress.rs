//! Weighted progress accounting across installation steps.
//!
//! A whole installation reports progress on a single 0-100 scale. Each step
//! owns a [`ProgressBudget`], a slice of that scale, and reports its own
//! completion in a local 0-100 frame through a [`ProgressTracker`], which
//! converts it to overall progress and forwards only the *increments* to the
//! caller's [`ProgressSink`].
//!
//! ```text
//!   local 0 ─────────── 100          (step's own frame)
//!          \             \
//!   overall 0 ── start ── start+range ── 100
//! ```
//!
//! Guarantees per tracker:
//! - increments are strictly positive, so the running total never decreases
//! - every emitted total lies in `[start, start + range]`
//! - after [`ProgressTracker::finish`] the running total is exactly
//!   `start + range`

/// Upper bound of the overall progress scale.
pub const PROGRESS_MAX: u32 = 100;

/// A single progress notification delivered to a [`ProgressSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Human-readable description of the current step.
    pub message: String,
    /// Percentage points gained since the previous update.
    pub increment: u32,
}

/// Receiver of progress increments.
///
/// Implemented by whatever renders progress (a terminal progress bar, a test
/// recorder). Closures taking `&ProgressUpdate` implement it directly.
pub trait ProgressSink {
    /// Deliver one increment.
    fn report(&self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressUpdate),
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _update: &ProgressUpdate) {}
}

/// A slice `[start, start + range]` of the overall 0-100 progress scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBudget {
    start: u32,
    range: u32,
}

impl ProgressBudget {
    /// The whole scale.
    pub const FULL: ProgressBudget = ProgressBudget {
        start: 0,
        range: PROGRESS_MAX,
    };

    /// Create a budget, clamping so that `start + range <= 100`.
    pub const fn new(start: u32, range: u32) -> Self {
        let start = if start > PROGRESS_MAX { PROGRESS_MAX } else { start };
        let room = PROGRESS_MAX - start;
        let range = if range > room { room } else { range };
        Self { start, range }
    }

    /// First overall value covered by this budget.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Width of this budget in percentage points.
    pub fn range(&self) -> u32 {
        self.range
    }

    /// Last overall value covered by this budget.
    pub fn end(&self) -> u32 {
        self.start + self.range
    }

    /// Map a local percentage onto the overall scale.
    ///
    /// Out-of-range and non-finite inputs are clamped to `[0, 100]`.
    pub fn overall(&self, local_percent: f64) -> u32 {
        let local = if local_percent.is_finite() {
            local_percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let value = (self.start as f64 + local / 100.0 * self.range as f64).round() as u32;
        value.clamp(self.start, self.end())
    }

    /// Partition this budget into `parts` consecutive sub-budgets.
    ///
    /// The range is divided as evenly as possible; the remainder goes to the
    /// first sub-budgets, one point each, so the sub-ranges always sum to
    /// this budget's range. Zero parts yields an empty list.
    pub fn split(&self, parts: usize) -> Vec<ProgressBudget> {
        if parts == 0 {
            return Vec::new();
        }

        let parts_u32 = u32::try_from(parts).unwrap_or(u32::MAX);
        let base = self.range / parts_u32;
        let remainder = self.range % parts_u32;

        let mut next_start = self.start;
        (0..parts)
            .map(|i| {
                let extra = u32::from(i < remainder as usize);
                let budget = ProgressBudget {
                    start: next_start,
                    range: base + extra,
                };
                next_start += budget.range;
                budget
            })
            .collect()
    }
}

/// Converts one step's local progress into overall increments.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    budget: ProgressBudget,
    message: String,
    last_emitted: u32,
}

impl<'a> ProgressTracker<'a> {
    /// Start tracking a step that owns `budget`.
    ///
    /// The running total is assumed to already stand at `budget.start()`.
    pub fn new(
        sink: &'a dyn ProgressSink,
        budget: ProgressBudget,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            budget,
            message: message.into(),
            last_emitted: budget.start(),
        }
    }

    /// Report local completion in percent.
    ///
    /// Emits an increment only when the overall value strictly grows.
    pub fn update(&mut self, local_percent: f64) {
        let overall = self.budget.overall(local_percent);
        self.emit_to(overall);
    }

    /// Report local completion as a `done / total` fraction.
    ///
    /// A zero total counts as one so that the call never divides by zero.
    pub fn update_fraction(&mut self, done: u64, total: u64) {
        let total = total.max(1);
        self.update(done as f64 / total as f64 * 100.0);
    }

    /// Close the step, emitting whatever is left up to the budget end.
    pub fn finish(&mut self) {
        let end = self.budget.end();
        self.emit_to(end);
    }

    fn emit_to(&mut self, overall: u32) {
        if overall <= self.last_emitted {
            return;
        }
        let increment = overall - self.last_emitted;
        self.last_emitted = overall;
        self.sink.report(&ProgressUpdate {
            message: self.message.clone(),
            increment,
        });
    }
}

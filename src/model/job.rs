/// Aggregate outcome of a batch, emitted once every repository has reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSignal {
    AllSucceeded,
    Failed { failed: usize },
}

impl FetchSignal {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchSignal::AllSucceeded)
    }
}

/// Progress of one batch fetch.
///
/// Invariant: `succeeded <= completed <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchJob {
    total: usize,
    completed: usize,
    succeeded: usize,
    reported: bool,
}

impl FetchJob {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            succeeded: 0,
            reported: false,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }

    /// Records one finished attempt. Returns the aggregate signal the first
    /// time the job becomes finished and `None` on every other call.
    /// Reports beyond `total` are ignored.
    pub fn record(&mut self, success: bool) -> Option<FetchSignal> {
        if self.completed < self.total {
            self.completed += 1;
            if success {
                self.succeeded += 1;
            }
        } else {
            log::warn!("Ignoring a completion report for an already finished job");
        }
        self.take_signal()
    }

    /// Returns the aggregate signal if the job is finished and has not been
    /// reported yet.
    pub fn take_signal(&mut self) -> Option<FetchSignal> {
        if self.reported || !self.is_finished() {
            return None;
        }
        self.reported = true;
        if self.succeeded == self.total {
            Some(FetchSignal::AllSucceeded)
        } else {
            Some(FetchSignal::Failed {
                failed: self.total - self.succeeded,
            })
        }
    }
}

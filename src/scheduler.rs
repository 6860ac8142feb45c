use std::collections::VecDeque;

/// Identifies one open/closed cycle of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Close requested by a plain tap on a carousel item.
    CloseFromTap,
    /// End of the click-suppression window after a drag release.
    ReleaseDragFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub cycle: CycleId,
    pub kind: TaskKind,
}

/// Next-tick queue on the single UI thread.
///
/// A drain only takes tasks posted before it started, so work posted while
/// draining lands on the following tick.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<ScheduledTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, cycle: CycleId, kind: TaskKind) {
        tracing::trace!(?cycle, ?kind, "posted next-tick task");
        self.tasks.push_back(ScheduledTask { cycle, kind });
    }

    /// Tasks due on this tick, in posting order.
    pub fn take_due(&mut self) -> Vec<ScheduledTask> {
        self.tasks.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, cycle: CycleId, kind: TaskKind) -> bool {
        self.tasks
            .iter()
            .any(|task| task.cycle == cycle && task.kind == kind)
    }
}

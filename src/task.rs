use parking_lot::Mutex;
use std::collections::HashMap;

use crate::config::DisplayStyle;
use crate::host::{Region, ViewId};
use crate::text::Selection;

pub const SUCCEED_MESSAGE: &str = "Succeed.";
pub const FAILED_MESSAGE: &str = "Failed!";

/// State of the translation cycle of one view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationTask {
    pub region: Option<Region>,
    /// Text queued for translation, emptied once a request is dispatched
    pub source_text: String,
    /// Payload for copy/insert/replace, set by a successful render
    pub result_text: Option<String>,
    pub status: Option<String>,
    /// Bumped by every translate; completions for older generations are stale
    pub generation: u64,
    /// Presentation currently showing a result
    pub display: Option<DisplayStyle>,
    /// Selection captured by the context menu for the next translate
    pub pending: Option<Selection>,
}

/// Work handed to a background worker for one cycle.
#[derive(Debug, Clone)]
pub struct TaskCycle {
    pub view: ViewId,
    pub generation: u64,
    pub region: Region,
    pub words: String,
}

/// Per-view task slots shared between the UI context and workers.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Mutex<HashMap<ViewId, TranslationTask>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a view's task.
    pub fn get(&self, view: ViewId) -> TranslationTask {
        self.tasks.lock().get(&view).cloned().unwrap_or_default()
    }

    pub fn update<R>(&self, view: ViewId, f: impl FnOnce(&mut TranslationTask) -> R) -> R {
        let mut tasks = self.tasks.lock();
        f(tasks.entry(view).or_default())
    }

    /// Start a new cycle for `selection`, overwriting whatever the view held.
    ///
    /// The source text is taken out of the task immediately so no other cycle
    /// can dispatch it again.
    pub fn begin(&self, view: ViewId, selection: Selection) -> TaskCycle {
        self.update(view, |task| {
            task.generation += 1;
            task.region = Some(selection.region);
            task.source_text = selection.text;
            task.result_text = None;
            task.display = None;
            task.pending = None;

            TaskCycle {
                view,
                generation: task.generation,
                region: selection.region,
                words: std::mem::take(&mut task.source_text),
            }
        })
    }

    pub fn is_current(&self, cycle: &TaskCycle) -> bool {
        self.tasks
            .lock()
            .get(&cycle.view)
            .is_some_and(|task| task.generation == cycle.generation)
    }

    /// Drop the region and result after a terminal action.
    pub fn reset(&self, view: ViewId) {
        self.update(view, |task| {
            task.region = None;
            task.result_text = None;
        });
    }

    pub fn set_pending(&self, view: ViewId, selection: Selection) {
        self.update(view, |task| task.pending = Some(selection));
    }

    pub fn take_pending(&self, view: ViewId) -> Option<Selection> {
        self.update(view, |task| task.pending.take())
    }
}

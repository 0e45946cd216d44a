// Host editor abstraction
//
// The translation core never touches a real editor. Everything it needs from
// the text-editing surface goes through the `Host` trait:
// - Buffer access: selection, cursor, word lookup, substrings
// - Buffer edits: insert and replace
// - Presentation: popups, phantoms, scratch buffers, status bar, progress
// - Clipboard
//
// `BufferHost` is a single-buffer in-memory implementation used by the CLI
// and by tests.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Identifies one host view (editor tab/pane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewId(pub u64);

/// A span of character positions in a view's buffer. `a` and `b` are
/// unordered, like an editor selection with an anchor and a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub a: usize,
    pub b: usize,
}

impl Region {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    pub fn begin(&self) -> usize {
        self.a.min(self.b)
    }

    pub fn end(&self) -> usize {
        self.a.max(self.b)
    }

    pub fn midpoint(&self) -> usize {
        (self.a + self.b) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.a == self.b
    }
}

/// Window coordinates of a context-menu click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

/// Everything the translation core consumes from the editor.
///
/// Display methods are UI-affine: the dispatcher only calls them from
/// [`crate::dispatcher::Dispatcher::pump_ui`] or from action handlers, never
/// from a worker. Link clicks inside popups and phantoms must be routed back
/// to [`crate::dispatcher::Dispatcher::navigate`].
#[cfg_attr(test, mockall::automock)]
pub trait Host: Send + Sync {
    /// First non-empty selection of the view with its text.
    fn selection(&self, view: ViewId) -> Option<(Region, String)>;

    /// Caret position of the first selection.
    fn cursor(&self, view: ViewId) -> usize;

    /// Map window coordinates to a buffer position.
    fn window_to_text(&self, view: ViewId, event: PointerEvent) -> usize;

    /// Region of the word containing `point`.
    fn word_at(&self, view: ViewId, point: usize) -> Region;

    fn substr(&self, view: ViewId, region: Region) -> String;

    fn insert_text(&self, view: ViewId, position: usize, text: &str);

    fn replace_text(&self, view: ViewId, region: Region, text: &str);

    fn show_popup(&self, view: ViewId, anchor: usize, content: &str);

    fn hide_popup(&self, view: ViewId);

    fn show_phantom(&self, view: ViewId, region: Region, key: &str, content: &str);

    fn remove_phantom(&self, view: ViewId, key: &str);

    fn open_scratch_buffer(&self, name: &str, content: &str, syntax: &str);

    fn set_clipboard(&self, text: &str);

    fn status_message(&self, text: &str);

    /// Show a busy indicator while a worker runs.
    fn begin_progress(&self, view: ViewId, label: &str);

    /// Clear the busy indicator, leaving `status` as the final message.
    fn end_progress(&self, view: ViewId, status: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScratchBuffer {
    pub name: String,
    pub content: String,
    pub syntax: String,
}

#[derive(Debug, Default)]
struct BufferState {
    text: String,
    selection: Option<Region>,
    cursor: usize,
    clipboard: String,
    statuses: Vec<String>,
    progress: Option<String>,
    popup: Option<(usize, String)>,
    phantoms: HashMap<String, (Region, String)>,
    scratch: Vec<ScratchBuffer>,
}

/// In-memory host over a single text buffer. Every view id maps to the same
/// buffer. Pointer coordinates are interpreted as `x` = character position.
#[derive(Debug, Default)]
pub struct BufferHost {
    state: Mutex<BufferState>,
}

impl BufferHost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(BufferState {
                text: text.into(),
                ..BufferState::default()
            }),
        }
    }

    pub fn with_selection(self, region: Region) -> Self {
        {
            let mut state = self.state.lock();
            state.selection = Some(region);
            state.cursor = region.b;
        }
        self
    }

    pub fn with_cursor(self, cursor: usize) -> Self {
        self.state.lock().cursor = cursor;
        self
    }

    pub fn select(&self, region: Option<Region>) {
        self.state.lock().selection = region;
    }

    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    pub fn clipboard(&self) -> String {
        self.state.lock().clipboard.clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.state.lock().statuses.clone()
    }

    /// Message left by the last finished progress indicator.
    pub fn progress(&self) -> Option<String> {
        self.state.lock().progress.clone()
    }

    pub fn popup(&self) -> Option<(usize, String)> {
        self.state.lock().popup.clone()
    }

    pub fn phantom(&self, key: &str) -> Option<(Region, String)> {
        self.state.lock().phantoms.get(key).cloned()
    }

    pub fn scratch_buffers(&self) -> Vec<ScratchBuffer> {
        self.state.lock().scratch.clone()
    }
}

fn byte_offset(text: &str, pos: usize) -> usize {
    text.char_indices()
        .nth(pos)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Host for BufferHost {
    fn selection(&self, _view: ViewId) -> Option<(Region, String)> {
        let state = self.state.lock();
        let region = state.selection.filter(|r| !r.is_empty())?;
        let start = byte_offset(&state.text, region.begin());
        let end = byte_offset(&state.text, region.end());
        Some((region, state.text[start..end].to_string()))
    }

    fn cursor(&self, _view: ViewId) -> usize {
        self.state.lock().cursor
    }

    fn window_to_text(&self, _view: ViewId, event: PointerEvent) -> usize {
        event.x.max(0.0) as usize
    }

    fn word_at(&self, _view: ViewId, point: usize) -> Region {
        let state = self.state.lock();
        let chars: Vec<char> = state.text.chars().collect();
        let point = point.min(chars.len());

        let mut begin = point;
        while begin > 0 && is_word_char(chars[begin - 1]) {
            begin -= 1;
        }
        let mut end = point;
        while end < chars.len() && is_word_char(chars[end]) {
            end += 1;
        }
        Region::new(begin, end)
    }

    fn substr(&self, _view: ViewId, region: Region) -> String {
        let state = self.state.lock();
        let start = byte_offset(&state.text, region.begin());
        let end = byte_offset(&state.text, region.end());
        state.text[start..end].to_string()
    }

    fn insert_text(&self, _view: ViewId, position: usize, text: &str) {
        let mut state = self.state.lock();
        let at = byte_offset(&state.text, position);
        state.text.insert_str(at, text);
    }

    fn replace_text(&self, _view: ViewId, region: Region, text: &str) {
        let mut state = self.state.lock();
        let start = byte_offset(&state.text, region.begin());
        let end = byte_offset(&state.text, region.end());
        state.text.replace_range(start..end, text);
        state.selection = None;
    }

    fn show_popup(&self, _view: ViewId, anchor: usize, content: &str) {
        self.state.lock().popup = Some((anchor, content.to_string()));
    }

    fn hide_popup(&self, _view: ViewId) {
        self.state.lock().popup = None;
    }

    fn show_phantom(&self, _view: ViewId, region: Region, key: &str, content: &str) {
        self.state
            .lock()
            .phantoms
            .insert(key.to_string(), (region, content.to_string()));
    }

    fn remove_phantom(&self, _view: ViewId, key: &str) {
        self.state.lock().phantoms.remove(key);
    }

    fn open_scratch_buffer(&self, name: &str, content: &str, syntax: &str) {
        self.state.lock().scratch.push(ScratchBuffer {
            name: name.to_string(),
            content: content.to_string(),
            syntax: syntax.to_string(),
        });
    }

    fn set_clipboard(&self, text: &str) {
        self.state.lock().clipboard = text.to_string();
    }

    fn status_message(&self, text: &str) {
        self.state.lock().statuses.push(text.to_string());
    }

    fn begin_progress(&self, _view: ViewId, label: &str) {
        self.state.lock().progress = Some(label.to_string());
    }

    fn end_progress(&self, _view: ViewId, status: &str) {
        self.state.lock().progress = Some(status.to_string());
    }
}

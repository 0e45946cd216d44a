use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

use crate::host::{BufferHost, Host, PointerEvent, Region, ViewId};

/// Host for the command line: buffer operations go to an in-memory buffer,
/// presentation is printed to the terminal.
pub struct TerminalHost {
    buffer: BufferHost,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalHost {
    pub fn new(buffer: BufferHost) -> Self {
        Self {
            buffer,
            spinner: Mutex::new(None),
        }
    }

    pub fn buffer(&self) -> &BufferHost {
        &self.buffer
    }
}

impl Host for TerminalHost {
    fn selection(&self, view: ViewId) -> Option<(Region, String)> {
        self.buffer.selection(view)
    }

    fn cursor(&self, view: ViewId) -> usize {
        self.buffer.cursor(view)
    }

    fn window_to_text(&self, view: ViewId, event: PointerEvent) -> usize {
        self.buffer.window_to_text(view, event)
    }

    fn word_at(&self, view: ViewId, point: usize) -> Region {
        self.buffer.word_at(view, point)
    }

    fn substr(&self, view: ViewId, region: Region) -> String {
        self.buffer.substr(view, region)
    }

    fn insert_text(&self, view: ViewId, position: usize, text: &str) {
        self.buffer.insert_text(view, position, text);
    }

    fn replace_text(&self, view: ViewId, region: Region, text: &str) {
        self.buffer.replace_text(view, region, text);
    }

    fn show_popup(&self, view: ViewId, anchor: usize, content: &str) {
        self.buffer.show_popup(view, anchor, content);
        println!("{}", content);
    }

    fn hide_popup(&self, view: ViewId) {
        self.buffer.hide_popup(view);
    }

    fn show_phantom(&self, view: ViewId, region: Region, key: &str, content: &str) {
        self.buffer.show_phantom(view, region, key, content);
        println!("{}", content);
    }

    fn remove_phantom(&self, view: ViewId, key: &str) {
        self.buffer.remove_phantom(view, key);
    }

    fn open_scratch_buffer(&self, name: &str, content: &str, syntax: &str) {
        self.buffer.open_scratch_buffer(name, content, syntax);
        println!("── {} ({}) ──\n{}", name, syntax, content);
    }

    fn set_clipboard(&self, text: &str) {
        self.buffer.set_clipboard(text);
    }

    fn status_message(&self, text: &str) {
        self.buffer.status_message(text);
        eprintln!("{}", text);
    }

    fn begin_progress(&self, view: ViewId, label: &str) {
        self.buffer.begin_progress(view, label);

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(label.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock() = Some(spinner);
    }

    fn end_progress(&self, view: ViewId, status: &str) {
        self.buffer.end_progress(view, status);
        if let Some(spinner) = self.spinner.lock().take() {
            spinner.finish_with_message(status.to_string());
        }
    }
}

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::host::{Host, PointerEvent, ViewId};
use crate::task::TaskStore;
use crate::text::{self, WordSource};

const COMMAND_SUFFIX: &str = "_translator";

/// One selectable context-menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub caption: String,
    pub command: String,
}

/// What the context menu shows: a single entry, or a foldable group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MenuEntry {
    Item(MenuItem),
    Group { caption: String, children: Vec<MenuItem> },
}

/// Command name for a provider id: `youdao` becomes `youdao_translator`.
pub fn command_for(id: &str) -> String {
    format!("{}{}", id.to_lowercase(), COMMAND_SUFFIX)
}

/// Provider id addressed by a menu command.
pub fn command_provider(command: &str) -> Option<&str> {
    command
        .strip_suffix(COMMAND_SUFFIX)
        .filter(|id| !id.is_empty())
}

/// Entries for every enabled provider, in provider id order.
pub fn menu_items(config: &Config) -> Vec<MenuItem> {
    config
        .providers
        .iter()
        .filter(|(_, provider)| provider.enabled)
        .map(|(id, provider)| MenuItem {
            caption: provider.caption_for(id),
            command: command_for(id),
        })
        .collect()
}

/// Build the context menu for a pointer event.
///
/// Returns `None` when no provider is configured, nothing can be resolved
/// under the selection or pointer, or every provider is disabled. The
/// resolved selection is remembered for the view so the chosen command
/// translates exactly what the menu was opened on.
pub fn build(
    config: &Config,
    tasks: &TaskStore,
    host: &dyn Host,
    view: ViewId,
    event: PointerEvent,
) -> Option<MenuEntry> {
    if config.providers.is_empty() {
        return None;
    }

    let source = WordSource::Pointer {
        event,
        auto_select: config.auto_select,
    };
    let selection = match text::resolve(host, view, &config.separator, source) {
        Ok(selection) => selection,
        Err(e) => {
            debug!("No translator menu: {}", e);
            return None;
        }
    };

    let mut items = menu_items(config);
    let entry = match items.len() {
        0 => return None,
        1 => MenuEntry::Item(items.remove(0)),
        _ => MenuEntry::Group {
            caption: config.caption.clone(),
            children: items,
        },
    };

    tasks.set_pending(view, selection);
    Some(entry)
}

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Config, DisplayStyle};
use crate::error::{Result, TranslatorError};
use crate::host::{Host, PointerEvent, ViewId};
use crate::menu::{self, MenuEntry, command_provider};
use crate::task::{FAILED_MESSAGE, SUCCEED_MESSAGE, TaskCycle, TaskStore};
use crate::text::{self, Selection, WordSource};
use crate::translate::{Provider, ProviderRegistry, RenderedResult};

/// Phantom key used for inline results
pub const PHANTOM_KEY: &str = "Translator";

/// Name of the scratch buffer opened by the `view` style
pub const SCRATCH_NAME: &str = "Translation";

/// Syntax hint for the scratch buffer
pub const SCRATCH_SYNTAX: &str = "json";

const PROGRESS_LABEL: &str = "Translating...";

/// Commands accepted by the dispatcher, both from the host and from links
/// embedded in rendered results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Translate,
    Copy,
    Insert,
    Replace,
    Hide,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Copy => "copy",
            Self::Insert => "insert",
            Self::Replace => "replace",
            Self::Hide => "hide",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = TranslatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "translate" => Ok(Self::Translate),
            "copy" => Ok(Self::Copy),
            "insert" => Ok(Self::Insert),
            "replace" => Ok(Self::Replace),
            "hide" => Ok(Self::Hide),
            other => Err(TranslatorError::UnknownAction(other.to_string())),
        }
    }
}

/// Outcome of a worker, applied on the UI context by [`Dispatcher::pump_ui`]
#[derive(Debug)]
pub enum UiJob {
    Display {
        cycle: TaskCycle,
        style: DisplayStyle,
        rendered: RenderedResult,
        response: serde_json::Value,
    },
    Failed {
        cycle: TaskCycle,
        error: TranslatorError,
    },
}

/// Routes actions to task state transitions and host side effects, runs
/// translations on tokio workers and hands their results back to the UI
/// context.
pub struct Dispatcher {
    host: Arc<dyn Host>,
    config: Arc<Config>,
    registry: ProviderRegistry,
    tasks: Arc<TaskStore>,
    ui_tx: mpsc::UnboundedSender<UiJob>,
    ui_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<UiJob>>,
}

impl Dispatcher {
    pub fn new(host: Arc<dyn Host>, config: Arc<Config>, registry: ProviderRegistry) -> Self {
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        Self {
            host,
            config,
            registry,
            tasks: Arc::new(TaskStore::new()),
            ui_tx,
            ui_rx: tokio::sync::Mutex::new(ui_rx),
        }
    }

    /// Build the dispatcher with every implemented provider from `config`
    pub fn from_config(host: Arc<dyn Host>, config: Config) -> Result<Self> {
        let registry = ProviderRegistry::from_config(&config)?;
        Ok(Self::new(host, Arc::new(config), registry))
    }

    pub fn tasks(&self) -> &Arc<TaskStore> {
        &self.tasks
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Context menu for a pointer event on `view`; see [`menu::build`].
    pub fn menu(&self, view: ViewId, event: PointerEvent) -> Option<MenuEntry> {
        menu::build(&self.config, &self.tasks, self.host.as_ref(), view, event)
    }

    /// Run a menu command such as `youdao_translator`. A translate started
    /// here uses the selection the menu was built on.
    pub fn run_command(&self, view: ViewId, command: &str, action: Action) -> Option<JoinHandle<()>> {
        match command_provider(command) {
            Some(provider) if action == Action::Translate => {
                let pending = self.tasks.take_pending(view);
                self.translate(view, provider, pending)
            }
            Some(provider) => self.run(view, provider, action),
            None => {
                self.report(&TranslatorError::UnknownProvider(command.to_string()));
                None
            }
        }
    }

    /// Entry point for every action. Returns the worker handle when a
    /// translation was scheduled. Must be called from within a tokio runtime
    /// for `Translate`.
    pub fn run(&self, view: ViewId, provider: &str, action: Action) -> Option<JoinHandle<()>> {
        let outcome = match action {
            Action::Translate => {
                // a menu that was closed without a choice leaves this behind
                self.tasks.take_pending(view);
                return self.translate(view, provider, None);
            }
            Action::Copy => self.copy(view),
            Action::Insert => self.insert(view),
            Action::Replace => self.replace(view),
            Action::Hide => {
                self.dismiss(view);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            self.report(&e);
        }
        None
    }

    /// Handle a link clicked inside a displayed result. The popup or phantom
    /// showing the result is dismissed before the action runs.
    pub fn navigate(&self, view: ViewId, provider: &str, href: &str) -> Option<JoinHandle<()>> {
        self.dismiss(view);
        match href.parse::<Action>() {
            Ok(Action::Hide) => None,
            Ok(action) => self.run(view, provider, action),
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    fn translate(&self, view: ViewId, provider_id: &str, pending: Option<Selection>) -> Option<JoinHandle<()>> {
        let provider = match self.registry.get(provider_id) {
            Ok(provider) => provider,
            Err(e) => {
                self.report(&e);
                return None;
            }
        };

        let selection = match pending {
            Some(selection) => Ok(selection),
            None => text::resolve(self.host.as_ref(), view, &self.config.separator, WordSource::Cursor),
        };
        let selection = match selection {
            Ok(selection) => selection,
            Err(e) => {
                self.report(&e);
                return None;
            }
        };

        // the new cycle owns the view; whatever the last one showed goes away
        self.dismiss(view);
        let cycle = self.tasks.begin(view, selection);
        info!(
            "Translating with {} (view {:?}, generation {}): {}",
            provider_id, view, cycle.generation, cycle.words
        );
        self.host.begin_progress(view, PROGRESS_LABEL);

        let ui_tx = self.ui_tx.clone();
        Some(tokio::spawn(async move {
            let job = run_cycle(provider, cycle).await;
            if ui_tx.send(job).is_err() {
                warn!("Dispatcher dropped before translation finished");
            }
        }))
    }

    fn copy(&self, view: ViewId) -> Result<()> {
        let result = self.current_result(view, Action::Copy)?;
        self.host.set_clipboard(&result);
        self.host.status_message("Translation copied to clipboard");
        Ok(())
    }

    fn insert(&self, view: ViewId) -> Result<()> {
        let result = self.current_result(view, Action::Insert)?;
        let region = self
            .tasks
            .get(view)
            .region
            .ok_or_else(|| TranslatorError::EmptyResult(Action::Insert.to_string()))?;

        self.host.insert_text(view, region.end(), &format!("\n{}\n", result));
        self.tasks.reset(view);
        Ok(())
    }

    fn replace(&self, view: ViewId) -> Result<()> {
        let result = self.current_result(view, Action::Replace)?;
        let region = self
            .tasks
            .get(view)
            .region
            .ok_or_else(|| TranslatorError::EmptyResult(Action::Replace.to_string()))?;

        self.host.replace_text(view, region, &result);
        self.tasks.reset(view);
        Ok(())
    }

    fn current_result(&self, view: ViewId, action: Action) -> Result<String> {
        self.tasks
            .get(view)
            .result_text
            .filter(|result| !result.is_empty())
            .ok_or_else(|| TranslatorError::EmptyResult(action.to_string()))
    }

    /// Remove whatever presentation is showing a result for `view`
    fn dismiss(&self, view: ViewId) {
        match self.tasks.update(view, |task| task.display.take()) {
            Some(DisplayStyle::Popup) => self.host.hide_popup(view),
            Some(DisplayStyle::Phantom) => self.host.remove_phantom(view, PHANTOM_KEY),
            Some(DisplayStyle::View) | None => {}
        }
    }

    /// Apply finished worker results. Call from the host's UI context;
    /// returns the number of jobs processed.
    pub fn pump_ui(&self) -> usize {
        let jobs: Vec<UiJob> = match self.ui_rx.try_lock() {
            Ok(mut rx) => std::iter::from_fn(|| rx.try_recv().ok()).collect(),
            Err(_) => return 0,
        };

        let processed = jobs.len();
        for job in jobs {
            self.apply(job);
        }
        processed
    }

    /// Wait for the next worker result and apply it.
    pub async fn pump_next(&self) {
        let job = self.ui_rx.lock().await.recv().await;
        if let Some(job) = job {
            self.apply(job);
        }
    }

    fn apply(&self, job: UiJob) {
        match job {
            UiJob::Display { cycle, style, rendered, response } => {
                if !self.tasks.is_current(&cycle) {
                    debug!("Discarding stale translation for generation {}", cycle.generation);
                    return;
                }

                self.tasks.update(cycle.view, |task| {
                    task.result_text = rendered.result_text.clone();
                    task.status = Some(SUCCEED_MESSAGE.to_string());
                    task.display = match style {
                        DisplayStyle::View => None,
                        other => Some(other),
                    };
                });
                self.display(&cycle, style, &rendered, &response);
                self.host.end_progress(cycle.view, SUCCEED_MESSAGE);
            }
            UiJob::Failed { cycle, error } => {
                if !self.tasks.is_current(&cycle) {
                    debug!("Discarding stale failure for generation {}: {}", cycle.generation, error);
                    return;
                }

                warn!("Translation failed: {:?}", error);
                self.tasks.update(cycle.view, |task| {
                    task.region = None;
                    task.result_text = None;
                    task.status = Some(error.to_string());
                });
                self.host.status_message(&error.to_string());
                self.host.end_progress(cycle.view, FAILED_MESSAGE);
            }
        }
    }

    fn display(&self, cycle: &TaskCycle, style: DisplayStyle, rendered: &RenderedResult, response: &serde_json::Value) {
        match style {
            DisplayStyle::Popup => {
                self.host.show_popup(cycle.view, cycle.region.midpoint(), &rendered.markdown);
            }
            DisplayStyle::Phantom => {
                self.host.show_phantom(cycle.view, cycle.region, PHANTOM_KEY, &rendered.markdown);
            }
            DisplayStyle::View => {
                // serializing a Value cannot fail
                let content = serde_json::to_string_pretty(response).unwrap_or_default();
                self.host.open_scratch_buffer(SCRATCH_NAME, &content, SCRATCH_SYNTAX);
            }
        }
    }

    fn report(&self, error: &TranslatorError) {
        debug!("Action not performed: {}", error);
        self.host.status_message(&error.to_string());
    }
}

/// Worker side of a cycle: network request, parse and render.
async fn run_cycle(provider: Arc<dyn Provider>, cycle: TaskCycle) -> UiJob {
    let outcome = async {
        let response = provider.translate(&cycle.words).await?;
        let rendered = provider.render(&cycle.words, &response)?;
        Ok::<_, TranslatorError>((rendered, response))
    }
    .await;

    match outcome {
        Ok((rendered, response)) => UiJob::Display {
            cycle,
            style: provider.style(),
            rendered,
            response,
        },
        Err(error) => UiJob::Failed { cycle, error },
    }
}

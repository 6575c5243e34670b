//! Terminal front-end for one run: feeds the monitor runtime, prints each
//! new view, and answers the publish confirmation.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use runwatch_core::{AuthState, JobId, JobStatus, MonitorViewModel, Msg};
use runwatch_engine::{JobClient, MonitorHandle, MonitorRuntime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use runwatch_logging::{monitor_debug, monitor_info, monitor_warn};
use thiserror::Error;

use crate::render::render_view;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("monitor runtime stopped unexpectedly")]
    RuntimeStopped,
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    AssumeYes,
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub publish: bool,
    pub confirmation: Confirmation,
    pub expand_steps: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            publish: false,
            confirmation: Confirmation::Prompt,
            expand_steps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Finished { status: JobStatus, published: bool },
    PublishFailed(String),
    /// Not found, or polling gave up.
    Failed(String),
    SignedOut,
    Interrupted,
}

impl WatchOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            WatchOutcome::Finished { .. } => 0,
            WatchOutcome::Failed(_) | WatchOutcome::PublishFailed(_) => 1,
            WatchOutcome::SignedOut => 2,
            WatchOutcome::Interrupted => 130,
        }
    }
}

/// Local bookkeeping on top of the view: which steps were auto-expanded and
/// whether the publish prompt already ran.
#[derive(Default)]
struct Session {
    toggled: HashSet<String>,
    publish_offered: bool,
}

/// Answers the publish confirmation.
#[async_trait::async_trait]
pub trait Confirm: Sync {
    async fn confirm(&self, question: String) -> io::Result<bool>;
}

/// y/N question on the controlling terminal.
pub struct StdinConfirm;

#[async_trait::async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, question: String) -> io::Result<bool> {
        tokio::task::spawn_blocking(move || -> io::Result<bool> {
            let mut stdout = io::stdout();
            write!(stdout, "{question} [y/N] ")?;
            stdout.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(parse_answer(&line))
        })
        .await
        .map_err(io::Error::other)?
    }
}

/// Latched interrupt request, checked both while waiting for views and while
/// the confirmation is open.
pub struct Interrupt {
    fired: watch::Receiver<bool>,
    listener: Option<JoinHandle<()>>,
}

impl Interrupt {
    /// Fires on the first Ctrl-C.
    pub fn on_ctrl_c() -> Self {
        let (tx, fired) = watch::channel(false);
        let listener = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = tx.send(true);
                }
                Err(err) => monitor_warn!("Cannot listen for Ctrl-C: {}", err),
            }
        });
        Self {
            fired,
            listener: Some(listener),
        }
    }

    /// Fires when the returned sender is set to `true`.
    pub fn manual() -> (watch::Sender<bool>, Self) {
        let (tx, fired) = watch::channel(false);
        (
            tx,
            Self {
                fired,
                listener: None,
            },
        )
    }

    async fn wait(&mut self) {
        if self.fired.wait_for(|fired| *fired).await.is_err() {
            // Nobody can fire it any more.
            std::future::pending::<()>().await;
        }
    }
}

impl Drop for Interrupt {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

pub async fn watch_run<C, W>(
    client: Arc<C>,
    job_id: JobId,
    options: WatchOptions,
    out: &mut W,
) -> Result<WatchOutcome, WatchError>
where
    C: JobClient + 'static,
    W: Write,
{
    let interrupt = Interrupt::on_ctrl_c();
    watch_run_with(client, job_id, options, out, &StdinConfirm, interrupt).await
}

pub async fn watch_run_with<C, W>(
    client: Arc<C>,
    job_id: JobId,
    options: WatchOptions,
    out: &mut W,
    confirm: &dyn Confirm,
    mut interrupt: Interrupt,
) -> Result<WatchOutcome, WatchError>
where
    C: JobClient + 'static,
    W: Write,
{
    let (runtime, handle) = MonitorRuntime::new(client);
    let task = tokio::spawn(runtime.run());
    handle.send(Msg::ViewOpened { job_id });
    monitor_info!("Watching run {}", job_id);

    let mut frontend = Frontend {
        handle: &handle,
        options: &options,
        confirm,
        interrupt: &mut interrupt,
        session: Session::default(),
    };
    let result = frontend.drive(out).await;

    handle.shutdown();
    if task.await.is_err() {
        monitor_warn!("Monitor runtime task ended abnormally");
    }
    result
}

struct Frontend<'a> {
    handle: &'a MonitorHandle,
    options: &'a WatchOptions,
    confirm: &'a dyn Confirm,
    interrupt: &'a mut Interrupt,
    session: Session,
}

impl Frontend<'_> {
    async fn drive<W: Write>(&mut self, out: &mut W) -> Result<WatchOutcome, WatchError> {
        let mut views = self.handle.subscribe();
        let mut printed = String::new();
        loop {
            tokio::select! {
                changed = views.changed() => {
                    changed.map_err(|_| WatchError::RuntimeStopped)?;
                }
                _ = self.interrupt.wait() => {
                    monitor_info!("Interrupted by user");
                    return Ok(WatchOutcome::Interrupted);
                }
            }
            let view = views.borrow_and_update().clone();

            let text = render_view(&view);
            if text != printed {
                writeln!(out, "{text}")?;
                out.flush()?;
                printed = text;
            }

            if let Some(outcome) = self.session.settle(&view, self.options) {
                return Ok(outcome);
            }
            for msg in self.session.expansions(&view, self.options) {
                self.handle.send(msg);
            }
            if let Some(outcome) = self.offer_publish(&view).await? {
                return Ok(outcome);
            }
        }
    }

    /// Runs the confirmation once per watch. A declined or interrupted prompt
    /// finishes the watch; a confirmed one leaves `settle` waiting for the
    /// result.
    async fn offer_publish(
        &mut self,
        view: &MonitorViewModel,
    ) -> Result<Option<WatchOutcome>, WatchError> {
        if !self.options.publish || self.session.publish_offered || !view.can_publish || view.stale
        {
            return Ok(None);
        }
        let (Some(job_id), Some(header)) = (view.job_id, view.header.as_ref()) else {
            return Ok(None);
        };
        if header.published || !header.status.is_terminal() {
            return Ok(None);
        }

        self.session.publish_offered = true;
        self.handle.send(Msg::PublishRequested);
        let confirmed = match self.options.confirmation {
            Confirmation::AssumeYes => true,
            Confirmation::Prompt => {
                let question = format!("Publish the final signal of run #{job_id}?");
                tokio::select! {
                    answer = self.confirm.confirm(question) => answer?,
                    _ = self.interrupt.wait() => {
                        monitor_info!("Interrupted at the publish prompt for run {}", job_id);
                        self.handle.send(Msg::PublishCancelled);
                        return Ok(Some(WatchOutcome::Interrupted));
                    }
                }
            }
        };
        monitor_debug!("Publish of run {} confirmed: {}", job_id, confirmed);

        if confirmed {
            self.handle.send(Msg::PublishConfirmed);
            Ok(None)
        } else {
            self.handle.send(Msg::PublishCancelled);
            Ok(Some(WatchOutcome::Finished {
                status: header.status.clone(),
                published: false,
            }))
        }
    }
}

impl Session {
    /// The outcome once the view can no longer change on its own.
    fn settle(&self, view: &MonitorViewModel, options: &WatchOptions) -> Option<WatchOutcome> {
        if view.auth == AuthState::Unauthenticated {
            return Some(WatchOutcome::SignedOut);
        }
        if let Some(error) = view.error.as_ref().filter(|error| error.persistent) {
            return Some(WatchOutcome::Failed(error.message.clone()));
        }

        let header = view.header.as_ref().filter(|_| !view.stale)?;
        if !header.status.is_terminal() {
            return None;
        }

        if self.publish_offered {
            return view.publish_result.as_ref().map(|result| {
                if result.is_success() {
                    WatchOutcome::Finished {
                        status: header.status.clone(),
                        published: true,
                    }
                } else {
                    WatchOutcome::PublishFailed(result.message().to_string())
                }
            });
        }
        if options.publish && view.can_publish && !header.published {
            return None;
        }
        Some(WatchOutcome::Finished {
            status: header.status.clone(),
            published: header.published,
        })
    }

    fn expansions(&mut self, view: &MonitorViewModel, options: &WatchOptions) -> Vec<Msg> {
        if !options.expand_steps {
            return Vec::new();
        }
        view.steps
            .iter()
            .filter(|step| !step.expanded && self.toggled.insert(step.name.clone()))
            .map(|step| Msg::StepToggled {
                name: step.name.clone(),
            })
            .collect()
    }
}

/// Anything but an explicit yes declines.
pub fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// Pushes filter state out to the address bar. The URL is read once at startup to
// build the initial state; after that this task keeps it a debounced function of
// the state, replacing history entries rather than adding them.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, trace};

use std::sync::Arc;

use finder_core::FilterState;
use finder_util::split_path_and_query;

use crate::error::{Error, Result};
use crate::path::is_detail_path;
use crate::route::target_url;

pub const SYNC_DEBOUNCE: Duration = Duration::from_millis(300);

/// The host's view of the address bar.
pub trait Navigator: Send + Sync + 'static {
    /// Current path and query, e.g. `/farm-stand?radius=50`.
    fn current_url(&self) -> String;
    /// Replace the current history entry.
    fn replace(&self, url: &str);
}

pub struct UrlSync {
    sender: mpsc::UnboundedSender<FilterState>,
    task: JoinHandle<()>,
}

impl UrlSync {
    pub fn spawn<N: Navigator>(navigator: Arc<N>) -> Self {
        Self::with_delay(navigator, SYNC_DEBOUNCE)
    }

    pub fn with_delay<N: Navigator>(navigator: Arc<N>, delay: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(navigator, receiver, delay));
        Self { sender, task }
    }

    /// Report the live state. The first report is the one decoded from the URL and is not written back.
    pub fn update(&self, state: FilterState) -> Result<()> {
        self.sender.send(state).map_err(|_| Error::Closed)
    }

    /// Stop the loop. A pending update is discarded.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.task.await {
            debug!("URL sync task ended abnormally: {}", e);
        }
    }
}

async fn run<N: Navigator>(navigator: Arc<N>, mut receiver: mpsc::UnboundedReceiver<FilterState>, delay: Duration) {
    let mut mounted = false;
    let mut pending: Option<FilterState> = None;
    let timer = sleep(delay);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            message = receiver.recv() => {
                let Some(state) = message else { break };
                if !mounted {
                    mounted = true;
                    continue;
                }
                let current = navigator.current_url();
                if on_detail_page(&current) {
                    trace!("on detail page {}, not syncing", current);
                    pending = None;
                    continue;
                }
                if state.is_clear() && target_url(&state) == current {
                    pending = None;
                    continue;
                }
                pending = Some(state);
                timer.as_mut().reset(Instant::now() + delay);
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(state) = pending.take() {
                    apply(navigator.as_ref(), &state);
                }
            }
        }
    }
}

fn on_detail_page(url: &str) -> bool {
    let (path, _) = split_path_and_query(url);
    is_detail_path(path)
}

fn apply<N: Navigator>(navigator: &N, state: &FilterState) {
    let current = navigator.current_url();
    if on_detail_page(&current) {
        return;
    }
    let url = target_url(state);
    if url != current {
        debug!("Replacing URL {} with {}", current, url);
        navigator.replace(&url);
    }
}

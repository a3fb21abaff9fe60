use super::{
    PreferenceStore,
    StorageBackend,
};
use derive_more::Display;
use meetsolis_layout_config::LayoutPreferences;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{
        unbounded_channel,
        UnboundedReceiver,
        UnboundedSender,
    },
    oneshot,
};
use tokio_util::sync::{
    CancellationToken,
    DropGuard,
};

#[derive(Debug, Display)]
enum WriterMessage {
    #[display("Save({_0:?})")]
    Save(LayoutPreferences),
    #[display("Flush")]
    Flush(oneshot::Sender<()>),
}

/// Persists preferences in the background so that callers never wait on storage.
///
/// Queued writes are coalesced to the latest value. When the last handle is dropped the task writes whatever
/// is still queued and exits.
#[derive(Debug, Clone)]
pub struct PreferenceWriter {
    sender: UnboundedSender<WriterMessage>,
    _task_guard: Arc<DropGuard>,
}

impl PreferenceWriter {
    /// Spawns the writer task onto the current tokio runtime.
    pub fn spawn<B>(store: PreferenceStore<B>) -> Self
    where
        B: StorageBackend + Clone + 'static,
    {
        let (sender, receiver) = unbounded_channel();
        let cancellation_token = CancellationToken::new();
        let task_guard = cancellation_token.clone().drop_guard();

        tokio::task::spawn(run(store, receiver, cancellation_token));

        Self {
            sender,
            _task_guard: Arc::new(task_guard),
        }
    }

    /// Queues a write and returns immediately.
    pub fn save(&self, prefs: LayoutPreferences) {
        if self.sender.send(WriterMessage::Save(prefs)).is_err() {
            warn!("Preference writer has stopped, dropping write");
        }
    }

    /// Waits until every write queued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.sender.send(WriterMessage::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn run<B>(
    store: PreferenceStore<B>,
    mut receiver: UnboundedReceiver<WriterMessage>,
    cancellation_token: CancellationToken,
) where
    B: StorageBackend + Clone + 'static,
{
    debug!(key = store.key(), "preference writer started");

    loop {
        let message = tokio::select! {
            message = receiver.recv() => message,
            _ = cancellation_token.cancelled() => None,
        };
        // After cancellation only what is already queued gets written.
        let Some(message) = message.or_else(|| {
            receiver.close();
            receiver.try_recv().ok()
        }) else {
            break;
        };
        trace!(%message, "preference writer received");

        let mut latest = None;
        let mut waiting = Vec::new();
        let mut push = |message: WriterMessage| match message {
            WriterMessage::Save(prefs) => latest = Some(prefs),
            WriterMessage::Flush(done) => waiting.push(done),
        };
        push(message);
        while let Ok(message) = receiver.try_recv() {
            push(message);
        }

        if let Some(prefs) = latest {
            let store = store.clone();
            if let Err(err) = tokio::task::spawn_blocking(move || store.save(&prefs)).await {
                warn!("Preference write task failed: {err}");
            }
        }
        for done in waiting {
            let _ = done.send(());
        }
    }

    debug!(key = store.key(), "preference writer stopped");
}

//! Background save worker for native platforms.

use super::{PersistenceAdapter, Storage, save_document};
use crate::document::Document;
use std::sync::Arc;
use std::sync::mpsc::{Sender, channel};
use std::thread::{self, JoinHandle};

/// Persistence adapter that hands documents to a background thread which
/// writes them to a [`Storage`] backend.
///
/// `on_save` only enqueues, so a slow or failing backend never blocks the
/// editor. Failures are logged and dropped. Dropping the worker closes the
/// queue, lets pending saves finish and joins the thread.
pub struct StorageWorker {
    tx: Option<Sender<Document>>,
    thread: Option<JoinHandle<()>>,
}

impl StorageWorker {
    /// Spawn the worker thread for `storage`.
    pub fn spawn<S: Storage + 'static>(storage: Arc<S>) -> Self {
        let (tx, rx) = channel::<Document>();

        let thread = thread::spawn(move || {
            log::debug!("Save worker started");
            for document in rx {
                match pollster::block_on(save_document(storage.as_ref(), &document)) {
                    Ok(()) => log::debug!("Saved document {}", document.id),
                    Err(e) => log::error!("Failed to save document {}: {}", document.id, e),
                }
            }
            log::debug!("Save worker exiting");
        });

        Self {
            tx: Some(tx),
            thread: Some(thread),
        }
    }

    /// Stop accepting documents and wait for queued saves to finish.
    pub fn shutdown(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        // Closing the sender ends the worker's receive loop
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Save worker panicked");
            }
        }
    }
}

impl PersistenceAdapter for StorageWorker {
    fn on_save(&self, document: &Document) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(document.clone()).is_err() {
            log::warn!("Save worker is gone; dropping save of {}", document.id);
        }
    }
}

impl Drop for StorageWorker {
    fn drop(&mut self) {
        self.finish();
    }
}

use std::path::Path;
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// The live feed over the store collection.
///
/// A single owned subscription object: created once at startup, polled
/// every event-loop tick, and torn down by dropping it (which releases
/// the underlying watcher — the unsubscribe handle of the store
/// contract). Collaborators' writes arrive here the same way our own
/// do, so the snapshot reload path is identical for both.
pub struct Subscription {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<()>,
}

impl Subscription {
    /// Start watching the given collection directory.
    pub fn start(collection_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };

                // Only creates, modifications, and removes of documents
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let relevant = event.paths.iter().any(|p| {
                    // Skip the write lock and persisted UI state
                    if let Some(name) = p.file_name().and_then(|n| n.to_str())
                        && (name == ".lock" || name == ".state.json")
                    {
                        return false;
                    }
                    p.extension().and_then(|e| e.to_str()) == Some("json")
                });

                if relevant {
                    let _ = tx.send(());
                }
            },
            Config::default(),
        )?;

        watcher.watch(collection_dir, RecursiveMode::NonRecursive)?;
        Ok(Subscription {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll: drains queued change events and reports whether
    /// any document changed since the last call.
    pub fn poll_changed(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

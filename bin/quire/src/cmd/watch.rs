//! Watch command implementation
//!
//! Builds the site once, then re-renders what each source change affects
//! until interrupted. File system events are queued and handled one at a time.

use std::{sync::Arc, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use notify::{
    EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};
use quire_core::Config;
use quire_generator::{ChangeEvent, ChangeKind, ChangeWatcher, PartialOutcome, SiteBuilder};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Capacity of the event queue between the notify thread and the builder.
const EVENT_QUEUE: usize = 256;

/// Run the watch command.
pub async fn run(config: Config) -> Result<()> {
    config.validate_paths()?;

    let builder = Arc::new(SiteBuilder::new(config));

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let start = Instant::now();
    let initial = tokio::task::spawn_blocking({
        let builder = Arc::clone(&builder);
        move || builder.build()
    });
    let stats = tokio::select! {
        res = &mut interrupt => {
            if let Err(e) = res {
                error!(error = %e, "failed to listen for interrupt");
            }
            println!("\nInterrupted, finishing the initial build before exiting.");
            return Ok(());
        }
        joined = initial => joined
            .wrap_err("Initial build task panicked")?
            .wrap_err("Initial build failed")?,
    };
    println!(
        "Initial build: {} pages, {} documents, {} assets in {:.2}s",
        stats.pages,
        stats.documents,
        stats.assets,
        start.elapsed().as_secs_f64()
    );

    let watcher = ChangeWatcher::new(builder);
    let (tx, rx) = mpsc::channel::<ChangeEvent>(EVENT_QUEUE);

    let mut fs_watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                for change in to_changes(event) {
                    if tx.blocking_send(change).is_err() {
                        debug!("event queue closed");
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "watch error"),
        },
        notify::Config::default(),
    )
    .wrap_err("Failed to create file watcher")?;

    fs_watcher
        .watch(watcher.root(), RecursiveMode::Recursive)
        .wrap_err_with(|| format!("Failed to watch {}", watcher.root().display()))?;

    info!(root = %watcher.root().display(), "watching for changes");
    println!("Watching for changes in {}...", watcher.root().display());
    println!("Press Ctrl + C to stop.");

    let shutdown = async {
        if let Err(e) = interrupt.await {
            error!(error = %e, "failed to listen for interrupt");
        }
    };
    let handled = process_queue(watcher, rx, shutdown, report).await;

    drop(fs_watcher);
    debug!(handled, "watch session ended");
    println!("\nStopped watching.");
    Ok(())
}

/// Handle queued changes one at a time until `shutdown` completes or the
/// queue closes, passing each partial build's outcome to `on_outcome`.
///
/// A partial build runs to completion before the next event is taken.
/// Returns the number of events handled.
pub async fn process_queue(
    watcher: ChangeWatcher,
    mut rx: mpsc::Receiver<ChangeEvent>,
    shutdown: impl Future<Output = ()>,
    mut on_outcome: impl FnMut(&ChangeEvent, &PartialOutcome),
) -> usize {
    tokio::pin!(shutdown);
    let mut handled = 0;

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            event = rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                let watcher = watcher.clone();
                let task = tokio::task::spawn_blocking(move || {
                    let outcome = watcher.process(&event);
                    (event, outcome)
                });
                match task.await {
                    Ok((event, Some(outcome))) => on_outcome(&event, &outcome),
                    Ok((_, None)) => {}
                    Err(e) => error!(error = %e, "rebuild task panicked"),
                }
                handled += 1;
            }
        }
    }

    handled
}

fn report(event: &ChangeEvent, outcome: &PartialOutcome) {
    match outcome {
        PartialOutcome::Pages(count) => {
            println!("{} changed, re-rendered {count} pages", event.path.display());
        }
        PartialOutcome::Document(path) | PartialOutcome::Asset(path) => {
            println!("{} -> {}", event.path.display(), path.display());
        }
        PartialOutcome::Skipped => {}
    }
}

/// Translate a notify event into change events, one per affected path.
pub fn to_changes(event: notify::Event) -> Vec<ChangeEvent> {
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut paths = event.paths.into_iter();
            let from = paths.next().map(|p| ChangeEvent::new(ChangeKind::Deleted, p));
            let to = paths.next().map(|p| ChangeEvent::new(ChangeKind::Created, p));
            from.into_iter().chain(to).collect()
        }
        kind => {
            let kind = change_kind(kind);
            event
                .paths
                .into_iter()
                .map(|path| ChangeEvent::new(kind, path))
                .collect()
        }
    }
}

fn change_kind(kind: EventKind) -> ChangeKind {
    match kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            ChangeKind::Created
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
            ChangeKind::Deleted
        }
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => ChangeKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind};
    use tempfile::TempDir;

    use super::*;

    fn site_watcher(dir: &TempDir) -> ChangeWatcher {
        let mut config = Config::default();
        config.build.source_dir = dir.path().join("templates");
        config.build.output_dir = dir.path().join("build");
        fs::create_dir_all(&config.build.source_dir).unwrap();
        fs::create_dir_all(&config.build.output_dir).unwrap();
        fs::write(config.build.source_dir.join("_base.html"), "[{% block body %}{% endblock %}]")
            .unwrap();
        for page in ["a", "b"] {
            fs::write(
                config.build.source_dir.join(format!("{page}.html")),
                format!("{{% extends \"_base.html\" %}}{{% block body %}}{page}{{% endblock %}}"),
            )
            .unwrap();
        }
        ChangeWatcher::new(Arc::new(SiteBuilder::new(config.prepare().unwrap())))
    }

    #[tokio::test]
    async fn test_queue_handles_events_in_order() {
        let dir = TempDir::new().unwrap();
        let watcher = site_watcher(&dir);
        let root = watcher.root().to_path_buf();
        let (tx, rx) = mpsc::channel(8);
        let events = [
            ChangeEvent::new(ChangeKind::Modified, root.join("b.html")),
            ChangeEvent::new(ChangeKind::Deleted, root.join("gone.html")),
            ChangeEvent::new(ChangeKind::Modified, root.join("_base.html")),
            ChangeEvent::new(ChangeKind::Created, root.join("a.html")),
        ];
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        let handled = process_queue(watcher, rx, std::future::pending(), |event, outcome| {
            seen.push((event.path.clone(), outcome.clone()));
        })
        .await;

        assert_eq!(handled, 4);
        assert_eq!(
            seen,
            vec![
                (root.join("b.html"), PartialOutcome::Pages(1)),
                (root.join("_base.html"), PartialOutcome::Pages(2)),
                (root.join("a.html"), PartialOutcome::Pages(1)),
            ]
        );
        let out = dir.path().join("build");
        assert_eq!(fs::read_to_string(out.join("a.html")).unwrap(), "[a]");
        assert_eq!(fs::read_to_string(out.join("b.html")).unwrap(), "[b]");
    }

    #[tokio::test]
    async fn test_queue_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let watcher = site_watcher(&dir);
        let (_tx, rx) = mpsc::channel(8);

        let handled = process_queue(watcher, rx, std::future::ready(()), |_, _| {}).await;

        assert_eq!(handled, 0);
        assert!(!dir.path().join("build/a.html").exists());
    }

    fn event(kind: EventKind, paths: &[&str]) -> notify::Event {
        paths
            .iter()
            .fold(notify::Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    #[test]
    fn test_create_and_modify() {
        let created = to_changes(event(EventKind::Create(CreateKind::File), &["a.html"]));
        assert_eq!(created, vec![ChangeEvent::new(ChangeKind::Created, "a.html")]);

        let modified = to_changes(event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["a.html"],
        ));
        assert_eq!(modified, vec![ChangeEvent::new(ChangeKind::Modified, "a.html")]);
    }

    #[test]
    fn test_remove_and_access() {
        let removed = to_changes(event(EventKind::Remove(RemoveKind::File), &["a.html"]));
        assert_eq!(removed[0].kind, ChangeKind::Deleted);

        let accessed = to_changes(event(EventKind::Access(AccessKind::Any), &["a.html"]));
        assert_eq!(accessed[0].kind, ChangeKind::Other);
    }

    #[test]
    fn test_rename_both_splits() {
        let changes = to_changes(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["old.html", "new.html"],
        ));

        assert_eq!(
            changes,
            vec![
                ChangeEvent::new(ChangeKind::Deleted, "old.html"),
                ChangeEvent::new(ChangeKind::Created, "new.html"),
            ]
        );
    }

    #[test]
    fn test_rename_to_is_creation() {
        let changes = to_changes(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["new.html"],
        ));
        assert_eq!(changes[0].kind, ChangeKind::Created);
    }
}

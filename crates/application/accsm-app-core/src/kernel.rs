use accsm_core::filename::SetupFilename;
use accsm_core::{FolderStructure, SetupId};
use camino::Utf8PathBuf;
use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::app_core::{AppCommand, AppStore, DomainEvent};
use crate::authoring::{SetupDraft, SetupEdit};
use crate::cache::QueryKey;
use crate::client::SetupClient;
use crate::domain::MainView;
use crate::dragdrop::DropAction;
use crate::error::DraftError;
use crate::import::{RunKind, RunOutcome};
use crate::modals::{rename_target, resolve_modal_data};
use crate::notice::Notice;
use crate::ports::{BackendGateway, Notifier, PreferencesRepo};
use crate::review::ReviewEdit;
use crate::setups_path::check_setups_path;

/// Forwards client notices to the kernel.
///
/// The client notifies from synchronous code, so notices get their own
/// unbounded queue instead of the bounded event channel.
struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("kernel gone; notice discarded");
        }
    }
}

/// Orders preference writes so an older snapshot never replaces a newer one.
#[derive(Default)]
struct PrefsWriter {
    issued: AtomicU64,
    written: Mutex<u64>,
}

impl PrefsWriter {
    fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn write(
        &self,
        generation: u64,
        save: impl FnOnce() -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if *written > generation {
            return Ok(());
        }
        save()?;
        *written = generation;
        Ok(())
    }
}

pub struct AppKernel<G, P> {
    pub store: AppStore,
    client: SetupClient<G>,
    prefs: Arc<P>,
    prefs_writer: Arc<PrefsWriter>,
    runtime: Handle,

    tx: mpsc::Sender<DomainEvent>,
    rx: mpsc::Receiver<DomainEvent>,
    notices: mpsc::UnboundedReceiver<Notice>,
    setups_changed: broadcast::Receiver<FolderStructure>,
    in_flight: Vec<JoinHandle<()>>,
}

impl<G, P> AppKernel<G, P>
where
    G: BackendGateway,
    P: PreferencesRepo,
{
    pub fn new(store: AppStore, gateway: G, prefs: P) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel(accsm_config::EVENT_CHANNEL_CAPACITY);
        let gateway = Arc::new(gateway);
        let setups_changed = gateway.subscribe_setups_changed();
        let (notice_tx, notices) = mpsc::unbounded_channel();
        let notifier = Arc::new(ChannelNotifier { tx: notice_tx });
        Ok(Self {
            store,
            client: SetupClient::new(gateway, notifier),
            prefs: Arc::new(prefs),
            prefs_writer: Arc::default(),
            runtime: crate::async_runtime::handle()?,
            tx,
            rx,
            notices,
            setups_changed,
            in_flight: Vec::new(),
        })
    }

    pub fn client(&self) -> &SetupClient<G> {
        &self.client
    }

    fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.push(self.runtime.spawn(fut));
    }

    pub fn dispatch(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::LoadInitialState => {
                self.store.apply(DomainEvent::BootLoadingStarted);
                let tx = self.tx.clone();
                let prefs = self.prefs.clone();
                let client = self.client.clone();
                self.spawn(async move {
                    let ev = match tokio::task::spawn_blocking(move || prefs.load()).await {
                        Ok(Ok(preferences)) => DomainEvent::InitialStateLoaded { preferences },
                        Ok(Err(e)) => DomainEvent::BootFailed {
                            message: format!("{e:#}"),
                        },
                        Err(e) => DomainEvent::BootFailed {
                            message: format!("Preferences loader panicked: {e}"),
                        },
                    };
                    let _ = tx.send(ev).await;

                    // Warm the reference data; failures are logged by the client.
                    let _ = futures::join!(client.cars(), client.tracks(), client.folder_structure());
                });
            }

            AppCommand::SelectSetup(id) => {
                self.store
                    .apply(DomainEvent::MainViewChanged(MainView::Viewing(id.clone())));
                let client = self.client.clone();
                self.spawn(async move {
                    let _ = client.setup(&id).await;
                });
            }

            AppCommand::StartNewSetup => self
                .store
                .apply(DomainEvent::MainViewChanged(MainView::Creating)),

            AppCommand::ClearView => self
                .store
                .apply(DomainEvent::MainViewChanged(MainView::Empty)),

            AppCommand::ToggleTrack(track) => self.store.apply(DomainEvent::TrackToggled(track)),
            AppCommand::ToggleCar(car) => self.store.apply(DomainEvent::CarToggled(car)),

            AppCommand::SetTrackSearch(q) => {
                self.store.apply(DomainEvent::TrackSearchChanged(q));
                self.persist_preferences();
            }

            AppCommand::SetCarSearch(q) => {
                self.store.apply(DomainEvent::CarSearchChanged(q));
                self.persist_preferences();
            }

            AppCommand::SetCarCategory(c) => {
                self.store.apply(DomainEvent::CarCategoryChanged(c));
                self.persist_preferences();
            }

            AppCommand::RefreshFolderStructure => {
                let client = self.client.clone();
                self.spawn(async move {
                    let _ = client.refresh_folder_structure(false).await;
                });
            }

            AppCommand::SetSetupsPath(input) => self.set_setups_path(&input),

            AppCommand::CreateSetup(draft) => self.create_setup(draft),
            AppCommand::EditSetup { setup, edit } => self.edit_setup(setup, edit),

            AppCommand::OpenImportModal { paths } => {
                self.store
                    .apply(DomainEvent::ImportModalOpened { paths: paths.clone() });
                if !paths.is_empty() {
                    self.start_import_run(RunKind::Staged, paths);
                }
            }

            AppCommand::CloseImportModal => self.store.apply(DomainEvent::ImportModalClosed),

            AppCommand::Drag(ev) => {
                let action = self.store.with_state_mut(|s| s.drop_router.handle(ev));
                match action {
                    DropAction::None => {}
                    DropAction::OpenModalWith(paths) => {
                        self.dispatch(AppCommand::OpenImportModal { paths });
                    }
                    DropAction::ProcessInModal(paths) => {
                        self.start_import_run(RunKind::Staged, paths);
                    }
                }
            }

            AppCommand::PickedPaths(paths) => {
                if paths.is_empty() {
                    return;
                }
                if self.store.state().import_modal_open {
                    self.start_import_run(RunKind::Staged, paths);
                } else {
                    self.dispatch(AppCommand::OpenImportModal { paths });
                }
            }

            AppCommand::ImportPathsDirect(paths) => {
                if !paths.is_empty() {
                    self.start_import_run(RunKind::Direct, paths);
                }
            }

            AppCommand::ImportTryAgain => self.store.apply(DomainEvent::ImportTryAgain),

            AppCommand::Review(edit) => {
                let persist = matches!(edit, ReviewEdit::SetApplyLfm(_));
                self.store.apply(DomainEvent::ReviewEdited(edit));
                if persist {
                    self.persist_preferences();
                }
            }

            AppCommand::SubmitReview => self.submit_review(),

            AppCommand::OpenDeleteSetup { setup, hooks } => {
                let cars = self.client.cached_cars();
                let tracks = self.client.cached_tracks();
                if let Some(data) = resolve_modal_data(cars.as_ref(), tracks.as_ref(), setup) {
                    self.store
                        .apply(DomainEvent::DeleteModalOpened(data.with_hooks(hooks)));
                }
            }

            AppCommand::OpenRenameSetup { setup, hooks } => {
                let cars = self.client.cached_cars();
                let tracks = self.client.cached_tracks();
                if let Some(data) = resolve_modal_data(cars.as_ref(), tracks.as_ref(), setup) {
                    self.store
                        .apply(DomainEvent::RenameModalOpened(data.with_hooks(hooks)));
                }
            }

            AppCommand::CloseDeleteSetup => self.store.apply(DomainEvent::DeleteModalClosed),
            AppCommand::CloseRenameSetup => self.store.apply(DomainEvent::RenameModalClosed),

            AppCommand::ConfirmDeleteSetup => self.confirm_delete(),
            AppCommand::ConfirmRenameSetup { new_name } => self.confirm_rename(&new_name),

            AppCommand::DismissNotice(ix) => self.store.apply(DomainEvent::NoticeDismissed(ix)),
        }
    }

    fn create_setup(&mut self, draft: SetupDraft) {
        if self.store.state().setup_form.pending {
            return;
        }
        let (id, prepared) = match draft.prepare(Utc::now()) {
            Ok(prepared) => prepared,
            Err(e) => {
                let title = match e {
                    DraftError::MissingFields => e.to_string(),
                    _ => format!("Failed to create setup: {e}"),
                };
                self.store.apply(DomainEvent::Notice(Notice::error(title)));
                self.store.apply(DomainEvent::SetupFormFailed(e.to_string()));
                return;
            }
        };

        self.store.apply(DomainEvent::SetupFormSubmitted);
        let tx = self.tx.clone();
        let client = self.client.clone();
        self.spawn(async move {
            let saved = match client.validate_setup(&id.car, &prepared.content).await {
                Ok(true) => match client.setup_exists(&id).await {
                    Ok(false) => client
                        .save_setup(&id, &prepared.file, true)
                        .await
                        .map_err(|e| e.to_string()),
                    Ok(true) => Err(format!("\"{}\" already exists", id.filename)),
                    Err(e) => Err(e.to_string()),
                },
                Ok(false) => Err("setup did not pass validation".to_string()),
                Err(e) => Err(e.to_string()),
            };

            match saved {
                Ok(()) => {
                    tracing::info!(setup = %id, "setup created");
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::success(
                            "Setup created successfully",
                        )))
                        .await;
                    let _ = tx.send(DomainEvent::SetupCreated(id)).await;
                }
                Err(message) => {
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::error(format!(
                            "Failed to create setup: {message}"
                        ))))
                        .await;
                    let _ = tx.send(DomainEvent::SetupFormFailed(message)).await;
                }
            }
        });
    }

    fn edit_setup(&mut self, setup: SetupId, edit: SetupEdit) {
        if self.store.state().setup_form.pending {
            return;
        }
        let prepared = match edit.prepare(Utc::now()) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.store.apply(DomainEvent::Notice(Notice::error(format!(
                    "Validation failed: {e}"
                ))));
                self.store.apply(DomainEvent::SetupFormFailed(e.to_string()));
                return;
            }
        };

        self.store.apply(DomainEvent::SetupFormSubmitted);
        let tx = self.tx.clone();
        let client = self.client.clone();
        self.spawn(async move {
            // Backend failures are reported by the client itself.
            let saved = match client.validate_setup(&setup.car, &prepared.content).await {
                Ok(true) => client
                    .edit_setup(&setup, &prepared.file, false)
                    .await
                    .map_err(|e| e.to_string()),
                Ok(false) => {
                    let message = "setup did not pass validation".to_string();
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::error(format!(
                            "Validation failed: {message}"
                        ))))
                        .await;
                    Err(message)
                }
                Err(e) => Err(e.to_string()),
            };

            let ev = match saved {
                Ok(()) => DomainEvent::SetupEdited(setup),
                Err(message) => DomainEvent::SetupFormFailed(message),
            };
            let _ = tx.send(ev).await;
        });
    }

    fn set_setups_path(&mut self, input: &str) {
        if self.store.state().setups_path_form.pending {
            return;
        }
        let path = match check_setups_path(input) {
            Ok(path) => path.to_string(),
            Err(e) => {
                self.store
                    .apply(DomainEvent::SetupsPathRejected(e.to_string()));
                return;
            }
        };
        let current: Option<String> = self.client.peek(&QueryKey::setups_path());
        if current.as_deref() == Some(path.as_str()) {
            tracing::debug!(%path, "setups path unchanged");
            self.store.apply(DomainEvent::SetupsPathUpdated);
            return;
        }

        self.store.apply(DomainEvent::SetupsPathSubmitted);
        let tx = self.tx.clone();
        let client = self.client.clone();
        self.spawn(async move {
            let ev = match client.set_setups_path(&path, false).await {
                Ok(()) => DomainEvent::SetupsPathUpdated,
                Err(e) => DomainEvent::SetupsPathRejected(format!("Failed to update path: {e}")),
            };
            let _ = tx.send(ev).await;
        });
    }

    fn start_import_run(&mut self, kind: RunKind, paths: Vec<Utf8PathBuf>) {
        let run_id = uuid::Uuid::new_v4();
        self.store
            .apply(DomainEvent::ImportRunStarted { run_id, kind });
        tracing::debug!(%run_id, ?kind, count = paths.len(), "import run started");

        let tx = self.tx.clone();
        let client = self.client.clone();
        self.spawn(async move {
            let outcome = match kind {
                RunKind::Direct => client
                    .import_json_files(&paths)
                    .await
                    .map(RunOutcome::Imported),
                RunKind::Staged => client
                    .validate_json_files(&paths)
                    .await
                    .map(RunOutcome::Validated),
            };

            match outcome {
                Ok(outcome) => {
                    let _ = tx
                        .send(DomainEvent::ImportRunFinished { run_id, outcome })
                        .await;
                }
                Err(e) => {
                    tracing::error!(%run_id, "import run failed: {e}");
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::error(format!(
                            "Failed to process files: {e}"
                        ))))
                        .await;
                    let _ = tx.send(DomainEvent::ImportRunFailed { run_id }).await;
                }
            }
        });
    }

    fn submit_review(&mut self) {
        let cars = self.client.cached_cars();
        let folder = self.client.cached_folder_structure();
        let batch = self
            .store
            .with_review(|review| {
                if review.can_import(cars.as_ref(), folder.as_ref()) {
                    review.submission()
                } else {
                    None
                }
            })
            .flatten();
        let Some(batch) = batch else {
            tracing::debug!("review is not importable yet");
            return;
        };

        self.store.apply(DomainEvent::ReviewSubmitStarted);
        let tx = self.tx.clone();
        let client = self.client.clone();
        self.spawn(async move {
            match client.import_validated_setups(&batch).await {
                Ok(results) => {
                    tracing::info!(count = results.len(), "validated setups imported");
                    let _ = client.refresh_folder_structure(true).await;
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::success(
                            "Setups imported successfully!",
                        )))
                        .await;
                    let _ = tx.send(DomainEvent::ImportModalClosed).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::error(format!(
                            "Failed to import setups: {e}"
                        ))))
                        .await;
                    let _ = tx.send(DomainEvent::ReviewSubmitFailed).await;
                }
            }
        });
    }

    fn confirm_delete(&mut self) {
        let slot = self.store.state().modals.delete_setup;
        if !slot.is_open || slot.pending {
            return;
        }
        let Some(data) = slot.data else {
            return;
        };

        self.store.apply(DomainEvent::DeleteStarted);
        let tx = self.tx.clone();
        let client = self.client.clone();
        self.spawn(async move {
            match client.delete_setup(&data.setup, true).await {
                Ok(()) => {
                    tracing::info!(setup = %data.setup, "setup deleted");
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::success(format!(
                            "Setup \"{}\" has been deleted",
                            data.stem()
                        ))))
                        .await;
                    let _ = client.refresh_folder_structure(true).await;
                    if let Some(after) = &data.on_after_delete {
                        after();
                    }
                    let _ = tx.send(DomainEvent::SetupDeleted(data.setup.clone())).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::error(format!(
                            "Failed to delete setup: {e}"
                        ))))
                        .await;
                    let _ = tx.send(DomainEvent::DeleteFailed).await;
                }
            }
        });
    }

    fn confirm_rename(&mut self, new_name: &str) {
        let slot = self.store.state().modals.rename_setup;
        if !slot.is_open || slot.pending {
            return;
        }
        let Some(data) = slot.data else {
            return;
        };
        let new_filename = match rename_target(&data.setup.filename, new_name) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!(setup = %data.setup, "rename declined: {e}");
                return;
            }
        };

        self.store.apply(DomainEvent::RenameStarted);
        let tx = self.tx.clone();
        let client = self.client.clone();
        self.spawn(async move {
            match client.rename_setup(&data.setup, &new_filename, true).await {
                Ok(()) => {
                    let renamed = data.setup.with_filename(new_filename.as_str());
                    tracing::info!(from = %data.setup, to = %renamed, "setup renamed");
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::success(format!(
                            "Setup renamed from \"{}\" to \"{}\"",
                            data.stem(),
                            SetupFilename::stem(&new_filename)
                        ))))
                        .await;
                    let _ = client.refresh_folder_structure(true).await;
                    if let Some(after) = &data.on_after_rename {
                        after(&new_filename);
                    }
                    let _ = tx
                        .send(DomainEvent::SetupRenamed {
                            from: data.setup.clone(),
                            to: renamed,
                        })
                        .await;
                }
                Err(e) => {
                    let _ = tx
                        .send(DomainEvent::Notice(Notice::error(format!(
                            "Failed to rename setup: {e}"
                        ))))
                        .await;
                    let _ = tx.send(DomainEvent::RenameFailed).await;
                }
            }
        });
    }

    fn persist_preferences(&mut self) {
        let snapshot = self.store.state().preferences;
        let prefs = self.prefs.clone();
        let writer = self.prefs_writer.clone();
        let generation = writer.next_generation();
        self.spawn(async move {
            let save = move || writer.write(generation, || prefs.save(&snapshot));
            match tokio::task::spawn_blocking(save).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Failed to save preferences: {e:#}"),
                Err(e) => tracing::error!("Preferences writer panicked: {e}"),
            }
        });
    }

    /// Applies pending push events and results of background work.
    pub fn tick(&mut self) {
        loop {
            match self.setups_changed.try_recv() {
                Ok(structure) => self.client.apply_setups_changed(structure),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "setups-changed subscription lagged");
                }
                Err(_) => break,
            }
        }

        while let Ok(notice) = self.notices.try_recv() {
            self.store.apply(DomainEvent::Notice(notice));
        }

        while let Ok(ev) = self.rx.try_recv() {
            if let Some(run_id) = ev.import_run_id() {
                if !self.store.state().import.is_current(run_id) {
                    tracing::debug!(%run_id, "dropping result of superseded import run");
                    continue;
                }
            }
            self.store.apply(ev);
        }

        self.in_flight.retain(|handle| !handle.is_finished());
    }

    /// Waits for every spawned task, then ticks.
    pub async fn settle(&mut self) {
        while !self.in_flight.is_empty() {
            let handles = std::mem::take(&mut self.in_flight);
            for res in futures::future::join_all(handles).await {
                if let Err(e) = res {
                    tracing::error!("background task failed: {e}");
                }
            }
        }
        self.tick();
    }

    pub fn sender(&self) -> mpsc::Sender<DomainEvent> {
        self.tx.clone()
    }
}

mod support;

use accsm_app_core::app_core::{AppCommand, AppStore, DomainEvent};
use accsm_app_core::domain::{AppState, BootState, Preferences};
use accsm_app_core::dragdrop::{DragEvent, DragState};
use accsm_app_core::import::{ImportPhase, RunOutcome};
use accsm_app_core::kernel::AppKernel;
use accsm_app_core::notice::NoticeLevel;
use accsm_app_core::review::ReviewEdit;
use camino::Utf8PathBuf;
use support::{invalid, structure, valid, FakeGateway, MemoryPreferences};

type Kernel = AppKernel<FakeGateway, MemoryPreferences>;

async fn booted(gateway: &FakeGateway, prefs: MemoryPreferences) -> (Kernel, AppStore) {
    let store = AppStore::new(AppState::default());
    let mut kernel = AppKernel::new(store.clone(), gateway.clone(), prefs).unwrap();
    kernel.dispatch(AppCommand::LoadInitialState);
    kernel.settle().await;
    assert_eq!(store.state().boot, BootState::Ready);
    (kernel, store)
}

fn dropped() -> Vec<Utf8PathBuf> {
    vec![
        Utf8PathBuf::from("/drop/Monza_Q.json"),
        Utf8PathBuf::from("/drop/Monza_R.json"),
        Utf8PathBuf::from("/drop/broken.json"),
    ]
}

fn monza_batch(gateway: &FakeGateway) {
    gateway.set_validation(vec![
        valid("/drop/Monza_Q.json", "bmw_m4_gt3"),
        valid("/drop/Monza_R.json", "bmw_m4_gt3"),
        invalid("/drop/broken.json", "expected value at line 1 column 1"),
    ]);
}

fn can_import(kernel: &Kernel, store: &AppStore) -> bool {
    let cars = kernel.client().cached_cars();
    let folder = kernel.client().cached_folder_structure();
    store
        .with_review(|r| r.can_import(cars.as_ref(), folder.as_ref()))
        .unwrap_or(false)
}

#[tokio::test]
async fn dropped_batch_is_reviewed_simplified_and_imported() {
    let gateway = FakeGateway::new();
    gateway.set_structure(structure(&[("porsche_992_gt3_r", "Spa", &["quali.json"])]));
    monza_batch(&gateway);
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    kernel.dispatch(AppCommand::Drag(DragEvent::Enter));
    assert!(store.state().drop_router.overlay_visible());
    kernel.dispatch(AppCommand::Drag(DragEvent::Drop(dropped())));
    kernel.settle().await;

    let state = store.state();
    assert!(state.import_modal_open);
    assert_eq!(state.import_initial_paths, dropped());
    let review = state.import.review().expect("review phase");
    assert_eq!(review.selected_track(), Some("monza"));
    assert_eq!(review.accepted().len(), 2);
    assert_eq!(review.rejected().len(), 1);

    kernel.dispatch(AppCommand::Review(ReviewEdit::SelectTrack(None)));
    assert!(!can_import(&kernel, &store));
    kernel.dispatch(AppCommand::Review(ReviewEdit::SelectTrack(Some(
        "monza".into(),
    ))));
    assert!(can_import(&kernel, &store));

    assert_eq!(store.with_review(|r| r.can_simplify()), Some(true));
    kernel.dispatch(AppCommand::Review(ReviewEdit::SimplifyAll { prefix: None }));
    kernel.dispatch(AppCommand::SubmitReview);
    kernel.settle().await;

    let imported = gateway.imported();
    let names: Vec<_> = imported.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, ["quali.json", "race.json"]);
    assert!(imported
        .iter()
        .all(|d| d.car == "bmw_m4_gt3" && d.track == "monza" && !d.apply_lfm));

    let state = store.state();
    assert!(!state.import_modal_open);
    assert_eq!(state.import.phase(), &ImportPhase::Waiting);
    assert_eq!(gateway.count("refresh_folder_structure"), 1);
    let titles: Vec<_> = state.notices.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["Setups imported successfully!"]);
}

#[tokio::test]
async fn existing_file_conflict_blocks_until_renamed() {
    let gateway = FakeGateway::new();
    monza_batch(&gateway);
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    kernel.dispatch(AppCommand::OpenImportModal { paths: dropped() });
    kernel.settle().await;
    kernel.dispatch(AppCommand::Review(ReviewEdit::SimplifyAll { prefix: None }));

    let folder = kernel.client().cached_folder_structure();
    let conflicts = store
        .with_review(|r| r.existing_conflicts(folder.as_ref()))
        .unwrap();
    assert_eq!(conflicts.into_iter().collect::<Vec<_>>(), [1]);
    assert!(!can_import(&kernel, &store));

    // Blocked submissions never reach the backend.
    kernel.dispatch(AppCommand::SubmitReview);
    kernel.settle().await;
    assert_eq!(gateway.count("import_validated_setups"), 0);

    kernel.dispatch(AppCommand::Review(ReviewEdit::BeginEdit(1)));
    kernel.dispatch(AppCommand::Review(ReviewEdit::SetDraft("race long".into())));
    kernel.dispatch(AppCommand::Review(ReviewEdit::CommitEdit));
    assert!(can_import(&kernel, &store));
}

#[tokio::test]
async fn lfm_toggle_is_remembered_for_the_next_batch() {
    let gateway = FakeGateway::new();
    monza_batch(&gateway);
    let prefs = MemoryPreferences::with(Preferences::default());
    let (mut kernel, store) = booted(&gateway, prefs.clone()).await;

    kernel.dispatch(AppCommand::OpenImportModal { paths: dropped() });
    kernel.settle().await;
    assert_eq!(store.with_review(|r| r.apply_lfm()), Some(false));

    kernel.dispatch(AppCommand::Review(ReviewEdit::SetApplyLfm(true)));
    kernel.settle().await;
    assert!(prefs.current().apply_lfm_default);

    kernel.dispatch(AppCommand::CloseImportModal);
    kernel.dispatch(AppCommand::OpenImportModal { paths: dropped() });
    kernel.settle().await;
    assert_eq!(store.with_review(|r| r.apply_lfm()), Some(true));
}

#[tokio::test]
async fn failed_submission_keeps_review_open() {
    let gateway = FakeGateway::new();
    gateway.set_structure(structure(&[]));
    monza_batch(&gateway);
    gateway.fail("import_validated_setups");
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    kernel.dispatch(AppCommand::OpenImportModal { paths: dropped() });
    kernel.settle().await;
    kernel.dispatch(AppCommand::SubmitReview);
    assert_eq!(store.with_review(|r| r.is_pending()), Some(true));
    kernel.settle().await;

    let state = store.state();
    assert!(state.import_modal_open);
    assert_eq!(state.import.review().map(|r| r.is_pending()), Some(false));
    let notice = state.notices.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(
        notice.title,
        "Failed to import setups: import_validated_setups exploded"
    );
}

#[tokio::test]
async fn drop_goes_to_exactly_one_target() {
    let gateway = FakeGateway::new();
    monza_batch(&gateway);
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    kernel.dispatch(AppCommand::OpenImportModal { paths: vec![] });
    assert_eq!(store.state().import.phase(), &ImportPhase::Waiting);

    kernel.dispatch(AppCommand::Drag(DragEvent::Enter));
    assert!(!store.state().drop_router.overlay_visible());
    kernel.dispatch(AppCommand::Drag(DragEvent::Drop(dropped())));
    kernel.settle().await;

    let state = store.state();
    assert!(state.import_initial_paths.is_empty());
    assert!(state.import.review().is_some());
    assert_eq!(gateway.count("validate_json_files"), 1);
}

#[tokio::test]
async fn drop_during_a_run_is_ignored_however_the_run_started() {
    let gateway = FakeGateway::new();
    monza_batch(&gateway);
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    // Overlay drop opens the modal and starts the run.
    kernel.dispatch(AppCommand::Drag(DragEvent::Drop(dropped())));
    let state = store.state();
    assert!(state.import.is_processing());
    assert_eq!(state.drop_router.modal_state(), DragState::Processing);

    kernel.dispatch(AppCommand::Drag(DragEvent::Drop(dropped())));
    kernel.settle().await;
    assert_eq!(gateway.count("validate_json_files"), 1);
    assert!(store.state().import.review().is_some());
    assert_eq!(store.state().drop_router.modal_state(), DragState::Idle);

    // Same for a run started from the file picker.
    kernel.dispatch(AppCommand::ImportTryAgain);
    kernel.dispatch(AppCommand::PickedPaths(dropped()));
    kernel.dispatch(AppCommand::Drag(DragEvent::Drop(dropped())));
    kernel.settle().await;
    assert_eq!(gateway.count("validate_json_files"), 2);

    // Once the run finished the modal takes drops again.
    kernel.dispatch(AppCommand::ImportTryAgain);
    kernel.dispatch(AppCommand::Drag(DragEvent::Drop(dropped())));
    kernel.settle().await;
    assert_eq!(gateway.count("validate_json_files"), 3);
}

#[tokio::test]
async fn superseded_runs_are_ignored() {
    let gateway = FakeGateway::new();
    monza_batch(&gateway);
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    // Closing while a run is in flight discards its result.
    kernel.dispatch(AppCommand::OpenImportModal { paths: dropped() });
    kernel.dispatch(AppCommand::CloseImportModal);
    kernel.settle().await;
    assert_eq!(store.state().import.phase(), &ImportPhase::Waiting);
    assert!(!store.state().import_modal_open);

    kernel.dispatch(AppCommand::OpenImportModal { paths: vec![] });
    kernel
        .sender()
        .send(DomainEvent::ImportRunFinished {
            run_id: uuid::Uuid::new_v4(),
            outcome: RunOutcome::Imported(vec![]),
        })
        .await
        .unwrap();
    kernel.tick();
    assert_eq!(store.state().import.phase(), &ImportPhase::Waiting);
}

#[tokio::test]
async fn direct_import_reports_per_file_results() {
    let gateway = FakeGateway::new();
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    kernel.dispatch(AppCommand::OpenImportModal { paths: vec![] });
    kernel.dispatch(AppCommand::ImportPathsDirect(vec![
        Utf8PathBuf::from("/drop/Monza_R.json"),
        Utf8PathBuf::from("/drop/notes.txt"),
    ]));
    kernel.settle().await;

    let state = store.state();
    let ImportPhase::Imported(summary) = state.import.phase() else {
        panic!("expected imported phase, got {:?}", state.import.phase());
    };
    assert_eq!(summary.succeeded.len(), 1);
    assert_eq!(summary.failed.len(), 1);

    kernel.dispatch(AppCommand::ImportTryAgain);
    assert_eq!(store.state().import.phase(), &ImportPhase::Waiting);
}

#[tokio::test]
async fn failed_run_returns_to_waiting_with_notice() {
    let gateway = FakeGateway::new();
    gateway.fail("validate_json_files");
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    kernel.dispatch(AppCommand::OpenImportModal { paths: dropped() });
    kernel.settle().await;

    let state = store.state();
    assert_eq!(state.import.phase(), &ImportPhase::Waiting);
    assert_eq!(
        state.notices.last().map(|n| n.title.as_str()),
        Some("Failed to process files: validate_json_files exploded")
    );
}

#[tokio::test]
async fn empty_validation_means_nothing_found() {
    let gateway = FakeGateway::new();
    let (mut kernel, store) = booted(&gateway, MemoryPreferences::default()).await;

    kernel.dispatch(AppCommand::PickedPaths(vec![Utf8PathBuf::from("/empty")]));
    kernel.settle().await;

    let state = store.state();
    assert!(state.import_modal_open);
    assert_eq!(state.import.phase(), &ImportPhase::NothingFound);
}

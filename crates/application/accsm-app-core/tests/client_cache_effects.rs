mod support;

use accsm_app_core::cache::{EntryState, QueryKey};
use accsm_app_core::client::SetupClient;
use accsm_app_core::notice::{Notice, NoticeLevel};
use accsm_app_core::ports::Notifier;
use accsm_core::SetupId;
use camino::Utf8PathBuf;
use std::sync::{Arc, Mutex};
use support::{setup_file, structure, FakeGateway};

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<Notice>>);

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

fn client() -> (SetupClient<FakeGateway>, FakeGateway, Arc<RecordingNotifier>) {
    let gateway = FakeGateway::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let client = SetupClient::new(Arc::new(gateway.clone()), notifier.clone());
    (client, gateway, notifier)
}

#[tokio::test]
async fn fresh_entries_are_served_without_refetch() {
    let (client, gateway, _) = client();

    client.cars().await.unwrap();
    client.cars().await.unwrap();
    client.folder_structure().await.unwrap();
    client.folder_structure().await.unwrap();

    assert_eq!(gateway.count("get_cars"), 1);
    assert_eq!(gateway.count("get_folder_structure"), 1);
}

#[tokio::test]
async fn rename_drops_old_entry_and_never_creates_new_one() {
    let (client, gateway, notifier) = client();
    let id = SetupId::new("bmw_m4_gt3", "monza", "race.json");
    gateway.put_setup(id.clone(), setup_file("bmw_m4_gt3"));

    client.setup(&id).await.unwrap();
    client.folder_structure().await.unwrap();
    assert_eq!(client.entry_state(&QueryKey::setup(&id)), EntryState::Fresh);

    client.rename_setup(&id, "sprint.json", false).await.unwrap();

    let renamed = id.with_filename("sprint.json");
    assert_eq!(client.entry_state(&QueryKey::setup(&id)), EntryState::Missing);
    assert_eq!(client.entry_state(&QueryKey::setup(&renamed)), EntryState::Missing);
    assert_eq!(
        client.entry_state(&QueryKey::folder_structure()),
        EntryState::Stale
    );

    let file = client.setup(&renamed).await.unwrap();
    assert_eq!(file.car_name, "bmw_m4_gt3");
    assert!(client.setup(&id).await.is_err());
    assert_eq!(gateway.count("get_setup"), 3);

    // The failed read is logged, not notified.
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].title, "Setup renamed successfully");
}

#[tokio::test]
async fn save_invalidates_setup_and_folder_structure() {
    let (client, gateway, _) = client();
    let id = SetupId::new("bmw_m4_gt3", "monza", "race.json");
    gateway.put_setup(id.clone(), setup_file("bmw_m4_gt3"));

    client.setup(&id).await.unwrap();
    client.folder_structure().await.unwrap();
    client
        .save_setup(&id, &setup_file("bmw_m4_gt3"), true)
        .await
        .unwrap();

    assert_eq!(client.entry_state(&QueryKey::setup(&id)), EntryState::Stale);
    // Stale data stays readable until the refetch replaces it.
    assert!(client.cached_folder_structure().is_some());

    client.folder_structure().await.unwrap();
    client.setup(&id).await.unwrap();
    assert_eq!(gateway.count("get_folder_structure"), 2);
    assert_eq!(gateway.count("get_setup"), 2);
}

#[tokio::test]
async fn set_path_overwrites_entry_and_refresh_overwrites_structure() {
    let (client, gateway, notifier) = client();

    assert_eq!(client.setups_path().await.unwrap(), "/setups");
    client.set_setups_path("/elsewhere", false).await.unwrap();
    assert_eq!(client.setups_path().await.unwrap(), "/elsewhere");
    assert_eq!(gateway.count("get_setups_path"), 1);

    gateway.set_structure(structure(&[
        ("bmw_m4_gt3", "monza", &["race.json", "quali.json"]),
        ("porsche_992_gt3_r", "Spa", &["wet.json"]),
    ]));
    client.refresh_folder_structure(false).await.unwrap();
    assert_eq!(
        client.entry_state(&QueryKey::folder_structure()),
        EntryState::Fresh
    );
    assert_eq!(client.folder_structure().await.unwrap().total_setups, 3);
    assert_eq!(gateway.count("get_folder_structure"), 0);

    let titles: Vec<_> = notifier.notices().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, ["Setups path updated", "Folder structure refreshed"]);
}

#[tokio::test]
async fn silent_mutations_do_not_notify() {
    let (client, gateway, notifier) = client();
    let id = SetupId::new("bmw_m4_gt3", "monza", "race.json");

    client.delete_setup(&id, true).await.unwrap();
    gateway.fail("delete_setup");
    assert!(client.delete_setup(&id, true).await.is_err());
    assert!(notifier.notices().is_empty());

    assert!(client.delete_setup(&id, false).await.is_err());
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(
        notices[0].title,
        "Failed to delete setup: delete_setup exploded"
    );
}

#[tokio::test]
async fn push_event_replaces_structure_without_refetch() {
    let (client, gateway, notifier) = client();
    client.folder_structure().await.unwrap();

    client.apply_setups_changed(structure(&[
        ("bmw_m4_gt3", "monza", &["race.json", "quali.json"]),
        ("porsche_992_gt3_r", "Spa", &["wet.json"]),
    ]));

    assert_eq!(client.folder_structure().await.unwrap().total_setups, 3);
    assert_eq!(gateway.count("get_folder_structure"), 1);

    let notices = notifier.notices();
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].title, "Setups folder updated");
    assert_eq!(
        notices[0].description.as_deref(),
        Some("Found 3 setups across 2 cars")
    );
}

#[tokio::test]
async fn import_invalidates_structure_only_when_something_landed() {
    let (client, _, _) = client();
    client.folder_structure().await.unwrap();

    client
        .import_json_files(&[Utf8PathBuf::from("/drop/readme.txt")])
        .await
        .unwrap();
    assert_eq!(
        client.entry_state(&QueryKey::folder_structure()),
        EntryState::Fresh
    );

    client
        .import_json_files(&[Utf8PathBuf::from("/drop/Monza_R.json")])
        .await
        .unwrap();
    assert_eq!(
        client.entry_state(&QueryKey::folder_structure()),
        EntryState::Stale
    );
}

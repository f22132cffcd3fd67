use buddy_core::model::{Language, ProjectId, UserProfile};
use buddy_core::time::fixed_now;
use chrono::Duration;
use storage::repository::{NewProjectRecord, ProfileRepository, ProjectRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_projects() {
    let repo = connect("memdb_projects_roundtrip").await;

    let id = repo
        .insert_project(NewProjectRecord::new(
            "#include <iostream>\nint main() {}",
            Language::Cpp,
            fixed_now(),
        ))
        .await
        .unwrap();

    let fetched = repo.get_project(id).await.unwrap().expect("project");
    assert_eq!(fetched.id(), id);
    assert_eq!(fetched.language(), Language::Cpp);
    assert_eq!(fetched.saved_at(), fixed_now());
    assert_eq!(fetched.line_count(), 2);

    assert!(repo.get_project(ProjectId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_lists_newest_first_with_limit() {
    let repo = connect("memdb_projects_listing").await;
    let now = fixed_now();

    let mut ids = Vec::new();
    for (offset, language) in [Language::Python, Language::Go, Language::Rust]
        .into_iter()
        .enumerate()
    {
        let minutes = i64::try_from(offset).unwrap();
        let id = repo
            .insert_project(NewProjectRecord::new(
                format!("// snippet {offset}"),
                language,
                now + Duration::minutes(minutes),
            ))
            .await
            .unwrap();
        ids.push(id);
    }

    let listed = repo.list_projects(2).await.unwrap();
    let listed_ids: Vec<ProjectId> = listed.iter().map(|p| p.id()).collect();
    assert_eq!(listed_ids, vec![ids[2], ids[1]]);
    assert_eq!(listed[0].language(), Language::Rust);

    let all: Vec<ProjectId> = repo
        .all_projects()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id())
        .collect();
    assert_eq!(all, vec![ids[2], ids[1], ids[0]]);
}

#[tokio::test]
async fn sqlite_delete_reports_missing_rows() {
    let repo = connect("memdb_projects_delete").await;
    let id = repo
        .insert_project(NewProjectRecord::new("print(1)", Language::Python, fixed_now()))
        .await
        .unwrap();

    repo.delete_project(id).await.unwrap();
    assert!(repo.get_project(id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_project(id).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_profile_is_a_single_overwritable_row() {
    let repo = connect("memdb_profile").await;
    assert!(repo.get_profile().await.unwrap().is_none());

    let first = UserProfile::new("Ada", Some("https://example.com/ada.png".into())).unwrap();
    repo.save_profile(&first).await.unwrap();
    assert_eq!(repo.get_profile().await.unwrap(), Some(first));

    let second = UserProfile::new("Grace", None).unwrap();
    repo.save_profile(&second).await.unwrap();
    let stored = repo.get_profile().await.unwrap().expect("profile");
    assert_eq!(stored.display_name(), "Grace");
    assert_eq!(stored.avatar_url(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

//! Registry behaviour against the in-memory store.
//!
//! Covers collaborator seeding, room listing order, membership enrollment on
//! file writes, compilation outcomes and not-found handling.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use collab_core::error::CoreError;
use collab_core::file::{FileDescriptor, FileUpdate, PasteFile, UpdateFile};
use collab_core::membership::MembershipPolicy;
use collab_core::project::{
    CollaboratorRole, CompilationStatus, CreateProject, ProjectStatus, RoomMember,
};
use collab_db::{MemoryStore, ProjectRegistry, ProjectStore, RegistryError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(name: &str, room_id: &str) -> CreateProject {
    CreateProject {
        name: Some(name.to_string()),
        room_id: Some(room_id.to_string()),
        created_by: Some("ana".to_string()),
        ..Default::default()
    }
}

fn paste(file_name: &str, content: &str, user: &str) -> FileDescriptor {
    let file_type = file_name.rsplit('.').next().unwrap_or("text").to_string();
    FileDescriptor::from_paste(PasteFile {
        file_name: Some(file_name.to_string()),
        file_type: Some(file_type),
        content: Some(content.to_string()),
        uploaded_by: Some(user.to_string()),
        ..Default::default()
    })
    .unwrap()
}

fn count_user(project: &collab_core::project::Project, username: &str) -> usize {
    project
        .collaborators
        .iter()
        .filter(|c| c.username == username)
        .count()
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_seeds_owner_without_duplicates() {
    let registry = ProjectRegistry::in_memory();
    let mut input = new_project("Site", "room-1");
    input.room_members = ["ana", "ben", "ben"]
        .into_iter()
        .map(|u| RoomMember {
            user_id: None,
            username: u.to_string(),
            email: None,
        })
        .collect();

    let project = registry.create_project(input).await.unwrap();

    assert_eq!(count_user(&project, "ana"), 1);
    assert_eq!(count_user(&project, "ben"), 1);
    assert_eq!(project.collaborators[0].role, CollaboratorRole::Owner);

    let stored = registry.get_project(&project.project_id).await.unwrap();
    assert_eq!(stored, project);
}

#[tokio::test]
async fn create_with_missing_fields_stores_nothing() {
    let registry = ProjectRegistry::in_memory();
    let err = registry
        .create_project(CreateProject {
            room_id: Some("room-1".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_matches!(
        err,
        RegistryError::Core(CoreError::Validation(msg)) if msg.contains("name") && msg.contains("createdBy")
    );
    let listed = registry
        .list_projects_for_room("room-1", ProjectStatus::Active)
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn room_listing_filters_and_orders_by_recent_update() {
    let registry = ProjectRegistry::in_memory();
    let first = registry.create_project(new_project("First", "room-1")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = registry.create_project(new_project("Second", "room-1")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let archived = registry.create_project(new_project("Old", "room-1")).await.unwrap();
    registry.create_project(new_project("Elsewhere", "room-2")).await.unwrap();

    registry
        .set_status(&archived.project_id, ProjectStatus::Archived)
        .await
        .unwrap();

    let ids: Vec<String> = registry
        .list_projects_for_room("room-1", ProjectStatus::Active)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.project_id)
        .collect();
    assert_eq!(ids, vec![second.project_id.clone(), first.project_id.clone()]);

    // Touching the older project moves it to the front.
    tokio::time::sleep(Duration::from_millis(5)).await;
    registry
        .add_file(&first.project_id, paste("a.txt", "x", "ana"))
        .await
        .unwrap();
    let ids: Vec<String> = registry
        .list_projects_for_room("room-1", ProjectStatus::Active)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.project_id)
        .collect();
    assert_eq!(ids, vec![first.project_id, second.project_id]);

    let archived_list = registry
        .list_projects_for_room("room-1", ProjectStatus::Archived)
        .await
        .unwrap();
    assert_eq!(archived_list.len(), 1);
    assert_eq!(archived_list[0].status, ProjectStatus::Archived);
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let registry = ProjectRegistry::in_memory();
    assert_matches!(
        registry.get_project_with_files("proj_missing").await,
        Err(RegistryError::Core(CoreError::NotFound { entity: "Project", .. }))
    );
    assert_matches!(
        registry
            .add_file("proj_missing", paste("index.html", "", "ana"))
            .await,
        Err(RegistryError::Core(CoreError::NotFound { .. }))
    );
}

// ---------------------------------------------------------------------------
// Files and membership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn writing_twice_enrolls_writer_once() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();

    registry
        .add_file(&project.project_id, paste("index.html", "<p>1</p>", "ben"))
        .await
        .unwrap();
    registry
        .add_file(&project.project_id, paste("app.js", "go()", "ben"))
        .await
        .unwrap();

    let stored = registry.get_project(&project.project_id).await.unwrap();
    assert_eq!(count_user(&stored, "ben"), 1);
    let ben = stored.collaborator("ben").unwrap();
    assert_eq!(ben.role, CollaboratorRole::Editor);
}

#[tokio::test]
async fn non_member_is_denied_when_auto_enroll_is_off() {
    let registry = ProjectRegistry::new(
        Arc::new(MemoryStore::new()),
        MembershipPolicy { auto_enroll: false },
    );
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();

    let err = registry
        .add_file(&project.project_id, paste("index.html", "", "mallory"))
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Core(CoreError::Forbidden(_)));

    let stored = registry.get_project_with_files(&project.project_id).await.unwrap();
    assert!(stored.files.is_empty());
    assert_eq!(stored.project.collaborators.len(), 1);
}

#[tokio::test]
async fn same_path_adds_a_second_file() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();

    let first = registry
        .add_file(&project.project_id, paste("style.css", "a{}", "ana"))
        .await
        .unwrap();
    let second = registry
        .add_file(&project.project_id, paste("style.css", "bb{}", "ana"))
        .await
        .unwrap();

    assert_ne!(first.file_id, second.file_id);
    let files = registry.list_files(&project.project_id).await.unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.file_id == first.file_id && f.content == "a{}"));
    assert!(files.iter().any(|f| f.file_id == second.file_id && f.content == "bb{}"));

    // Raw lookup serves the newest file at that path.
    let served = registry
        .find_file_by_name(&project.project_id, "style.css")
        .await
        .unwrap();
    assert_eq!(served.file_id, second.file_id);
}

#[tokio::test]
async fn file_write_for_missing_project_writes_nothing() {
    let store = MemoryStore::new();
    let project = collab_core::project::Project::create(
        new_project("Ghost", "room-1"),
        chrono::Utc::now(),
    )
    .unwrap();
    let file = collab_core::file::ProjectFile {
        file_id: "file_ghost".into(),
        project_id: project.project_id.clone(),
        file_name: "index.html".into(),
        file_path: "index.html".into(),
        file_type: collab_core::file_types::FileType::Html,
        content: String::new(),
        uploaded_by: "ana".into(),
        last_modified_by: "ana".into(),
        metadata: collab_core::file::FileMetadata::describe(
            "",
            collab_core::file_types::FileType::Html,
            Default::default(),
        ),
        created_at: project.created_at,
        updated_at: project.updated_at,
    };

    assert!(!store.insert_file(&project, &file).await.unwrap());
    assert!(store.list_files(&project.project_id).await.unwrap().is_empty());

    store.insert_project(&project).await.unwrap();
    let mut touched = project.clone();
    touched.updated_at = chrono::Utc::now();
    assert!(store.insert_file(&touched, &file).await.unwrap());
    assert_eq!(store.list_files(&project.project_id).await.unwrap().len(), 1);
    let stored = store.find_project(&project.project_id).await.unwrap().unwrap();
    assert_eq!(stored.updated_at, touched.updated_at);

    let mut edited = file.clone();
    edited.file_id = "file_other".into();
    assert!(!store.save_file(&touched, &edited).await.unwrap());
}

#[tokio::test]
async fn project_files_are_ordered_by_name() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();
    for name in ["style.css", "app.js", "index.html"] {
        registry
            .add_file(&project.project_id, paste(name, "", "ana"))
            .await
            .unwrap();
    }

    let with_files = registry.get_project_with_files(&project.project_id).await.unwrap();
    let names: Vec<_> = with_files.files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["app.js", "index.html", "style.css"]);
}

#[tokio::test]
async fn update_with_unknown_file_id_leaves_files_unchanged() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();
    registry
        .add_file(&project.project_id, paste("index.html", "<p>keep</p>", "ana"))
        .await
        .unwrap();
    let before = registry.list_files(&project.project_id).await.unwrap();

    let update = FileUpdate::from_request(UpdateFile {
        content: Some("<p>clobber</p>".into()),
        last_modified_by: Some("zed".into()),
    })
    .unwrap();
    let err = registry
        .update_file(&project.project_id, "file_missing", update)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        RegistryError::Core(CoreError::NotFound { entity: "ProjectFile", .. })
    );
    let after = registry.list_files(&project.project_id).await.unwrap();
    assert_eq!(before, after);
    let stored = registry.get_project(&project.project_id).await.unwrap();
    assert!(stored.collaborator("zed").is_none());
}

#[tokio::test]
async fn update_replaces_content_and_modifier() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();
    let file = registry
        .add_file(&project.project_id, paste("app.js", "old()", "ana"))
        .await
        .unwrap();

    let updated = registry
        .update_file(
            &project.project_id,
            &file.file_id,
            FileUpdate {
                content: "new()".into(),
                last_modified_by: "cara".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.content, "new()");
    assert_eq!(updated.last_modified_by, "cara");
    assert_eq!(updated.uploaded_by, "ana");
    assert!(updated.updated_at >= file.updated_at);
    let stored = registry.get_project(&project.project_id).await.unwrap();
    assert!(stored.collaborator("cara").is_some());
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn compile_without_html_reports_failure() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();
    registry
        .add_file(&project.project_id, paste("style.css", "p{}", "ana"))
        .await
        .unwrap();

    let result = registry.compile_project(&project.project_id, "ana").await.unwrap();
    assert!(!result.success);
    assert!(result.error.is_some());

    let stored = registry.get_project(&project.project_id).await.unwrap();
    assert_eq!(stored.compilation.status, CompilationStatus::Error);
    assert_matches!(
        registry.preview_document(&project.project_id).await,
        Err(RegistryError::Core(CoreError::Validation(_)))
    );
}

#[tokio::test]
async fn compile_inlines_sources_and_enables_preview() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Demo", "room-1")).await.unwrap();
    for (name, content) in [
        ("index.html", "<h1>Hi</h1>"),
        ("style.css", "body{color:red}"),
        ("app.js", "console.log(1)"),
    ] {
        registry
            .add_file(&project.project_id, paste(name, content, "ana"))
            .await
            .unwrap();
    }

    let result = registry.compile_project(&project.project_id, "ana").await.unwrap();
    assert!(result.success);
    let output = result.output.clone().unwrap();
    assert!(output.contains("body{color:red}"));
    assert!(output.contains("console.log(1)"));
    assert!(output.contains("<title>Demo</title>"));
    assert_eq!(
        result.preview_url.as_deref(),
        Some(format!("/api/projects/{}/preview", project.project_id).as_str())
    );

    let preview = registry.preview_document(&project.project_id).await.unwrap();
    assert_eq!(preview, output);

    let stored = registry.get_project(&project.project_id).await.unwrap();
    assert_eq!(stored.compilation.compiled_by.as_deref(), Some("ana"));
}

#[tokio::test]
async fn find_file_by_name() {
    let registry = ProjectRegistry::in_memory();
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();
    registry
        .add_file(&project.project_id, paste("app.js", "run()", "ana"))
        .await
        .unwrap();

    let file = registry
        .find_file_by_name(&project.project_id, "app.js")
        .await
        .unwrap();
    assert_eq!(file.content, "run()");
    assert_matches!(
        registry.find_file_by_name(&project.project_id, "nope.js").await,
        Err(RegistryError::Core(CoreError::NotFound { .. }))
    );
}

#[tokio::test]
async fn concurrent_writers_are_each_enrolled_once() {
    let registry = Arc::new(ProjectRegistry::in_memory());
    let project = registry.create_project(new_project("Site", "room-1")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let registry = Arc::clone(&registry);
        let project_id = project.project_id.clone();
        handles.push(tokio::spawn(async move {
            let user = if i % 2 == 0 { "ben" } else { "cara" };
            registry
                .add_file(&project_id, paste(&format!("f{i}.txt"), "x", user))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = registry.get_project_with_files(&project.project_id).await.unwrap();
    assert_eq!(stored.files.len(), 16);
    assert_eq!(count_user(&stored.project, "ben"), 1);
    assert_eq!(count_user(&stored.project, "cara"), 1);
}

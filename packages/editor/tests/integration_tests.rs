//! Integration tests for the editor crate

use pagesmith_editor::{
    get_page_id, DragScope, EditorConfig, EditorError, FileStore, MemoryStore, PageBuilder, PagePayload, PageRecord,
    PageStatus, PageStore, Phase,
};
use std::time::{Duration, Instant};

fn config() -> EditorConfig {
    EditorConfig {
        success_notice: Duration::from_millis(50),
        error_notice: Duration::from_millis(80),
        ..EditorConfig::default()
    }
}

#[tokio::test]
async fn test_page_lifecycle_on_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut builder = PageBuilder::new(FileStore::new(dir.path()), config());

    builder.new_page();
    builder.set_title("Speaker Lineup");
    builder.set_status(PageStatus::Published);
    builder.set_show_in_nav(true);

    let section_id = builder.layout().sections[1].id.clone();
    let row_id = builder.add_row(&section_id)?.created_id.unwrap();
    builder.apply_row_preset(&section_id, &row_id, "2 Columns")?;
    let column_id = builder.layout().sections[1].rows[1].columns[1].id.clone();
    builder.add_module(&section_id, &row_id, &column_id, "speakers")?;

    let id = builder.save().await?;
    assert_eq!(id, get_page_id("speaker-lineup"));
    assert!(dir.path().join(format!("{}.json", id)).exists());

    let saved_layout = builder.layout().clone();

    let mut reopened = PageBuilder::new(FileStore::new(dir.path()), config());
    reopened.load(&id).await?;

    assert_eq!(reopened.phase(), &Phase::Ready);
    assert_eq!(reopened.page().title, "Speaker Lineup");
    assert_eq!(reopened.page().status, PageStatus::Published);
    assert!(reopened.page().show_in_nav);
    assert_eq!(reopened.layout(), &saved_layout);
    assert_eq!(reopened.row_layout_name(&section_id, &row_id), Some("2 Columns"));

    // Ids minted after a reload never collide with stored ones
    let new_section = reopened.add_section()?.created_id.unwrap();
    assert_eq!(
        reopened.layout().ids().iter().filter(|id| **id == new_section).count(),
        1
    );

    reopened.save().await?;
    let pages = reopened.store().list_pages().await?;
    assert_eq!(pages.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_legacy_document_loads_and_saves_in_current_shape() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let now = chrono::Utc::now();
    store
        .insert(PageRecord {
            id: "42".to_string(),
            payload: PagePayload {
                title: "Old page".to_string(),
                slug: "old-page".to_string(),
                layout_json: r#"[
                    {"id": "section-7", "name": "Hero", "type": "header",
                     "styling": {"padding": {"top": 40, "bottom": 40}},
                     "rows": [{"id": "row-8", "columns": [
                        {"id": "col-9", "width": 100, "modules": [
                            {"id": "module-2040", "name": "text", "category": "basic",
                             "defaultProps": {"text": "Hi"}}
                        ]}
                     ]}]}
                ]"#
                .to_string(),
                ..PagePayload::default()
            },
            created_at: now,
            updated_at: now,
        })
        .await;

    let mut builder = PageBuilder::new(store, config());
    builder.load("42").await?;

    let section = &builder.layout().sections[0];
    assert_eq!(section.style.padding.as_deref(), Some("40px 0 40px 0"));

    // Counter resumes above the highest stored suffix
    let created = builder.add_section()?.created_id.unwrap();
    assert_eq!(created, "section-2041");

    builder.save().await?;
    let record = builder.store().get_page("42").await?;
    let document: serde_json::Value = serde_json::from_str(&record.payload.layout_json)?;
    assert!(document["sections"].is_array());
    assert_eq!(document["sections"][0]["styling"]["padding"], "40px 0 40px 0");
    Ok(())
}

#[tokio::test]
async fn test_unreadable_layout_falls_back_to_starter() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let created = store
        .create_page(&PagePayload {
            title: "Broken".to_string(),
            slug: "broken".to_string(),
            layout_json: "{\"sections\": 12}".to_string(),
            ..PagePayload::default()
        })
        .await?;

    let mut builder = PageBuilder::new(store, config());
    builder.load(&created.id).await?;

    assert_eq!(builder.phase(), &Phase::Ready);
    assert_eq!(builder.layout().sections.len(), 2);
    assert_eq!(builder.layout().sections[1].name, "Main Content");
    Ok(())
}

#[tokio::test]
async fn test_save_failure_notice_then_retry() -> anyhow::Result<()> {
    let mut builder = PageBuilder::new(MemoryStore::new(), config());
    builder.new_page();
    builder.set_title("Tickets");

    builder.store().fail_next("network unreachable").await;
    assert!(matches!(builder.save().await, Err(EditorError::Store(_))));
    assert!(builder.phase().notice().unwrap().contains("network unreachable"));

    // Edits stay possible while the error is displayed
    builder.add_section()?;

    builder.tick(Instant::now() + Duration::from_secs(1));
    assert_eq!(builder.phase(), &Phase::Ready);

    builder.save().await?;
    assert!(matches!(builder.phase(), Phase::SaveSucceeded { .. }));
    assert_eq!(builder.store().list_pages().await?[0].payload.slug, "tickets");
    Ok(())
}

#[tokio::test]
async fn test_drag_reorders_modules_in_one_column() -> anyhow::Result<()> {
    let mut builder = PageBuilder::new(MemoryStore::new(), config());
    builder.new_page();

    let section = &builder.layout().sections[1];
    let (s, r, c) = (
        section.id.clone(),
        section.rows[0].id.clone(),
        section.rows[0].columns[0].id.clone(),
    );
    let mut added = Vec::new();
    for key in ["heading", "text", "button", "image"] {
        added.push(builder.add_module(&s, &r, &c, key)?.created_id.unwrap());
    }

    builder.start_drag(
        added[0].clone(),
        DragScope::Modules {
            section_id: s.clone(),
            row_id: r.clone(),
            column_id: c.clone(),
        },
    );
    builder.drop_on(Some(&added[2]))?;

    let names: Vec<&str> = builder.layout().sections[1].rows[0].columns[0]
        .modules
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["text", "button", "heading", "image"]);
    assert!(!builder.drag().is_dragging());
    Ok(())
}

#[tokio::test]
async fn test_library_from_store_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("blocks.json"),
        r#"[{"id": 5, "name": "Sponsor strip", "content_type": "html", "status": "published"},
            {"id": 6, "name": "Unused", "status": "archived"}]"#,
    )?;
    std::fs::write(
        dir.path().join("forms.json"),
        r#"[{"id": "11", "name": "Newsletter", "form_config": {"fields": []}, "status": "published"}]"#,
    )?;

    let mut builder = PageBuilder::new(FileStore::new(dir.path()), config());
    let errors = builder.refresh_library().await;

    assert!(errors.is_empty());
    assert!(builder.catalog().get("block-5").is_some());
    assert!(builder.catalog().get("block-6").is_none());
    assert_eq!(builder.catalog().get("form-11").unwrap().label, "Newsletter");
    Ok(())
}

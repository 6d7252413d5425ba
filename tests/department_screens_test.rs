use dept_admin::utils::validation::Validate;
use dept_admin::{
    AdminConfig, AdminError, CreateDepartmentDraft, DepartmentDetails, DepartmentList,
    DepartmentService, DetailsView, Field, InMemoryDepartmentService, ListView, Operation,
};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_delete_unknown_department_leaves_collection_unchanged() {
    let service = Arc::new(InMemoryDepartmentService::with_default_seed());
    let mut details = DepartmentDetails::new(Arc::clone(&service), "does-not-exist");

    details.request_delete();
    assert!(details.is_confirming_delete());

    let err = assert_err!(details.confirm_delete().await);
    assert!(matches!(err, AdminError::NotFound { .. }));
    assert_eq!(details.delete_error().as_deref(), Some("Department not found"));
    assert!(!details.is_confirming_delete());
    assert_eq!(service.department_count().await, 5);
}

#[tokio::test]
async fn test_delete_removes_department_from_listing() {
    let service = Arc::new(InMemoryDepartmentService::with_default_seed());
    let mut details = DepartmentDetails::new(Arc::clone(&service), "5");
    assert_ok!(details.load().await);

    details.request_delete();
    let notice = assert_ok!(details.confirm_delete().await);
    assert_eq!(notice.message, "Department deleted successfully!");

    let mut list = DepartmentList::new(Arc::clone(&service));
    assert_ok!(list.refresh().await);
    list.set_filter("support");
    assert!(list.rows().is_empty());
    assert_eq!(
        list.empty_message(),
        "No departments found matching your criteria"
    );
}

#[tokio::test]
async fn test_transient_delete_failure_can_be_retried() {
    let service = Arc::new(InMemoryDepartmentService::with_default_seed());
    service.fail_next(
        Operation::DeleteDepartment,
        "Failed to delete department. Please try again.",
    );
    let mut details = DepartmentDetails::new(Arc::clone(&service), "4");

    details.request_delete();
    assert_err!(details.confirm_delete().await);
    assert_eq!(service.department_count().await, 5);

    details.request_delete();
    assert_ok!(details.confirm_delete().await);
    assert_eq!(service.department_count().await, 4);
}

#[tokio::test]
async fn test_update_failure_stays_in_edit_mode() {
    let service = Arc::new(InMemoryDepartmentService::with_default_seed());
    service.fail_next(
        Operation::UpdateDepartment,
        "Failed to update department. Please try again.",
    );
    let mut details = DepartmentDetails::new(Arc::clone(&service), "1");
    assert_ok!(details.load().await);
    assert!(details.begin_edit());
    details.change_field(Field::Description, "Platform and infrastructure");

    assert_err!(details.save().await);
    assert!(details.is_editing());
    assert_eq!(
        details.update_error().as_deref(),
        Some("Failed to update department. Please try again.")
    );

    let notice = assert_ok!(details.save().await);
    assert_eq!(notice.message, "Department updated successfully!");
    match details.view() {
        DetailsView::Ready(department) => {
            assert_eq!(department.description, "Platform and infrastructure");
            assert_eq!(department.roles.len(), 3);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_cancel_edit_discards_form() {
    let service = Arc::new(InMemoryDepartmentService::with_default_seed());
    let mut details = DepartmentDetails::new(Arc::clone(&service), "2");
    assert_ok!(details.load().await);

    details.begin_edit();
    details.change_field(Field::Name, "");
    details.cancel_edit();

    assert!(!details.is_editing());
    assert!(details.errors().name.is_none());
    assert_eq!(service.call_count(Operation::UpdateDepartment), 0);
}

#[tokio::test]
async fn test_listing_loads_seed_departments() {
    let list = DepartmentList::new(InMemoryDepartmentService::with_default_seed());
    assert_eq!(list.view(), ListView::Loading);

    assert_eq!(assert_ok!(list.refresh().await), 5);
    match list.view() {
        ListView::Ready { rows } => {
            let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
            assert_eq!(
                names,
                vec!["Engineering", "Product", "Accounting", "Marketing", "Support"]
            );
            assert_eq!(rows[3].role_count, 0);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_auto_close_applies_to_update_and_delete() {
    let sticky = assert_ok!(AdminConfig::from_toml_str(
        r#"
[notification]
auto_close = false
"#
    ));
    assert_eq!(sticky.auto_close(), None);

    let service = Arc::new(InMemoryDepartmentService::with_default_seed());
    let mut details = DepartmentDetails::new(Arc::clone(&service), "4")
        .with_notification_auto_close(sticky.auto_close());
    assert_ok!(details.load().await);
    details.begin_edit();
    details.change_field(Field::Name, "Growth");
    let notice = assert_ok!(details.save().await);
    assert_eq!(notice.auto_close, None);

    let quick = assert_ok!(AdminConfig::from_toml_str(
        r#"
[notification]
duration_ms = 1500
"#
    ));
    let mut details = DepartmentDetails::new(Arc::clone(&service), "4")
        .with_notification_auto_close(quick.auto_close());
    details.request_delete();
    let notice = assert_ok!(details.confirm_delete().await);
    assert_eq!(notice.auto_close, Some(chrono::Duration::milliseconds(1500)));
}

#[tokio::test]
async fn test_largest_numeric_seed_id_from_config() {
    let config = assert_ok!(AdminConfig::from_toml_str(
        r#"
[catalog]
seed = "empty"

[[catalog.roles]]
id = "R1"
name = "Recruiter"
department = "A"

[[catalog.departments]]
id = "18446744073709551615"
name = "Edge"
description = "Largest numeric id"
roles = ["R1"]
"#
    ));
    assert_ok!(config.validate());

    let service = InMemoryDepartmentService::new(assert_ok!(config.build_catalog()));
    let draft = CreateDepartmentDraft {
        name: "Security".to_string(),
        description: "Keeps us safe".to_string(),
        selected_roles: config.catalog.roles.clone().unwrap_or_default(),
    };
    let envelope = assert_ok!(service.create_department(draft).await);
    assert_eq!(envelope.payload.id, "1");
    assert_eq!(service.department_count().await, 2);
}

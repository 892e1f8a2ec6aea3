//! Handler tests for the project endpoints, backed by memory adapters.

use super::*;
use crate::domain::{ProjectStatus, Role};
use crate::inbound::http::test_utils::TestWorld;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

macro_rules! test_app {
    ($world:expr) => {
        actix_test::init_service(
            App::new()
                .app_data($world.state())
                .wrap($world.session_middleware())
                .service(
                    web::scope("/api/v1")
                        .service(list_projects)
                        .service(create_project)
                        .service(get_project)
                        .service(update_project)
                        .service(delete_project)
                        .service(assign_designer)
                        .service(complete_project)
                        .service(upload_project_file)
                        .service(dashboard),
                ),
        )
        .await
    };
}

/// Send a request and return status plus JSON body (`null` when empty).
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let response = actix_test::call_service(&$app, $req.to_request()).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, body)
    }};
}

struct Cast {
    world: TestWorld,
    client: Cookie<'static>,
    other_client: Cookie<'static>,
    designer: Cookie<'static>,
    designer_id: String,
    manager: Cookie<'static>,
}

async fn cast_with(world: TestWorld) -> Cast {
    world.register("client@studio.io", Role::Client, "Cleo").await;
    world.register("other@studio.io", Role::Client, "Otto").await;
    let designer = world.register("lee@studio.io", Role::Designer, "Lee").await;
    world.register("pm@studio.io", Role::ProjectManager, "Pat").await;
    Cast {
        client: world.login_cookie("client@studio.io").await,
        other_client: world.login_cookie("other@studio.io").await,
        designer: world.login_cookie("lee@studio.io").await,
        designer_id: designer.id().to_string(),
        manager: world.login_cookie("pm@studio.io").await,
        world,
    }
}

async fn cast() -> Cast {
    cast_with(TestWorld::new()).await
}

fn create(cookie: &Cookie<'static>, title: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/projects")
        .cookie(cookie.clone())
        .set_json(json!({ "title": title, "description": "Logo and palette" }))
}

fn get(cookie: &Cookie<'static>, uri: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::get().uri(uri).cookie(cookie.clone())
}

fn titles(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .filter_map(|project| project["title"].as_str())
        .collect()
}

#[actix_web::test]
async fn anonymous_listing_is_unauthorised() {
    let world = TestWorld::new();
    let app = test_app!(world);

    let (status, body) = send!(app, actix_test::TestRequest::get().uri("/api/v1/projects"));

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn clients_create_pending_projects_they_own() {
    let cast = cast().await;
    let app = test_app!(cast.world);

    let (status, body) = send!(app, create(&cast.client, "  Brand refresh "));

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Brand refresh");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["designerId"], Value::Null);
    assert_eq!(body["files"], json!([]));
}

#[actix_web::test]
async fn designers_cannot_create_projects() {
    let cast = cast().await;
    let app = test_app!(cast.world);

    let (status, _) = send!(app, create(&cast.designer, "Side project"));

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[case(json!({"title": "   ", "description": "Logo"}), "title")]
#[case(json!({"title": "Brand", "description": ""}), "description")]
#[actix_web::test]
async fn blank_fields_are_rejected_before_storage(#[case] payload: Value, #[case] field: &str) {
    let cast = cast().await;
    let app = test_app!(cast.world);

    let (status, body) = send!(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/projects")
            .cookie(cast.client.clone())
            .set_json(payload)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);

    let (_, listed) = send!(app, get(&cast.manager, "/api/v1/projects"));
    assert_eq!(listed, json!([]));
}

#[actix_web::test]
async fn listings_follow_ownership_and_assignment() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, mine) = send!(app, create(&cast.client, "Mine"));
    send!(app, create(&cast.other_client, "Theirs"));
    let assign_uri = format!("/api/v1/projects/{}/assignment", mine["id"].as_str().expect("id"));
    let (status, _) = send!(
        app,
        actix_test::TestRequest::post()
            .uri(&assign_uri)
            .cookie(cast.manager.clone())
            .set_json(json!({ "designerId": cast.designer_id }))
    );
    assert_eq!(status, StatusCode::OK);

    let (_, client_view) = send!(app, get(&cast.client, "/api/v1/projects"));
    let (_, designer_view) = send!(app, get(&cast.designer, "/api/v1/projects"));
    let (_, manager_view) = send!(app, get(&cast.manager, "/api/v1/projects"));

    assert_eq!(titles(&client_view), ["Mine"]);
    assert_eq!(titles(&designer_view), ["Mine"]);
    let mut everything = titles(&manager_view);
    everything.sort_unstable();
    assert_eq!(everything, ["Mine", "Theirs"]);
}

#[actix_web::test]
async fn status_moves_forward_through_the_workflow() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));
    let id = created["id"].as_str().expect("id").to_owned();

    let (status, assigned) = send!(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{id}/assignment"))
            .cookie(cast.manager.clone())
            .set_json(json!({ "designerId": cast.designer_id }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["status"], ProjectStatus::InProgress.as_str());
    assert_eq!(assigned["designerId"], cast.designer_id.as_str());

    let (status, completed) = send!(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{id}/completion"))
            .cookie(cast.designer.clone())
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    let (status, body) = send!(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{id}/assignment"))
            .cookie(cast.manager.clone())
            .set_json(json!({ "designerId": cast.designer_id }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn only_designers_can_be_assigned() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));
    let client = cast
        .world
        .register("third@studio.io", Role::Client, "Tess")
        .await;

    let (status, body) = send!(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{}/assignment", created["id"].as_str().expect("id")))
            .cookie(cast.manager.clone())
            .set_json(json!({ "designerId": client.id().to_string() }))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "not_a_designer");
}

#[actix_web::test]
async fn owners_edit_content_and_strangers_see_nothing() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));
    let uri = format!("/api/v1/projects/{}", created["id"].as_str().expect("id"));

    let (status, updated) = send!(
        app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .cookie(cast.client.clone())
            .set_json(json!({ "title": "Brand refresh v2" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Brand refresh v2");
    assert_eq!(updated["description"], created["description"]);
    assert_eq!(updated["status"], "pending");

    let (status, _) = send!(
        app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .cookie(cast.other_client.clone())
            .set_json(json!({ "title": "Hijacked" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn empty_patches_are_rejected() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));

    let (status, body) = send!(
        app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/projects/{}", created["id"].as_str().expect("id")))
            .cookie(cast.client.clone())
            .set_json(json!({}))
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "empty_patch");
}

#[actix_web::test]
async fn only_managers_delete_and_deleted_projects_disappear() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));
    let uri = format!("/api/v1/projects/{}", created["id"].as_str().expect("id"));

    let (status, _) = send!(
        app,
        actix_test::TestRequest::delete().uri(&uri).cookie(cast.client.clone())
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        app,
        actix_test::TestRequest::delete().uri(&uri).cookie(cast.manager.clone())
    );
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send!(app, get(&cast.manager, &uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = send!(app, get(&cast.manager, "/api/v1/projects"));
    assert_eq!(listed, json!([]));
}

#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let cast = cast().await;
    let app = test_app!(cast.world);

    let (status, body) = send!(app, get(&cast.manager, "/api/v1/projects/not-a-uuid"));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

fn upload(cookie: &Cookie<'static>, id: &str, name: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri(&format!("/api/v1/projects/{id}/files/{name}"))
        .cookie(cookie.clone())
        .insert_header((CONTENT_TYPE, "application/pdf"))
        .set_payload(b"%PDF-1.7 brief".to_vec())
}

#[actix_web::test]
async fn uploads_append_storage_urls() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));
    let id = created["id"].as_str().expect("id");

    let (status, body) = send!(app, upload(&cast.client, id, "brief.pdf"));

    assert_eq!(status, StatusCode::OK);
    let files = body["files"].as_array().expect("files");
    assert_eq!(files.len(), 1);
    let url = files[0].as_str().expect("url");
    assert!(url.starts_with("memory://projects/"), "unexpected url {url}");
    assert!(url.ends_with(".pdf"));
}

#[actix_web::test]
async fn missing_bucket_falls_back_to_the_file_store() {
    let cast = cast_with(TestWorld::without_bucket()).await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));

    let (status, body) = send!(
        app,
        upload(&cast.client, created["id"].as_str().expect("id"), "brief.pdf")
    );

    assert_eq!(status, StatusCode::OK);
    let url = body["files"][0].as_str().expect("url");
    assert!(url.starts_with("/api/files/"), "unexpected url {url}");
}

#[rstest]
#[case("payload.exe", StatusCode::BAD_REQUEST)]
#[case("brief", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn unsupported_files_are_rejected(#[case] name: &str, #[case] expected: StatusCode) {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));

    let (status, body) = send!(
        app,
        upload(&cast.client, created["id"].as_str().expect("id"), name)
    );

    assert_eq!(status, expected);
    assert_eq!(body["details"]["code"], "unsupported_extension");
}

#[actix_web::test]
async fn designers_cannot_upload_to_assigned_projects() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    let (_, created) = send!(app, create(&cast.client, "Brand refresh"));
    let id = created["id"].as_str().expect("id");
    send!(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{id}/assignment"))
            .cookie(cast.manager.clone())
            .set_json(json!({ "designerId": cast.designer_id }))
    );

    let (status, _) = send!(app, upload(&cast.designer, id, "brief.pdf"));

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn dashboard_counts_projects_by_status() {
    let cast = cast().await;
    let app = test_app!(cast.world);
    send!(app, create(&cast.client, "First"));
    let (_, second) = send!(app, create(&cast.client, "Second"));
    send!(
        app,
        actix_test::TestRequest::post()
            .uri(&format!(
                "/api/v1/projects/{}/assignment",
                second["id"].as_str().expect("id")
            ))
            .cookie(cast.manager.clone())
            .set_json(json!({ "designerId": cast.designer_id }))
    );

    let (status, body) = send!(app, get(&cast.client, "/api/v1/dashboard"));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "client@studio.io");
    assert_eq!(
        body["summary"],
        json!({ "pending": 1, "inProgress": 1, "completed": 0, "total": 2 })
    );
    assert_eq!(body["recentProjects"].as_array().map(Vec::len), Some(2));
}

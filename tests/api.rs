use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use scheduler_pro::{
    app::build_app,
    llm::{StaticReply, TextGenerator},
    state::AppState,
    store::memory::MemoryStore,
};

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_empty(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

const BOUNDARY: &str = "scheduler-test-boundary";

fn multipart_request(uri: &str, token: &str, files: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, mime, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn app_with(ai: Arc<dyn TextGenerator>) -> Router {
    build_app(AppState::fake_with(ai))
}

fn app() -> Router {
    build_app(AppState::fake())
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/api/users/register",
            None,
            json!({"name": "Ann", "email": email, "password": "hunter22"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/users/login",
            None,
            json!({"email": email, "password": "hunter22"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_course(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/courses", Some(token), json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_task(app: &Router, token: &str, course: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/courses/{course}/tasks"),
            Some(token),
            body,
        ),
    )
    .await
}

async fn upload_notes(app: &Router, token: &str, course: &str) {
    let (status, _) = send(
        app,
        multipart_request(
            &format!("/api/documents/upload/{course}"),
            token,
            &[("week1.txt", "text/plain", "Homework 1 is due October 1st.")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn titles(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(
        &app(),
        Request::builder().uri("/api/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn register_returns_public_user_and_rejects_duplicates() {
    let app = app();
    let req = || {
        json_request(
            Method::POST,
            "/api/users/register",
            None,
            json!({"name": " Ann ", "email": "ann@example.com", "password": "pw", "university": "NTU"}),
        )
    };
    let (status, body) = send(&app, req()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["university"], "NTU");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());

    let (status, _) = send(&app, req()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_requires_all_fields() {
    let (status, body) = send(
        &app(),
        json_request(
            Method::POST,
            "/api/users/register",
            None,
            json!({"name": "Ann", "email": "ann@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app();
    register_and_login(&app, "ann@example.com").await;

    let (s1, b1) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users/login",
            None,
            json!({"email": "nobody@example.com", "password": "hunter22"}),
        ),
    )
    .await;
    let (s2, b2) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users/login",
            None,
            json!({"email": "ann@example.com", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = app();
    let (status, body) = send(
        &app,
        Request::builder().uri("/api/courses").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    let (status, body) = send(&app, get("/api/users/me", "not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn profile_can_be_read_and_patched() {
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;

    let (status, body) = send(&app, get("/api/users/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ann@example.com");

    let (status, body) = send(
        &app,
        json_request(
            Method::PATCH,
            "/api/users/me",
            Some(&token),
            json!({"department": "CS", "avatarUrl": "https://example.com/a.png"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["department"], "CS");
    assert_eq!(body["avatarUrl"], "https://example.com/a.png");

    let (status, _) = send(
        &app,
        json_request(Method::PATCH, "/api/users/me", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn courses_are_private_to_their_owner() {
    let app = app();
    let ann = register_and_login(&app, "ann@example.com").await;
    let bob = register_and_login(&app, "bob@example.com").await;
    let course = create_course(&app, &ann, "Algorithms").await;

    let (_, body) = send(&app, get("/api/courses", &bob)).await;
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, get(&format!("/api/courses/{course}/tasks"), &bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = create_task(&app, &bob, &course, json!({"title": "sneaky"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/courses", Some(&ann), json!({"name": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn title_only_task_gets_defaults_and_missing_title_is_rejected() {
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;

    let (status, task) = create_task(&app, &token, &course, json!({"title": "Read ch. 3"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["deadline"], Value::Null);
    assert_eq!(task["completed"], false);
    assert_eq!(task["actualTime"], 0);
    assert_eq!(task["taskType"], "other");
    assert_eq!(task["courseId"], course.as_str());

    let (status, _) = create_task(&app, &token, &course, json!({"deadline": "2025-10-01"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn course_tasks_follow_reorder_and_unknown_ids_change_nothing() {
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let (_, task) = create_task(&app, &token, &course, json!({"title": title})).await;
        ids.push(task["id"].as_str().unwrap().to_string());
    }
    let list = format!("/api/courses/{course}/tasks");

    let (_, tasks) = send(&app, get(&list, &token)).await;
    assert_eq!(titles(&tasks), ["a", "b", "c"]);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/tasks/reorder",
            Some(&token),
            json!({"orderedTaskIds": [ids[2], ids[0], ids[1]]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    let (_, tasks) = send(&app, get(&list, &token)).await;
    assert_eq!(titles(&tasks), ["c", "a", "b"]);

    let unknown = uuid::Uuid::new_v4().to_string();
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/tasks/reorder",
            Some(&token),
            json!({"orderedTaskIds": [ids[0], unknown]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, tasks) = send(&app, get(&list, &token)).await;
    assert_eq!(titles(&tasks), ["c", "a", "b"]);

    for bad in [json!({"orderedTaskIds": []}), json!({"orderedTaskIds": [ids[0], ids[0]]}), json!({})] {
        let (status, _) = send(
            &app,
            json_request(Method::POST, "/api/tasks/reorder", Some(&token), bad),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn reorder_failing_midway_keeps_the_previous_order() {
    let store = Arc::new(MemoryStore::failing_batch_write_at(1));
    let app = build_app(AppState::fake_with_repo(store, Arc::new(StaticReply::ok("[]"))));
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let (_, task) = create_task(&app, &token, &course, json!({"title": title})).await;
        ids.push(task["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/tasks/reorder",
            Some(&token),
            json!({"orderedTaskIds": [ids[2], ids[1], ids[0]]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");

    let (_, tasks) = send(&app, get(&format!("/api/courses/{course}/tasks"), &token)).await;
    assert_eq!(titles(&tasks), ["a", "b", "c"]);
    let indexes: Vec<_> = tasks.as_array().unwrap().iter().map(|t| t["orderIndex"].clone()).collect();
    assert_eq!(indexes, [json!(0), json!(1), json!(2)]);
}

#[tokio::test]
async fn analyze_insert_failing_midway_stores_no_tasks() {
    let store = Arc::new(MemoryStore::failing_batch_write_at(1));
    let ai = Arc::new(StaticReply::ok(
        "[{\"title\":\"HW1\",\"deadline\":\"2025-10-01\"},{\"title\":\"HW2\",\"deadline\":\"2025-10-08\"}]",
    ));
    let app = build_app(AppState::fake_with_repo(store, ai));
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    create_task(&app, &token, &course, json!({"title": "existing"})).await;
    upload_notes(&app, &token, &course).await;

    let (status, _) = send(&app, post_empty(&format!("/api/analyze/course/{course}"), &token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, tasks) = send(&app, get(&format!("/api/courses/{course}/tasks"), &token)).await;
    assert_eq!(titles(&tasks), ["existing"]);
}

#[tokio::test]
async fn task_list_filters_by_inclusive_deadline_range() {
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    for (title, deadline) in [("late", Some("2025-11-02")), ("early", Some("2025-10-01")), ("open", None), ("end", Some("2025-10-31"))] {
        let mut body = json!({"title": title});
        if let Some(d) = deadline {
            body["deadline"] = json!(d);
        }
        create_task(&app, &token, &course, body).await;
    }

    let (_, all) = send(&app, get("/api/tasks", &token)).await;
    assert_eq!(titles(&all), ["early", "end", "late", "open"]);

    let (_, october) = send(&app, get("/api/tasks?start=2025-10-01&end=2025-10-31", &token)).await;
    assert_eq!(titles(&october), ["early", "end"]);

    let (status, _) = send(&app, get("/api/tasks?start=yesterday", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_delete_and_home_summary() {
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;
    let other = register_and_login(&app, "bob@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    let (_, task) = create_task(&app, &token, &course, json!({"title": "HW1"})).await;
    let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, _) = send(&app, json_request(Method::PATCH, &uri, Some(&token), json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, json_request(Method::PATCH, &uri, Some(&token), json!({"actualTime": -3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, json_request(Method::PATCH, &uri, Some(&other), json!({"completed": true}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &uri, Some(&token), json!({"completed": true, "actualTime": 90})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);
    assert_eq!(body["actualTime"], 90);

    let (status, summary) = send(&app, get("/api/home/summary", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["courseCount"], 1);
    assert_eq!(summary["tasksDueTodayCount"], 0);
    assert_eq!(summary["totalStudyTime"], 90);

    let delete = |uri: String, token: String| {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&app, delete(uri.clone(), token.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, tasks) = send(&app, get(&format!("/api/courses/{course}/tasks"), &token)).await;
    assert_eq!(tasks, json!([]));

    let missing = format!("/api/tasks/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, delete(missing, token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn patch_keeps_usable_fields_when_another_is_mistyped() {
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    let (_, task) = create_task(&app, &token, &course, json!({"title": "HW1"})).await;
    let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &uri, Some(&token), json!({"completed": 1, "actualTime": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], false);
    assert_eq!(body["actualTime"], 30);

    let (status, body) = send(&app, json_request(Method::PATCH, &uri, Some(&token), json!({"actualTime": 12.5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actualTime"], 13);

    let (status, _) = send(&app, json_request(Method::PATCH, &uri, Some(&token), json!({"completed": "done"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploads_store_text_documents_and_reject_bad_files() {
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    let upload = format!("/api/documents/upload/{course}");

    let (status, body) = send(
        &app,
        multipart_request(
            &upload,
            &token,
            &[
                ("syllabus.md", "text/markdown", "# Week 1\nQuiz on 2025-10-08"),
                ("notes.txt", "text/plain", "Graphs"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["fileName"], "syllabus.md");
    assert!(body[0].get("textContent").is_none());

    let (status, _) = send(
        &app,
        multipart_request(&upload, &token, &[("photo.png", "image/png", "\u{89}PNG")]),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    // One unreadable file aborts the whole request.
    let (status, _) = send(
        &app,
        multipart_request(
            &upload,
            &token,
            &[
                ("good.txt", "text/plain", "fine"),
                ("blank.txt", "text/plain", "   "),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, docs) = send(&app, get(&format!("/api/documents/course/{course}"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(docs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn upload_respects_file_count_limit() {
    // The fake config allows 3 files per request.
    let app = app();
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    let file = ("n.txt", "text/plain", "text");
    let (status, _) = send(
        &app,
        multipart_request(
            &format!("/api/documents/upload/{course}"),
            &token,
            &[file, file, file, file],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_without_documents_is_not_found() {
    let ai = Arc::new(StaticReply::ok("[]"));
    let app = app_with(ai.clone());
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;

    let (status, _) = send(&app, post_empty(&format!("/api/analyze/course/{course}"), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(ai.prompts().is_empty());
}

#[tokio::test]
async fn analyze_creates_tasks_from_the_reply() {
    let ai = Arc::new(StaticReply::ok(
        "```json\n[{\"title\":\"HW1\",\"deadline\":\"2025-10-01\",\"estimatedTime\":180},{\"title\":\"No date\"}]\n```",
    ));
    let app = app_with(ai.clone());
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    upload_notes(&app, &token, &course).await;

    let (status, body) = send(&app, post_empty(&format!("/api/analyze/course/{course}"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 1);
    assert_eq!(body["skipped"], 1);
    assert!(body["message"].is_string());

    let prompts = ai.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Homework 1 is due October 1st."));

    let (_, tasks) = send(&app, get(&format!("/api/courses/{course}/tasks"), &token)).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["title"], "HW1");
    assert_eq!(tasks[0]["deadline"], "2025-10-01");
    assert_eq!(tasks[0]["estimatedTime"], 180);
    assert_eq!(tasks[0]["taskType"], "other");
    assert_eq!(tasks[0]["completed"], false);
}

#[tokio::test]
async fn prose_reply_is_a_generic_500_and_stores_nothing() {
    let app = app_with(Arc::new(StaticReply::ok("I found two homework assignments.")));
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    upload_notes(&app, &token, &course).await;

    let (status, body) = send(&app, post_empty(&format!("/api/analyze/course/{course}"), &token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "AI analysis failed, please try again later.");

    let (_, tasks) = send(&app, get(&format!("/api/courses/{course}/tasks"), &token)).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn upstream_failure_is_a_generic_500() {
    let app = app_with(Arc::new(StaticReply::failing("429 quota exceeded for key abc")));
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    upload_notes(&app, &token, &course).await;

    let (status, body) = send(
        &app,
        post_empty(&format!("/api/analyze/course/{course}/summarize"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Summary generation failed, please try again later.");
}

#[tokio::test]
async fn summary_is_returned_verbatim() {
    let app = app_with(Arc::new(StaticReply::ok("  Graphs, trees and heaps.\n")));
    let token = register_and_login(&app, "ann@example.com").await;
    let course = create_course(&app, &token, "Algorithms").await;
    upload_notes(&app, &token, &course).await;

    let (status, body) = send(
        &app,
        post_empty(&format!("/api/analyze/course/{course}/summarize"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Graphs, trees and heaps.");
}

#[tokio::test]
async fn quiz_is_validated_before_it_is_returned() {
    let option = |text: &str, ok: bool| json!({"text": text, "isCorrect": ok, "rationale": "r"});
    let good = json!({
        "title": "Week 1",
        "questions": [{"question": "2+2?", "hint": "add", "answerOptions": [option("4", true), option("5", false)]}]
    });
    let bad = json!({
        "title": "Week 1",
        "questions": [{"question": "2+2?", "hint": "add", "answerOptions": [option("4", true), option("four", true)]}]
    });

    for (reply, expected) in [(good, StatusCode::OK), (bad, StatusCode::INTERNAL_SERVER_ERROR)] {
        let app = app_with(Arc::new(StaticReply::ok(reply.to_string())));
        let token = register_and_login(&app, "ann@example.com").await;
        let course = create_course(&app, &token, "Algorithms").await;
        upload_notes(&app, &token, &course).await;

        let (status, body) = send(
            &app,
            post_empty(&format!("/api/analyze/course/{course}/quiz"), &token),
        )
        .await;
        assert_eq!(status, expected);
        if status == StatusCode::OK {
            assert_eq!(body["questions"][0]["answerOptions"][0]["isCorrect"], true);
        } else {
            assert_eq!(body["message"], "Quiz generation failed, please try again later.");
        }
    }
}

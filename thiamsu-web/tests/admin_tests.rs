//! Integration tests for the staff-only `/admin` endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use thiamsu_common::config::SiteConfig;
use thiamsu_common::db::init_memory_database;
use thiamsu_common::db::models::{Lang, NewUser, SongFields, User};
use thiamsu_common::db::songs::{create_song, find_song_by_id};
use thiamsu_common::db::translations::insert_translation;
use thiamsu_common::db::users::create_user;
use thiamsu_common::time::now;
use tower::util::ServiceExt;
use thiamsu_web::{build_router, AppState};

struct TestApp {
    db: SqlitePool,
    app: Router,
    staff: User,
    member: User,
}

async fn setup() -> TestApp {
    let db = init_memory_database().await.unwrap();
    let staff = create_user(
        &db,
        &NewUser {
            username: "editor".to_string(),
            full_name: "Editor".to_string(),
            avatar_url: None,
            is_staff: true,
        },
    )
    .await
    .unwrap();
    let member = create_user(
        &db,
        &NewUser {
            username: "member".to_string(),
            full_name: "Member".to_string(),
            avatar_url: None,
            is_staff: false,
        },
    )
    .await
    .unwrap();
    let app = build_router(AppState::new(db.clone(), SiteConfig::default()));
    TestApp {
        db,
        app,
        staff,
        member,
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request(method, uri, Some(&self.staff.api_token), body))
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

#[tokio::test]
async fn test_admin_requires_staff() {
    let t = setup().await;

    for token in [None, Some("not-a-token"), Some(t.member.api_token.as_str())] {
        let response = t
            .app
            .clone()
            .oneshot(request("GET", "/admin/songs", token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    let (status, _) = t.send("GET", "/admin/songs", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_list_songs() {
    let t = setup().await;

    let (status, song) = t
        .send(
            "POST",
            "/admin/songs",
            Some(json!({
                "original_title": "望春風",
                "performer": "純純",
                "original_lyrics": "獨夜無伴守燈下\n清風對面吹"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(song["readonly"], false);

    let (status, body) = t
        .send("POST", "/admin/songs", Some(json!({"original_title": " "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fields"][0]["field"], "original_title");

    let (_, body) = t.send("GET", "/admin/songs?q=%E7%B4%94", None).await;
    assert_eq!(body["songs"].as_array().unwrap().len(), 1);
    assert_eq!(body["songs"][0]["performer"], "純純");
    assert!(body["songs"][0]["created_at"].is_string());

    let (_, body) = t.send("GET", "/admin/songs?q=nothing", None).await;
    assert!(body["songs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_song_editor_fields_and_line_update() {
    let t = setup().await;
    let song = create_song(
        &t.db,
        &SongFields {
            original_title: "t".to_string(),
            original_lyrics: "first\n\nthird".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let uri = format!("/admin/songs/{}", song.id);

    let (status, body) = t.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let fields = body["lyric_fields"].as_array().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0]["name"], "original_lyrics_line_0001");
    assert_eq!(fields[1]["disabled"], true);
    assert_eq!(fields[2]["required"], true);

    let (status, body) = t
        .send(
            "PUT",
            &uri,
            Some(json!({
                "original_title": "renamed",
                "performer": "p",
                "lyric_lines": {"original_lyrics_line_0003": "THIRD"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original_title"], "renamed");
    assert_eq!(body["original_lyrics"], "first\n\nTHIRD");

    let (status, body) = t
        .send(
            "PUT",
            &uri,
            Some(json!({
                "original_title": "renamed",
                "lyric_lines": {"original_lyrics_line_0001": ""}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let field = &body["error"]["fields"][0]["field"];
    assert_eq!(field, "original_lyrics_line_0001");
    let stored = find_song_by_id(&t.db, song.id).await.unwrap().unwrap();
    assert_eq!(stored.original_lyrics, "first\n\nTHIRD");

    let (status, _) = t.send("GET", "/admin/songs/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_words_lifecycle() {
    let t = setup().await;
    let song = create_song(
        &t.db,
        &SongFields {
            original_title: "t".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let uri = format!("/admin/songs/{}/new-words", song.id);

    let word = json!({"content": "月娘", "description": "moon"});
    let (status, word) = t.send("POST", &uri, Some(word)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, words) = t.send("GET", &uri, None).await;
    assert_eq!(words[0]["content"], "月娘");

    let delete_uri = format!("/admin/new-words/{}", word["id"]);
    let (status, _) = t.send("DELETE", &delete_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = t.send("DELETE", &delete_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let orphan = json!({"content": "x"});
    let (status, _) = t
        .send("POST", "/admin/songs/999/new-words", Some(orphan))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mappings_upsert_search_delete() {
    let t = setup().await;

    for (hanzi, hanlo) in [("月娘", "gue̍h-niû"), ("月娘", "gue̍h-niû--"), ("光", "kng")] {
        let mapping = json!({"hanzi": hanzi, "hanlo": hanlo});
        t.send("POST", "/admin/mappings", Some(mapping)).await;
    }

    let (_, all) = t.send("GET", "/admin/mappings", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, found) = t.send("GET", "/admin/mappings?q=%E6%9C%88", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["hanlo"], "gue̍h-niû--");

    let blank = json!({"hanzi": "", "hanlo": ""});
    let (status, _) = t.send("POST", "/admin/mappings", Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t.send("DELETE", "/admin/mappings/%E5%85%89", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, all) = t.send("GET", "/admin/mappings", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_headlines_and_privacy_policy() {
    let t = setup().await;
    let song = create_song(
        &t.db,
        &SongFields {
            original_title: "t".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let (status, _) = t
        .send(
            "POST",
            "/admin/headlines",
            Some(json!({
                "song_id": song.id,
                "start_time": "2018-01-01T00:00:00Z",
                "end_time": "2018-02-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = t
        .send(
            "POST",
            "/admin/headlines",
            Some(json!({
                "song_id": song.id,
                "start_time": "2018-02-01T00:00:00Z",
                "end_time": "2018-01-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, headlines) = t.send("GET", "/admin/headlines", None).await;
    assert_eq!(headlines.as_array().unwrap().len(), 1);

    let policy = json!({"content": "<p>v2</p>"});
    let (status, _) = t.send("PUT", "/admin/privacy-policy", Some(policy)).await;
    assert_eq!(status, StatusCode::OK);
    let response = t
        .app
        .clone()
        .oneshot(request("GET", "/privacy", None, None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["content"], "<p>v2</p>");
}

#[tokio::test]
async fn test_translation_listing_filters() {
    let t = setup().await;
    let song = create_song(
        &t.db,
        &SongFields {
            original_title: "望春風".to_string(),
            original_lyrics: "line1\nline2".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    insert_translation(&t.db, song.id, 1, Lang::Hanzi, "B", None, now())
        .await
        .unwrap();
    let member = Some(t.member.id);
    insert_translation(&t.db, song.id, 0, Lang::Tailo, "a", member, now())
        .await
        .unwrap();

    let (_, body) = t.send("GET", "/admin/translations", None).await;
    assert_eq!(body["translations"].as_array().unwrap().len(), 2);
    assert_eq!(body["translations"][0]["content"], "a");
    assert_eq!(body["translations"][0]["original_lyric"], "line1");
    assert_eq!(body["translations"][0]["song_title"], "望春風");

    let (_, body) = t.send("GET", "/admin/translations?lang=hanzi", None).await;
    assert_eq!(body["translations"].as_array().unwrap().len(), 1);
    assert_eq!(body["translations"][0]["original_lyric"], "line2");

    let (_, body) = t.send("GET", "/admin/translations?q=nothing", None).await;
    assert!(body["translations"].as_array().unwrap().is_empty());

    let (status, _) = t.send("GET", "/admin/translations?lang=hanlo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

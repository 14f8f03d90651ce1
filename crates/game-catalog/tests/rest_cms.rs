//! `RestCms` against a mocked CMS REST API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use game_catalog::{
    CatalogError, CmsStore, EntityKind, GameInfo, ImageField, ImageUpload, NewGame, NewRelation,
    RestCms, RestCmsConfig,
};

fn cms(server: &MockServer, token: Option<&str>) -> RestCms {
    RestCms::new(&RestCmsConfig {
        base_url: server.uri(),
        token: token.map(str::to_string),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_find_by_name_filters_by_exact_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/publishers"))
        .and(query_param("name", "Devolver Digital"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "name": "Devolver Digital", "slug": "devolver-digital", "created_at": "x" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/publishers"))
        .and(query_param("name", "Nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let cms = cms(&server, None);
    let found = cms
        .find_by_name(EntityKind::Publisher, "Devolver Digital")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, 7);
    assert_eq!(found.slug.as_deref(), Some("devolver-digital"));

    assert!(cms
        .find_by_name(EntityKind::Publisher, "Nobody")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_create_relation_posts_name_and_slug_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/categories"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_json(json!({ "name": "Role-playing", "slug": "role-playing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "name": "Role-playing", "slug": "role-playing"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = cms(&server, Some("s3cret"))
        .create_relation(
            EntityKind::Category,
            &NewRelation {
                name: "Role-playing".to_string(),
                slug: "role-playing".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.id, 3);
}

#[tokio::test]
async fn test_create_game_flattens_scraped_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/games"))
        .and(body_json(json!({
            "name": "Hades",
            "slug": "hades",
            "price": 24.5,
            "release_date": "2020-09-17T00:00:00.000Z",
            "categories": [1, 2],
            "platforms": [3],
            "developers": [4],
            "publisher": 5,
            "rating": "PEGI12",
            "short_description": "Defy the god of the dead.",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 99, "name": "Hades", "slug": "hades"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let game = NewGame {
        name: "Hades".to_string(),
        slug: "hades".to_string(),
        price: Some(24.5),
        release_date: Some("2020-09-17T00:00:00.000Z".to_string()),
        categories: vec![1, 2],
        platforms: vec![3],
        developers: vec![4],
        publisher: Some(5),
        info: Some(GameInfo {
            rating: "PEGI12".to_string(),
            short_description: Some("Defy the god of the dead.".to_string()),
            description: None,
        }),
    };
    let entry = cms(&server, None).create_game(&game).await.unwrap();
    assert_eq!(entry.id, 99);
}

#[tokio::test]
async fn test_upload_sends_multipart_reference_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"refId\"\r\n\r\n99"))
        .and(body_string_contains("name=\"ref\"\r\n\r\ngame"))
        .and(body_string_contains("name=\"field\"\r\n\r\ngallery"))
        .and(body_string_contains("filename=\"hades-0.jpg\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .expect(1)
        .mount(&server)
        .await;

    cms(&server, None)
        .upload_image(ImageUpload {
            ref_id: 99,
            kind: EntityKind::Game,
            field: ImageField::Gallery,
            filename: "hades-0.jpg".to_string(),
            bytes: b"jpeg".to_vec(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rejected_write_keeps_error_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/developers"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "error": "Bad Request",
            "data": { "errors": { "slug": ["slug must be unique"] } }
        })))
        .mount(&server)
        .await;

    let err = cms(&server, None)
        .create_relation(
            EntityKind::Developer,
            &NewRelation {
                name: "Dup".to_string(),
                slug: "dup".to_string(),
            },
        )
        .await
        .unwrap_err();

    match err {
        CatalogError::Status { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("slug must be unique"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

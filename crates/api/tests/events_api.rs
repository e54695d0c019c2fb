//! HTTP-level integration tests for the `/events` resource: public listing,
//! map, detail by slug, and multipart submission.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{
    body_json, get, multipart_body, post_multipart, user_token, FakeImageStore, FilePart,
    TestServices, BUCKET_URL,
};
use eventboard_core::category::Category;
use eventboard_core::geo::Coordinates;
use eventboard_core::status::EventStatus;
use eventboard_core::submission::{NewEvent, SUCCESS_MESSAGE};
use eventboard_core::types::UserId;
use eventboard_core::upload::MAX_IMAGE_BYTES;
use eventboard_db::repositories::EventRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_event(title: &str, category: Category, day: u32) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: format!("About {title}"),
        starts_at: NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        location: "123 Main St, Asheville".to_string(),
        coordinates: None,
        price: None,
        category,
        image_url: None,
        slug: eventboard_core::slug::generate_slug(title),
        owner_id: UserId::new_v4(),
        status: EventStatus::Pending,
    }
}

async fn insert_approved(pool: &PgPool, input: NewEvent) -> i64 {
    let event = EventRepo::create(pool, &input).await.unwrap();
    EventRepo::update_status(pool, event.id, EventStatus::Pending, EventStatus::Approved)
        .await
        .unwrap()
        .unwrap()
        .id
}

fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("title", "Jazz Night"),
        ("description", "Live jazz downtown"),
        ("date", "2024-06-10"),
        ("time", "19:30"),
        ("location", "123 Main St, Asheville"),
        ("longitude", "-82.55"),
        ("latitude", "35.59"),
        ("price", ""),
        ("category", "music"),
    ]
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_shows_only_approved_events_in_start_order(pool: PgPool) {
    insert_approved(&pool, new_event("Late Show", Category::Film, 20)).await;
    insert_approved(&pool, new_event("Early Market", Category::Markets, 5)).await;
    EventRepo::create(&pool, &new_event("Still Pending", Category::Music, 1))
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/events").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let events = json["data"]["events"].as_array().unwrap();
    let titles: Vec<&str> = events.iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Early Market", "Late Show"]);
    assert!(json["data"]["error"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_cards_are_enriched(pool: PgPool) {
    insert_approved(&pool, new_event("Jazz Night", Category::Music, 10)).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/events").await).await;
    let card = &json["data"]["events"][0];

    assert_eq!(card["date_label"], "Monday, June 10, 2024");
    assert_eq!(card["time_label"], "10:00 AM");
    assert_eq!(card["day_of_week"], "Mon");
    assert_eq!(card["day_of_month"], 10);
    assert_eq!(card["price"], "Free");
    assert_eq!(card["category"], "music");
    assert_eq!(
        card["maps_url"],
        "https://www.google.com/maps/search/?api=1&query=123%20Main%20St%2C%20Asheville"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_filters_by_category_and_search(pool: PgPool) {
    insert_approved(&pool, new_event("Jazz Night", Category::Music, 10)).await;
    insert_approved(&pool, new_event("Blues Night", Category::Music, 11)).await;
    insert_approved(&pool, new_event("Jazz Film", Category::Film, 12)).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/events?category=music&q=JAZZ").await).await;
    let events = json["data"]["events"].as_array().unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Jazz Night");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_lays_out_round_robin_columns(pool: PgPool) {
    let mut ids = Vec::new();
    for day in 1..=5 {
        ids.push(insert_approved(&pool, new_event(&format!("Event {day}"), Category::Music, day)).await);
    }
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/events?width=800").await).await;
    let columns = json["data"]["columns"].as_array().unwrap();

    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0], serde_json::json!([ids[0], ids[2], ids[4]]));
    assert_eq!(columns[1], serde_json::json!([ids[1], ids[3]]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_rejects_unknown_category(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/events?category=bogus").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_fetch_failure_is_reported_in_page(pool: PgPool) {
    sqlx::query("DROP TABLE events").execute(&pool).await.unwrap();
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/events").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["error"],
        "Failed to load events. Please try again later."
    );
    assert!(json["data"]["events"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Map and detail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn map_includes_only_located_approved_events(pool: PgPool) {
    let mut located = new_event("Located", Category::Music, 10);
    located.coordinates = Some(Coordinates::new(-82.55, 35.59));
    insert_approved(&pool, located).await;
    insert_approved(&pool, new_event("Nowhere", Category::Music, 11)).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/events/map").await).await;
    let features = json["data"]["features"].as_array().unwrap();

    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["name"], "Located");
    assert_eq!(
        features[0]["geometry"]["coordinates"],
        serde_json::json!([-82.55, 35.59])
    );
    assert_eq!(json["data"]["view"]["zoom"], 12.0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn by_slug_returns_earliest_approved_match(pool: PgPool) {
    insert_approved(&pool, new_event("Open Mic", Category::Music, 20)).await;
    let first = insert_approved(&pool, new_event("Open Mic", Category::Music, 3)).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/events/by-slug/open-mic").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], first);

    let missing = get(app, "/api/v1/events/by-slug/no-such-event").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_creates_pending_event_with_image(pool: PgPool) {
    let images = Arc::new(FakeImageStore::default());
    let app = common::build_test_app_with(
        pool.clone(),
        TestServices {
            images: Arc::clone(&images),
            ..Default::default()
        },
    );
    let (user_id, token) = user_token();
    let body = multipart_body(
        &valid_fields(),
        Some(FilePart {
            filename: "poster.png",
            content_type: "image/png",
            bytes: b"\x89PNG fake",
        }),
    );

    let response = post_multipart(app, "/api/v1/events", Some(&token), body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["message"], SUCCESS_MESSAGE);
    assert_eq!(data["status"], "pending");
    assert_eq!(data["redirect_to"], "/events");
    assert_eq!(data["redirect_after_ms"], 3000);
    assert_eq!(data["image_upload_failed"], false);
    assert_eq!(data["event"]["slug"], "jazz-night");

    let uploads = images.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    let (key, _, content_type) = &uploads[0];
    assert!(key.ends_with("-jazz-night.png"), "unexpected key {key}");
    assert_eq!(content_type, "image/png");
    assert_eq!(
        data["event"]["image_url"],
        format!("{BUCKET_URL}/{key}")
    );

    let id = data["event"]["id"].as_i64().unwrap();
    let stored = EventRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.owner_id, user_id);
    assert_eq!(stored.status, "pending");
    assert_eq!(stored.price, None);
    assert_eq!(stored.longitude, Some(-82.55));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submitted_event_is_not_publicly_listed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = user_token();

    let response = post_multipart(
        app.clone(),
        "/api/v1/events",
        Some(&token),
        multipart_body(&valid_fields(), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get(app, "/api/v1/events").await).await;
    assert!(json["data"]["events"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_without_token_requires_login(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_multipart(
        app,
        "/api/v1/events",
        None,
        multipart_body(&valid_fields(), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You must be logged in to submit an event");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_reports_field_errors(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = user_token();
    let fields = vec![
        ("title", "  "),
        ("description", "Something"),
        ("date", "10/06/2024"),
        ("location", "Somewhere"),
        ("category", "music"),
    ];

    let response = post_multipart(
        app,
        "/api/v1/events",
        Some(&token),
        multipart_body(&fields, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "date"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_accepts_event_type_alias(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = user_token();
    let mut fields = valid_fields();
    fields.retain(|(name, _)| *name != "category");
    fields.push(("event_type", "kids-family"));

    let response = post_multipart(
        app,
        "/api/v1/events",
        Some(&token),
        multipart_body(&fields, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["event"]["category"], "kids-family");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn oversized_image_is_a_field_error(pool: PgPool) {
    let images = Arc::new(FakeImageStore::default());
    let app = common::build_test_app_with(
        pool,
        TestServices {
            images: Arc::clone(&images),
            ..Default::default()
        },
    );
    let (_, token) = user_token();
    let big = vec![0u8; MAX_IMAGE_BYTES + 1];

    let response = post_multipart(
        app,
        "/api/v1/events",
        Some(&token),
        multipart_body(
            &valid_fields(),
            Some(FilePart {
                filename: "huge.jpg",
                content_type: "image/jpeg",
                bytes: &big,
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"][0]["field"], "image");
    assert!(images.uploads.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_upload_still_saves_event(pool: PgPool) {
    let app = common::build_test_app_with(
        pool,
        TestServices {
            images: Arc::new(FakeImageStore {
                fail: true,
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    let (_, token) = user_token();

    let response = post_multipart(
        app,
        "/api/v1/events",
        Some(&token),
        multipart_body(
            &valid_fields(),
            Some(FilePart {
                filename: "poster.jpg",
                content_type: "image/jpeg",
                bytes: b"jpeg",
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["image_upload_failed"], true);
    assert!(json["data"]["event"]["image_url"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn lone_coordinate_is_a_field_error(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = user_token();
    let mut fields = valid_fields();
    fields.retain(|(name, _)| *name != "latitude");

    let response = post_multipart(
        app,
        "/api/v1/events",
        Some(&token),
        multipart_body(&fields, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"][0]["field"], "coordinates");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn database_rejection_message_is_shown_verbatim(pool: PgPool) {
    sqlx::query(
        "CREATE FUNCTION reject_event() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'Event quota exceeded'; END; \
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_event BEFORE INSERT ON events \
         FOR EACH ROW EXECUTE FUNCTION reject_event()",
    )
    .execute(&pool)
    .await
    .unwrap();
    let app = common::build_test_app(pool);
    let (_, token) = user_token();

    let response = post_multipart(
        app,
        "/api/v1/events",
        Some(&token),
        multipart_body(&valid_fields(), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PERSISTENCE_ERROR");
    assert_eq!(json["error"], "Event quota exceeded");
}

// tests/admin_tests.rs

use std::str::FromStr;

use quizmaster::{config::Config, routes, state::AppState, utils::hash::hash_password};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin-password";

/// Same harness as tests/api_tests.rs: fresh in-memory database, seeded
/// admin, app served on a random port.
async fn spawn_app() -> (String, SqlitePool) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid connection string")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let hashed = hash_password(ADMIN_PASSWORD).expect("Failed to hash admin password");
    sqlx::query(
        "INSERT INTO users (username, password, full_name, role) VALUES (?, ?, 'Administrator', 'admin')",
    )
    .bind(ADMIN_USERNAME)
    .bind(hashed)
    .execute(&pool)
    .await
    .expect("Failed to seed admin user");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

async fn login(address: &str, client: &reqwest::Client, username: &str, password: &str) -> String {
    let body: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    body["token"].as_str().expect("Token not found").to_string()
}

/// Creates subject -> chapter -> quiz and returns their ids.
async fn seed_hierarchy(
    address: &str,
    client: &reqwest::Client,
    admin_token: &str,
    subject_name: &str,
    chapter_name: &str,
) -> (i64, i64, i64) {
    let subject: serde_json::Value = client
        .post(format!("{}/api/admin/subjects", address))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({"name": subject_name}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let subject_id = subject["id"].as_i64().unwrap();

    let chapter: serde_json::Value = client
        .post(format!("{}/api/admin/subjects/{}/chapters", address, subject_id))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({"name": chapter_name}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let chapter_id = chapter["id"].as_i64().unwrap();

    let quiz: serde_json::Value = client
        .post(format!("{}/api/admin/chapters/{}/quizzes", address, chapter_id))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({"date_of_quiz": "2024-03-01", "time_duration": 45}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quiz_id = quiz["id"].as_i64().unwrap();

    (subject_id, chapter_id, quiz_id)
}

#[tokio::test]
async fn admin_routes_reject_anonymous_and_regular_users() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // No token at all
    let anonymous = client
        .get(format!("{}/api/admin/dashboard", address))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    // Regular user token
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "plainuser",
            "password": "password123",
            "full_name": "Plain User"
        }))
        .send()
        .await
        .unwrap();
    let user_token = login(&address, &client, "plainuser", "password123").await;

    let forbidden = client
        .get(format!("{}/api/admin/dashboard", address))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);
}

#[tokio::test]
async fn duplicate_subject_name_is_conflict() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let first = client
        .post(format!("{}/api/admin/subjects", address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"name": "Biology"}))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/api/admin/subjects", address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"name": "Biology"}))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects WHERE name = 'Biology'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn blank_subject_name_is_rejected() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = client
        .post(format!("{}/api/admin/subjects", address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"name": "   "}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_chapter_within_subject_is_conflict() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let (subject_id, _chapter_id, _quiz_id) =
        seed_hierarchy(&address, &client, &admin_token, "History", "Antiquity").await;

    let duplicate = client
        .post(format!("{}/api/admin/subjects/{}/chapters", address, subject_id))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"name": "Antiquity"}))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 409);

    // The same chapter name under a different subject is fine.
    let other: serde_json::Value = client
        .post(format!("{}/api/admin/subjects", address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"name": "Archaeology"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let reused = client
        .post(format!(
            "{}/api/admin/subjects/{}/chapters",
            address,
            other["id"].as_i64().unwrap()
        ))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"name": "Antiquity"}))
        .send()
        .await
        .unwrap();
    assert_eq!(reused.status().as_u16(), 201);
}

#[tokio::test]
async fn quiz_duration_must_be_in_range() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let (_subject_id, chapter_id, _quiz_id) =
        seed_hierarchy(&address, &client, &admin_token, "Geography", "Maps").await;

    for bad_duration in [0, 181, -5] {
        let response = client
            .post(format!("{}/api/admin/chapters/{}/quizzes", address, chapter_id))
            .bearer_auth(&admin_token)
            .json(&serde_json::json!({"date_of_quiz": "2024-04-01", "time_duration": bad_duration}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "duration {}", bad_duration);
    }
}

#[tokio::test]
async fn question_correct_option_must_be_in_range() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let (_subject_id, _chapter_id, quiz_id) =
        seed_hierarchy(&address, &client, &admin_token, "Astronomy", "Planets").await;

    for bad_option in [0, 5] {
        let response = client
            .post(format!("{}/api/admin/quizzes/{}/questions", address, quiz_id))
            .bearer_auth(&admin_token)
            .json(&serde_json::json!({
                "statement": "Largest planet?",
                "option1": "Jupiter",
                "option2": "Saturn",
                "option3": "Earth",
                "option4": "Mars",
                "correct_option": bad_option
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "option {}", bad_option);
    }
}

#[tokio::test]
async fn view_question_returns_full_payload() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let (_subject_id, _chapter_id, quiz_id) =
        seed_hierarchy(&address, &client, &admin_token, "Music", "Theory").await;

    let created: serde_json::Value = client
        .post(format!("{}/api/admin/quizzes/{}/questions", address, quiz_id))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "statement": "Notes in an octave?",
            "option1": "10",
            "option2": "12",
            "option3": "7",
            "option4": "8",
            "correct_option": 2
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = created["id"].as_i64().unwrap();

    let question: serde_json::Value = client
        .get(format!("{}/api/admin/questions/{}", address, question_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(question["statement"], "Notes in an octave?");
    assert_eq!(question["option2"], "12");
    assert_eq!(question["correct_option"], "2");
}

#[tokio::test]
async fn deleting_subject_cascades_to_descendants() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let (subject_id, chapter_id, quiz_id) =
        seed_hierarchy(&address, &client, &admin_token, "Economics", "Markets").await;

    client
        .post(format!("{}/api/admin/quizzes/{}/questions", address, quiz_id))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "statement": "Supply up, price?",
            "option1": "Up",
            "option2": "Down",
            "option3": "Flat",
            "option4": "Undefined",
            "correct_option": 2
        }))
        .send()
        .await
        .unwrap();

    // A recorded score rides on the hierarchy too.
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "econstudent",
            "password": "password123",
            "full_name": "Econ Student"
        }))
        .send()
        .await
        .unwrap();
    let user_token = login(&address, &client, "econstudent", "password123").await;
    client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .bearer_auth(&user_token)
        .json(&serde_json::json!({"answers": {}}))
        .send()
        .await
        .unwrap();

    let delete = client
        .delete(format!("{}/api/admin/subjects/{}", address, subject_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status().as_u16(), 204);

    let chapters: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chapters WHERE subject_id = ?")
        .bind(subject_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE chapter_id = ?")
        .bind(chapter_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = ?")
        .bind(quiz_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let scores: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scores WHERE quiz_id = ?")
        .bind(quiz_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(
        (chapters, quizzes, questions, scores),
        (0, 0, 0, 0),
        "subject deletion must take the whole hierarchy with it"
    );
}

#[tokio::test]
async fn deleting_missing_subject_is_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = client
        .delete(format!("{}/api/admin/subjects/4242", address))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn search_matches_case_insensitively_across_entities() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    seed_hierarchy(&address, &client, &admin_token, "Mathematics", "Algebra").await;
    seed_hierarchy(&address, &client, &admin_token, "Literature", "Poetry").await;

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "mathfan",
            "password": "password123",
            "full_name": "Ada Lovelace"
        }))
        .send()
        .await
        .unwrap();

    let results: serde_json::Value = client
        .get(format!("{}/api/admin/search", address))
        .query(&[("q", "MATH")])
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let subjects = results["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["name"], "Mathematics");

    let users = results["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "mathfan");

    // Quizzes surface through their chapter's name.
    let chapter_hits: serde_json::Value = client
        .get(format!("{}/api/admin/search", address))
        .query(&[("q", "algebra")])
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chapter_hits["chapters"].as_array().unwrap().len(), 1);
    assert_eq!(chapter_hits["quizzes"].as_array().unwrap().len(), 1);

    // And nothing matches noise.
    let empty: serde_json::Value = client
        .get(format!("{}/api/admin/search", address))
        .query(&[("q", "zzzzzz")])
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty["subjects"].as_array().unwrap().is_empty());
    assert!(empty["users"].as_array().unwrap().is_empty());
    assert!(empty["chapters"].as_array().unwrap().is_empty());
    assert!(empty["quizzes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_summary_aggregates_per_subject() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&address, &client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let (_subject_id, _chapter_id, quiz_id) =
        seed_hierarchy(&address, &client, &admin_token, "Botany", "Trees").await;
    client
        .post(format!("{}/api/admin/quizzes/{}/questions", address, quiz_id))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "statement": "Tallest tree species?",
            "option1": "Sequoia",
            "option2": "Oak",
            "option3": "Birch",
            "option4": "Pine",
            "correct_option": 1
        }))
        .send()
        .await
        .unwrap();

    // A subject with no quizzes at all must still report zeros.
    client
        .post(format!("{}/api/admin/subjects", address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({"name": "Zoology"}))
        .send()
        .await
        .unwrap();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "botanist",
            "password": "password123",
            "full_name": "Bo Tanist"
        }))
        .send()
        .await
        .unwrap();
    let user_token = login(&address, &client, "botanist", "password123").await;

    let attempt: serde_json::Value = client
        .get(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = attempt["questions"][0]["id"].as_i64().unwrap();

    let mut answers = std::collections::HashMap::new();
    answers.insert(question_id, "1".to_string());
    client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .bearer_auth(&user_token)
        .json(&serde_json::json!({"answers": answers}))
        .send()
        .await
        .unwrap();

    let summary: serde_json::Value = client
        .get(format!("{}/api/admin/summary", address))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rows = summary.as_array().unwrap();
    let botany = rows.iter().find(|r| r["name"] == "Botany").unwrap();
    assert_eq!(botany["top_score"], 1);
    assert_eq!(botany["attempts"], 1);

    let zoology = rows.iter().find(|r| r["name"] == "Zoology").unwrap();
    assert_eq!(zoology["top_score"], 0);
    assert_eq!(zoology["attempts"], 0);
}

//! Integration tests: bind the router on a loopback port backed by an
//! in-memory database and exercise it over real HTTP.
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use biourb_api::middleware::decode_token;
use biourb_api::{AppState, AppStateInner};
use biourb_db::Database;
use biourb_types::api::{AreaResponse, LoginResponse, StatsResponse, TreeResponse};

const SECRET: &str = "integration-secret";

struct TestServer {
    base: String,
    state: AppState,
    http: Client,
}

impl TestServer {
    async fn start(require_auth: bool) -> Self {
        Self::start_with(require_auth, chrono::Duration::hours(1)).await
    }

    async fn start_with(require_auth: bool, token_ttl: chrono::Duration) -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: SECRET.to_string(),
            token_ttl,
        });

        let app = biourb_api::router(state.clone(), require_auth);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            state,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self.http.post(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self.http.put(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn delete(&self, path: &str) -> StatusCode {
        self.http.delete(self.url(path)).send().await.unwrap().status()
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> T {
        let resp = self.http.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }

    async fn register(&self, email: &str) {
        let (status, _) = self
            .post(
                "/register",
                json!({"cpf": "111.222.333-44", "name": "Maria", "email": email, "password": "ipe-amarelo"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn login(&self, email: &str) -> LoginResponse {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(&json!({"email": email, "password": "ipe-amarelo"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }

    fn count(&self, table: &str) -> i64 {
        self.state
            .db
            .with_conn(|conn| {
                Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
            })
            .unwrap()
    }
}

fn tree_body(user_id: i64, name: &str, health: &str, area: Option<i64>) -> Value {
    json!({
        "usuario_id": user_id,
        "treeName": name,
        "popularName": "Ipê",
        "lifecondition": health,
        "location": "Rua da Aurora, Recife",
        "plantingDate": "2022-06-01",
        "altura": 3.2,
        "diametro": null,
        "areaVerdeId": area.map(|id| id.to_string()),
    })
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    let (status, body) = server
        .post(
            "/register",
            json!({"cpf": "999", "name": "Outra", "email": "maria@example.com", "password": "x"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].is_string());
    assert_eq!(server.count("users"), 1);

    // The first account still logs in with its own password.
    let login = server.login("maria@example.com").await;
    assert_eq!(login.user.nome, "Maria");
}

#[tokio::test]
async fn registration_requires_every_field() {
    let server = TestServer::start(false).await;
    let (status, _) = server
        .post("/register", json!({"cpf": "1", "name": "Sem senha", "email": "a@b.c"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.count("users"), 0);
}

#[tokio::test]
async fn login_issues_token_for_the_user() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    let login = server.login("maria@example.com").await;
    assert!(login.user.is_admin, "first user is the administrator");
    assert!(login.expires_at > chrono::Utc::now());

    let claims = decode_token(SECRET, &login.token).unwrap();
    assert_eq!(claims.sub, login.user.id);
}

#[tokio::test]
async fn login_failures_are_distinguished_consistently() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    for _ in 0..2 {
        let (status, body) = server
            .post("/login", json!({"email": "maria@example.com", "password": "wrong"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.get("token").is_none());

        let (status, _) = server
            .post("/login", json!({"email": "nobody@example.com", "password": "wrong"}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn tree_without_location_is_not_persisted() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    let mut body = tree_body(1, "Tabebuia", "Saudável", None);
    body.as_object_mut().unwrap().remove("location");

    let (status, resp) = server.post("/trees", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["msg"].is_string());
    assert_eq!(server.count("trees"), 0);
}

#[tokio::test]
async fn unknown_health_status_is_rejected() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    let (status, _) = server.post("/trees", tree_body(1, "Tabebuia", "Excelente", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.count("trees"), 0);
}

#[tokio::test]
async fn trees_are_listed_newest_first() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    let mut ids = Vec::new();
    for i in 0..4 {
        let (status, body) = server
            .post("/trees", tree_body(1, &format!("Tree {}", i), "Doente", None))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["insertedId"].as_i64().unwrap());
    }

    let trees: Vec<TreeResponse> = server.get("/trees").await;
    assert_eq!(trees.len(), 4);
    ids.reverse();
    assert_eq!(trees.iter().map(|t| t.id).collect::<Vec<_>>(), ids);
    assert!(trees.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert_eq!(trees[0].nome_registrante, "Maria");
}

#[tokio::test]
async fn area_tree_counts_include_empty_areas() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    let (_, full) = server
        .post("/areas", json!({"usuario_id": 1, "nome": "Jaqueira", "localizacao": "Recife"}))
        .await;
    let (_, empty) = server
        .post(
            "/areas",
            json!({"usuario_id": "1", "nome": "Dois Irmãos", "localizacao": "Recife", "status": "Planejada"}),
        )
        .await;
    let full = full["insertedId"].as_i64().unwrap();
    let empty = empty["insertedId"].as_i64().unwrap();

    for i in 0..3 {
        let (status, _) = server
            .post("/trees", tree_body(1, &format!("T{}", i), "Saudável", Some(full)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let areas: Vec<AreaResponse> = server.get("/areas").await;
    let find = |id: i64| areas.iter().find(|a| a.id == id).unwrap();
    assert_eq!(find(full).total_arvores, 3);
    assert_eq!(find(empty).total_arvores, 0);

    let trees: Vec<TreeResponse> = server.get("/trees").await;
    assert!(trees.iter().all(|t| t.nome_area.as_deref() == Some("Jaqueira")));
}

#[tokio::test]
async fn update_and_delete_of_missing_ids_succeed_silently() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;
    server.post("/trees", tree_body(1, "Ficus", "Saudável", None)).await;

    assert_eq!(server.delete("/trees/9999").await, StatusCode::OK);
    assert_eq!(server.count("trees"), 1);

    let (status, _) = server.put("/trees/9999", tree_body(1, "Ficus", "Doente", None)).await;
    assert_eq!(status, StatusCode::OK);
    let trees: Vec<TreeResponse> = server.get("/trees").await;
    assert_eq!(trees[0].estado_saude.as_str(), "Saudável");
}

#[tokio::test]
async fn update_replaces_and_requires_fields() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;
    let (_, created) = server.post("/trees", tree_body(1, "Ficus", "Saudável", None)).await;
    let id = created["insertedId"].as_i64().unwrap();

    let (status, _) = server
        .put(&format!("/trees/{}", id), json!({"treeName": "Ficus benjamina"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .put(&format!("/trees/{}", id), tree_body(1, "Ficus benjamina", "Morrendo", None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let trees: Vec<TreeResponse> = server.get("/trees").await;
    assert_eq!(trees[0].nome_cientifico, "Ficus benjamina");
    assert_eq!(trees[0].estado_saude.as_str(), "Morrendo");

    assert_eq!(server.delete(&format!("/trees/{}", id)).await, StatusCode::OK);
    assert_eq!(server.count("trees"), 0);
}

#[tokio::test]
async fn area_update_and_delete() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;
    let (_, created) = server
        .post("/areas", json!({"usuario_id": 1, "nome": "Praça", "localizacao": "Centro"}))
        .await;
    let id = created["insertedId"].as_i64().unwrap();

    let (status, _) = server.put(&format!("/areas/{}", id), json!({"nome": "Praça"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .put(
            &format!("/areas/{}", id),
            json!({"nome": "Praça do Arsenal", "localizacao": "Recife Antigo", "status": "Em Manutenção"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let areas: Vec<AreaResponse> = server.get("/areas").await;
    assert_eq!(areas[0].nome, "Praça do Arsenal");
    assert_eq!(areas[0].status.as_str(), "Em Manutenção");

    assert_eq!(server.delete(&format!("/areas/{}", id)).await, StatusCode::OK);
    assert_eq!(server.count("green_areas"), 0);
}

#[tokio::test]
async fn stats_match_table_counts() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;
    server.register("joao@example.com").await;
    server
        .post("/areas", json!({"usuario_id": 1, "nome": "Praça", "localizacao": "Centro"}))
        .await;
    server.post("/trees", tree_body(1, "a", "Saudável", None)).await;
    server.post("/trees", tree_body(2, "b", "Healthy", None)).await;
    server.post("/trees", tree_body(2, "c", "Morrendo", None)).await;

    let stats: StatsResponse = server.get("/stats").await;
    assert_eq!(stats.total_arvores, server.count("trees"));
    assert_eq!(stats.total_areas, server.count("green_areas"));
    assert_eq!(stats.total_usuarios, server.count("users"));

    let healthy: i64 = server
        .state
        .db
        .with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM trees WHERE estado_saude = 'Saudável'",
                [],
                |r| r.get(0),
            )?)
        })
        .unwrap();
    assert_eq!(stats.arvores_saudaveis, healthy);
    assert_eq!(healthy, 2);
}

#[tokio::test]
async fn tree_for_unknown_user_is_a_server_error() {
    let server = TestServer::start(false).await;

    let (status, body) = server.post("/trees", tree_body(77, "Sem dono", "Saudável", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("FOREIGN KEY"));
}

#[tokio::test]
async fn required_auth_gates_writes_only() {
    let server = TestServer::start(true).await;
    server.register("maria@example.com").await;

    let (status, _) = server.post("/trees", tree_body(1, "Ficus", "Saudável", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(server.delete("/trees/1").await, StatusCode::UNAUTHORIZED);

    let login = server.login("maria@example.com").await;
    let mut body = tree_body(1, "Ficus", "Saudável", None);
    body.as_object_mut().unwrap().remove("usuario_id");

    let resp = server
        .http
        .post(server.url("/trees"))
        .bearer_auth(&login.token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let trees: Vec<TreeResponse> = server.get("/trees").await;
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].usuario_id, login.user.id);
}

#[tokio::test]
async fn health_probe_reports_ok() {
    let server = TestServer::start(false).await;
    let body: Value = server.get("/health").await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn token_lifetime_past_the_calendar_is_a_server_error() {
    let server = TestServer::start_with(false, chrono::Duration::days(1_000_000_000)).await;
    server.register("maria@example.com").await;

    let (status, body) = server
        .post("/login", json!({"email": "maria@example.com", "password": "ipe-amarelo"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("token lifetime"));

    // The server is still up for the next request.
    let body: Value = server.get("/health").await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn non_numeric_ids_are_json_validation_errors() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    for path in ["/trees/abc", "/areas/1.5"] {
        let resp = server.http.delete(server.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert!(body["msg"].is_string(), "{} answered {}", path, body);
    }

    let (status, body) = server.put("/trees/abc", tree_body(1, "Ficus", "Saudável", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].is_string());
}

#[tokio::test]
async fn token_user_is_the_registrant_whatever_the_body_says() {
    let server = TestServer::start(true).await;
    server.register("maria@example.com").await;
    server.register("joao@example.com").await;
    let joao = server.login("joao@example.com").await;

    let resp = server
        .http
        .post(server.url("/areas"))
        .bearer_auth(&joao.token)
        .json(&json!({"usuario_id": 1, "nome": "Horto", "localizacao": "Dois Irmãos"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = server
        .http
        .post(server.url("/trees"))
        .bearer_auth(&joao.token)
        .json(&tree_body(1, "Ficus", "Saudável", None))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let areas: Vec<AreaResponse> = server.get("/areas").await;
    assert_eq!(areas[0].usuario_id, joao.user.id);
    let trees: Vec<TreeResponse> = server.get("/trees").await;
    assert_eq!(trees[0].usuario_id, joao.user.id);
    assert_ne!(joao.user.id, 1);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let server = TestServer::start(false).await;

    for path in ["/register", "/login", "/trees", "/areas"] {
        let resp = server
            .http
            .post(server.url(path))
            .header("content-type", "application/json")
            .body("{\"nome\": ")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert!(body["msg"].is_string(), "{} answered {}", path, body);
    }
}

#[tokio::test]
async fn area_requires_a_registrant_and_a_known_status() {
    let server = TestServer::start(false).await;
    server.register("maria@example.com").await;

    let (status, body) = server
        .post("/areas", json!({"nome": "Praça", "localizacao": "Centro"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].is_string());

    let (status, body) = server
        .post(
            "/areas",
            json!({"usuario_id": 1, "nome": "Praça", "localizacao": "Centro", "status": "Fechada"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["msg"].as_str().unwrap().contains("Fechada"));
    assert_eq!(server.count("green_areas"), 0);
}

#[tokio::test]
async fn api_docs_describe_every_route() {
    let server = TestServer::start(false).await;

    let doc: Value = server.get("/api-docs/openapi.json").await;
    let paths = doc["paths"].as_object().unwrap();
    for path in ["/register", "/login", "/stats", "/health", "/trees", "/trees/{id}", "/areas", "/areas/{id}"] {
        assert!(paths.contains_key(path), "{} missing from the document", path);
    }
    assert!(doc["paths"]["/trees"]["post"]["requestBody"].is_object());

    let resp = server.http.get(server.url("/api-docs")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("swagger-ui"));
}

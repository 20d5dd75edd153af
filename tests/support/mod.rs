//! In-process stand-in for the remote store: password auth, filtered row
//! CRUD with PostgREST-style operators, and blob upload. Only the surface
//! the service actually uses is implemented.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use actix_web::{App, HttpRequest, HttpResponse, web};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Value, json};
use uuid::Uuid;

use getlife_be::config::AppConfig;
use getlife_be::repositories::store::SupabaseStore;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
const FAR_FUTURE_EXP: u64 = 4_102_444_800; // 2100-01-01

#[derive(serde::Serialize, serde::Deserialize)]
struct Claims {
    sub: String,
    aud: Option<String>,
    exp: u64,
    role: Option<String>,
    email: Option<String>,
}

pub fn mint_token(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        aud: Some("authenticated".to_string()),
        exp: FAR_FUTURE_EXP,
        role: Some("authenticated".to_string()),
        email: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

struct MockUser {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Default)]
pub struct MockState {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    users: Mutex<Vec<MockUser>>,
}

fn now() -> Value {
    json!(chrono::Utc::now().to_rfc3339())
}

/// Missing columns are filled in the way the real store's schema defaults
/// and triggers would.
fn apply_defaults(table: &str, row: &mut serde_json::Map<String, Value>) {
    let defaults: Vec<(&str, Value)> = match table {
        "profiles" => vec![
            ("id", json!(Uuid::new_v4())),
            ("full_name", Value::Null),
            ("phone", Value::Null),
            ("role", json!("user")),
            ("is_verified", json!(false)),
            ("is_blocked", json!(false)),
            ("created_at", now()),
            ("updated_at", Value::Null),
        ],
        "user_profiles" => vec![
            ("balance", json!(0)),
            ("address", Value::Null),
            ("latitude", Value::Null),
            ("longitude", Value::Null),
        ],
        "mitra_profiles" => vec![
            ("balance", json!(0)),
            ("is_active", json!(false)),
            ("description", Value::Null),
            ("service_types", Value::Null),
            ("profile_image", Value::Null),
        ],
        "services" => vec![
            ("id", json!(Uuid::new_v4())),
            ("description", Value::Null),
            ("is_active", json!(true)),
            ("created_at", now()),
        ],
        "orders" => vec![
            ("id", json!(Uuid::new_v4())),
            ("user_id", Value::Null),
            ("mitra_id", Value::Null),
            ("service_id", Value::Null),
            ("notes", Value::Null),
            ("latitude", Value::Null),
            ("longitude", Value::Null),
            ("status", json!("pending")),
            ("rating", Value::Null),
            ("review", Value::Null),
            ("created_at", now()),
            ("started_at", Value::Null),
            ("completed_at", Value::Null),
        ],
        "balance_transactions" => vec![
            ("id", json!(Uuid::new_v4())),
            ("user_id", Value::Null),
            ("description", Value::Null),
            ("order_id", Value::Null),
            ("voucher_id", Value::Null),
            ("created_at", now()),
        ],
        "vouchers" => vec![
            ("id", json!(Uuid::new_v4())),
            ("usage_limit", Value::Null),
            ("used_count", json!(0)),
            ("valid_until", Value::Null),
            ("is_active", json!(true)),
            ("created_at", now()),
        ],
        "voucher_usage" => vec![
            ("id", json!(Uuid::new_v4())),
            ("voucher_id", Value::Null),
            ("user_id", Value::Null),
            ("used_at", now()),
        ],
        "mitra_verifications" => vec![
            ("id", json!(Uuid::new_v4())),
            ("mitra_id", Value::Null),
            ("ktp_image", Value::Null),
            ("kk_image", Value::Null),
            ("status", json!("pending")),
            ("rejection_reason", Value::Null),
            ("submitted_at", now()),
            ("reviewed_at", Value::Null),
            ("reviewed_by", Value::Null),
        ],
        "chat_messages" => vec![
            ("id", json!(Uuid::new_v4())),
            ("sender_id", Value::Null),
            ("receiver_id", Value::Null),
            ("order_id", Value::Null),
            ("is_read", json!(false)),
            ("created_at", now()),
        ],
        "banners" => vec![
            ("id", json!(Uuid::new_v4())),
            ("link_url", Value::Null),
            ("is_active", json!(true)),
            ("created_at", now()),
        ],
        _ => vec![],
    };
    for (key, value) in defaults {
        row.entry(key.to_string()).or_insert(value);
    }
}

fn cell_eq(cell: &Value, raw: &str) -> bool {
    match cell {
        Value::String(s) => s == raw,
        Value::Number(n) => n.to_string() == raw,
        Value::Bool(b) => b.to_string() == raw,
        Value::Null => raw == "null",
        _ => false,
    }
}

fn cell_gte(cell: &Value, raw: &str) -> bool {
    match cell {
        Value::Number(n) => raw
            .parse::<f64>()
            .map(|r| n.as_f64().unwrap_or(f64::MIN) >= r)
            .unwrap_or(false),
        Value::String(s) => s.as_str() >= raw,
        _ => false,
    }
}

/// `col` + PostgREST operator string, e.g. `eq.42`, `gte.2025-01-01`,
/// `is.null`, `in.(a,b)`.
fn field_matches(row: &Value, col: &str, op_val: &str) -> bool {
    let cell = row.get(col).unwrap_or(&Value::Null);
    if let Some(raw) = op_val.strip_prefix("eq.") {
        cell_eq(cell, raw)
    } else if let Some(raw) = op_val.strip_prefix("gte.") {
        cell_gte(cell, raw)
    } else if op_val == "is.null" {
        cell.is_null()
    } else if let Some(list) = op_val.strip_prefix("in.(").and_then(|v| v.strip_suffix(')')) {
        list.split(',').any(|raw| cell_eq(cell, raw.trim()))
    } else {
        false
    }
}

fn split_top_level(expr: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in expr.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn condition_matches(row: &Value, cond: &str) -> bool {
    if let Some(inner) = cond.strip_prefix("and(").and_then(|v| v.strip_suffix(')')) {
        return split_top_level(inner).iter().all(|c| condition_matches(row, c));
    }
    match cond.split_once('.') {
        Some((col, op_val)) => field_matches(row, col, op_val),
        None => false,
    }
}

fn or_matches(row: &Value, expr: &str) -> bool {
    let inner = expr
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(expr);
    split_top_level(inner).iter().any(|c| condition_matches(row, c))
}

struct ParsedQuery {
    filters: Vec<(String, String)>,
    or_expr: Option<String>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

fn parse_query(pairs: &[(String, String)]) -> ParsedQuery {
    let mut parsed = ParsedQuery {
        filters: Vec::new(),
        or_expr: None,
        order: None,
        limit: None,
    };
    for (key, value) in pairs {
        match key.as_str() {
            "select" => {}
            "or" => parsed.or_expr = Some(value.clone()),
            "limit" => parsed.limit = value.parse().ok(),
            "order" => {
                let (col, dir) = value.split_once('.').unwrap_or((value.as_str(), "asc"));
                parsed.order = Some((col.to_string(), dir == "desc"));
            }
            _ => parsed.filters.push((key.clone(), value.clone())),
        }
    }
    parsed
}

fn row_matches(row: &Value, query: &ParsedQuery) -> bool {
    if let Some(or_expr) = &query.or_expr {
        if !or_matches(row, or_expr) {
            return false;
        }
    }
    query
        .filters
        .iter()
        .all(|(col, op_val)| field_matches(row, col, op_val))
}

fn sort_rows(rows: &mut [Value], order: &Option<(String, bool)>) {
    if let Some((col, desc)) = order {
        rows.sort_by(|a, b| {
            let av = a.get(col).unwrap_or(&Value::Null);
            let bv = b.get(col).unwrap_or(&Value::Null);
            let ordering = match (av, bv) {
                (Value::Number(x), Value::Number(y)) => x
                    .as_f64()
                    .partial_cmp(&y.as_f64())
                    .unwrap_or(std::cmp::Ordering::Equal),
                (Value::String(x), Value::String(y)) => x.cmp(y),
                _ => std::cmp::Ordering::Equal,
            };
            if *desc { ordering.reverse() } else { ordering }
        });
    }
}

type QueryPairs = web::Query<Vec<(String, String)>>;

async fn rest_get(
    state: web::Data<MockState>,
    path: web::Path<String>,
    query: QueryPairs,
    req: HttpRequest,
) -> HttpResponse {
    let table = path.into_inner();
    let parsed = parse_query(&query);
    let tables = state.tables.lock().unwrap();
    let mut rows: Vec<Value> = tables
        .get(&table)
        .map(|rows| rows.iter().filter(|r| row_matches(r, &parsed)).cloned().collect())
        .unwrap_or_default();
    sort_rows(&mut rows, &parsed.order);

    let total = rows.len();
    if let Some(limit) = parsed.limit {
        rows.truncate(limit);
    }

    let mut response = HttpResponse::Ok();
    let wants_count = req
        .headers()
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("count=exact"))
        .unwrap_or(false);
    if wants_count {
        let upper = total.saturating_sub(1);
        response.insert_header(("content-range", format!("0-{}/{}", upper, total)));
    }
    response.json(rows)
}

async fn rest_post(
    state: web::Data<MockState>,
    path: web::Path<String>,
    body: web::Json<Value>,
    req: HttpRequest,
) -> HttpResponse {
    let table = path.into_inner();
    let incoming = match body.into_inner() {
        Value::Array(rows) => rows,
        row => vec![row],
    };

    let mut inserted = Vec::new();
    {
        let mut tables = state.tables.lock().unwrap();
        for row in incoming {
            let Value::Object(mut obj) = row else {
                return HttpResponse::BadRequest().json(json!({"message": "row must be an object"}));
            };
            apply_defaults(&table, &mut obj);
            let row = Value::Object(obj);

            // Unique (voucher_id, user_id) per usage row.
            if table == "voucher_usage" {
                let duplicate = tables.get("voucher_usage").is_some_and(|rows| {
                    rows.iter().any(|existing| {
                        existing.get("voucher_id") == row.get("voucher_id")
                            && existing.get("user_id") == row.get("user_id")
                    })
                });
                if duplicate {
                    return HttpResponse::Conflict()
                        .json(json!({"message": "duplicate key value violates unique constraint"}));
                }
            }

            tables.entry(table.clone()).or_default().push(row.clone());
            inserted.push(row);
        }
    }

    let wants_representation = req
        .headers()
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("return=representation"))
        .unwrap_or(false);
    if wants_representation {
        HttpResponse::Created().json(inserted)
    } else {
        HttpResponse::Created().finish()
    }
}

async fn rest_patch(
    state: web::Data<MockState>,
    path: web::Path<String>,
    query: QueryPairs,
    body: web::Json<Value>,
) -> HttpResponse {
    let table = path.into_inner();
    let parsed = parse_query(&query);
    let Value::Object(patch) = body.into_inner() else {
        return HttpResponse::BadRequest().json(json!({"message": "patch must be an object"}));
    };

    let mut updated = Vec::new();
    let mut tables = state.tables.lock().unwrap();
    if let Some(rows) = tables.get_mut(&table) {
        for row in rows.iter_mut() {
            if row_matches(row, &parsed) {
                if let Value::Object(obj) = row {
                    for (key, value) in &patch {
                        obj.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
    }
    HttpResponse::Ok().json(updated)
}

async fn rest_delete(
    state: web::Data<MockState>,
    path: web::Path<String>,
    query: QueryPairs,
) -> HttpResponse {
    let table = path.into_inner();
    let parsed = parse_query(&query);
    let mut tables = state.tables.lock().unwrap();
    if let Some(rows) = tables.get_mut(&table) {
        rows.retain(|row| !row_matches(row, &parsed));
    }
    HttpResponse::NoContent().finish()
}

async fn auth_signup(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    let email = body
        .get("email")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let password = body
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let full_name = body
        .get("data")
        .and_then(|d| d.get("full_name"))
        .cloned()
        .unwrap_or(Value::Null);

    {
        let users = state.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return HttpResponse::BadRequest().json(json!({"msg": "User already registered"}));
        }
    }

    let id = Uuid::new_v4();
    state.users.lock().unwrap().push(MockUser {
        id,
        email: email.clone(),
        password,
    });

    // Trigger behavior: a profile row and a balance row appear with the
    // identity.
    {
        let mut tables = state.tables.lock().unwrap();
        let mut profile = serde_json::Map::new();
        profile.insert("id".into(), json!(id));
        profile.insert("full_name".into(), full_name);
        apply_defaults("profiles", &mut profile);
        tables.entry("profiles".into()).or_default().push(Value::Object(profile));

        let mut balance_row = serde_json::Map::new();
        balance_row.insert("user_id".into(), json!(id));
        apply_defaults("user_profiles", &mut balance_row);
        tables
            .entry("user_profiles".into())
            .or_default()
            .push(Value::Object(balance_row));
    }

    HttpResponse::Ok().json(json!({"id": id, "email": email}))
}

async fn auth_token(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    let email = body.get("email").and_then(|v| v.as_str()).unwrap_or_default();
    let password = body.get("password").and_then(|v| v.as_str()).unwrap_or_default();

    let users = state.users.lock().unwrap();
    let Some(user) = users.iter().find(|u| u.email == email && u.password == password) else {
        return HttpResponse::BadRequest()
            .json(json!({"error_description": "Invalid login credentials"}));
    };

    HttpResponse::Ok().json(json!({
        "access_token": mint_token(user.id),
        "refresh_token": "mock-refresh",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": {"id": user.id, "email": user.email},
    }))
}

async fn auth_logout() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn auth_user(state: web::Data<MockState>, req: HttpRequest) -> HttpResponse {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();

    let validation = Validation::new(Algorithm::HS256);
    let Ok(data) = decode::<Claims>(
        token,
        &DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        &validation,
    ) else {
        return HttpResponse::Unauthorized().json(json!({"message": "invalid JWT"}));
    };
    let Ok(id) = Uuid::parse_str(&data.claims.sub) else {
        return HttpResponse::Unauthorized().json(json!({"message": "invalid subject"}));
    };

    let users = state.users.lock().unwrap();
    match users.iter().find(|u| u.id == id) {
        Some(user) => HttpResponse::Ok().json(json!({"id": user.id, "email": user.email})),
        None => HttpResponse::Unauthorized().json(json!({"message": "user not found"})),
    }
}

async fn storage_upload(path: web::Path<(String, String)>) -> HttpResponse {
    let (bucket, object) = path.into_inner();
    HttpResponse::Ok().json(json!({"Key": format!("{}/{}", bucket, object)}))
}

/// Boot the mock store and return a `SupabaseStore` pointed at it, plus the
/// server guard (dropping it stops the server) and shared state for seeding.
pub fn start_mock_store() -> (actix_test::TestServer, SupabaseStore, web::Data<MockState>) {
    let state = web::Data::new(MockState::default());
    let server_state = state.clone();

    let server = actix_test::start(move || {
        App::new()
            .app_data(server_state.clone())
            .route("/auth/v1/signup", web::post().to(auth_signup))
            .route("/auth/v1/token", web::post().to(auth_token))
            .route("/auth/v1/logout", web::post().to(auth_logout))
            .route("/auth/v1/user", web::get().to(auth_user))
            .route("/rest/v1/{table}", web::get().to(rest_get))
            .route("/rest/v1/{table}", web::post().to(rest_post))
            .route("/rest/v1/{table}", web::patch().to(rest_patch))
            .route("/rest/v1/{table}", web::delete().to(rest_delete))
            .route("/storage/v1/object/{bucket}/{tail:.*}", web::post().to(storage_upload))
    });

    let config = test_config(&format!("http://{}", server.addr()));
    let store = SupabaseStore::new(&config, reqwest::Client::new());
    (server, store, state)
}

pub fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: base_url.trim_end_matches('/').to_string(),
        supabase_anon_key: "anon-key".to_string(),
        supabase_service_role_key: "service-role-key".to_string(),
        supabase_jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_email: None,
        admin_password: None,
        allowed_origins: "http://localhost:3000".to_string(),
        port: 0,
    }
}

impl MockState {
    /// Seed one row, with the same defaults an insert would get.
    pub fn seed(&self, table: &str, row: Value) -> Value {
        let Value::Object(mut obj) = row else {
            panic!("seed row must be an object");
        };
        apply_defaults(table, &mut obj);
        let row = Value::Object(obj);
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        row
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

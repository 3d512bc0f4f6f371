use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{FromRequest, Query, State},
    http::{Method, Request, StatusCode},
    routing::get,
    Form, Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tienda::admin::{AdminClient, AdminError, ProductForm};
use tienda::domain::value_objects::ProductId;
use tienda::{build_app, AppState, Catalog, Config};

type Sheet = Arc<Mutex<Vec<Value>>>;

#[derive(Clone)]
struct ScriptState {
    sheet: Sheet,
    /// How long `getCatalog` takes to answer, from a snapshot taken on arrival.
    read_delay: Duration,
}

/// In-process stand-in for the spreadsheet script.
struct MockScript {
    url: String,
    sheet: Sheet,
    handle: tokio::task::JoinHandle<()>,
}

impl MockScript {
    async fn spawn(rows: Vec<Value>) -> Self { Self::spawn_slow(rows, Duration::ZERO).await }

    async fn spawn_slow(rows: Vec<Value>, read_delay: Duration) -> Self {
        let sheet: Sheet = Arc::new(Mutex::new(rows));
        let state = ScriptState { sheet: sheet.clone(), read_delay };
        let app = Router::new().route("/exec", get(read).post(write)).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { url: format!("http://{}/exec", addr), sheet, handle }
    }

    fn client(&self) -> AdminClient { AdminClient::new(reqwest::Client::new(), self.url.clone()) }

    fn ids(&self) -> Vec<String> {
        self.sheet.lock().unwrap().iter().map(|r| r["id"].as_str().unwrap().to_string()).collect()
    }
}

impl Drop for MockScript {
    fn drop(&mut self) { self.handle.abort(); }
}

async fn read(State(state): State<ScriptState>, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    match q.get("action").map(String::as_str) {
        Some("getCatalog") => {
            let snapshot = state.sheet.lock().unwrap().clone();
            tokio::time::sleep(state.read_delay).await;
            Json(json!({ "success": true, "catalogo": snapshot }))
        }
        _ => Json(json!({ "success": false, "error": "Acción no válida" })),
    }
}

async fn write(State(state): State<ScriptState>, Query(q): Query<HashMap<String, String>>, req: Request<Body>) -> Json<Value> {
    let action = q.get("action").cloned().unwrap_or_default();
    if action == "uploadFile" {
        let Json(body) = Json::<Value>::from_request(req, &()).await.unwrap();
        let name = body["fileName"].as_str().unwrap_or_default();
        return Json(json!({ "success": true, "url": format!("https://drive.example/{name}") }));
    }

    let Form(fields) = Form::<HashMap<String, String>>::from_request(req, &()).await.unwrap();
    let mut rows = state.sheet.lock().unwrap();
    let id = fields.get("id").cloned().unwrap_or_default();
    let row = json!({
        "id": id,
        "nombre": fields.get("nombre"),
        "precio": fields.get("precio").and_then(|p| p.parse::<u64>().ok()),
        "tallas": fields.get("tallas"),
        "imagen": fields.get("imagen"),
    });
    match action.as_str() {
        "addProduct" => rows.push(row),
        "updateProduct" => match rows.iter_mut().find(|r| r["id"] == id) {
            Some(existing) => *existing = row,
            None => return Json(json!({ "success": false, "error": "ID no existe" })),
        },
        "deleteProduct" => rows.retain(|r| r["id"] != id),
        _ => return Json(json!({ "success": false, "error": "Acción no válida" })),
    }
    Json(json!({ "success": true }))
}

fn seed() -> Vec<Value> {
    vec![
        json!({ "id": "P002", "nombre": "Pizza", "precio": 32000, "tallas": "S a XL", "imagen": "" }),
        json!({ "id": "P001", "nombre": "Camiseta", "precio": "50000", "tallas": "S a XL", "img": "https://x/c.jpg" }),
    ]
}

fn form(nombre: &str) -> ProductForm {
    ProductForm { nombre: nombre.into(), precio: "18000".into(), tallas: "1 a 3".into(), imagen: "https://x/p.jpg".into() }
}

#[tokio::test]
async fn catalog_comes_back_sorted_by_id() {
    let mock = MockScript::spawn(seed()).await;
    let products = mock.client().get_catalog().await.unwrap();
    let ids: Vec<&str> = products.iter().map(|p| p.id().as_str()).collect();
    assert_eq!(ids, vec!["P001", "P002"]);
    assert_eq!(products[0].imagen(), "https://x/c.jpg");
    assert_eq!(products[0].precio().amount(), 50000);
}

#[tokio::test]
async fn save_without_id_creates_next_product() {
    let mock = MockScript::spawn(seed()).await;
    let draft = mock.client().save(None, form("Empanada")).await.unwrap();
    assert_eq!(draft.id.as_str(), "P003");
    assert_eq!(mock.ids(), vec!["P002", "P001", "P003"]);
}

#[tokio::test]
async fn save_with_id_updates_in_place() {
    let mock = MockScript::spawn(seed()).await;
    let client = mock.client();
    client.save(Some(&ProductId::new("P002")), form("Pizza Hawaiana")).await.unwrap();
    let products = client.get_catalog().await.unwrap();
    assert_eq!(products[1].nombre(), "Pizza Hawaiana");

    let err = client.save(Some(&ProductId::new("P404")), form("X")).await.unwrap_err();
    assert!(matches!(err, AdminError::ProductNotFound(_)));
}

#[tokio::test]
async fn invalid_form_never_reaches_remote() {
    let mock = MockScript::spawn(seed()).await;
    let bad = ProductForm { precio: "gratis".into(), ..form("Arepa") };
    let err = mock.client().save(None, bad).await.unwrap_err();
    assert!(matches!(err, AdminError::Validation(_)));
    assert_eq!(mock.ids().len(), 2);
}

#[tokio::test]
async fn delete_and_upload() {
    let mock = MockScript::spawn(seed()).await;
    let client = mock.client();
    client.delete_product(&ProductId::new("P002")).await.unwrap();
    assert_eq!(mock.ids(), vec!["P001"]);

    let url = client.upload_file("gorra.jpg", "image/jpeg", b"\xff\xd8\xff").await.unwrap();
    assert_eq!(url, "https://drive.example/gorra.jpg");
    assert!(!client.guard().is_busy());
}

#[tokio::test]
async fn remote_error_message_is_surfaced() {
    let mock = MockScript::spawn(seed()).await;
    let draft = form("X").into_draft(ProductId::new("P777")).unwrap();
    match mock.client().update_product(&draft).await {
        Err(AdminError::Remote(msg)) => assert_eq!(msg, "ID no existe"),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn admin_routes_search_by_id_or_name() {
    let mock = MockScript::spawn(seed()).await;
    let app = build_app(AppState::new(Catalog::default(), Config::default(), Some(mock.client()), None));

    let req = Request::builder().uri("/api/v1/admin/products?search=p002").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["imagen"], "img/placeholder.jpg");
    assert_eq!(body[0]["tallas"], "S a XL");

    let req = Request::builder().method(Method::DELETE).uri("/api/v1/admin/products/P404").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = Request::builder().uri("/api/v1/admin/next-id").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["id"], "P003");
}

#[tokio::test]
async fn overlapping_creates_never_share_an_id() {
    let mock = MockScript::spawn_slow(seed(), Duration::from_millis(200)).await;
    let client = mock.client();

    let (first, second) = tokio::join!(client.save(None, form("Arepa")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.save(None, form("Buñuelo")).await
    });

    assert_eq!(first.unwrap().id.as_str(), "P003");
    assert!(matches!(second, Err(AdminError::Busy)));
    assert_eq!(mock.ids(), vec!["P002", "P001", "P003"]);
    assert!(!client.guard().is_busy());
}

#[tokio::test]
async fn second_create_through_routes_is_busy() {
    let mock = MockScript::spawn_slow(seed(), Duration::from_millis(200)).await;
    let app = build_app(AppState::new(Catalog::default(), Config::default(), Some(mock.client()), None));

    let create = |nombre: &str| {
        let body = serde_json::to_vec(&form(nombre)).unwrap();
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/admin/products")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    let (first, second) = tokio::join!(app.clone().oneshot(create("Arepa")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.clone().oneshot(create("Buñuelo")).await
    });

    assert_eq!(first.unwrap().status(), StatusCode::CREATED);
    let second = second.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let bytes = axum::body::to_bytes(second.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "busy");
    assert_eq!(mock.ids(), vec!["P002", "P001", "P003"]);

    let upload = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/admin/uploads?file_name=gorra.jpg")
        .header("content-type", "image/jpeg")
        .body(Body::from(vec![0xff, 0xd8, 0xff]))
        .unwrap();
    assert_eq!(app.oneshot(upload).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn next_id_follows_numeric_order() {
    let rows = vec![
        json!({ "id": "P999", "nombre": "A", "precio": 1, "tallas": "N/A", "imagen": "" }),
        json!({ "id": "P1000", "nombre": "B", "precio": 1, "tallas": "N/A", "imagen": "" }),
    ];
    let mock = MockScript::spawn(rows).await;
    let draft = mock.client().save(None, form("C")).await.unwrap();
    assert_eq!(draft.id.as_str(), "P1001");
}

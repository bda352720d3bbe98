use std::sync::{Arc, Mutex};

use apm_catalog::{
    CatalogClient, CatalogConfig, CatalogService, FetchError, HttpCatalogClient,
    ProductListPresenter,
};
use apm_core::CategoryId;
use apm_products::CategoryFilter;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn config(&self) -> CatalogConfig {
        CatalogConfig::with_api_url(self.base_url.clone())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn products_body() -> Value {
    json!([
        {
            "id": 1,
            "productName": "Leaf Rake",
            "productCode": "GDN-0011",
            "description": "Leaf rake with 48-inch wooden handle",
            "price": 19.95,
            "categoryId": 1,
            "quantityInStock": 15,
            "supplierIds": [1, 2]
        },
        {
            "id": 5,
            "productName": "Hammer",
            "productCode": "TBX-0048",
            "description": "Curved claw steel hammer",
            "price": 8.9,
            "categoryId": 3,
            "quantityInStock": 8,
            "supplierIds": [5, 6]
        }
    ])
}

fn categories_body() -> Value {
    json!([
        { "id": 1, "name": "Garden" },
        { "id": 3, "name": "Toolbox" }
    ])
}

fn suppliers_body() -> Value {
    json!([
        { "id": 1, "name": "Acme Gizmo", "cost": 12, "minQuantity": 12 },
        { "id": 5, "name": "Acme Tools", "cost": 6, "minQuantity": 24 }
    ])
}

fn healthy_catalog() -> Router {
    Router::new()
        .route("/api/products", get(|| async { axum::Json(products_body()) }))
        .route(
            "/api/productCategories",
            get(|| async { axum::Json(categories_body()) }),
        )
        .route("/api/suppliers", get(|| async { axum::Json(suppliers_body()) }))
}

fn failing_catalog() -> Router {
    let boom = || async {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": "boom" })),
        )
    };
    Router::new()
        .route("/api/products", get(boom))
        .route("/api/productCategories", get(boom))
        .route("/api/suppliers", get(|| async { axum::Json(json!([])) }))
}

#[tokio::test]
async fn http_client_decodes_collections() {
    let srv = TestServer::spawn(healthy_catalog()).await;
    let client = HttpCatalogClient::new(&srv.config());

    let products = client.fetch_products().await.unwrap();
    let categories = client.fetch_categories().await.unwrap();
    let suppliers = client.fetch_suppliers().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[1].product_name, "Hammer");
    assert_eq!(categories[1].name, "Toolbox");
    assert_eq!(suppliers[1].minimum_quantity, 24);
}

#[tokio::test]
async fn http_client_maps_backend_status_and_body() {
    let srv = TestServer::spawn(failing_catalog()).await;
    let client = HttpCatalogClient::new(&srv.config());

    let err = client.fetch_products().await.unwrap_err();

    assert_eq!(
        err,
        FetchError::Backend {
            status: 500,
            error: "boom".to_string()
        }
    );
    assert_eq!(err.user_message(), "Backend returned code 500: boom");
}

#[tokio::test]
async fn http_client_reports_malformed_bodies_as_decode_errors() {
    let app = Router::new().route(
        "/api/products",
        get(|| async { axum::Json(json!({ "not": "a list" })) }),
    );
    let srv = TestServer::spawn(app).await;

    let err = HttpCatalogClient::new(&srv.config())
        .fetch_products()
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
    assert!(err.user_message().starts_with("An error occurred: "));
}

#[tokio::test]
async fn http_client_reports_unreachable_backend_as_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = CatalogConfig::with_api_url(format!("http://{}", addr));
    let err = HttpCatalogClient::new(&config)
        .fetch_categories()
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn http_client_sends_bearer_token_when_configured() {
    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let app = Router::new().route(
        "/api/products",
        get(move |headers: HeaderMap| {
            let sink = Arc::clone(&sink);
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                *sink.lock().unwrap() = auth;
                axum::Json(json!([]))
            }
        }),
    );
    let srv = TestServer::spawn(app).await;

    let mut config = srv.config();
    config.auth_token = Some("secret-token".to_string());
    HttpCatalogClient::new(&config)
        .fetch_products()
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn product_list_end_to_end_over_http() {
    let srv = TestServer::spawn(healthy_catalog()).await;
    let catalog = Arc::new(CatalogService::new(Arc::new(HttpCatalogClient::new(
        &srv.config(),
    ))));
    let presenter = ProductListPresenter::new(Arc::clone(&catalog));
    let view = presenter.attach();

    catalog.load().await;
    presenter.select_category("3").unwrap();
    presenter.add_product();

    let snapshot = view.snapshot();
    assert_eq!(snapshot.selected_category, CategoryFilter::Only(CategoryId::new(3)));
    let codes: Vec<&str> = snapshot
        .products
        .iter()
        .map(|p| p.product_code.as_str())
        .collect();
    assert_eq!(codes, vec!["TBX-0048", "TBX-0042"]);
    // Fetched product carries the markup, the added one does not.
    assert!((snapshot.products[0].price - 8.9 * 1.5).abs() < 1e-9);
    assert_eq!(snapshot.products[1].price, 8.9);
    assert_eq!(snapshot.products[0].category.as_deref(), Some("Toolbox"));
    assert_eq!(snapshot.error_message, None);
}

#[tokio::test]
async fn backend_failure_yields_message_and_empty_lists() {
    let srv = TestServer::spawn(failing_catalog()).await;
    let catalog = Arc::new(CatalogService::new(Arc::new(HttpCatalogClient::new(
        &srv.config(),
    ))));
    let presenter = ProductListPresenter::new(Arc::clone(&catalog));
    let view = presenter.attach();

    catalog.load().await;

    let snapshot = view.snapshot();
    assert!(snapshot.products.is_empty());
    assert!(snapshot.categories.is_empty());
    let message = snapshot.error_message.unwrap();
    assert!(message.contains("Backend returned code 500"), "{message}");
}

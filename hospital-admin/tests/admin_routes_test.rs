//! End-to-end tests for the admin console router.
//!
//! Each test builds the full axum app on a throwaway SQLite database and
//! drives it with `tower::ServiceExt::oneshot`, the way a browser would:
//! form posts, 303 redirects and the session cookie.

#![cfg(feature = "sqlite")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use hospital_admin::admin::{AdminState, SESSION_COOKIE, app_router};
use hospital_admin::auth::Role;
use hospital_admin::config::DatabaseConfig;
use hospital_admin::db::{Database, DbPool};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _temp: TempDir,
    pool: DbPool,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let db = Database::new(&DatabaseConfig::default(), temp.path())
            .await
            .unwrap();
        let pool = db.pool();
        let state = Arc::new(AdminState::new(pool.clone(), 3600));

        state
            .sessions
            .create_user("admin", "s3cret", Role::Administrator)
            .await
            .unwrap();

        Self {
            _temp: temp,
            pool,
            router: app_router(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&self, path: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Sign in and return the `name=value` cookie pair.
    async fn login(&self, username: &str, password: &str) -> Option<String> {
        let response = self
            .post(
                "/admin/login",
                None,
                &format!("username={username}&password={password}"),
            )
            .await;
        let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
        let pair = set_cookie.split(';').next()?.to_string();
        assert!(pair.starts_with(SESSION_COOKIE));
        Some(pair)
    }

    async fn admin_cookie(&self) -> String {
        self.login("admin", "s3cret")
            .await
            .expect("administrator login should succeed")
    }

    async fn insert_patient(&self, name: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO patient (name, contact_info) VALUES (?, '') RETURNING patient_id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .unwrap();
        id
    }
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_unauthenticated_requests_redirect_to_login() {
    let app = TestApp::new().await;

    for path in [
        "/admin/dashboard",
        "/admin/bills",
        "/admin/departments",
        "/admin/medicines",
        "/admin/resources",
        "/admin/staff",
    ] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&response), "/admin/login");
        assert!(body_text(response).await.is_empty());
    }

    let response = app
        .post("/admin/medicines", None, "delete_medicine=1&medicine_id=1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn test_unknown_cookie_redirects_to_login() {
    let app = TestApp::new().await;
    let response = app
        .get("/admin/bills", Some(&format!("{SESSION_COOKIE}=not-a-session")))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn test_root_redirects_to_dashboard() {
    let app = TestApp::new().await;
    for path in ["/", "/admin", "/admin/"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&response), "/admin/dashboard");
    }
}

#[tokio::test]
async fn test_login_rejects_bad_password_and_non_admins() {
    let app = TestApp::new().await;
    assert!(app.login("admin", "wrong").await.is_none());

    let response = app
        .post("/admin/login", None, "username=admin&password=wrong")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Invalid username or password"));

    let store = hospital_admin::auth::SessionStore::new(app.pool.clone());
    store
        .create_user("frontdesk", "desk", Role::Receptionist)
        .await
        .unwrap();
    assert!(app.login("frontdesk", "desk").await.is_none());
}

#[tokio::test]
async fn test_login_sets_strict_http_only_cookie() {
    let app = TestApp::new().await;
    let response = app
        .post("/admin/login", None, "username=admin&password=s3cret")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/dashboard");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let value = cookie.split(';').next().unwrap();
    let session_id = value.trim_start_matches(&format!("{SESSION_COOKIE}="));
    assert_eq!(session_id.len(), 64);
}

#[tokio::test]
async fn test_empty_listings_render() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    for (path, empty) in [
        ("/admin/bills", "No bills found"),
        ("/admin/departments", "No departments found"),
        ("/admin/medicines", "No medicines found"),
        ("/admin/resources", "No resources found"),
    ] {
        let response = app.get(path, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        assert!(body_text(response).await.contains(empty), "GET {path}");
    }
}

#[tokio::test]
async fn test_failed_reads_render_banner_and_empty_dropdown() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;
    app.insert_patient("Jane Roe").await;

    sqlx::query("DROP TABLE patient")
        .execute(&app.pool)
        .await
        .unwrap();

    let response = app.get("/admin/bills", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"id="load-error""#));
    assert!(body.contains("Could not load bills"));
    assert!(body.contains("No bills found"));
    assert!(!body.contains("Jane Roe"));
    assert!(!body.contains("no such table"));
}

#[tokio::test]
async fn test_failed_listing_keeps_working_dropdown() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;
    app.post(
        "/admin/departments",
        Some(&cookie),
        "add_department=1&name=Radiology&description=Imaging&head_doctor_id=",
    )
    .await;

    sqlx::query("DROP TABLE resource")
        .execute(&app.pool)
        .await
        .unwrap();

    let response = app.get("/admin/resources", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"id="load-error""#));
    assert!(body.contains("No resources found"));
    assert!(body.contains("Radiology"));
}

#[tokio::test]
async fn test_add_bill_redirects_and_flashes_once() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;
    let patient_id = app.insert_patient("Jane Roe").await;

    let response = app
        .post(
            "/admin/bills",
            Some(&cookie),
            &format!("add_bill=1&patient_id={patient_id}&amount=150.00&description=X-ray&status=Unpaid"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/bills");

    let page = body_text(app.get("/admin/bills", Some(&cookie)).await).await;
    assert!(page.contains("Bill added successfully"));
    assert!(page.contains("150.00"));
    assert!(page.contains("Unpaid"));
    assert!(page.contains("X-ray"));
    assert!(page.contains("Jane Roe"));

    let again = body_text(app.get("/admin/bills", Some(&cookie)).await).await;
    assert!(!again.contains("Bill added successfully"));
    assert!(again.contains("150.00"));
}

#[tokio::test]
async fn test_bill_storage_failure_is_opaque() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    let response = app
        .post(
            "/admin/bills",
            Some(&cookie),
            "add_bill=1&patient_id=999&amount=10&description=Lab&status=Paid",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("The change could not be saved"));
    assert!(!page.contains("FOREIGN KEY"));
    assert!(page.contains("No bills found"));
}

#[tokio::test]
async fn test_invalid_status_is_rejected_before_storage() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;
    let patient_id = app.insert_patient("Jane Roe").await;

    let response = app
        .post(
            "/admin/bills",
            Some(&cookie),
            &format!("add_bill=1&patient_id={patient_id}&amount=10&description=Lab&status=Overdue"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Status is invalid"));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bill")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_department_without_head_shows_not_assigned() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    let response = app
        .post(
            "/admin/departments",
            Some(&cookie),
            "add_department=1&name=Cardiology&description=Heart+care&head_doctor_id=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = body_text(app.get("/admin/departments", Some(&cookie)).await).await;
    assert!(page.contains("Cardiology"));
    assert!(page.contains("Not Assigned"));
}

#[tokio::test]
async fn test_medicine_edit_and_delete() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    let added = app
        .post(
            "/admin/medicines",
            Some(&cookie),
            "add_medicine=1&name=Paracetamol&description=Pain+relief&dosage_form=Tablet&stock_quantity=500&category=Analgesics",
        )
        .await;
    assert_eq!(added.status(), StatusCode::SEE_OTHER);

    let (id,): (i64,) = sqlx::query_as("SELECT medicine_id FROM medicine")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let edited = app
        .post(
            "/admin/medicines",
            Some(&cookie),
            &format!("edit_medicine=1&medicine_id={id}&name=Paracetamol&description=Pain+relief&dosage_form=Tablet&stock_quantity=480&category=Analgesics"),
        )
        .await;
    assert_eq!(edited.status(), StatusCode::SEE_OTHER);
    let page = body_text(app.get("/admin/medicines", Some(&cookie)).await).await;
    assert!(page.contains("Medicine updated successfully"));
    assert!(page.contains("480"));

    let deleted = app
        .post(
            "/admin/medicines",
            Some(&cookie),
            &format!("delete_medicine=1&medicine_id={id}"),
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::SEE_OTHER);
    let page = body_text(app.get("/admin/medicines", Some(&cookie)).await).await;
    assert!(page.contains("No medicines found"));

    // Deleting again still reports success
    let again = app
        .post(
            "/admin/medicines",
            Some(&cookie),
            &format!("delete_medicine=1&medicine_id={id}"),
        )
        .await;
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_negative_stock_rerenders_with_message() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    let response = app
        .post(
            "/admin/medicines",
            Some(&cookie),
            "add_medicine=1&name=Paracetamol&description=x&dosage_form=Tablet&stock_quantity=-1&category=x",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Stock quantity is invalid"));
}

#[tokio::test]
async fn test_resource_without_department_shows_na() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    let response = app
        .post(
            "/admin/resources",
            Some(&cookie),
            "add_resource=1&type=bed&name=Bed+12&department_id=&status=available&details=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Details is required"));

    let response = app
        .post(
            "/admin/resources",
            Some(&cookie),
            "add_resource=1&type=bed&name=Bed+12&department_id=&status=available&details=Ward+3",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = body_text(app.get("/admin/resources", Some(&cookie)).await).await;
    assert!(page.contains("Bed 12"));
    assert!(page.contains("BED"));
    assert!(page.contains("AVAILABLE"));
    assert!(page.contains("<td>N/A</td>"));
}

#[tokio::test]
async fn test_staff_doctor_add_and_delete() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    let response = app
        .post(
            "/admin/staff",
            Some(&cookie),
            "add_staff=1&username=mgrey&password=scalpel&role=Doctor&name=Meredith+Grey&specialization=Surgery&contact_info=555-0142&department_id=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/staff");

    let page = body_text(app.get("/admin/staff", Some(&cookie)).await).await;
    assert!(page.contains("Staff member added successfully"));
    assert!(page.contains("Meredith Grey"));

    let (user_id, password): (i64, String) =
        sqlx::query_as(r#"SELECT user_id, password FROM "user" WHERE username = 'mgrey'"#)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_ne!(password, "scalpel");

    let response = app
        .post(
            "/admin/staff",
            Some(&cookie),
            &format!("delete_staff=1&user_id={user_id}"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (doctors,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM doctor")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(doctors, 0);
}

#[tokio::test]
async fn test_dashboard_counts_and_logout() {
    let app = TestApp::new().await;
    let cookie = app.admin_cookie().await;

    let page = body_text(app.get("/admin/dashboard", Some(&cookie)).await).await;
    assert!(page.contains("Departments"));
    assert!(page.contains("Staff"));

    let response = app.post("/admin/logout", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");

    let response = app.get("/admin/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
}

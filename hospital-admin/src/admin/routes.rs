//! Admin route handlers.
//!
//! Login, logout, dashboard and the router tying in the entity screens from
//! [`crate::admin::pages`].

use crate::admin::middleware::{AdminState, SESSION_COOKIE};
use crate::admin::pages;
use crate::admin::templates::{BaseContext, CountTile, DashboardTemplate, LoginTemplate};
use crate::db;
use crate::guard::LOGIN_PATH;
use crate::sql;
use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Build the whole application: root redirects plus the `/admin` tree.
pub fn app_router(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/", get(to_dashboard))
        .route("/admin", get(to_dashboard))
        .route("/admin/", get(to_dashboard))
        .nest("/admin", admin_router(state))
}

/// Build the admin router.
pub fn admin_router(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", post(logout))
        .route("/dashboard", get(dashboard))
        .route("/bills", get(pages::bills_page).post(pages::bills_submit))
        .route(
            "/departments",
            get(pages::departments_page).post(pages::departments_submit),
        )
        .route(
            "/medicines",
            get(pages::medicines_page).post(pages::medicines_submit),
        )
        .route(
            "/resources",
            get(pages::resources_page).post(pages::resources_submit),
        )
        .route("/staff", get(pages::staff_page).post(pages::staff_submit))
        .with_state(state)
}

async fn to_dashboard() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

/// Render a template, falling back to the error text.
pub(crate) fn render<T: Template>(template: &T) -> Response {
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {e}")),
    )
    .into_response()
}

/// Login page handler.
async fn login_page(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    // If already logged in, redirect to dashboard
    if state.require_admin(&jar).await.is_ok() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    render(&LoginTemplate { error: None })
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

/// Login form submission handler.
async fn login_submit(
    State(state): State<Arc<AdminState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let session_id = match state
        .sessions
        .authenticate(
            form.username.trim(),
            &form.password,
            state.session_timeout_secs,
        )
        .await
    {
        Ok(Some(session_id)) => session_id,
        Ok(None) => {
            warn!(username = %form.username.trim(), "Rejected console login");
            return render(&LoginTemplate {
                error: Some("Invalid username or password".to_string()),
            });
        }
        Err(e) => {
            error!("Login error: {:#}", e);
            return render(&LoginTemplate {
                error: Some("An error occurred. Please try again.".to_string()),
            });
        }
    };

    info!(username = %form.username.trim(), "Administrator signed in");

    let cookie = format!(
        "{SESSION_COOKIE}={session_id}; Path=/admin; HttpOnly; SameSite=Strict; Max-Age={}",
        state.session_timeout_secs
    );

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, DASHBOARD_PATH.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

/// Logout handler.
async fn logout(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && let Err(e) = state.sessions.delete_session(cookie.value()).await
    {
        error!("Failed to delete session: {:#}", e);
    }

    // Clear cookie by expiring it immediately
    let cookie = format!("{SESSION_COOKIE}=; Path=/admin; HttpOnly; SameSite=Strict; Max-Age=0");

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, LOGIN_PATH.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

/// Dashboard handler.
async fn dashboard(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    let mut ctx = match state.require_admin(&jar).await {
        Ok(ctx) => ctx,
        Err(redirect) => return redirect,
    };
    let flash = state.take_flash(&mut ctx).await;

    let counters: [(&'static str, &'static str, &'static str); 6] = [
        ("Bills", sql::COUNT_BILLS, pages::BILLS_PATH),
        ("Unpaid bills", sql::COUNT_UNPAID_BILLS, pages::BILLS_PATH),
        ("Departments", sql::COUNT_DEPARTMENTS, pages::DEPARTMENTS_PATH),
        ("Medicines", sql::COUNT_MEDICINES, pages::MEDICINES_PATH),
        ("Resources", sql::COUNT_RESOURCES, pages::RESOURCES_PATH),
        ("Staff", sql::COUNT_STAFF, pages::STAFF_PATH),
    ];

    let mut tiles = Vec::with_capacity(counters.len());
    for (label, query, href) in counters {
        let value = match db::count(&state.pool, query).await {
            Ok(n) => n.to_string(),
            Err(e) => {
                error!(label, "Failed to count rows: {}", e);
                "-".to_string()
            }
        };
        tiles.push(CountTile { label, value, href });
    }

    render(&DashboardTemplate {
        base: BaseContext {
            username: ctx.username,
            active: "dashboard",
            flash,
            error: None,
            load_error: None,
        },
        tiles,
    })
}

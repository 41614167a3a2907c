//! Entity screens: bills, departments, medicines, resources and staff.
//!
//! Every screen answers GET with its listing and POST with exactly one
//! mutation. A successful mutation stores a flash message on the session and
//! redirects back to the listing; a failed one re-renders the listing with the
//! error inline.

use crate::admin::middleware::AdminState;
use crate::admin::routes::render;
use crate::admin::templates::{
    BaseContext, BillsTemplate, DepartmentsTemplate, MedicinesTemplate, ResourcesTemplate,
    StaffTemplate,
};
use crate::auth::Role;
use crate::bill::BillInput;
use crate::department::DepartmentInput;
use crate::error::Result;
use crate::forms::{FormFields, LookupOption, Mutation};
use crate::guard::AdminContext;
use crate::medicine::MedicineInput;
use crate::resource::ResourceInput;
use crate::staff;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{error, warn};

pub const BILLS_PATH: &str = "/admin/bills";
pub const DEPARTMENTS_PATH: &str = "/admin/departments";
pub const MEDICINES_PATH: &str = "/admin/medicines";
pub const RESOURCES_PATH: &str = "/admin/resources";
pub const STAFF_PATH: &str = "/admin/staff";

/// Turn a mutation outcome into the redirect, or the message to re-render with.
async fn finish(
    state: &AdminState,
    ctx: &AdminContext,
    entity: &'static str,
    outcome: Result<&'static str>,
    listing: &'static str,
) -> std::result::Result<Response, String> {
    match outcome {
        Ok(message) => {
            if let Err(e) = state.sessions.set_flash(&ctx.session_id, message).await {
                error!(entity, "Failed to store flash message: {:#}", e);
            }
            Ok(Redirect::to(listing).into_response())
        }
        Err(e) => {
            if e.is_storage() {
                error!(entity, user = %ctx.username, "Mutation failed: {}", e);
            } else {
                warn!(entity, "Mutation rejected: {}", e);
            }
            Err(e.user_message())
        }
    }
}

/// Listing rows, or an empty table plus a banner when the read fails.
fn load_rows<T>(result: Result<Vec<T>>, what: &'static str) -> (Vec<T>, Option<String>) {
    match result {
        Ok(rows) => (rows, None),
        Err(e) => {
            error!(what, "Failed to load listing: {}", e);
            (
                Vec::new(),
                Some(format!("Could not load {what}. Please try again later.")),
            )
        }
    }
}

/// Dropdown entries; a failed lookup leaves the dropdown empty.
fn load_options(result: Result<Vec<LookupOption>>, what: &'static str) -> Vec<LookupOption> {
    result.unwrap_or_else(|e| {
        warn!(what, "Failed to load lookup options: {}", e);
        Vec::new()
    })
}

async fn base_context(
    state: &AdminState,
    mut ctx: AdminContext,
    active: &'static str,
    error: Option<String>,
    load_error: Option<String>,
) -> BaseContext {
    let flash = state.take_flash(&mut ctx).await;
    BaseContext {
        username: ctx.username,
        active,
        flash,
        error,
        load_error,
    }
}

// =============================================================================
// Bills
// =============================================================================

pub async fn bills_page(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    match state.require_admin(&jar).await {
        Ok(ctx) => render_bills(&state, ctx, None).await,
        Err(redirect) => redirect,
    }
}

pub async fn bills_submit(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
    Form(fields): Form<FormFields>,
) -> Response {
    let ctx = match state.require_admin(&jar).await {
        Ok(ctx) => ctx,
        Err(redirect) => return redirect,
    };

    let outcome = match Mutation::from_form(&fields, "bill", "bill_id", BillInput::from_form) {
        Ok(mutation) => state.bills.apply(mutation).await,
        Err(e) => Err(e.into()),
    };

    match finish(&state, &ctx, "bill", outcome, BILLS_PATH).await {
        Ok(redirect) => redirect,
        Err(message) => render_bills(&state, ctx, Some(message)).await,
    }
}

async fn render_bills(state: &AdminState, ctx: AdminContext, error: Option<String>) -> Response {
    let (bills, load_error) = load_rows(state.bills.list().await, "bills");
    let patients = load_options(state.bills.patient_options().await, "patients");

    render(&BillsTemplate {
        base: base_context(state, ctx, "bills", error, load_error).await,
        bills,
        patients,
        statuses: BillsTemplate::statuses(),
    })
}

// =============================================================================
// Departments
// =============================================================================

pub async fn departments_page(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    match state.require_admin(&jar).await {
        Ok(ctx) => render_departments(&state, ctx, None).await,
        Err(redirect) => redirect,
    }
}

pub async fn departments_submit(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
    Form(fields): Form<FormFields>,
) -> Response {
    let ctx = match state.require_admin(&jar).await {
        Ok(ctx) => ctx,
        Err(redirect) => return redirect,
    };

    let outcome = match Mutation::from_form(
        &fields,
        "department",
        "department_id",
        DepartmentInput::from_form,
    ) {
        Ok(mutation) => state.departments.apply(mutation).await,
        Err(e) => Err(e.into()),
    };

    match finish(&state, &ctx, "department", outcome, DEPARTMENTS_PATH).await {
        Ok(redirect) => redirect,
        Err(message) => render_departments(&state, ctx, Some(message)).await,
    }
}

async fn render_departments(
    state: &AdminState,
    ctx: AdminContext,
    error: Option<String>,
) -> Response {
    let (departments, load_error) = load_rows(state.departments.list().await, "departments");
    let doctors = load_options(state.departments.doctor_options().await, "doctors");

    render(&DepartmentsTemplate {
        base: base_context(state, ctx, "departments", error, load_error).await,
        departments,
        doctors,
    })
}

// =============================================================================
// Medicines
// =============================================================================

pub async fn medicines_page(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    match state.require_admin(&jar).await {
        Ok(ctx) => render_medicines(&state, ctx, None).await,
        Err(redirect) => redirect,
    }
}

pub async fn medicines_submit(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
    Form(fields): Form<FormFields>,
) -> Response {
    let ctx = match state.require_admin(&jar).await {
        Ok(ctx) => ctx,
        Err(redirect) => return redirect,
    };

    let outcome = match Mutation::from_form(
        &fields,
        "medicine",
        "medicine_id",
        MedicineInput::from_form,
    ) {
        Ok(mutation) => state.medicines.apply(mutation).await,
        Err(e) => Err(e.into()),
    };

    match finish(&state, &ctx, "medicine", outcome, MEDICINES_PATH).await {
        Ok(redirect) => redirect,
        Err(message) => render_medicines(&state, ctx, Some(message)).await,
    }
}

async fn render_medicines(state: &AdminState, ctx: AdminContext, error: Option<String>) -> Response {
    let (medicines, load_error) = load_rows(state.medicines.list().await, "medicines");

    render(&MedicinesTemplate {
        base: base_context(state, ctx, "medicines", error, load_error).await,
        medicines,
    })
}

// =============================================================================
// Resources
// =============================================================================

pub async fn resources_page(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    match state.require_admin(&jar).await {
        Ok(ctx) => render_resources(&state, ctx, None).await,
        Err(redirect) => redirect,
    }
}

pub async fn resources_submit(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
    Form(fields): Form<FormFields>,
) -> Response {
    let ctx = match state.require_admin(&jar).await {
        Ok(ctx) => ctx,
        Err(redirect) => return redirect,
    };

    let outcome = match Mutation::from_form(
        &fields,
        "resource",
        "resource_id",
        ResourceInput::from_form,
    ) {
        Ok(mutation) => state.resources.apply(mutation).await,
        Err(e) => Err(e.into()),
    };

    match finish(&state, &ctx, "resource", outcome, RESOURCES_PATH).await {
        Ok(redirect) => redirect,
        Err(message) => render_resources(&state, ctx, Some(message)).await,
    }
}

async fn render_resources(state: &AdminState, ctx: AdminContext, error: Option<String>) -> Response {
    let (resources, load_error) = load_rows(state.resources.list().await, "resources");
    let departments = load_options(state.departments.options().await, "departments");

    render(&ResourcesTemplate {
        base: base_context(state, ctx, "resources", error, load_error).await,
        resources,
        departments,
        types: ResourcesTemplate::types(),
        statuses: ResourcesTemplate::statuses(),
    })
}

// =============================================================================
// Staff
// =============================================================================

pub async fn staff_page(State(state): State<Arc<AdminState>>, jar: CookieJar) -> Response {
    match state.require_admin(&jar).await {
        Ok(ctx) => render_staff(&state, ctx, None).await,
        Err(redirect) => redirect,
    }
}

pub async fn staff_submit(
    State(state): State<Arc<AdminState>>,
    jar: CookieJar,
    Form(fields): Form<FormFields>,
) -> Response {
    let ctx = match state.require_admin(&jar).await {
        Ok(ctx) => ctx,
        Err(redirect) => return redirect,
    };

    let outcome = match staff::mutation_from_form(&fields) {
        Ok(mutation) => state.staff.apply(mutation).await,
        Err(e) => Err(e.into()),
    };

    match finish(&state, &ctx, "staff", outcome, STAFF_PATH).await {
        Ok(redirect) => redirect,
        Err(message) => render_staff(&state, ctx, Some(message)).await,
    }
}

async fn render_staff(state: &AdminState, ctx: AdminContext, error: Option<String>) -> Response {
    let (staff, load_error) = load_rows(state.staff.list().await, "staff");
    let departments = load_options(state.departments.options().await, "departments");

    render(&StaffTemplate {
        base: base_context(state, ctx, "staff", error, load_error).await,
        staff,
        departments,
        roles: Role::ALL.iter().map(|r| r.as_str()).collect(),
    })
}

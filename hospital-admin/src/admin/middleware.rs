//! Admin state, session cookie and the per-request session check.

use crate::auth::SessionStore;
use crate::bill::BillStore;
use crate::db::DbPool;
use crate::department::DepartmentStore;
use crate::guard::{self, Access, AdminContext, LOGIN_PATH};
use crate::medicine::MedicineStore;
use crate::resource::ResourceStore;
use crate::staff::StaffStore;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use tracing::{error, warn};

/// Cookie name for the session ID
pub const SESSION_COOKIE: &str = "hospital_admin_session";

/// State shared by admin routes
pub struct AdminState {
    /// Pool for ad-hoc reads such as dashboard counts
    pub pool: DbPool,
    /// Admin sessions and flash messages
    pub sessions: SessionStore,
    /// Session timeout in seconds
    pub session_timeout_secs: u64,
    pub bills: BillStore,
    pub departments: DepartmentStore,
    pub medicines: MedicineStore,
    pub resources: ResourceStore,
    pub staff: StaffStore,
}

impl AdminState {
    pub fn new(pool: DbPool, session_timeout_secs: u64) -> Self {
        Self {
            sessions: SessionStore::new(pool.clone()),
            session_timeout_secs,
            bills: BillStore::new(pool.clone()),
            departments: DepartmentStore::new(pool.clone()),
            medicines: MedicineStore::new(pool.clone()),
            resources: ResourceStore::new(pool.clone()),
            staff: StaffStore::new(pool.clone()),
            pool,
        }
    }

    /// Run the session guard for this request.
    ///
    /// Returns the admin context, or the redirect to answer with. A session
    /// lookup failure is treated like a missing session.
    pub async fn require_admin(&self, jar: &CookieJar) -> Result<AdminContext, Response> {
        let session = match jar.get(SESSION_COOKIE) {
            Some(cookie) => match self.sessions.validate_session(cookie.value()).await {
                Ok(session) => session,
                Err(e) => {
                    warn!("Session lookup failed: {:#}", e);
                    None
                }
            },
            None => None,
        };

        match guard::authorize(session) {
            Access::Allow(ctx) => Ok(ctx),
            Access::Redirect => Err(Redirect::to(LOGIN_PATH).into_response()),
        }
    }

    /// Hand out the pending flash message and clear it so it renders once.
    pub async fn take_flash(&self, ctx: &mut AdminContext) -> Option<String> {
        let flash = ctx.flash.take()?;
        if let Err(e) = self.sessions.clear_flash(&ctx.session_id).await {
            error!("Failed to clear flash message: {:#}", e);
        }
        Some(flash)
    }
}

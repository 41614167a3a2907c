//! Staff accounts and their doctor/nurse detail rows.
//!
//! A staff member is a `"user"` row plus, for doctors and nurses, exactly one
//! detail row keyed by the same user id. Adding writes both rows inside one
//! transaction so an account without its details is never visible. Deleting
//! removes the account and lets the schema cascade to the detail row and any
//! open sessions.

use crate::auth::{self, Role};
use crate::db::{DbPool, DbRow};
use crate::error::{Error, Result, ValidationError};
use crate::forms::{FormFields, Mutation};
use crate::sql;
use sqlx::Row;
use tracing::{debug, info};

/// Shown when a staff member has no department.
pub const NO_DEPARTMENT: &str = "N/A";

/// Add payload: the account plus whatever details its role requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffMember {
    pub username: String,
    pub password: String,
    pub profile: StaffProfile,
}

/// Role together with its detail fields. Doctors and nurses cannot be
/// constructed without them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffProfile {
    Doctor(DoctorDetails),
    Nurse(NurseDetails),
    Receptionist,
    Administrator,
}

impl StaffProfile {
    pub fn role(&self) -> Role {
        match self {
            StaffProfile::Doctor(_) => Role::Doctor,
            StaffProfile::Nurse(_) => Role::Nurse,
            StaffProfile::Receptionist => Role::Receptionist,
            StaffProfile::Administrator => Role::Administrator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorDetails {
    pub name: String,
    pub specialization: String,
    pub contact_info: String,
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NurseDetails {
    pub name: String,
    pub contact_info: String,
    pub department_id: Option<i64>,
}

impl NewStaffMember {
    pub fn from_form(form: &FormFields) -> Result<Self, ValidationError> {
        let username = form.required("username", "Username")?;
        let password = form.required("password", "Password")?;
        let role: Role = form.parsed("role", "Role")?;

        let profile = match role {
            Role::Doctor => StaffProfile::Doctor(DoctorDetails {
                name: form.required("name", "Name")?,
                specialization: form.required("specialization", "Specialization")?,
                contact_info: form.required("contact_info", "Contact info")?,
                department_id: form.optional_id("department_id", "Department")?,
            }),
            Role::Nurse => StaffProfile::Nurse(NurseDetails {
                name: form.required("name", "Name")?,
                contact_info: form.required("contact_info", "Contact info")?,
                department_id: form.optional_id("department_id", "Department")?,
            }),
            Role::Receptionist => StaffProfile::Receptionist,
            Role::Administrator => StaffProfile::Administrator,
        };

        Ok(Self {
            username,
            password,
            profile,
        })
    }
}

/// Edit payload. Only detail fields change; username, password and role
/// stay as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffDetailsUpdate {
    pub name: String,
    pub contact_info: String,
    pub department_id: Option<i64>,
    /// Required when the account is a doctor, ignored for nurses.
    pub specialization: Option<String>,
}

impl StaffDetailsUpdate {
    pub fn from_form(form: &FormFields) -> Result<Self, ValidationError> {
        Ok(Self {
            name: form.required("name", "Name")?,
            contact_info: form.required("contact_info", "Contact info")?,
            department_id: form.optional_id("department_id", "Department")?,
            specialization: form.get("specialization").map(str::to_string),
        })
    }
}

pub type StaffMutation = Mutation<NewStaffMember, StaffDetailsUpdate>;

/// Parse a staff POST body into its mutation.
pub fn mutation_from_form(form: &FormFields) -> Result<StaffMutation, ValidationError> {
    Mutation::from_form_split(
        form,
        "staff",
        "user_id",
        NewStaffMember::from_form,
        StaffDetailsUpdate::from_form,
    )
}

/// One listing row, with name and department resolved from whichever detail
/// row exists.
#[derive(Debug, Clone)]
pub struct StaffRecord {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    /// Detail name, or the username for accounts without details.
    pub name: String,
    pub contact_info: String,
    pub specialization: String,
    pub department_id: Option<i64>,
    pub department_name: String,
    pub has_details: bool,
}

impl StaffRecord {
    fn from_row(row: DbRow) -> Result<Self, sqlx::Error> {
        let username: String = row.try_get("username")?;
        let name: Option<String> = row.try_get("name")?;
        let contact_info: Option<String> = row.try_get("contact_info")?;
        let specialization: Option<String> = row.try_get("specialization")?;
        let department_name: Option<String> = row.try_get("department_name")?;

        Ok(Self {
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            has_details: name.is_some(),
            name: name.unwrap_or_else(|| username.clone()),
            username,
            contact_info: contact_info.unwrap_or_default(),
            specialization: specialization.unwrap_or_default(),
            department_id: row.try_get("department_id")?,
            department_name: department_name.unwrap_or_else(|| NO_DEPARTMENT.to_string()),
        })
    }
}

/// Database-backed storage for staff accounts.
pub struct StaffStore {
    pool: DbPool,
}

impl StaffStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the account and its detail row atomically. Returns the user id.
    pub async fn add(&self, member: &NewStaffMember) -> Result<i64> {
        let password_hash =
            auth::hash_password(&member.password).map_err(|e| Error::PasswordHash(e.to_string()))?;
        let role = member.profile.role();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(sql::INSERT_USER)
            .bind(&member.username)
            .bind(&password_hash)
            .bind(role.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let user_id: i64 = row.try_get("user_id")?;

        match &member.profile {
            StaffProfile::Doctor(d) => {
                sqlx::query(sql::INSERT_DOCTOR)
                    .bind(user_id)
                    .bind(&d.name)
                    .bind(&d.specialization)
                    .bind(&d.contact_info)
                    .bind(d.department_id)
                    .execute(&mut *tx)
                    .await?;
            }
            StaffProfile::Nurse(n) => {
                sqlx::query(sql::INSERT_NURSE)
                    .bind(user_id)
                    .bind(&n.name)
                    .bind(&n.contact_info)
                    .bind(n.department_id)
                    .execute(&mut *tx)
                    .await?;
            }
            StaffProfile::Receptionist | StaffProfile::Administrator => {}
        }

        // Dropping `tx` on any early return above rolls both inserts back
        tx.commit().await?;

        info!(user_id, username = %member.username, role = %role, "Staff member added");
        Ok(user_id)
    }

    /// Overwrite the detail row of a doctor or nurse.
    pub async fn edit(&self, user_id: i64, update: &StaffDetailsUpdate) -> Result<()> {
        let row = sqlx::query(sql::SELECT_USER_ROLE)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Err(Error::NotFound("Staff member"));
        };

        let role: String = row.try_get("role")?;
        let result = match role.parse::<Role>() {
            Ok(Role::Doctor) => {
                let specialization = update
                    .specialization
                    .as_deref()
                    .ok_or(ValidationError::Missing("Specialization"))?;
                sqlx::query(sql::UPDATE_DOCTOR)
                    .bind(&update.name)
                    .bind(specialization)
                    .bind(&update.contact_info)
                    .bind(update.department_id)
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?
            }
            Ok(Role::Nurse) => {
                sqlx::query(sql::UPDATE_NURSE)
                    .bind(&update.name)
                    .bind(&update.contact_info)
                    .bind(update.department_id)
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?
            }
            _ => {
                debug!(user_id, role = %role, "Edit requested for account without details");
                return Err(ValidationError::invalid(
                    "Role",
                    format!("{role} accounts have no editable details"),
                )
                .into());
            }
        };

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Staff member"));
        }
        info!(user_id, "Staff member updated");
        Ok(())
    }

    /// Remove the account. Detail rows and sessions go with it.
    pub async fn delete(&self, user_id: i64) -> Result<()> {
        sqlx::query(sql::DELETE_USER)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!(user_id, "Staff member deleted");
        Ok(())
    }

    /// All accounts by role, then resolved name.
    pub async fn list(&self) -> Result<Vec<StaffRecord>> {
        let rows = sqlx::query(sql::SELECT_STAFF).fetch_all(&self.pool).await?;
        let staff = rows
            .into_iter()
            .map(StaffRecord::from_row)
            .collect::<Result<_, _>>()?;
        Ok(staff)
    }

    /// Run one mutation and return the message to flash on success.
    pub async fn apply(&self, mutation: StaffMutation) -> Result<&'static str> {
        match mutation {
            Mutation::Add(member) => {
                self.add(&member).await?;
                Ok("Staff member added successfully")
            }
            Mutation::Edit(user_id, update) => {
                self.edit(user_id, &update).await?;
                Ok("Staff member updated successfully")
            }
            Mutation::Delete(user_id) => {
                self.delete(user_id).await?;
                Ok("Staff member deleted successfully")
            }
        }
    }
}

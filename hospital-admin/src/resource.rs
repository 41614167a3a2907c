//! Physical resources: wards, rooms, beds and equipment.

use crate::db::{DbPool, DbRow};
use crate::error::{Error, Result, ValidationError};
use crate::forms::{FormFields, Mutation};
use crate::sql;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Shown when a resource belongs to no department.
pub const NO_DEPARTMENT: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Ward,
    Room,
    Bed,
    Equipment,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Ward,
        ResourceType::Room,
        ResourceType::Bed,
        ResourceType::Equipment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Ward => "WARD",
            ResourceType::Room => "ROOM",
            ResourceType::Bed => "BED",
            ResourceType::Equipment => "EQUIPMENT",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("must be one of WARD, ROOM, BED, EQUIPMENT (got '{s}')"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    Available,
    Occupied,
    Maintenance,
}

impl ResourceStatus {
    pub const ALL: [ResourceStatus; 3] = [
        ResourceStatus::Available,
        ResourceStatus::Occupied,
        ResourceStatus::Maintenance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceStatus::Available => "AVAILABLE",
            ResourceStatus::Occupied => "OCCUPIED",
            ResourceStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("must be one of AVAILABLE, OCCUPIED, MAINTENANCE (got '{s}')"))
    }
}

/// Validated add/edit payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInput {
    pub resource_type: ResourceType,
    pub name: String,
    pub department_id: Option<i64>,
    pub status: ResourceStatus,
    pub details: String,
}

impl ResourceInput {
    pub fn from_form(form: &FormFields) -> Result<Self, ValidationError> {
        Ok(Self {
            resource_type: form.parsed("type", "Type")?,
            name: form.required("name", "Name")?,
            department_id: form.optional_id("department_id", "Department")?,
            status: form.parsed("status", "Status")?,
            details: form.required("details", "Details")?,
        })
    }
}

/// Resource row with its department name resolved.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub resource_id: i64,
    pub resource_type: String,
    pub name: String,
    pub department_id: Option<i64>,
    pub department_name: String,
    pub status: String,
    pub details: String,
}

impl ResourceRecord {
    fn from_row(row: DbRow) -> Result<Self, sqlx::Error> {
        let department_name: Option<String> = row.try_get("department_name")?;
        Ok(Self {
            resource_id: row.try_get("resource_id")?,
            resource_type: row.try_get("type")?,
            name: row.try_get("name")?,
            department_id: row.try_get("department_id")?,
            department_name: department_name.unwrap_or_else(|| NO_DEPARTMENT.to_string()),
            status: row.try_get("status")?,
            details: row.try_get("details")?,
        })
    }
}

/// Database-backed storage for resources.
pub struct ResourceStore {
    pool: DbPool,
}

impl ResourceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, input: &ResourceInput) -> Result<i64> {
        let row = sqlx::query(sql::INSERT_RESOURCE)
            .bind(input.resource_type.as_str())
            .bind(&input.name)
            .bind(input.department_id)
            .bind(input.status.as_str())
            .bind(&input.details)
            .fetch_one(&self.pool)
            .await?;

        let resource_id: i64 = row.try_get("resource_id")?;
        info!(resource_id, kind = %input.resource_type, name = %input.name, "Resource added");
        Ok(resource_id)
    }

    pub async fn edit(&self, resource_id: i64, input: &ResourceInput) -> Result<()> {
        let result = sqlx::query(sql::UPDATE_RESOURCE)
            .bind(input.resource_type.as_str())
            .bind(&input.name)
            .bind(input.department_id)
            .bind(input.status.as_str())
            .bind(&input.details)
            .bind(resource_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Resource"));
        }
        info!(resource_id, status = %input.status, "Resource updated");
        Ok(())
    }

    pub async fn delete(&self, resource_id: i64) -> Result<()> {
        sqlx::query(sql::DELETE_RESOURCE)
            .bind(resource_id)
            .execute(&self.pool)
            .await?;

        info!(resource_id, "Resource deleted");
        Ok(())
    }

    /// All resources by type, then name.
    pub async fn list(&self) -> Result<Vec<ResourceRecord>> {
        let rows = sqlx::query(sql::SELECT_RESOURCES)
            .fetch_all(&self.pool)
            .await?;
        let resources = rows
            .into_iter()
            .map(ResourceRecord::from_row)
            .collect::<Result<_, _>>()?;
        Ok(resources)
    }

    /// Run one mutation and return the message to flash on success.
    pub async fn apply(&self, mutation: Mutation<ResourceInput>) -> Result<&'static str> {
        match mutation {
            Mutation::Add(input) => {
                self.add(&input).await?;
                Ok("Resource added successfully")
            }
            Mutation::Edit(resource_id, input) => {
                self.edit(resource_id, &input).await?;
                Ok("Resource updated successfully")
            }
            Mutation::Delete(resource_id) => {
                self.delete(resource_id).await?;
                Ok("Resource deleted successfully")
            }
        }
    }
}

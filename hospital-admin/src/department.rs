//! Hospital departments and their head doctors.

use crate::db::{self, DbPool, DbRow};
use crate::error::{Error, Result, ValidationError};
use crate::forms::{FormFields, LookupOption, Mutation};
use crate::sql;
use sqlx::Row;
use tracing::info;

/// Shown when a department has no head doctor.
pub const NOT_ASSIGNED: &str = "Not Assigned";

/// Validated add/edit payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentInput {
    pub name: String,
    pub description: String,
    pub head_doctor_id: Option<i64>,
}

impl DepartmentInput {
    pub fn from_form(form: &FormFields) -> Result<Self, ValidationError> {
        Ok(Self {
            name: form.required("name", "Name")?,
            description: form.required("description", "Description")?,
            head_doctor_id: form.optional_id("head_doctor_id", "Head doctor")?,
        })
    }
}

/// Department row with the head doctor's name resolved.
#[derive(Debug, Clone)]
pub struct DepartmentRecord {
    pub department_id: i64,
    pub name: String,
    pub description: String,
    pub head_doctor_id: Option<i64>,
    pub head_doctor_name: String,
}

impl DepartmentRecord {
    fn from_row(row: DbRow) -> Result<Self, sqlx::Error> {
        let head_doctor_name: Option<String> = row.try_get("head_doctor_name")?;
        Ok(Self {
            department_id: row.try_get("department_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            head_doctor_id: row.try_get("head_doctor_id")?,
            head_doctor_name: head_doctor_name.unwrap_or_else(|| NOT_ASSIGNED.to_string()),
        })
    }
}

/// Database-backed storage for departments.
pub struct DepartmentStore {
    pool: DbPool,
}

impl DepartmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, input: &DepartmentInput) -> Result<i64> {
        let row = sqlx::query(sql::INSERT_DEPARTMENT)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.head_doctor_id)
            .fetch_one(&self.pool)
            .await?;

        let department_id: i64 = row.try_get("department_id")?;
        info!(department_id, name = %input.name, "Department added");
        Ok(department_id)
    }

    pub async fn edit(&self, department_id: i64, input: &DepartmentInput) -> Result<()> {
        let result = sqlx::query(sql::UPDATE_DEPARTMENT)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.head_doctor_id)
            .bind(department_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Department"));
        }
        info!(department_id, "Department updated");
        Ok(())
    }

    /// Resources and staff pointing here lose their department reference.
    pub async fn delete(&self, department_id: i64) -> Result<()> {
        sqlx::query(sql::DELETE_DEPARTMENT)
            .bind(department_id)
            .execute(&self.pool)
            .await?;

        info!(department_id, "Department deleted");
        Ok(())
    }

    /// All departments by name.
    pub async fn list(&self) -> Result<Vec<DepartmentRecord>> {
        let rows = sqlx::query(sql::SELECT_DEPARTMENTS)
            .fetch_all(&self.pool)
            .await?;
        let departments = rows
            .into_iter()
            .map(DepartmentRecord::from_row)
            .collect::<Result<_, _>>()?;
        Ok(departments)
    }

    /// Doctors selectable as head of department.
    pub async fn doctor_options(&self) -> Result<Vec<LookupOption>> {
        Ok(db::lookup_options(&self.pool, sql::SELECT_DOCTOR_OPTIONS).await?)
    }

    /// Departments selectable on resource and staff forms.
    pub async fn options(&self) -> Result<Vec<LookupOption>> {
        Ok(db::lookup_options(&self.pool, sql::SELECT_DEPARTMENT_OPTIONS).await?)
    }

    /// Run one mutation and return the message to flash on success.
    pub async fn apply(&self, mutation: Mutation<DepartmentInput>) -> Result<&'static str> {
        match mutation {
            Mutation::Add(input) => {
                self.add(&input).await?;
                Ok("Department added successfully")
            }
            Mutation::Edit(department_id, input) => {
                self.edit(department_id, &input).await?;
                Ok("Department updated successfully")
            }
            Mutation::Delete(department_id) => {
                self.delete(department_id).await?;
                Ok("Department deleted successfully")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_head_doctor_is_none() {
        let form: FormFields = [
            ("name", "Cardiology"),
            ("description", "Heart care"),
            ("head_doctor_id", ""),
        ]
        .into_iter()
        .collect();
        let input = DepartmentInput::from_form(&form).unwrap();
        assert_eq!(input.head_doctor_id, None);
    }

    #[cfg(feature = "sqlite")]
    mod store {
        use super::*;

        fn cardiology(head_doctor_id: Option<i64>) -> DepartmentInput {
            DepartmentInput {
                name: "Cardiology".to_string(),
                description: "Heart care".to_string(),
                head_doctor_id,
            }
        }

        #[tokio::test]
        async fn test_empty_list() {
            let (_temp, pool) = db::test_pool().await;
            let store = DepartmentStore::new(pool);
            assert!(store.list().await.unwrap().is_empty());
            assert!(store.doctor_options().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_without_head_doctor_shows_not_assigned() {
            let (_temp, pool) = db::test_pool().await;
            let store = DepartmentStore::new(pool);
            store.add(&cardiology(None)).await.unwrap();

            let departments = store.list().await.unwrap();
            assert_eq!(departments.len(), 1);
            assert_eq!(departments[0].name, "Cardiology");
            assert_eq!(departments[0].head_doctor_id, None);
            assert_eq!(departments[0].head_doctor_name, NOT_ASSIGNED);
        }

        #[tokio::test]
        async fn test_ordered_by_name() {
            let (_temp, pool) = db::test_pool().await;
            let store = DepartmentStore::new(pool);
            for name in ["Radiology", "Cardiology", "Neurology"] {
                store
                    .add(&DepartmentInput {
                        name: name.to_string(),
                        description: "-".to_string(),
                        head_doctor_id: None,
                    })
                    .await
                    .unwrap();
            }

            let names: Vec<_> = store.list().await.unwrap().into_iter().map(|d| d.name).collect();
            assert_eq!(names, vec!["Cardiology", "Neurology", "Radiology"]);
        }

        #[tokio::test]
        async fn test_edit_and_delete() {
            let (_temp, pool) = db::test_pool().await;
            let store = DepartmentStore::new(pool);
            let id = store.add(&cardiology(None)).await.unwrap();

            let mut update = cardiology(None);
            update.description = "Cardiac surgery".to_string();
            store.edit(id, &update).await.unwrap();
            store.edit(id, &update).await.unwrap();
            assert_eq!(store.list().await.unwrap()[0].description, "Cardiac surgery");

            store.delete(id).await.unwrap();
            store.delete(id).await.unwrap();
            assert!(store.list().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_unknown_head_doctor_rejected_by_storage() {
            let (_temp, pool) = db::test_pool().await;
            let store = DepartmentStore::new(pool);
            let err = store.add(&cardiology(Some(42))).await.unwrap_err();
            assert!(err.is_storage());
        }
    }
}

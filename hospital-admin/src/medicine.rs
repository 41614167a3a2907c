//! Medicine inventory.

use crate::db::{DbPool, DbRow};
use crate::error::{Error, Result, ValidationError};
use crate::forms::{FormFields, Mutation, Quantity};
use crate::sql;
use sqlx::Row;
use tracing::info;

/// Validated add/edit payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineInput {
    pub name: String,
    pub description: String,
    pub dosage_form: String,
    pub stock_quantity: i64,
    pub category: String,
}

impl MedicineInput {
    pub fn from_form(form: &FormFields) -> Result<Self, ValidationError> {
        let Quantity(stock_quantity) = form.parsed("stock_quantity", "Stock quantity")?;
        Ok(Self {
            name: form.required("name", "Name")?,
            description: form.required("description", "Description")?,
            dosage_form: form.required("dosage_form", "Dosage form")?,
            stock_quantity,
            category: form.required("category", "Category")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineRecord {
    pub medicine_id: i64,
    pub name: String,
    pub description: String,
    pub dosage_form: String,
    pub stock_quantity: i64,
    pub category: String,
}

impl MedicineRecord {
    fn from_row(row: DbRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            medicine_id: row.try_get("medicine_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            dosage_form: row.try_get("dosage_form")?,
            stock_quantity: row.try_get("stock_quantity")?,
            category: row.try_get("category")?,
        })
    }
}

/// Database-backed storage for medicines.
pub struct MedicineStore {
    pool: DbPool,
}

impl MedicineStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, input: &MedicineInput) -> Result<i64> {
        let row = sqlx::query(sql::INSERT_MEDICINE)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.dosage_form)
            .bind(input.stock_quantity)
            .bind(&input.category)
            .fetch_one(&self.pool)
            .await?;

        let medicine_id: i64 = row.try_get("medicine_id")?;
        info!(medicine_id, name = %input.name, stock = input.stock_quantity, "Medicine added");
        Ok(medicine_id)
    }

    pub async fn edit(&self, medicine_id: i64, input: &MedicineInput) -> Result<()> {
        let result = sqlx::query(sql::UPDATE_MEDICINE)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.dosage_form)
            .bind(input.stock_quantity)
            .bind(&input.category)
            .bind(medicine_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Medicine"));
        }
        info!(medicine_id, stock = input.stock_quantity, "Medicine updated");
        Ok(())
    }

    pub async fn delete(&self, medicine_id: i64) -> Result<()> {
        sqlx::query(sql::DELETE_MEDICINE)
            .bind(medicine_id)
            .execute(&self.pool)
            .await?;

        info!(medicine_id, "Medicine deleted");
        Ok(())
    }

    /// All medicines by name.
    pub async fn list(&self) -> Result<Vec<MedicineRecord>> {
        let rows = sqlx::query(sql::SELECT_MEDICINES)
            .fetch_all(&self.pool)
            .await?;
        let medicines = rows
            .into_iter()
            .map(MedicineRecord::from_row)
            .collect::<Result<_, _>>()?;
        Ok(medicines)
    }

    /// Run one mutation and return the message to flash on success.
    pub async fn apply(&self, mutation: Mutation<MedicineInput>) -> Result<&'static str> {
        match mutation {
            Mutation::Add(input) => {
                self.add(&input).await?;
                Ok("Medicine added successfully")
            }
            Mutation::Edit(medicine_id, input) => {
                self.edit(medicine_id, &input).await?;
                Ok("Medicine updated successfully")
            }
            Mutation::Delete(medicine_id) => {
                self.delete(medicine_id).await?;
                Ok("Medicine deleted successfully")
            }
        }
    }
}

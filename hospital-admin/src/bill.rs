//! Patient billing.

use crate::db::{self, DbPool, DbRow};
use crate::error::{Error, Result, ValidationError};
use crate::forms::{Amount, FormFields, LookupOption, Mutation};
use crate::sql;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Payment state of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    Unpaid,
    Partial,
    Paid,
}

impl BillStatus {
    pub const ALL: [BillStatus; 3] = [BillStatus::Unpaid, BillStatus::Partial, BillStatus::Paid];

    pub fn as_str(self) -> &'static str {
        match self {
            BillStatus::Unpaid => "Unpaid",
            BillStatus::Partial => "Partial",
            BillStatus::Paid => "Paid",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BillStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("must be one of Unpaid, Partial, Paid (got '{s}')"))
    }
}

/// Validated add/edit payload.
#[derive(Debug, Clone, PartialEq)]
pub struct BillInput {
    pub patient_id: i64,
    pub amount: Amount,
    pub description: String,
    pub status: BillStatus,
}

impl BillInput {
    pub fn from_form(form: &FormFields) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            patient_id: form.required_id("patient_id", "Patient")?,
            amount: form.parsed("amount", "Amount")?,
            description: form.required("description", "Description")?,
            status: form.parsed("status", "Status")?,
        })
    }
}

/// Bill row joined with its patient's name.
#[derive(Debug, Clone)]
pub struct BillRecord {
    pub bill_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub amount: Amount,
    pub description: String,
    /// Stored text; rows written before status validation may hold anything.
    pub status: String,
    pub bill_date: String,
}

impl BillRecord {
    fn from_row(row: DbRow) -> std::result::Result<Self, sqlx::Error> {
        let bill_date: String = row.try_get("bill_date")?;
        Ok(Self {
            bill_id: row.try_get("bill_id")?,
            patient_id: row.try_get("patient_id")?,
            patient_name: row.try_get("patient_name")?,
            amount: Amount::from_cents(row.try_get("amount_cents")?),
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            bill_date: display_date(&bill_date),
        })
    }
}

fn display_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Database-backed storage for bills.
pub struct BillStore {
    pool: DbPool,
}

impl BillStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a bill dated now. Returns the new bill id.
    pub async fn add(&self, input: &BillInput) -> Result<i64> {
        let row = sqlx::query(sql::INSERT_BILL)
            .bind(input.patient_id)
            .bind(input.amount.cents())
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(db::format_timestamp(Utc::now()))
            .fetch_one(&self.pool)
            .await?;

        let bill_id: i64 = row.try_get("bill_id")?;
        info!(bill_id, patient_id = input.patient_id, amount = %input.amount, "Bill added");
        Ok(bill_id)
    }

    /// Overwrite every editable field. The original bill date is kept.
    pub async fn edit(&self, bill_id: i64, input: &BillInput) -> Result<()> {
        let result = sqlx::query(sql::UPDATE_BILL)
            .bind(input.patient_id)
            .bind(input.amount.cents())
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(bill_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Bill"));
        }
        info!(bill_id, "Bill updated");
        Ok(())
    }

    /// Delete by id. A missing id is not an error.
    pub async fn delete(&self, bill_id: i64) -> Result<()> {
        sqlx::query(sql::DELETE_BILL)
            .bind(bill_id)
            .execute(&self.pool)
            .await?;

        info!(bill_id, "Bill deleted");
        Ok(())
    }

    /// All bills, newest first.
    pub async fn list(&self) -> Result<Vec<BillRecord>> {
        let rows = sqlx::query(sql::SELECT_BILLS).fetch_all(&self.pool).await?;
        let bills = rows
            .into_iter()
            .map(BillRecord::from_row)
            .collect::<std::result::Result<_, _>>()?;
        Ok(bills)
    }

    /// Patients selectable on the bill forms.
    pub async fn patient_options(&self) -> Result<Vec<LookupOption>> {
        Ok(db::lookup_options(&self.pool, sql::SELECT_PATIENT_OPTIONS).await?)
    }

    /// Run one mutation and return the message to flash on success.
    pub async fn apply(&self, mutation: Mutation<BillInput>) -> Result<&'static str> {
        match mutation {
            Mutation::Add(input) => {
                self.add(&input).await?;
                Ok("Bill added successfully")
            }
            Mutation::Edit(bill_id, input) => {
                self.edit(bill_id, &input).await?;
                Ok("Bill updated successfully")
            }
            Mutation::Delete(bill_id) => {
                self.delete(bill_id).await?;
                Ok("Bill deleted successfully")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Unpaid".parse::<BillStatus>(), Ok(BillStatus::Unpaid));
        assert_eq!("paid".parse::<BillStatus>(), Ok(BillStatus::Paid));
        assert!("Overdue".parse::<BillStatus>().is_err());
    }

    #[test]
    fn test_input_from_form() {
        let input = BillInput::from_form(&form(&[
            ("patient_id", "1"),
            ("amount", "150"),
            ("description", "X-ray"),
            ("status", "unpaid"),
        ]))
        .unwrap();
        assert_eq!(input.amount.cents(), 15000);
        assert_eq!(input.status, BillStatus::Unpaid);

        let missing = BillInput::from_form(&form(&[("patient_id", "1"), ("amount", "1")]));
        assert_eq!(missing, Err(ValidationError::Missing("Description")));

        let bad_status = BillInput::from_form(&form(&[
            ("patient_id", "1"),
            ("amount", "1"),
            ("description", "x"),
            ("status", "Written off"),
        ]));
        assert!(matches!(bad_status, Err(ValidationError::Invalid { field: "Status", .. })));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2026-01-02T03:04:05Z"), "2026-01-02 03:04");
        assert_eq!(display_date("garbage"), "garbage");
    }

    #[cfg(feature = "sqlite")]
    mod store {
        use super::*;

        fn xray(patient_id: i64) -> BillInput {
            BillInput {
                patient_id,
                amount: "150.00".parse().unwrap(),
                description: "X-ray".to_string(),
                status: BillStatus::Unpaid,
            }
        }

        #[tokio::test]
        async fn test_empty_list() {
            let (_temp, pool) = db::test_pool().await;
            let store = BillStore::new(pool);
            assert!(store.list().await.unwrap().is_empty());
            assert!(store.patient_options().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_add_then_list() {
            let (_temp, pool) = db::test_pool().await;
            let patient_id = db::insert_test_patient(&pool, "Jane Roe").await;
            let store = BillStore::new(pool);

            store.add(&xray(patient_id)).await.unwrap();

            let bills = store.list().await.unwrap();
            assert_eq!(bills.len(), 1);
            assert_eq!(bills[0].amount.to_string(), "150.00");
            assert_eq!(bills[0].status, "Unpaid");
            assert_eq!(bills[0].description, "X-ray");
            assert_eq!(bills[0].patient_name, "Jane Roe");

            let options = store.patient_options().await.unwrap();
            assert_eq!(options, vec![LookupOption { id: patient_id, name: "Jane Roe".into() }]);
        }

        #[tokio::test]
        async fn test_list_is_newest_first() {
            let (_temp, pool) = db::test_pool().await;
            let patient_id = db::insert_test_patient(&pool, "Jane Roe").await;
            let store = BillStore::new(pool.clone());

            let mut ids = Vec::new();
            for (description, bill_date) in [
                ("Consultation", "2026-03-01T09:00:00Z"),
                ("Blood panel", "2026-01-15T09:00:00Z"),
                ("MRI", "2026-03-01T09:00:00Z"),
            ] {
                let mut input = xray(patient_id);
                input.description = description.to_string();
                let bill_id = store.add(&input).await.unwrap();
                sqlx::query("UPDATE bill SET bill_date = ? WHERE bill_id = ?")
                    .bind(bill_date)
                    .bind(bill_id)
                    .execute(&pool)
                    .await
                    .unwrap();
                ids.push(bill_id);
            }

            let bills = store.list().await.unwrap();
            let order: Vec<&str> = bills.iter().map(|b| b.description.as_str()).collect();
            // Same date falls back to the later bill id
            assert_eq!(order, ["MRI", "Consultation", "Blood panel"]);
            assert_eq!(bills[0].bill_id, ids[2]);
            assert_eq!(bills[0].bill_date, "2026-03-01 09:00");
            assert_eq!(bills[2].bill_date, "2026-01-15 09:00");
        }

        #[tokio::test]
        async fn test_edit_is_idempotent() {
            let (_temp, pool) = db::test_pool().await;
            let patient_id = db::insert_test_patient(&pool, "Jane Roe").await;
            let store = BillStore::new(pool);
            let bill_id = store.add(&xray(patient_id)).await.unwrap();

            let mut update = xray(patient_id);
            update.amount = Amount::from_cents(7550);
            update.status = BillStatus::Partial;

            store.edit(bill_id, &update).await.unwrap();
            let once = store.list().await.unwrap();
            store.edit(bill_id, &update).await.unwrap();
            let twice = store.list().await.unwrap();

            assert_eq!(once.len(), 1);
            assert_eq!(once[0].amount, twice[0].amount);
            assert_eq!(once[0].status, "Partial");
            assert_eq!(twice[0].status, "Partial");
            assert_eq!(once[0].bill_date, twice[0].bill_date);
        }

        #[tokio::test]
        async fn test_edit_missing_bill() {
            let (_temp, pool) = db::test_pool().await;
            let patient_id = db::insert_test_patient(&pool, "Jane Roe").await;
            let store = BillStore::new(pool);
            assert!(matches!(
                store.edit(404, &xray(patient_id)).await,
                Err(Error::NotFound("Bill"))
            ));
        }

        #[tokio::test]
        async fn test_delete_removes_one_and_tolerates_missing() {
            let (_temp, pool) = db::test_pool().await;
            let patient_id = db::insert_test_patient(&pool, "Jane Roe").await;
            let store = BillStore::new(pool);
            let first = store.add(&xray(patient_id)).await.unwrap();
            store.add(&xray(patient_id)).await.unwrap();

            store.delete(first).await.unwrap();
            assert_eq!(store.list().await.unwrap().len(), 1);

            store.delete(first).await.unwrap();
            assert_eq!(store.list().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_unknown_patient_is_storage_error() {
            let (_temp, pool) = db::test_pool().await;
            let store = BillStore::new(pool);
            let err = store.add(&xray(999)).await.unwrap_err();
            assert!(err.is_storage());
        }
    }
}

//! Askama templates for the admin UI.

use crate::bill::{BillRecord, BillStatus};
use crate::department::DepartmentRecord;
use crate::forms::LookupOption;
use crate::medicine::MedicineRecord;
use crate::resource::{ResourceRecord, ResourceStatus, ResourceType};
use crate::staff::StaffRecord;
use askama::Template;

/// Base data available to all templates
pub struct BaseContext {
    pub username: String,
    /// Navigation entry to highlight
    pub active: &'static str,
    /// One-shot success message from the previous request
    pub flash: Option<String>,
    /// Failed mutation on this request
    pub error: Option<String>,
    /// Listing could not be read
    pub load_error: Option<String>,
}

/// Login page template
#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Dashboard page template
#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub base: BaseContext,
    pub tiles: Vec<CountTile>,
}

/// One dashboard counter
pub struct CountTile {
    pub label: &'static str,
    /// Rendered count, or "-" when it could not be read
    pub value: String,
    pub href: &'static str,
}

#[derive(Template)]
#[template(path = "admin/bills.html")]
pub struct BillsTemplate {
    pub base: BaseContext,
    pub bills: Vec<BillRecord>,
    pub patients: Vec<LookupOption>,
    pub statuses: Vec<&'static str>,
}

impl BillsTemplate {
    pub fn statuses() -> Vec<&'static str> {
        BillStatus::ALL.iter().map(|s| s.as_str()).collect()
    }
}

#[derive(Template)]
#[template(path = "admin/departments.html")]
pub struct DepartmentsTemplate {
    pub base: BaseContext,
    pub departments: Vec<DepartmentRecord>,
    pub doctors: Vec<LookupOption>,
}

#[derive(Template)]
#[template(path = "admin/medicines.html")]
pub struct MedicinesTemplate {
    pub base: BaseContext,
    pub medicines: Vec<MedicineRecord>,
}

#[derive(Template)]
#[template(path = "admin/resources.html")]
pub struct ResourcesTemplate {
    pub base: BaseContext,
    pub resources: Vec<ResourceRecord>,
    pub departments: Vec<LookupOption>,
    pub types: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
}

impl ResourcesTemplate {
    pub fn types() -> Vec<&'static str> {
        ResourceType::ALL.iter().map(|t| t.as_str()).collect()
    }

    pub fn statuses() -> Vec<&'static str> {
        ResourceStatus::ALL.iter().map(|s| s.as_str()).collect()
    }
}

#[derive(Template)]
#[template(path = "admin/staff.html")]
pub struct StaffTemplate {
    pub base: BaseContext,
    pub staff: Vec<StaffRecord>,
    pub departments: Vec<LookupOption>,
    pub roles: Vec<&'static str>,
}

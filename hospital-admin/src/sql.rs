//! SQL query constants with database-specific placeholders.
//!
//! SQLite uses `?` placeholders, PostgreSQL uses `$1, $2, ...` numbered placeholders.
//! Queries without parameters are shared by both backends.
//!
//! `user` is a reserved word in PostgreSQL, so the table name is always quoted.

// =============================================================================
// Users and sessions
// =============================================================================

#[cfg(feature = "sqlite")]
pub const INSERT_USER: &str =
    r#"INSERT INTO "user" (username, password, role) VALUES (?, ?, ?) RETURNING user_id"#;

#[cfg(feature = "postgres")]
pub const INSERT_USER: &str =
    r#"INSERT INTO "user" (username, password, role) VALUES ($1, $2, $3) RETURNING user_id"#;

#[cfg(feature = "sqlite")]
pub const SELECT_USER_BY_USERNAME: &str =
    r#"SELECT user_id, username, password, role FROM "user" WHERE username = ?"#;

#[cfg(feature = "postgres")]
pub const SELECT_USER_BY_USERNAME: &str =
    r#"SELECT user_id, username, password, role FROM "user" WHERE username = $1"#;

#[cfg(feature = "sqlite")]
pub const SELECT_USER_ROLE: &str = r#"SELECT role FROM "user" WHERE user_id = ?"#;

#[cfg(feature = "postgres")]
pub const SELECT_USER_ROLE: &str = r#"SELECT role FROM "user" WHERE user_id = $1"#;

#[cfg(feature = "sqlite")]
pub const DELETE_USER: &str = r#"DELETE FROM "user" WHERE user_id = ?"#;

#[cfg(feature = "postgres")]
pub const DELETE_USER: &str = r#"DELETE FROM "user" WHERE user_id = $1"#;

#[cfg(feature = "sqlite")]
pub const INSERT_ADMIN_SESSION: &str = r#"
    INSERT INTO admin_session (session_id, user_id, created_at, expires_at)
    VALUES (?, ?, ?, ?)
"#;

#[cfg(feature = "postgres")]
pub const INSERT_ADMIN_SESSION: &str = r#"
    INSERT INTO admin_session (session_id, user_id, created_at, expires_at)
    VALUES ($1, $2, $3, $4)
"#;

#[cfg(feature = "sqlite")]
pub const SELECT_ADMIN_SESSION: &str = r#"
    SELECT s.session_id, s.user_id, s.created_at, s.expires_at, s.flash_message,
           u.username, u.role
    FROM admin_session s
    JOIN "user" u ON u.user_id = s.user_id
    WHERE s.session_id = ?
"#;

#[cfg(feature = "postgres")]
pub const SELECT_ADMIN_SESSION: &str = r#"
    SELECT s.session_id, s.user_id, s.created_at, s.expires_at, s.flash_message,
           u.username, u.role
    FROM admin_session s
    JOIN "user" u ON u.user_id = s.user_id
    WHERE s.session_id = $1
"#;

#[cfg(feature = "sqlite")]
pub const DELETE_ADMIN_SESSION: &str = "DELETE FROM admin_session WHERE session_id = ?";

#[cfg(feature = "postgres")]
pub const DELETE_ADMIN_SESSION: &str = "DELETE FROM admin_session WHERE session_id = $1";

#[cfg(feature = "sqlite")]
pub const DELETE_EXPIRED_ADMIN_SESSIONS: &str = "DELETE FROM admin_session WHERE expires_at < ?";

#[cfg(feature = "postgres")]
pub const DELETE_EXPIRED_ADMIN_SESSIONS: &str =
    "DELETE FROM admin_session WHERE expires_at < $1";

#[cfg(feature = "sqlite")]
pub const SET_SESSION_FLASH: &str =
    "UPDATE admin_session SET flash_message = ? WHERE session_id = ?";

#[cfg(feature = "postgres")]
pub const SET_SESSION_FLASH: &str =
    "UPDATE admin_session SET flash_message = $1 WHERE session_id = $2";

#[cfg(feature = "sqlite")]
pub const CLEAR_SESSION_FLASH: &str =
    "UPDATE admin_session SET flash_message = NULL WHERE session_id = ?";

#[cfg(feature = "postgres")]
pub const CLEAR_SESSION_FLASH: &str =
    "UPDATE admin_session SET flash_message = NULL WHERE session_id = $1";

// =============================================================================
// Bills
// =============================================================================

#[cfg(feature = "sqlite")]
pub const INSERT_BILL: &str = r#"
    INSERT INTO bill (patient_id, amount_cents, description, status, bill_date)
    VALUES (?, ?, ?, ?, ?)
    RETURNING bill_id
"#;

#[cfg(feature = "postgres")]
pub const INSERT_BILL: &str = r#"
    INSERT INTO bill (patient_id, amount_cents, description, status, bill_date)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING bill_id
"#;

#[cfg(feature = "sqlite")]
pub const UPDATE_BILL: &str = r#"
    UPDATE bill SET patient_id = ?, amount_cents = ?, description = ?, status = ?
    WHERE bill_id = ?
"#;

#[cfg(feature = "postgres")]
pub const UPDATE_BILL: &str = r#"
    UPDATE bill SET patient_id = $1, amount_cents = $2, description = $3, status = $4
    WHERE bill_id = $5
"#;

#[cfg(feature = "sqlite")]
pub const DELETE_BILL: &str = "DELETE FROM bill WHERE bill_id = ?";

#[cfg(feature = "postgres")]
pub const DELETE_BILL: &str = "DELETE FROM bill WHERE bill_id = $1";

pub const SELECT_BILLS: &str = r#"
    SELECT b.bill_id, b.patient_id, p.name AS patient_name, b.amount_cents,
           b.description, b.status, b.bill_date
    FROM bill b
    JOIN patient p ON p.patient_id = b.patient_id
    ORDER BY b.bill_date DESC, b.bill_id DESC
"#;

pub const SELECT_PATIENT_OPTIONS: &str =
    "SELECT patient_id AS id, name FROM patient ORDER BY name";

// =============================================================================
// Departments
// =============================================================================

#[cfg(feature = "sqlite")]
pub const INSERT_DEPARTMENT: &str = r#"
    INSERT INTO department (name, description, head_doctor_id)
    VALUES (?, ?, ?)
    RETURNING department_id
"#;

#[cfg(feature = "postgres")]
pub const INSERT_DEPARTMENT: &str = r#"
    INSERT INTO department (name, description, head_doctor_id)
    VALUES ($1, $2, $3)
    RETURNING department_id
"#;

#[cfg(feature = "sqlite")]
pub const UPDATE_DEPARTMENT: &str = r#"
    UPDATE department SET name = ?, description = ?, head_doctor_id = ?
    WHERE department_id = ?
"#;

#[cfg(feature = "postgres")]
pub const UPDATE_DEPARTMENT: &str = r#"
    UPDATE department SET name = $1, description = $2, head_doctor_id = $3
    WHERE department_id = $4
"#;

#[cfg(feature = "sqlite")]
pub const DELETE_DEPARTMENT: &str = "DELETE FROM department WHERE department_id = ?";

#[cfg(feature = "postgres")]
pub const DELETE_DEPARTMENT: &str = "DELETE FROM department WHERE department_id = $1";

pub const SELECT_DEPARTMENTS: &str = r#"
    SELECT d.department_id, d.name, d.description, d.head_doctor_id,
           doc.name AS head_doctor_name
    FROM department d
    LEFT JOIN doctor doc ON doc.user_id = d.head_doctor_id
    ORDER BY d.name
"#;

pub const SELECT_DEPARTMENT_OPTIONS: &str =
    "SELECT department_id AS id, name FROM department ORDER BY name";

pub const SELECT_DOCTOR_OPTIONS: &str = "SELECT user_id AS id, name FROM doctor ORDER BY name";

// =============================================================================
// Medicines
// =============================================================================

#[cfg(feature = "sqlite")]
pub const INSERT_MEDICINE: &str = r#"
    INSERT INTO medicine (name, description, dosage_form, stock_quantity, category)
    VALUES (?, ?, ?, ?, ?)
    RETURNING medicine_id
"#;

#[cfg(feature = "postgres")]
pub const INSERT_MEDICINE: &str = r#"
    INSERT INTO medicine (name, description, dosage_form, stock_quantity, category)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING medicine_id
"#;

#[cfg(feature = "sqlite")]
pub const UPDATE_MEDICINE: &str = r#"
    UPDATE medicine SET name = ?, description = ?, dosage_form = ?, stock_quantity = ?, category = ?
    WHERE medicine_id = ?
"#;

#[cfg(feature = "postgres")]
pub const UPDATE_MEDICINE: &str = r#"
    UPDATE medicine SET name = $1, description = $2, dosage_form = $3, stock_quantity = $4, category = $5
    WHERE medicine_id = $6
"#;

#[cfg(feature = "sqlite")]
pub const DELETE_MEDICINE: &str = "DELETE FROM medicine WHERE medicine_id = ?";

#[cfg(feature = "postgres")]
pub const DELETE_MEDICINE: &str = "DELETE FROM medicine WHERE medicine_id = $1";

pub const SELECT_MEDICINES: &str = r#"
    SELECT medicine_id, name, description, dosage_form, stock_quantity, category
    FROM medicine
    ORDER BY name
"#;

// =============================================================================
// Resources
// =============================================================================

#[cfg(feature = "sqlite")]
pub const INSERT_RESOURCE: &str = r#"
    INSERT INTO resource (type, name, department_id, status, details)
    VALUES (?, ?, ?, ?, ?)
    RETURNING resource_id
"#;

#[cfg(feature = "postgres")]
pub const INSERT_RESOURCE: &str = r#"
    INSERT INTO resource (type, name, department_id, status, details)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING resource_id
"#;

#[cfg(feature = "sqlite")]
pub const UPDATE_RESOURCE: &str = r#"
    UPDATE resource SET type = ?, name = ?, department_id = ?, status = ?, details = ?
    WHERE resource_id = ?
"#;

#[cfg(feature = "postgres")]
pub const UPDATE_RESOURCE: &str = r#"
    UPDATE resource SET type = $1, name = $2, department_id = $3, status = $4, details = $5
    WHERE resource_id = $6
"#;

#[cfg(feature = "sqlite")]
pub const DELETE_RESOURCE: &str = "DELETE FROM resource WHERE resource_id = ?";

#[cfg(feature = "postgres")]
pub const DELETE_RESOURCE: &str = "DELETE FROM resource WHERE resource_id = $1";

pub const SELECT_RESOURCES: &str = r#"
    SELECT r.resource_id, r.type, r.name, r.department_id, d.name AS department_name,
           r.status, r.details
    FROM resource r
    LEFT JOIN department d ON d.department_id = r.department_id
    ORDER BY r.type, r.name
"#;

// =============================================================================
// Staff (user + doctor/nurse detail rows)
// =============================================================================

#[cfg(feature = "sqlite")]
pub const INSERT_DOCTOR: &str = r#"
    INSERT INTO doctor (user_id, name, specialization, contact_info, department_id)
    VALUES (?, ?, ?, ?, ?)
"#;

#[cfg(feature = "postgres")]
pub const INSERT_DOCTOR: &str = r#"
    INSERT INTO doctor (user_id, name, specialization, contact_info, department_id)
    VALUES ($1, $2, $3, $4, $5)
"#;

#[cfg(feature = "sqlite")]
pub const INSERT_NURSE: &str = r#"
    INSERT INTO nurse (user_id, name, contact_info, department_id)
    VALUES (?, ?, ?, ?)
"#;

#[cfg(feature = "postgres")]
pub const INSERT_NURSE: &str = r#"
    INSERT INTO nurse (user_id, name, contact_info, department_id)
    VALUES ($1, $2, $3, $4)
"#;

#[cfg(feature = "sqlite")]
pub const UPDATE_DOCTOR: &str = r#"
    UPDATE doctor SET name = ?, specialization = ?, contact_info = ?, department_id = ?
    WHERE user_id = ?
"#;

#[cfg(feature = "postgres")]
pub const UPDATE_DOCTOR: &str = r#"
    UPDATE doctor SET name = $1, specialization = $2, contact_info = $3, department_id = $4
    WHERE user_id = $5
"#;

#[cfg(feature = "sqlite")]
pub const UPDATE_NURSE: &str = r#"
    UPDATE nurse SET name = ?, contact_info = ?, department_id = ?
    WHERE user_id = ?
"#;

#[cfg(feature = "postgres")]
pub const UPDATE_NURSE: &str = r#"
    UPDATE nurse SET name = $1, contact_info = $2, department_id = $3
    WHERE user_id = $4
"#;

/// Name, contact and department come from whichever detail row exists; the
/// department join follows the non-null reference of the two.
pub const SELECT_STAFF: &str = r#"
    SELECT u.user_id, u.username, u.role,
           COALESCE(doc.name, nur.name) AS name,
           COALESCE(doc.contact_info, nur.contact_info) AS contact_info,
           doc.specialization,
           COALESCE(doc.department_id, nur.department_id) AS department_id,
           dep.name AS department_name
    FROM "user" u
    LEFT JOIN doctor doc ON doc.user_id = u.user_id
    LEFT JOIN nurse nur ON nur.user_id = u.user_id
    LEFT JOIN department dep ON dep.department_id =
        CASE WHEN doc.department_id IS NOT NULL THEN doc.department_id ELSE nur.department_id END
    ORDER BY u.role, COALESCE(doc.name, nur.name, u.username)
"#;

// =============================================================================
// Dashboard
// =============================================================================

pub const COUNT_BILLS: &str = "SELECT COUNT(*) AS n FROM bill";
pub const COUNT_UNPAID_BILLS: &str = "SELECT COUNT(*) AS n FROM bill WHERE status <> 'Paid'";
pub const COUNT_DEPARTMENTS: &str = "SELECT COUNT(*) AS n FROM department";
pub const COUNT_MEDICINES: &str = "SELECT COUNT(*) AS n FROM medicine";
pub const COUNT_RESOURCES: &str = "SELECT COUNT(*) AS n FROM resource";
pub const COUNT_STAFF: &str = r#"SELECT COUNT(*) AS n FROM "user""#;

//! Form input handling shared by the entity screens.
//!
//! Browsers post `application/x-www-form-urlencoded` bodies where every value
//! is a string. [`FormFields`] holds the raw map; each entity converts it into
//! a strict input struct before anything reaches the database.

use crate::error::ValidationError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Raw form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    /// True if the body carries the given marker field (e.g. `add_bill`).
    pub fn has(&self, marker: &str) -> bool {
        self.0.contains_key(marker)
    }

    /// Trimmed value, or `None` when absent or blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Non-blank text field.
    pub fn required(&self, name: &str, label: &'static str) -> Result<String, ValidationError> {
        self.get(name)
            .map(str::to_string)
            .ok_or(ValidationError::Missing(label))
    }

    /// Required record id.
    pub fn required_id(&self, name: &str, label: &'static str) -> Result<i64, ValidationError> {
        let raw = self.get(name).ok_or(ValidationError::Missing(label))?;
        parse_id(raw, label)
    }

    /// Optional foreign key: blank means no reference.
    pub fn optional_id(&self, name: &str, label: &'static str) -> Result<Option<i64>, ValidationError> {
        self.get(name).map(|raw| parse_id(raw, label)).transpose()
    }

    /// Required field parsed through `FromStr`.
    pub fn parsed<T>(&self, name: &str, label: &'static str) -> Result<T, ValidationError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.get(name).ok_or(ValidationError::Missing(label))?;
        raw.parse()
            .map_err(|e: T::Err| ValidationError::invalid(label, e.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn parse_id(raw: &str, label: &'static str) -> Result<i64, ValidationError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::invalid(label, "not a valid selection")),
    }
}

/// The single mutation a POST requests.
///
/// `E` is the edit payload; it defaults to the add payload for entities that
/// edit the same fields they are created with.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<A, E = A> {
    Add(A),
    Edit(i64, E),
    Delete(i64),
}

impl<T> Mutation<T> {
    /// Pick the mutation from the `add_<entity>`, `edit_<entity>` and
    /// `delete_<entity>` markers. The first marker present wins, in that order.
    pub fn from_form<F>(
        fields: &FormFields,
        entity: &str,
        id_field: &str,
        parse: F,
    ) -> Result<Self, ValidationError>
    where
        F: Fn(&FormFields) -> Result<T, ValidationError>,
    {
        Self::from_form_split(fields, entity, id_field, &parse, &parse)
    }
}

impl<A, E> Mutation<A, E> {
    /// Like [`Mutation::from_form`], with separate parsers for add and edit.
    pub fn from_form_split<FA, FE>(
        fields: &FormFields,
        entity: &str,
        id_field: &str,
        parse_add: FA,
        parse_edit: FE,
    ) -> Result<Self, ValidationError>
    where
        FA: Fn(&FormFields) -> Result<A, ValidationError>,
        FE: Fn(&FormFields) -> Result<E, ValidationError>,
    {
        if fields.has(&format!("add_{entity}")) {
            Ok(Mutation::Add(parse_add(fields)?))
        } else if fields.has(&format!("edit_{entity}")) {
            let id = fields.required_id(id_field, "Record id")?;
            Ok(Mutation::Edit(id, parse_edit(fields)?))
        } else if fields.has(&format!("delete_{entity}")) {
            Ok(Mutation::Delete(fields.required_id(id_field, "Record id")?))
        } else {
            Err(ValidationError::NoAction)
        }
    }
}

/// Money amount held as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() && frac.is_empty() {
            return Err("expected a number such as 150.00".to_string());
        }
        if !digits_only(whole) || !digits_only(frac) {
            return Err("expected a non-negative number such as 150.00".to_string());
        }
        if frac.len() > 2 {
            return Err("at most two decimal places are allowed".to_string());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| "amount is too large".to_string())?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Amount)
            .ok_or_else(|| "amount is too large".to_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Non-negative whole quantity (stock counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity(pub i64);

impl FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(n) if n >= 0 => Ok(Quantity(n)),
            Ok(_) => Err("must not be negative".to_string()),
            Err(_) => Err("expected a whole number".to_string()),
        }
    }
}

/// One entry of a dropdown fed by another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOption {
    pub id: i64,
    pub name: String,
}

//! People and places: customers, stores, departments and employees.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{Gender, Role};
use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    /// National identity number (TCKN), 11 digits when present.
    pub identity_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on `today`, if a birth date is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        Some(age.max(0))
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Department
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub store_id: String,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Employee
// =============================================================================

/// A store employee. Sales are attributed to employees for quota tracking.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub store_id: String,
    pub department_id: Option<String>,
    #[ts(as = "String")]
    pub hire_date: NaiveDate,
    pub salary_cents: i64,
    /// Monthly sales quota; commission is paid on the excess.
    pub monthly_quota_cents: i64,
    pub is_active: bool,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[inline]
    pub fn salary(&self) -> Money {
        Money::from_cents(self.salary_cents)
    }

    #[inline]
    pub fn monthly_quota(&self) -> Money {
        Money::from_cents(self.monthly_quota_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(birth: Option<NaiveDate>) -> Customer {
        Customer {
            id: "c-1".into(),
            identity_number: None,
            first_name: "Ayşe".into(),
            last_name: "Yılmaz".into(),
            phone: None,
            email: None,
            address: None,
            city: Some("İstanbul".into()),
            gender: Some(Gender::Female),
            birth_date: birth,
            is_deleted: false,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let c = customer(NaiveDate::from_ymd_opt(1990, 6, 15));
        assert_eq!(c.age_on(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()), Some(33));
        assert_eq!(c.age_on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), Some(34));
        assert_eq!(customer(None).age_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), None);
    }

    #[test]
    fn test_full_name() {
        assert_eq!(customer(None).full_name(), "Ayşe Yılmaz");
    }
}

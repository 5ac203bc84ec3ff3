//! Stores, departments, customers and employees.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use teknoroma_core::validation::{validate_email, validate_identity_number, validate_name, validate_price};
use teknoroma_core::{
    CoreError, Customer, Department, Employee, Gender, Role, Store, ValidationError, Visibility,
    DEFAULT_MONTHLY_QUOTA,
};
use teknoroma_db::repository::new_id;
use teknoroma_db::Database;

use crate::error::ServiceResult;
use crate::services::catalog::clean;

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StoreInput {
    pub name: String,
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentInput {
    pub name: String,
    pub store_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInput {
    pub identity_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub store_id: String,
    pub department_id: Option<String>,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub salary_cents: i64,
    /// Defaults to the chain-wide quota.
    pub monthly_quota_cents: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct PeopleService {
    db: Database,
}

impl PeopleService {
    pub fn new(db: Database) -> Self {
        PeopleService { db }
    }

    // -------------------------------------------------------------------------
    // Stores
    // -------------------------------------------------------------------------

    pub async fn create_store(&self, input: StoreInput) -> ServiceResult<Store> {
        let store = self
            .db
            .stores()
            .insert(&Store {
                id: new_id(),
                name: validate_name("name", &input.name, 100)?,
                city: validate_name("city", &input.city, 100)?,
                district: clean(input.district),
                address: clean(input.address),
                phone: clean(input.phone),
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            })
            .await?;

        info!(id = %store.id, name = %store.name, "Store created");
        Ok(store)
    }

    pub async fn get_store(&self, id: &str, visibility: Visibility) -> ServiceResult<Store> {
        Ok(self
            .db
            .stores()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Store", id))?)
    }

    pub async fn list_stores(&self, visibility: Visibility) -> ServiceResult<Vec<Store>> {
        Ok(self.db.stores().list(visibility).await?)
    }

    pub async fn update_store(&self, id: &str, input: StoreInput) -> ServiceResult<Store> {
        let existing = self.get_store(id, Visibility::Active).await?;
        let store = Store {
            name: validate_name("name", &input.name, 100)?,
            city: validate_name("city", &input.city, 100)?,
            district: clean(input.district),
            address: clean(input.address),
            phone: clean(input.phone),
            ..existing
        };
        Ok(self.db.stores().update(&store).await?)
    }

    pub async fn delete_store(&self, id: &str) -> ServiceResult<()> {
        self.db.stores().soft_delete(id).await?;
        info!(id = %id, "Store deleted");
        Ok(())
    }

    pub async fn restore_store(&self, id: &str) -> ServiceResult<Store> {
        self.db.stores().restore(id).await?;
        self.get_store(id, Visibility::Active).await
    }

    // -------------------------------------------------------------------------
    // Departments
    // -------------------------------------------------------------------------

    pub async fn create_department(&self, input: DepartmentInput) -> ServiceResult<Department> {
        let name = validate_name("name", &input.name, 100)?;
        self.get_store(&input.store_id, Visibility::Active).await?;

        let department = self
            .db
            .departments()
            .insert(&Department {
                id: new_id(),
                name,
                store_id: input.store_id,
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            })
            .await?;

        info!(id = %department.id, store_id = %department.store_id, "Department created");
        Ok(department)
    }

    pub async fn get_department(&self, id: &str, visibility: Visibility) -> ServiceResult<Department> {
        Ok(self
            .db
            .departments()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Department", id))?)
    }

    pub async fn list_departments(
        &self,
        store_id: Option<&str>,
        visibility: Visibility,
    ) -> ServiceResult<Vec<Department>> {
        Ok(self.db.departments().list(store_id, visibility).await?)
    }

    pub async fn update_department(&self, id: &str, input: DepartmentInput) -> ServiceResult<Department> {
        let existing = self.get_department(id, Visibility::Active).await?;
        let name = validate_name("name", &input.name, 100)?;
        self.get_store(&input.store_id, Visibility::Active).await?;

        let department = Department {
            name,
            store_id: input.store_id,
            ..existing
        };
        Ok(self.db.departments().update(&department).await?)
    }

    pub async fn delete_department(&self, id: &str) -> ServiceResult<()> {
        self.db.departments().soft_delete(id).await?;
        Ok(())
    }

    pub async fn restore_department(&self, id: &str) -> ServiceResult<Department> {
        self.db.departments().restore(id).await?;
        self.get_department(id, Visibility::Active).await
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    fn customer_from(input: CustomerInput, base: Customer) -> Result<Customer, ValidationError> {
        let identity_number = clean(input.identity_number);
        if let Some(n) = &identity_number {
            validate_identity_number(n)?;
        }
        let email = clean(input.email);
        if let Some(e) = &email {
            validate_email(e)?;
        }

        Ok(Customer {
            identity_number,
            first_name: validate_name("first_name", &input.first_name, 100)?,
            last_name: validate_name("last_name", &input.last_name, 100)?,
            phone: clean(input.phone),
            email,
            address: clean(input.address),
            city: clean(input.city),
            gender: input.gender,
            birth_date: input.birth_date,
            ..base
        })
    }

    async fn ensure_identity_free(&self, customer: &Customer) -> ServiceResult<()> {
        if let Some(number) = &customer.identity_number {
            if let Some(other) = self.db.customers().get_by_identity_number(number).await? {
                if other.id != customer.id {
                    return Err(CoreError::duplicate("identity_number", number.clone()).into());
                }
            }
        }
        Ok(())
    }

    pub async fn create_customer(&self, input: CustomerInput) -> ServiceResult<Customer> {
        let customer = Self::customer_from(
            input,
            Customer {
                id: new_id(),
                identity_number: None,
                first_name: String::new(),
                last_name: String::new(),
                phone: None,
                email: None,
                address: None,
                city: None,
                gender: None,
                birth_date: None,
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            },
        )?;
        self.ensure_identity_free(&customer).await?;

        let customer = self.db.customers().insert(&customer).await?;
        info!(id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn get_customer(&self, id: &str, visibility: Visibility) -> ServiceResult<Customer> {
        Ok(self
            .db
            .customers()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", id))?)
    }

    pub async fn list_customers(&self, visibility: Visibility) -> ServiceResult<Vec<Customer>> {
        Ok(self.db.customers().list(visibility).await?)
    }

    pub async fn update_customer(&self, id: &str, input: CustomerInput) -> ServiceResult<Customer> {
        let existing = self.get_customer(id, Visibility::Active).await?;
        let customer = Self::customer_from(input, existing)?;
        self.ensure_identity_free(&customer).await?;
        Ok(self.db.customers().update(&customer).await?)
    }

    pub async fn delete_customer(&self, id: &str) -> ServiceResult<()> {
        self.db.customers().soft_delete(id).await?;
        info!(id = %id, "Customer deleted");
        Ok(())
    }

    pub async fn restore_customer(&self, id: &str) -> ServiceResult<Customer> {
        self.db.customers().restore(id).await?;
        self.get_customer(id, Visibility::Active).await
    }

    // -------------------------------------------------------------------------
    // Employees
    // -------------------------------------------------------------------------

    async fn employee_from(&self, input: EmployeeInput, base: Employee) -> ServiceResult<Employee> {
        let email = clean(input.email);
        if let Some(e) = &email {
            validate_email(e)?;
            if let Some(other) = self.db.employees().get_by_email(e).await? {
                if other.id != base.id {
                    return Err(CoreError::duplicate("email", e.clone()).into());
                }
            }
        }

        validate_price("salary", input.salary_cents)?;
        let quota = input.monthly_quota_cents.unwrap_or(DEFAULT_MONTHLY_QUOTA.cents());
        validate_price("monthly_quota", quota)?;

        self.get_store(&input.store_id, Visibility::Active).await?;
        if let Some(department_id) = &input.department_id {
            let department = self.get_department(department_id, Visibility::Active).await?;
            if department.store_id != input.store_id {
                return Err(ValidationError::invalid_format("department_id", "belongs to another store").into());
            }
        }

        Ok(Employee {
            first_name: validate_name("first_name", &input.first_name, 100)?,
            last_name: validate_name("last_name", &input.last_name, 100)?,
            email,
            phone: clean(input.phone),
            role: input.role,
            store_id: input.store_id,
            department_id: input.department_id,
            hire_date: input.hire_date,
            salary_cents: input.salary_cents,
            monthly_quota_cents: quota,
            is_active: input.is_active,
            ..base
        })
    }

    pub async fn create_employee(&self, input: EmployeeInput) -> ServiceResult<Employee> {
        let blank = Employee {
            id: new_id(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            phone: None,
            role: input.role,
            store_id: String::new(),
            department_id: None,
            hire_date: input.hire_date,
            salary_cents: 0,
            monthly_quota_cents: DEFAULT_MONTHLY_QUOTA.cents(),
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
            modified_at: None,
        };
        let employee = self.employee_from(input, blank).await?;

        let employee = self.db.employees().insert(&employee).await?;
        info!(id = %employee.id, role = %employee.role, store_id = %employee.store_id, "Employee created");
        Ok(employee)
    }

    pub async fn get_employee(&self, id: &str, visibility: Visibility) -> ServiceResult<Employee> {
        Ok(self
            .db
            .employees()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Employee", id))?)
    }

    pub async fn list_employees(
        &self,
        store_id: Option<&str>,
        role: Option<Role>,
        visibility: Visibility,
    ) -> ServiceResult<Vec<Employee>> {
        Ok(self.db.employees().list(store_id, role, visibility).await?)
    }

    pub async fn update_employee(&self, id: &str, input: EmployeeInput) -> ServiceResult<Employee> {
        let existing = self.get_employee(id, Visibility::Active).await?;
        let employee = self.employee_from(input, existing).await?;
        Ok(self.db.employees().update(&employee).await?)
    }

    pub async fn delete_employee(&self, id: &str) -> ServiceResult<()> {
        self.db.employees().soft_delete(id).await?;
        info!(id = %id, "Employee deleted");
        Ok(())
    }

    pub async fn restore_employee(&self, id: &str) -> ServiceResult<Employee> {
        self.db.employees().restore(id).await?;
        self.get_employee(id, Visibility::Active).await
    }
}

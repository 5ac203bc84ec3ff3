//! # Catalog Services
//!
//! Categories, suppliers and products.
//!
//! ```text
//! input ──► validate (pure) ──► uniqueness pre-check ──► repository
//!                                    │
//!                                    └── a racing insert still hits the
//!                                        UNIQUE index → DbError::UniqueViolation
//! ```
//!
//! Stock on hand only enters through `ProductInput::units_in_stock` at
//! creation; afterwards it moves through [`crate::services::StockService`]
//! and the sale workflow.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use teknoroma_core::validation::{validate_barcode, validate_email, validate_name, validate_price, validate_stock_level};
use teknoroma_core::{classify, Category, CoreError, Product, StockStatus, Supplier, ValidationError, Visibility};
use teknoroma_db::repository::new_id;
use teknoroma_db::{Database, ProductFilter};

use crate::error::ServiceResult;

/// Default page size for product search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Upper bound a caller may ask for.
pub const MAX_SEARCH_LIMIT: u32 = 100;

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub tax_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub barcode: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    /// Opening stock. Ignored on update.
    #[serde(default)]
    pub units_in_stock: i64,
    #[serde(default)]
    pub critical_stock_level: i64,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Trims optional text; blank becomes `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_email(value: Option<String>) -> Result<Option<String>, ValidationError> {
    let email = clean(value);
    if let Some(e) = &email {
        validate_email(e)?;
    }
    Ok(email)
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub async fn create_category(&self, input: CategoryInput) -> ServiceResult<Category> {
        let name = validate_name("name", &input.name, 100)?;
        if self.db.categories().get_by_name(&name).await?.is_some() {
            return Err(CoreError::duplicate("category name", name).into());
        }

        let category = self
            .db
            .categories()
            .insert(&Category {
                id: new_id(),
                name,
                description: clean(input.description),
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            })
            .await?;

        info!(id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn get_category(&self, id: &str, visibility: Visibility) -> ServiceResult<Category> {
        Ok(self
            .db
            .categories()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Category", id))?)
    }

    pub async fn list_categories(&self, visibility: Visibility) -> ServiceResult<Vec<Category>> {
        Ok(self.db.categories().list(visibility).await?)
    }

    pub async fn update_category(&self, id: &str, input: CategoryInput) -> ServiceResult<Category> {
        let mut category = self.get_category(id, Visibility::Active).await?;
        let name = validate_name("name", &input.name, 100)?;

        if let Some(other) = self.db.categories().get_by_name(&name).await? {
            if other.id != category.id {
                return Err(CoreError::duplicate("category name", name).into());
            }
        }

        category.name = name;
        category.description = clean(input.description);
        Ok(self.db.categories().update(&category).await?)
    }

    pub async fn delete_category(&self, id: &str) -> ServiceResult<()> {
        self.db.categories().soft_delete(id).await?;
        info!(id = %id, "Category deleted");
        Ok(())
    }

    pub async fn restore_category(&self, id: &str) -> ServiceResult<Category> {
        self.db.categories().restore(id).await?;
        self.get_category(id, Visibility::Active).await
    }

    // -------------------------------------------------------------------------
    // Suppliers
    // -------------------------------------------------------------------------

    fn supplier_from(input: SupplierInput, base: Supplier) -> Result<Supplier, ValidationError> {
        Ok(Supplier {
            company_name: validate_name("company_name", &input.company_name, 200)?,
            contact_name: clean(input.contact_name),
            phone: clean(input.phone),
            email: clean_email(input.email)?,
            address: clean(input.address),
            city: clean(input.city),
            tax_number: clean(input.tax_number),
            ..base
        })
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> ServiceResult<Supplier> {
        let supplier = Self::supplier_from(
            input,
            Supplier {
                id: new_id(),
                company_name: String::new(),
                contact_name: None,
                phone: None,
                email: None,
                address: None,
                city: None,
                tax_number: None,
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            },
        )?;

        let supplier = self.db.suppliers().insert(&supplier).await?;
        info!(id = %supplier.id, company = %supplier.company_name, "Supplier created");
        Ok(supplier)
    }

    pub async fn get_supplier(&self, id: &str, visibility: Visibility) -> ServiceResult<Supplier> {
        Ok(self
            .db
            .suppliers()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Supplier", id))?)
    }

    pub async fn list_suppliers(&self, visibility: Visibility) -> ServiceResult<Vec<Supplier>> {
        Ok(self.db.suppliers().list(visibility).await?)
    }

    pub async fn update_supplier(&self, id: &str, input: SupplierInput) -> ServiceResult<Supplier> {
        let existing = self.get_supplier(id, Visibility::Active).await?;
        let supplier = Self::supplier_from(input, existing)?;
        Ok(self.db.suppliers().update(&supplier).await?)
    }

    pub async fn delete_supplier(&self, id: &str) -> ServiceResult<()> {
        self.db.suppliers().soft_delete(id).await?;
        info!(id = %id, "Supplier deleted");
        Ok(())
    }

    pub async fn restore_supplier(&self, id: &str) -> ServiceResult<Supplier> {
        self.db.suppliers().restore(id).await?;
        self.get_supplier(id, Visibility::Active).await
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Validates product fields and checks the referenced category/supplier.
    async fn checked_product(&self, input: &ProductInput) -> ServiceResult<(String, String)> {
        let name = validate_name("name", &input.name, 200)?;
        validate_barcode(&input.barcode)?;
        validate_price("unit_price", input.unit_price_cents)?;
        validate_stock_level("units_in_stock", input.units_in_stock)?;
        validate_stock_level("critical_stock_level", input.critical_stock_level)?;

        if let Some(category_id) = &input.category_id {
            self.get_category(category_id, Visibility::Active).await?;
        }
        if let Some(supplier_id) = &input.supplier_id {
            self.get_supplier(supplier_id, Visibility::Active).await?;
        }

        Ok((name, input.barcode.trim().to_string()))
    }

    pub async fn create_product(&self, input: ProductInput) -> ServiceResult<Product> {
        let (name, barcode) = self.checked_product(&input).await?;
        if self.db.products().get_by_barcode(&barcode).await?.is_some() {
            return Err(CoreError::duplicate("barcode", barcode).into());
        }

        let product = self
            .db
            .products()
            .insert(&Product {
                id: new_id(),
                name,
                barcode,
                description: clean(input.description),
                unit_price_cents: input.unit_price_cents,
                units_in_stock: input.units_in_stock,
                critical_stock_level: input.critical_stock_level,
                stock_status: classify(input.units_in_stock, input.critical_stock_level),
                category_id: input.category_id,
                supplier_id: input.supplier_id,
                is_active: input.is_active,
                version: 1,
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            })
            .await?;

        info!(id = %product.id, barcode = %product.barcode, status = %product.stock_status, "Product created");
        Ok(product)
    }

    pub async fn get_product(&self, id: &str, visibility: Visibility) -> ServiceResult<Product> {
        Ok(self
            .db
            .products()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id))?)
    }

    pub async fn get_product_by_barcode(&self, barcode: &str) -> ServiceResult<Product> {
        Ok(self
            .db
            .products()
            .get_by_barcode(barcode.trim())
            .await?
            .ok_or_else(|| CoreError::not_found("Product", barcode))?)
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list(filter).await?)
    }

    /// Active products in the Critical or OutOfStock band.
    pub async fn critical_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list_critical().await?)
    }

    /// Name or barcode substring search.
    pub async fn search_products(&self, query: &str, limit: Option<u32>) -> ServiceResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::required("q").into());
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
        Ok(self.db.products().search(query, limit).await?)
    }

    /// Updates catalog fields; stock on hand is left alone.
    pub async fn update_product(&self, id: &str, input: ProductInput) -> ServiceResult<Product> {
        let existing = self.get_product(id, Visibility::Active).await?;
        let (name, barcode) = self.checked_product(&input).await?;

        if let Some(other) = self.db.products().get_by_barcode(&barcode).await? {
            if other.id != existing.id {
                return Err(CoreError::duplicate("barcode", barcode).into());
            }
        }

        let updated = self
            .db
            .products()
            .update(&Product {
                name,
                barcode,
                description: clean(input.description),
                unit_price_cents: input.unit_price_cents,
                critical_stock_level: input.critical_stock_level,
                category_id: input.category_id,
                supplier_id: input.supplier_id,
                is_active: input.is_active,
                ..existing
            })
            .await?;

        if updated.stock_status != StockStatus::Sufficient {
            info!(id = %updated.id, status = %updated.stock_status, "Product below critical level after update");
        }
        Ok(updated)
    }

    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        self.db.products().soft_delete(id).await?;
        info!(id = %id, "Product deleted");
        Ok(())
    }

    pub async fn restore_product(&self, id: &str) -> ServiceResult<Product> {
        self.db.products().restore(id).await?;
        self.get_product(id, Visibility::Active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_blanks() {
        assert_eq!(clean(Some("  ".into())), None);
        assert_eq!(clean(Some(" Kadıköy ".into())), Some("Kadıköy".into()));
        assert_eq!(clean(None), None);
    }

    #[test]
    fn test_clean_email_validates() {
        assert!(clean_email(Some("bad".into())).is_err());
        assert_eq!(clean_email(Some(" ".into())).unwrap(), None);
        assert_eq!(
            clean_email(Some("info@tedarik.com.tr".into())).unwrap().as_deref(),
            Some("info@tedarik.com.tr")
        );
    }

    #[test]
    fn test_product_input_defaults() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "name": "Kulaklık",
            "barcode": "8690000000099",
            "unit_price_cents": 150000
        }))
        .unwrap();
        assert!(input.is_active);
        assert_eq!(input.units_in_stock, 0);
        assert_eq!(input.critical_stock_level, 0);
    }
}

//! # Seed Data Generator
//!
//! Populates a development database with a small TeknoRoma chain.
//!
//! ## Usage
//! ```bash
//! # Seed ./teknoroma_dev.db
//! cargo run -p teknoroma-db --bin seed
//!
//! # Specify database path
//! cargo run -p teknoroma-db --bin seed -- --db ./data/teknoroma.db
//! ```
//!
//! ## Generated Data
//! - 3 stores (İstanbul, Ankara, İzmir), each with sales/warehouse departments
//! - 4 categories and 3 suppliers
//! - electronics products across all three stock bands
//! - one employee per role in every store
//! - a handful of customers with varied demographics

use chrono::{NaiveDate, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use teknoroma_core::{Category, Customer, Department, Employee, Gender, Product, Role, StockStatus, Store, Supplier};
use teknoroma_db::repository::new_id;
use teknoroma_db::{Database, DbConfig};

const STORES: &[(&str, &str, &str)] = &[
    ("TeknoRoma Kadıköy", "İstanbul", "Kadıköy"),
    ("TeknoRoma Çankaya", "Ankara", "Çankaya"),
    ("TeknoRoma Bornova", "İzmir", "Bornova"),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Bilgisayar", "Laptops and desktops"),
    ("Telefon", "Smartphones"),
    ("Aksesuar", "Cables, cases, chargers"),
    ("Beyaz Eşya", "Home appliances"),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Anadolu Bilişim A.Ş.", "İstanbul"),
    ("Ege Elektronik Ltd.", "İzmir"),
    ("Başkent Dağıtım", "Ankara"),
];

/// (name, category index, supplier index, price in TRY, stock, critical level)
const PRODUCTS: &[(&str, usize, usize, i64, i64, i64)] = &[
    ("Lenovo ThinkPad E14", 0, 0, 32_999, 12, 3),
    ("HP Pavilion 15", 0, 0, 24_499, 2, 3),
    ("Apple MacBook Air M2", 0, 1, 44_999, 0, 2),
    ("Samsung Galaxy S24", 1, 1, 39_999, 25, 5),
    ("iPhone 15", 1, 2, 52_999, 4, 5),
    ("Xiaomi Redmi Note 13", 1, 2, 9_999, 40, 10),
    ("USB-C Kablo 1m", 2, 0, 149, 300, 50),
    ("Hızlı Şarj Adaptörü 25W", 2, 1, 599, 18, 20),
    ("Telefon Kılıfı", 2, 2, 249, 120, 30),
    ("Arçelik Buzdolabı", 3, 2, 27_999, 6, 2),
    ("Bosch Bulaşık Makinesi", 3, 1, 21_499, 1, 2),
];

const ROLES: &[Role] = &[
    Role::StoreManager,
    Role::Cashier,
    Role::MobileSales,
    Role::Warehouse,
    Role::Accounting,
    Role::TechnicalService,
];

/// (first, last, gender, birth year, city)
const CUSTOMERS: &[(&str, &str, Gender, i32, &str)] = &[
    ("Ayşe", "Yılmaz", Gender::Female, 1988, "İstanbul"),
    ("Mehmet", "Demir", Gender::Male, 1975, "Ankara"),
    ("Zeynep", "Kaya", Gender::Female, 2003, "İzmir"),
    ("Can", "Öztürk", Gender::Male, 1996, "İstanbul"),
    ("Elif", "Şahin", Gender::Female, 1959, "Bursa"),
    ("Deniz", "Arslan", Gender::Other, 2008, "İstanbul"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut db_path = String::from("./teknoroma_dev.db");

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("TeknoRoma Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./teknoroma_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(products = existing, "Database already seeded, skipping (delete the file to regenerate)");
        return Ok(());
    }

    let now = Utc::now();

    // Stores, departments, staff
    let mut store_ids = Vec::new();
    for (idx, (name, city, district)) in STORES.iter().enumerate() {
        let store = db
            .stores()
            .insert(&Store {
                id: new_id(),
                name: name.to_string(),
                city: city.to_string(),
                district: Some(district.to_string()),
                address: None,
                phone: Some(format!("0212 555 {:02} {:02}", idx, idx + 10)),
                is_deleted: false,
                created_at: now,
                modified_at: None,
            })
            .await?;

        let mut departments = Vec::new();
        for dept in ["Satış", "Depo"] {
            let department = db
                .departments()
                .insert(&Department {
                    id: new_id(),
                    name: dept.to_string(),
                    store_id: store.id.clone(),
                    is_deleted: false,
                    created_at: now,
                    modified_at: None,
                })
                .await?;
            departments.push(department.id);
        }

        for (r, role) in ROLES.iter().enumerate() {
            let department_id = match role {
                Role::Warehouse => departments.get(1).cloned(),
                _ => departments.first().cloned(),
            };
            db.employees()
                .insert(&Employee {
                    id: new_id(),
                    first_name: role.as_str().replace('_', " "),
                    last_name: format!("Store{}", idx + 1),
                    email: Some(format!("{}.{}@teknoroma.com.tr", role.as_str(), idx + 1)),
                    phone: None,
                    role: *role,
                    store_id: store.id.clone(),
                    department_id,
                    hire_date: NaiveDate::from_ymd_opt(2020 + r as i32 % 4, 1, 15).ok_or("invalid hire date")?,
                    salary_cents: 3_500_000,
                    monthly_quota_cents: teknoroma_core::DEFAULT_MONTHLY_QUOTA.cents(),
                    is_active: true,
                    is_deleted: false,
                    created_at: now,
                    modified_at: None,
                })
                .await?;
        }

        store_ids.push(store.id);
    }
    info!(stores = store_ids.len(), employees = store_ids.len() * ROLES.len(), "Stores and staff created");

    // Catalog
    let mut category_ids = Vec::new();
    for (name, description) in CATEGORIES {
        let category = db
            .categories()
            .insert(&Category {
                id: new_id(),
                name: name.to_string(),
                description: Some(description.to_string()),
                is_deleted: false,
                created_at: now,
                modified_at: None,
            })
            .await?;
        category_ids.push(category.id);
    }

    let mut supplier_ids = Vec::new();
    for (idx, (company, city)) in SUPPLIERS.iter().enumerate() {
        let supplier = db
            .suppliers()
            .insert(&Supplier {
                id: new_id(),
                company_name: company.to_string(),
                contact_name: None,
                phone: None,
                email: None,
                address: None,
                city: Some(city.to_string()),
                tax_number: Some(format!("{:010}", 1_234_567_000 + idx)),
                is_deleted: false,
                created_at: now,
                modified_at: None,
            })
            .await?;
        supplier_ids.push(supplier.id);
    }

    for (idx, (name, category, supplier, price, stock, critical)) in PRODUCTS.iter().enumerate() {
        let product = Product {
            id: new_id(),
            name: name.to_string(),
            barcode: format!("869{:010}", idx + 1),
            description: None,
            unit_price_cents: price * 100,
            units_in_stock: *stock,
            critical_stock_level: *critical,
            // derived on insert
            stock_status: StockStatus::Sufficient,
            category_id: category_ids.get(*category).cloned(),
            supplier_id: supplier_ids.get(*supplier).cloned(),
            is_active: true,
            version: 1,
            is_deleted: false,
            created_at: now,
            modified_at: None,
        };

        if let Err(e) = db.products().insert(&product).await {
            warn!(name = %product.name, error = %e, "Failed to insert product");
        }
    }
    info!(products = PRODUCTS.len(), "Catalog created");

    // Customers
    for (idx, (first, last, gender, year, city)) in CUSTOMERS.iter().enumerate() {
        db.customers()
            .insert(&Customer {
                id: new_id(),
                identity_number: Some(format!("{}", 10_000_000_000_i64 + idx as i64 * 7_919)),
                first_name: first.to_string(),
                last_name: last.to_string(),
                phone: None,
                email: None,
                address: None,
                city: Some(city.to_string()),
                gender: Some(*gender),
                birth_date: NaiveDate::from_ymd_opt(*year, 6, 1),
                is_deleted: false,
                created_at: now,
                modified_at: None,
            })
            .await?;
    }
    info!(customers = CUSTOMERS.len(), "Customers created");

    let stock = db.reports().stock_report().await?;
    info!(
        sufficient = stock.sufficient,
        critical = stock.critical,
        out_of_stock = stock.out_of_stock,
        "Seed complete"
    );

    Ok(())
}

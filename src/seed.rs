//! Idempotent demo data. Every row is keyed by its natural unique column
//! (email, ndc, name) and inserted with `ON CONFLICT DO NOTHING`, so the
//! routine can be re-run against a populated database.

use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::{macros::datetime, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::auth::{claims::Role, password::hash_password};

pub struct SeedUser {
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: Role,
}

pub struct SeedProduct {
    pub product_name: &'static str,
    pub ndc: &'static str,
    pub supplier_name: &'static str,
    pub quantity: i32,
    pub store: &'static str,
    pub total: f64,
    pub product_group: &'static str,
    pub dispensed: i32,
    pub storage: i32,
    pub overage: i32,
    pub returned: i32,
}

pub const USERS: [SeedUser; 2] = [
    SeedUser {
        email: "admin@pharmacy.com",
        password: "admin123",
        name: "Admin User",
        role: Role::Admin,
    },
    SeedUser {
        email: "pharmacist@pharmacy.com",
        password: "pharm123",
        name: "Pharmacist User",
        role: Role::Pharmacist,
    },
];

pub const PRODUCTS: [SeedProduct; 3] = [
    SeedProduct {
        product_name: "Dexmethylphenidate 10mg",
        ndc: "42858-0721-01",
        supplier_name: "Jason",
        quantity: 25,
        store: "Fireside",
        total: 658.0,
        product_group: "STIMULANTS",
        dispensed: 10,
        storage: 5,
        overage: 8,
        returned: 2,
    },
    SeedProduct {
        product_name: "Adderral XR 20mg",
        ndc: "42858-0721-02",
        supplier_name: "Manson",
        quantity: 47,
        store: "Fireside",
        total: 6785.0,
        product_group: "AMPHETAMINE",
        dispensed: 20,
        storage: 10,
        overage: 15,
        returned: 2,
    },
    SeedProduct {
        product_name: "Dextro/Amphet ER 15MG",
        ndc: "42858-0721-03",
        supplier_name: "Albert",
        quantity: 98,
        store: "Fireside",
        total: 679.0,
        product_group: "AMPHETAMINE",
        dispensed: 30,
        storage: 15,
        overage: 20,
        returned: 5,
    },
];

pub const INVENTORY_START: OffsetDateTime = datetime!(2024-06-24 0:00 UTC);
pub const INVENTORY_END: OffsetDateTime = datetime!(2025-08-21 0:00 UTC);

/// (name, contact number)
pub const SUPPLIERS: [(&str, &str); 3] = [
    ("Jason Supplies", "123-456-7890"),
    ("Manson Pharma", "234-567-8901"),
    ("Albert Distribution", "345-678-9012"),
];

/// (name, stock in hand, location)
pub const STORES: [(&str, i32, &str); 2] = [
    ("Fireside Pharmacy", 100, "Downtown"),
    ("La Quinta Pharmacy", 150, "Uptown"),
];

pub async fn run(db: &PgPool) -> anyhow::Result<()> {
    info!("seeding database");
    let mut tx = db.begin().await.context("begin tx")?;

    let mut inserted = 0u64;
    inserted += seed_users(&mut tx).await?;
    inserted += seed_products(&mut tx).await?;
    inserted += seed_suppliers(&mut tx).await?;
    inserted += seed_stores(&mut tx).await?;

    tx.commit().await.context("commit tx")?;
    info!(inserted, "database seeded");
    Ok(())
}

async fn seed_users(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<u64> {
    let mut n = 0;
    for u in &USERS {
        let hash = hash_password(u.password)?;
        n += sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(u.email)
        .bind(hash)
        .bind(u.name)
        .bind(u.role.as_str())
        .execute(&mut **tx)
        .await
        .with_context(|| format!("seed user {}", u.email))?
        .rows_affected();
    }
    Ok(n)
}

async fn seed_products(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<u64> {
    let mut n = 0;
    for p in &PRODUCTS {
        n += sqlx::query(
            r#"
            INSERT INTO products (
                id, product_name, ndc, supplier_name, quantity, store, total,
                product_group, dispensed, storage, overage, returned,
                starting_inv_date, ending_inv_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (ndc) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(p.product_name)
        .bind(p.ndc)
        .bind(p.supplier_name)
        .bind(p.quantity)
        .bind(p.store)
        .bind(p.total)
        .bind(p.product_group)
        .bind(p.dispensed)
        .bind(p.storage)
        .bind(p.overage)
        .bind(p.returned)
        .bind(INVENTORY_START)
        .bind(INVENTORY_END)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("seed product {}", p.ndc))?
        .rows_affected();
    }
    Ok(n)
}

async fn seed_suppliers(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<u64> {
    let mut n = 0;
    for (name, contact) in SUPPLIERS {
        n += sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_number)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(contact)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("seed supplier {}", name))?
        .rows_affected();
    }
    Ok(n)
}

async fn seed_stores(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<u64> {
    let mut n = 0;
    for (name, stock, location) in STORES {
        n += sqlx::query(
            r#"
            INSERT INTO stores (id, name, stock_in_hand, location)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(stock)
        .bind(location)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("seed store {}", name))?
        .rows_affected();
    }
    Ok(n)
}

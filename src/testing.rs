//! In-memory repositories and helpers for handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use lazy_static::lazy_static;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    auth::{
        claims::Role,
        password::hash_password,
        repo::UserRepository,
        repo_types::User,
    },
    products::{
        repo::{page_offset, ProductRepository},
        repo_types::{NewProduct, Product, ProductPage},
    },
    seed,
    state::AppState,
};

lazy_static! {
    // Hashed once; argon2 is slow in debug builds.
    static ref SEED_USERS: Vec<User> = seed::USERS
        .iter()
        .map(|u| User {
            id: Uuid::new_v4(),
            email: u.email.to_string(),
            password_hash: hash_password(u.password).expect("hash seed password"),
            name: u.name.to_string(),
            role: u.role,
            created_at: OffsetDateTime::now_utc(),
        })
        .collect();
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn seeded() -> Self {
        Self {
            users: Mutex::new(SEED_USERS.clone()),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

#[derive(Default)]
pub struct MemoryProducts {
    rows: Mutex<Vec<Product>>,
    last_created: Mutex<Option<OffsetDateTime>>,
}

impl MemoryProducts {
    /// Strictly increasing creation times so ordering is deterministic.
    fn next_created_at(&self) -> OffsetDateTime {
        let mut last = self.last_created.lock().unwrap();
        let mut now = OffsetDateTime::now_utc();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

fn apply(p: &mut Product, input: NewProduct) {
    p.product_name = input.product_name;
    p.ndc = input.ndc;
    p.supplier_name = input.supplier_name;
    p.quantity = input.quantity;
    p.store = input.store;
    p.total = input.total;
    p.product_group = input.product_group;
    p.dispensed = input.dispensed;
    p.storage = input.storage;
    p.overage = input.overage;
    p.returned = input.returned;
    p.starting_inv_date = input.starting_inv_date;
    p.ending_inv_date = input.ending_inv_date;
}

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn create(&self, input: NewProduct) -> anyhow::Result<Product> {
        let now = self.next_created_at();
        let mut rows = self.rows.lock().unwrap();
        anyhow::ensure!(
            !rows.iter().any(|p| p.ndc == input.ndc),
            "duplicate key value violates unique constraint \"products_ndc_key\""
        );
        let mut product = Product {
            id: Uuid::new_v4(),
            product_name: String::new(),
            ndc: String::new(),
            supplier_name: String::new(),
            quantity: 0,
            store: String::new(),
            total: 0.0,
            product_group: String::new(),
            dispensed: 0,
            storage: 0,
            overage: 0,
            returned: 0,
            starting_inv_date: None,
            ending_inv_date: None,
            created_at: now,
            updated_at: now,
        };
        apply(&mut product, input);
        rows.push(product.clone());
        Ok(product)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: Uuid, input: NewProduct) -> anyhow::Result<Option<Product>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|p| p.id == id).map(|p| {
            apply(p, input);
            p.updated_at = OffsetDateTime::now_utc();
            p.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }

    async fn list(&self, page: i64, page_size: i64) -> anyhow::Result<ProductPage> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = rows.len() as i64;
        let items = rows
            .into_iter()
            .skip(page_offset(page, page_size).min(total) as usize)
            .take(page_size as usize)
            .collect();
        Ok(ProductPage { items, total })
    }
}

/// Fake state with the two demo users loaded and an empty product table.
pub fn seeded_state() -> AppState {
    AppState {
        users: Arc::new(MemoryUsers::seeded()),
        ..AppState::fake()
    }
}

pub fn token_for(state: &AppState, role: Role) -> String {
    state.keys.issue(Uuid::new_v4(), role).expect("sign test token")
}

/// Sends one request through the full router.
pub async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = crate::app::build_app(state.clone())
        .oneshot(req)
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

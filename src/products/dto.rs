use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

use super::repo_types::NewProduct;
use crate::error::{FieldError, ValidationError};

pub const PAGE_SIZE: i64 = 10;

/// Loose product body as sent by clients. Types are checked in `validate`
/// so that every bad field can be reported at once.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub product_name: Option<Value>,
    pub ndc: Option<Value>,
    pub supplier_name: Option<Value>,
    pub quantity: Option<Value>,
    pub store: Option<Value>,
    pub total: Option<Value>,
    pub product_group: Option<Value>,
    pub dispensed: Option<Value>,
    pub storage: Option<Value>,
    pub overage: Option<Value>,
    #[serde(rename = "return")]
    pub returned: Option<Value>,
    pub starting_inv_date: Option<Value>,
    pub ending_inv_date: Option<Value>,
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &'static str, message: &str) {
        self.errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    fn text(&mut self, field: &'static str, v: Option<&Value>) -> String {
        match v {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                self.fail(field, "is required");
                String::new()
            }
            Some(_) => {
                self.fail(field, "must be a string");
                String::new()
            }
        }
    }

    /// Integers; numeric strings are accepted. Missing values are an error
    /// when `required`, otherwise 0.
    fn int(&mut self, field: &'static str, v: Option<&Value>, required: bool) -> i32 {
        let parsed = match v {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::Number(n)) => Some(
                n.as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            ),
            Some(Value::String(s)) => Some(s.trim().parse::<i64>().ok()),
            Some(_) => Some(None),
        };
        match parsed {
            None if required => {
                self.fail(field, "is required");
                0
            }
            None => 0,
            Some(Some(n)) => match i32::try_from(n) {
                Ok(n) => n,
                Err(_) => {
                    self.fail(field, "is out of range");
                    0
                }
            },
            Some(None) => {
                self.fail(field, "must be an integer");
                0
            }
        }
    }

    fn number(&mut self, field: &'static str, v: Option<&Value>) -> f64 {
        let parsed = match v {
            None | Some(Value::Null) => {
                self.fail(field, "is required");
                return 0.0;
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.fail(field, "is required");
                return 0.0;
            }
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed.filter(|f| f.is_finite()) {
            Some(f) => f,
            None => {
                self.fail(field, "must be a number");
                0.0
            }
        }
    }

    fn date(&mut self, field: &'static str, v: Option<&Value>) -> Option<OffsetDateTime> {
        match v {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => match parse_date(s.trim()) {
                Some(d) => Some(d),
                None => {
                    self.fail(field, "must be an RFC 3339 timestamp or YYYY-MM-DD date");
                    None
                }
            },
            Some(_) => {
                self.fail(field, "must be a date string");
                None
            }
        }
    }
}

fn parse_date(s: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(ts);
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

impl ProductPayload {
    pub fn validate(&self) -> Result<NewProduct, ValidationError> {
        let mut c = Checker::default();
        let product = NewProduct {
            product_name: c.text("productName", self.product_name.as_ref()),
            ndc: c.text("ndc", self.ndc.as_ref()),
            supplier_name: c.text("supplierName", self.supplier_name.as_ref()),
            quantity: c.int("quantity", self.quantity.as_ref(), true),
            store: c.text("store", self.store.as_ref()),
            total: c.number("total", self.total.as_ref()),
            product_group: c.text("productGroup", self.product_group.as_ref()),
            dispensed: c.int("dispensed", self.dispensed.as_ref(), false),
            storage: c.int("storage", self.storage.as_ref(), false),
            overage: c.int("overage", self.overage.as_ref(), false),
            returned: c.int("return", self.returned.as_ref(), false),
            starting_inv_date: c.date("startingInvDate", self.starting_inv_date.as_ref()),
            ending_inv_date: c.date("endingInvDate", self.ending_inv_date.as_ref()),
        };
        if c.errors.is_empty() {
            Ok(product)
        } else {
            Err(ValidationError { fields: c.errors })
        }
    }
}

/// `?page=N`; anything unparseable or below 1 means page 1.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

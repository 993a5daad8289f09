//! Checkout payload validation.
//!
//! Pure: nothing here touches a store. Quantities, total and phone arrive as
//! raw JSON values so that a wrong type is reported as a field error
//! instead of a body parse failure.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{CustomerContact, Money, ProductId, UserId};

const PHONE_DIGITS: usize = 10;

/// Raw `POST /orders` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[serde(default)]
    pub products: Vec<CheckoutLine>,
    #[serde(default)]
    pub total: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Value,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: Value,
    /// Display name sent by the client. Ignored: the stored name is authoritative.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A checkout that passed validation.
///
/// Lines are unique per product and sorted by product id.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub user_id: Option<UserId>,
    pub lines: Vec<RequestedLine>,
    pub customer: CustomerContact,
    pub claimed_total: Money,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("products[{line}]: product id is required")]
    InvalidProductReference { line: usize },
    #[error("products[{line}]: quantity must be a positive integer")]
    InvalidQuantity { line: usize },
    #[error("{field} is required")]
    MissingCustomerField { field: &'static str },
    #[error("phone must be exactly 10 digits")]
    InvalidPhoneFormat,
    #[error("total must be a positive number")]
    InvalidTotal,
    #[error("unknown user: {0}")]
    UnknownUser(UserId),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// Name of the offending request field, for error details.
    pub fn field(&self) -> Option<String> {
        match self {
            ValidationError::EmptyCart => Some("products".to_string()),
            ValidationError::InvalidProductReference { line } => Some(format!("products[{}].productId", line)),
            ValidationError::InvalidQuantity { line } => Some(format!("products[{}].quantity", line)),
            ValidationError::MissingCustomerField { field } => Some(field.to_string()),
            ValidationError::InvalidPhoneFormat => Some("phone".to_string()),
            ValidationError::InvalidTotal => Some("total".to_string()),
            ValidationError::UnknownUser(_) => Some("userId".to_string()),
            ValidationError::MalformedBody(_) => None,
        }
    }
}

/// Turns a raw checkout payload into a [`ValidatedOrder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderValidator;

impl OrderValidator {
    pub fn validate(&self, payload: &CheckoutPayload) -> Result<ValidatedOrder, ValidationError> {
        if payload.products.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        let mut merged: BTreeMap<ProductId, u32> = BTreeMap::new();
        for (line, item) in payload.products.iter().enumerate() {
            let product_id = item
                .product_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .ok_or(ValidationError::InvalidProductReference { line })?;
            let quantity = positive_integer(&item.quantity).ok_or(ValidationError::InvalidQuantity { line })?;

            let slot = merged.entry(ProductId::from(product_id)).or_insert(0);
            *slot = slot.checked_add(quantity).ok_or(ValidationError::InvalidQuantity { line })?;
        }

        let name = required(payload.name.as_deref(), "name")?;
        let address = required(payload.address.as_deref(), "address")?;
        let phone = phone_text(&payload.phone).ok_or(ValidationError::MissingCustomerField { field: "phone" })?;
        if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhoneFormat);
        }

        let claimed_total = payload
            .total
            .as_f64()
            .filter(|total| *total > 0.0)
            .and_then(Money::from_major)
            .ok_or(ValidationError::InvalidTotal)?;

        let user_id = payload
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(UserId::from);

        Ok(ValidatedOrder {
            user_id,
            lines: merged
                .into_iter()
                .map(|(product_id, quantity)| RequestedLine { product_id, quantity })
                .collect(),
            customer: CustomerContact { name, address, phone },
            claimed_total,
        })
    }
}

/// Accepts JSON integers and integral floats in `1..=u32::MAX`.
fn positive_integer(value: &Value) -> Option<u32> {
    let number = value.as_number()?;
    let whole = match number.as_u64() {
        Some(n) => n,
        None => {
            let float = number.as_f64()?;
            if float.fract() != 0.0 || float < 1.0 || float > u32::MAX as f64 {
                return None;
            }
            float as u64
        }
    };
    u32::try_from(whole).ok().filter(|n| *n > 0)
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ValidationError::MissingCustomerField { field })
}

/// Phone numbers may arrive as strings or bare JSON numbers.
fn phone_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

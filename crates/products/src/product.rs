use serde::{Deserialize, Serialize};

use shopfront_core::{DomainError, DomainResult, Price, Record};

const MAX_NAME_LEN: usize = 200;

/// Catalog product as stored in the managed document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Units on hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            description: None,
            category: None,
            stock: None,
        }
    }
}

/// Partial update for a [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

fn check_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn check_category(category: &str) -> DomainResult<()> {
    if category.trim().is_empty() {
        return Err(DomainError::validation("category cannot be blank"));
    }
    Ok(())
}

fn check_stock(stock: i64) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::validation("stock cannot be negative"));
    }
    Ok(())
}

impl Record for Product {
    type Patch = ProductPatch;

    const KIND: &'static str = "product";

    fn validate(&self) -> DomainResult<()> {
        check_name(&self.name)?;
        self.price.check("price")?;
        if let Some(category) = &self.category {
            check_category(category)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        Ok(())
    }

    fn validate_patch(patch: &ProductPatch) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            check_name(name)?;
        }
        if let Some(price) = &patch.price {
            price.check("price")?;
        }
        if let Some(category) = &patch.category {
            check_category(category)?;
        }
        if let Some(stock) = patch.stock {
            check_stock(stock)?;
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(stock) = patch.stock {
            self.stock = Some(stock);
        }
    }
}

use serde::{Deserialize, Serialize};

use shopfront_core::{DomainError, DomainResult, Price, Record};

const MAX_NAME_LEN: usize = 200;

/// Inventory item as stored in the document database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl Item {
    pub fn new(name: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            description: None,
            quantity: None,
        }
    }
}

/// Partial update for an [`Item`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
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

fn check_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

impl Record for Item {
    type Patch = ItemPatch;

    const KIND: &'static str = "item";

    fn validate(&self) -> DomainResult<()> {
        check_name(&self.name)?;
        self.price.check("price")?;
        if let Some(q) = self.quantity {
            check_quantity(q)?;
        }
        Ok(())
    }

    fn validate_patch(patch: &ItemPatch) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            check_name(name)?;
        }
        if let Some(price) = &patch.price {
            price.check("price")?;
        }
        if let Some(q) = patch.quantity {
            check_quantity(q)?;
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = Some(quantity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget() -> Item {
        Item::new("Widget", 10u64)
    }

    #[test]
    fn valid_item_passes_validation() {
        assert!(widget().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let item = Item::new("   ", 10u64);
        let err = item.validate().unwrap_err();
        assert_eq!(err, DomainError::validation("name cannot be empty"));
    }

    #[test]
    fn overlong_name_is_rejected() {
        let item = Item::new("x".repeat(MAX_NAME_LEN + 1), 10u64);
        assert!(matches!(item.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut item = widget();
        item.quantity = Some(-3);
        let err = item.validate().unwrap_err();
        assert_eq!(err, DomainError::validation("quantity cannot be negative"));
    }

    #[test]
    fn deserializes_from_client_payload_ignoring_unknown_fields() {
        let item: Item = serde_json::from_value(json!({
            "name": "Widget",
            "price": 10,
            "colour": "blue"
        }))
        .unwrap();
        assert_eq!(item, widget());
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({ "name": "Widget", "price": 10 })
        );
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut item = widget();
        item.description = Some("small".to_string());

        item.apply_patch(ItemPatch {
            price: Some(Price::from(12u64)),
            quantity: Some(5),
            ..ItemPatch::default()
        });

        assert_eq!(item.name, "Widget");
        assert_eq!(item.price, Price::from(12u64));
        assert_eq!(item.description.as_deref(), Some("small"));
        assert_eq!(item.quantity, Some(5));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = ItemPatch {
            name: Some("Gadget".to_string()),
            ..ItemPatch::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "name": "Gadget" }));
    }

    #[test]
    fn invalid_patch_fields_are_rejected() {
        let patch = ItemPatch {
            name: Some(String::new()),
            ..ItemPatch::default()
        };
        assert!(Item::validate_patch(&patch).is_err());

        let patch = ItemPatch {
            price: Some(Price::from(-1i64)),
            ..ItemPatch::default()
        };
        assert!(Item::validate_patch(&patch).is_err());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a valid patch applied to a valid item yields a valid item.
            #[test]
            fn valid_patch_keeps_item_valid(
                name in proptest::option::of("[A-Za-z][A-Za-z0-9 ]{0,99}"),
                price in proptest::option::of(0u64..1_000_000),
                quantity in proptest::option::of(0i64..10_000),
            ) {
                let patch = ItemPatch {
                    name,
                    price: price.map(Price::from),
                    description: None,
                    quantity,
                };
                prop_assert!(Item::validate_patch(&patch).is_ok());

                let mut item = widget();
                item.apply_patch(patch);
                prop_assert!(item.validate().is_ok());
            }

            /// Property: merging an empty patch changes nothing.
            #[test]
            fn empty_patch_is_a_no_op(name in "[A-Za-z][A-Za-z0-9 ]{0,99}", price in 0u64..1_000_000) {
                let mut item = Item::new(name, price);
                let before = item.clone();
                item.apply_patch(ItemPatch::default());
                prop_assert_eq!(item, before);
            }
        }
    }
}

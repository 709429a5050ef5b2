//! Scenario tests for validation, defaults and formulas working together.

use tenantry_expr::Value;
use tenantry_fields::{
    apply_defaults, calculate_formulas, validate_entity, EntityTypeDef, FieldDef, FieldType,
    Record, SelectOption, ValidationRules,
};

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn contact() -> EntityTypeDef {
    EntityTypeDef::new("contact", "Contact", "Contacts", "user")
        .field(FieldDef::new("name", "Name", FieldType::Text).required())
        .field(FieldDef::new("email", "Email", FieldType::Email).required())
}

#[test]
fn contact_missing_email() {
    let result = validate_entity(&contact(), &record(&[("name", "Jane Doe".into())]));
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "email");
    assert_eq!(result.errors[0].message, "Email is required");
}

#[test]
fn contact_malformed_email() {
    let result = validate_entity(
        &contact(),
        &record(&[("name", "Jane Doe".into()), ("email", "not-an-email".into())]),
    );
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0]
        .message
        .ends_with("must be a valid email address"));
}

#[test]
fn contact_valid() {
    let result = validate_entity(
        &contact(),
        &record(&[
            ("name", "Jane Doe".into()),
            ("email", "jane@example.com".into()),
        ]),
    );
    assert!(result.valid);
    assert!(result.errors.is_empty());
}

#[test]
fn bedrooms_bounds() {
    let property = EntityTypeDef::new("property", "Property", "Properties", "home").field(
        FieldDef::new("bedrooms", "Bedrooms", FieldType::Number)
            .validation(ValidationRules::range(0.0, 20.0)),
    );
    for (value, ok) in [(-1, false), (5, true), (20, true)] {
        let result = validate_entity(&property, &record(&[("bedrooms", value.into())]));
        assert_eq!(result.valid, ok, "bedrooms = {value}");
    }
}

#[test]
fn validation_result_serializes_for_clients() {
    let result = validate_entity(&contact(), &Record::new());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["errors"][0]["field"], "name");
    assert_eq!(json["errors"][0]["message"], "Name is required");
    assert!(json["errors"][0]["value"].is_null());
}

#[tokio::test]
async fn validate_default_then_calculate() {
    let order = EntityTypeDef::new("order", "Order", "Orders", "cart")
        .field(FieldDef::new("quantity", "Quantity", FieldType::Number).required())
        .field(FieldDef::new("unit_price", "Unit Price", FieldType::Currency).required())
        .field(
            FieldDef::new("discount", "Discount", FieldType::Percentage)
                .default_value(0)
                .validation(ValidationRules::range(0.0, 100.0)),
        )
        .field(
            FieldDef::new("status", "Status", FieldType::Select)
                .default_value("pending")
                .options([
                    SelectOption::new("pending", "Pending"),
                    SelectOption::new("shipped", "Shipped"),
                ]),
        )
        .field(
            FieldDef::new("total", "Total", FieldType::Formula)
                .formula("{quantity} * {unit_price} * (100 - {discount}) / 100"),
        );

    let input = record(&[("quantity", 3.into()), ("unit_price", "20".into())]);
    assert!(validate_entity(&order, &input).valid);

    let defaulted = apply_defaults(&order, &input);
    assert_eq!(defaulted["status"], Value::from("pending"));
    assert!(validate_entity(&order, &defaulted).valid);

    let calculated = calculate_formulas(&order, &defaulted).await;
    assert_eq!(calculated["total"], Value::from(60));
}

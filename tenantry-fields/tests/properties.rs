//! Property-based tests for schema invariants.

use proptest::prelude::*;
use tenantry_expr::Value;
use tenantry_fields::{
    apply_defaults, validate_entity, EntityTypeDef, FieldDef, FieldType, Record, SelectOption,
};

/// Non-computed types with a representative well-formed value.
fn well_formed(ty: FieldType) -> Option<Value> {
    let value = match ty {
        FieldType::Text | FieldType::Richtext | FieldType::Color => Value::from("hello"),
        FieldType::Barcode | FieldType::Qrcode => Value::from("0123456789"),
        FieldType::Number | FieldType::Currency | FieldType::Percentage | FieldType::Rating => {
            Value::from(42)
        }
        FieldType::Date | FieldType::Datetime => Value::from("2024-02-29T12:00:00Z"),
        FieldType::Boolean => Value::from(false),
        FieldType::Select => Value::from("a"),
        FieldType::Multiselect => Value::List(vec!["a".into()]),
        FieldType::UserReference | FieldType::EntityReference => Value::from("01HZX"),
        FieldType::File | FieldType::Image | FieldType::Address => Value::from("blob"),
        FieldType::Url => Value::from("https://example.com"),
        FieldType::Email => Value::from("a@b.co"),
        FieldType::Phone => Value::from("+44 20 7946 0958"),
        FieldType::Formula | FieldType::Lookup | FieldType::Rollup => return None,
    };
    Some(value)
}

/// A value of the wrong representation for `ty`.
fn malformed(ty: FieldType) -> Option<Value> {
    let value = match ty {
        FieldType::Number | FieldType::Currency | FieldType::Percentage | FieldType::Rating => {
            Value::from("abc")
        }
        FieldType::Formula | FieldType::Lookup | FieldType::Rollup => return None,
        FieldType::Date | FieldType::Datetime => Value::from("abc"),
        _ => Value::List(vec![Value::from(1)]),
    };
    Some(value)
}

fn single(ty: FieldType, required: bool) -> EntityTypeDef {
    let mut field = FieldDef::new("f", "Field", ty).options(if ty.has_options() {
        vec![SelectOption::new("a", "A"), SelectOption::new("b", "B")]
    } else {
        Vec::new()
    });
    field.required = required;
    EntityTypeDef::new("t", "T", "Ts", "x").field(field)
}

fn with(value: Value) -> Record {
    let mut data = Record::new();
    data.insert("f".into(), value);
    data
}

#[test]
fn type_safety_for_every_type() {
    for ty in FieldType::ALL {
        let et = single(ty, false);
        if let Some(good) = well_formed(ty) {
            let result = validate_entity(&et, &with(good));
            assert!(result.valid, "{ty} rejected a well-formed value: {:?}", result.errors);
        }
        if let Some(bad) = malformed(ty) {
            let result = validate_entity(&et, &with(bad));
            assert_eq!(result.errors.len(), 1, "{ty} accepted a malformed value");
        }
    }
}

fn field_type() -> impl Strategy<Value = FieldType> {
    prop::sample::select(FieldType::ALL.to_vec())
}

fn blank() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        Just(Some(Value::from(""))),
    ]
}

proptest! {
    #[test]
    fn required_blank_yields_exactly_one_error(ty in field_type(), value in blank()) {
        let et = single(ty, true);
        let data = value.map(with).unwrap_or_default();
        let result = validate_entity(&et, &data);
        prop_assert!(!result.valid);
        prop_assert_eq!(result.errors.len(), 1);
        prop_assert_eq!(&result.errors[0].message, "Field is required");
    }

    #[test]
    fn select_closure(
        options in prop::collection::hash_set("[a-z]{1,6}", 1..6),
        candidate in "[a-z]{1,6}",
        rotate in 0usize..6,
    ) {
        let mut options: Vec<String> = options.into_iter().collect();
        let len = options.len();
        options.rotate_left(rotate % len);
        let field = FieldDef::new("f", "Field", FieldType::Select)
            .options(options.iter().map(|o| SelectOption::new(o.clone(), o.to_uppercase())));
        let et = EntityTypeDef::new("t", "T", "Ts", "x").field(field);
        let result = validate_entity(&et, &with(Value::from(candidate.as_str())));
        prop_assert_eq!(result.valid, options.contains(&candidate));
    }

    #[test]
    fn defaults_are_idempotent(
        defaults in prop::collection::vec(prop::option::of(-1000i32..1000), 1..8),
        present in prop::collection::vec(any::<bool>(), 8),
    ) {
        let mut et = EntityTypeDef::new("t", "T", "Ts", "x");
        let mut data = Record::new();
        for (i, default) in defaults.iter().enumerate() {
            let mut field = FieldDef::new(format!("f{i}"), format!("F{i}"), FieldType::Number);
            field.default_value = default.map(Value::from);
            et = et.field(field);
            if present[i] {
                data.insert(format!("f{i}"), Value::from("user"));
            }
        }
        let once = apply_defaults(&et, &data);
        let twice = apply_defaults(&et, &once);
        prop_assert_eq!(&once, &twice);
        for (i, default) in defaults.iter().enumerate() {
            let key = format!("f{i}");
            if present[i] {
                prop_assert_eq!(&once[&key], &Value::from("user"));
            } else {
                prop_assert_eq!(once.get(&key).cloned(), default.map(Value::from));
            }
        }
    }
}

//! CloudFormation intrinsic functions
//!
//! Values that are only known at deploy time are expressed as intrinsic
//! function objects. Every helper returns a plain `serde_json::Value` so it
//! can be dropped into any resource property.

use serde_json::{Value, json};

/// `{"Ref": logical_id}`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [logical_id, attribute]}`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{"Fn::Join": [separator, parts]}`
pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

/// `{"Fn::Sub": template}`
pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

/// The `index`th availability zone of the deployment region
pub fn availability_zone(index: usize) -> Value {
    json!({ "Fn::Select": [index, { "Fn::GetAZs": "" }] })
}

/// Dynamic reference to a field of a Secrets Manager secret
///
/// Resolved by CloudFormation when the consuming resource is deployed, so the
/// value never appears in the template.
pub fn secret_field(secret_logical_id: &str, field: &str) -> Value {
    join(
        "",
        vec![
            Value::String("{{resolve:secretsmanager:".to_string()),
            reference(secret_logical_id),
            Value::String(format!(":SecretString:{field}::}}}}")),
        ],
    )
}

/// Check whether a value is an intrinsic function rather than a literal
pub fn is_intrinsic(value: &Value) -> bool {
    match value {
        Value::Object(map) if map.len() == 1 => map
            .keys()
            .next()
            .is_some_and(|k| k == "Ref" || k.starts_with("Fn::")),
        _ => false,
    }
}

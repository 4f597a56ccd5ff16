use schemars::Schema;
use serde_json::{Map, Value};

// Align with docs: expose a RootSchema alias.
pub type RootSchema = Schema;

pub fn schema_for<T: schemars::JsonSchema>() -> RootSchema {
    schemars::schema_for!(T)
}

fn object_root() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), Value::String("object".into()));
    map
}

fn root_type(map: &Map<String, Value>) -> Option<&str> {
    map.get("type").and_then(Value::as_str)
}

/// Render an input schema for the wire. The root is always `type: object`:
/// an unconstrained root (e.g. `true` or `{}`) gains the type, any other
/// root type is replaced.
pub fn to_wire(schema: &RootSchema) -> Value {
    let mut map = match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => return Value::Object(object_root()),
    };
    match root_type(&map) {
        Some("object") => {}
        Some(_) => return Value::Object(object_root()),
        None if map.keys().any(|k| k == "anyOf" || k == "oneOf" || k == "allOf") => {
            return Value::Object(object_root());
        }
        None => {
            map.insert("type".into(), Value::String("object".into()));
        }
    }
    Value::Object(map)
}

/// Render an output schema for the wire, matching what `tools/call` puts in
/// `structuredContent`: objects as-is, any other value under `result`.
///
/// - object roots pass through;
/// - other typed roots (arrays, strings, numbers) are described inside a
///   `{"result": ...}` wrapper, with `$schema`/`$defs` hoisted to the root;
/// - untyped roots (any JSON value) become a bare object schema, since the
///   payload may arrive either way.
pub fn output_to_wire(schema: &RootSchema) -> Value {
    let mut inner = match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => return Value::Object(object_root()),
    };
    match root_type(&inner) {
        Some("object") => Value::Object(inner),
        Some(_) => {
            let mut root = object_root();
            for key in ["$schema", "$defs"] {
                if let Some(v) = inner.remove(key) {
                    root.insert(key.into(), v);
                }
            }
            let mut properties = Map::new();
            properties.insert("result".into(), Value::Object(inner));
            root.insert("properties".into(), Value::Object(properties));
            root.insert("required".into(), Value::Array(vec![Value::String("result".into())]));
            Value::Object(root)
        }
        None => {
            let mut root = object_root();
            if let Some(v) = inner.remove("$schema") {
                root.insert("$schema".into(), v);
            }
            Value::Object(root)
        }
    }
}

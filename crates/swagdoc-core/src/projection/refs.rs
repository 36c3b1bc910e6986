use serde_json::Value;

/// Canonical pool prefix and its Swagger 2.0 counterpart.
const SWAGGER2_POOLS: [(&str, &str); 3] = [
    ("#/components/schemas/", "#/definitions/"),
    ("#/components/parameters/", "#/parameters/"),
    ("#/components/responses/", "#/responses/"),
];

/// Rewrites every canonical `$ref` in `value` to its Swagger 2.0 location.
pub fn to_swagger2_refs(value: &mut Value) {
    rewrite(value, &|path| {
        SWAGGER2_POOLS.iter().find_map(|(canonical, legacy)| {
            path.strip_prefix(canonical)
                .map(|name| format!("{legacy}{name}"))
        })
    });
}

/// Rewrites every Swagger 2.0 `$ref` in `value` to the canonical location.
pub fn to_canonical_refs(value: &mut Value) {
    rewrite(value, &|path| {
        SWAGGER2_POOLS.iter().find_map(|(canonical, legacy)| {
            path.strip_prefix(legacy)
                .map(|name| format!("{canonical}{name}"))
        })
    });
}

fn rewrite(value: &mut Value, map: &dyn Fn(&str) -> Option<String>) {
    match value {
        Value::Object(object) => {
            for (key, child) in object.iter_mut() {
                match child {
                    Value::String(path) if key == "$ref" => {
                        if let Some(rewritten) = map(path) {
                            *path = rewritten;
                        }
                    }
                    _ => rewrite(child, map),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite(item, map);
            }
        }
        _ => {}
    }
}

/// Collects every `$ref` string in `value`, in document order.
pub fn collect_refs(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                match child {
                    Value::String(path) if key == "$ref" => out.push(path.clone()),
                    _ => collect_refs(child, out),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        _ => {}
    }
}

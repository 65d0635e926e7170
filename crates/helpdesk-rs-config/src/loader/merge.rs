//! JSON merge for layered configuration.

use serde_json::{Map, Value};

/// Merge `overlay` into `base`. Objects merge key by key; any other value
/// replaces the base value. Keys holding a non-object value in `locked` are
/// left untouched.
pub(super) fn merge_layer(base: &mut Value, overlay: &Value, locked: Option<&Value>) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let locked_map = match locked {
                Some(Value::Object(map)) => Some(map),
                Some(_) => return,
                None => None,
            };
            for (key, value) in overlay_map {
                let key_lock = locked_map.and_then(|map| map.get(key));
                if key_lock.is_some_and(|lock| !lock.is_object()) {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(existing) => merge_layer(existing, value, key_lock),
                    None if key_lock.is_some() => {
                        let mut entry = Value::Object(Map::new());
                        merge_layer(&mut entry, value, key_lock);
                        base_map.insert(key.clone(), entry);
                    }
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            if locked.is_none() {
                *base_slot = overlay_value.clone();
            }
        }
    }
}

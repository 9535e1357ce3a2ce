//! Field-level fallback decoding.
//!
//! The server sends `null` for unset fields, floats where integers are
//! expected, and occasionally a value of the wrong type altogether. A single
//! bad field must not make the surrounding message unreadable, so wire
//! structs decode each field through [`lenient`]: a value that does not fit
//! becomes the field's default.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Deserialize a field, falling back to `T::default()` when the value does
/// not fit. Finite floats are rounded when the target is an integer.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(&value))
}

fn coerce<T: DeserializeOwned + Default>(value: &Value) -> T {
    if let Ok(parsed) = T::deserialize(value) {
        return parsed;
    }
    let Some(number) = value.as_f64().filter(|n| n.is_finite()) else {
        if !value.is_null() {
            tracing::trace!(%value, "field value does not fit, using default");
        }
        return T::default();
    };

    let rounded = number.round();
    let whole = if rounded < 0.0 { Value::from(rounded as i64) } else { Value::from(rounded as u64) };
    T::deserialize(&whole).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_becomes_default() {
        assert_eq!(coerce::<String>(&Value::Null), "");
        assert_eq!(coerce::<u64>(&Value::Null), 0);
        assert_eq!(coerce::<Option<String>>(&Value::Null), None);
    }

    #[test]
    fn floats_round_into_integers() {
        assert_eq!(coerce::<i64>(&json!(87.5)), 88);
        assert_eq!(coerce::<u32>(&json!(12.0)), 12);
        assert_eq!(coerce::<i64>(&json!(-3.4)), -3);
        assert_eq!(coerce::<Option<u64>>(&json!(41.6)), Some(42));
    }

    #[test]
    fn wrong_type_becomes_default() {
        assert_eq!(coerce::<u64>(&json!("soon")), 0);
        assert!(!coerce::<bool>(&json!(1)));
        assert_eq!(coerce::<u32>(&json!(-5.0)), 0);
        assert_eq!(coerce::<Vec<String>>(&json!({"a": 1})), Vec::<String>::new());
    }

    #[test]
    fn fitting_values_pass_through() {
        assert_eq!(coerce::<f64>(&json!(1.5)), 1.5);
        assert_eq!(coerce::<String>(&json!("vega")), "vega");
        assert_eq!(coerce::<Value>(&json!({"k": [1]})), json!({"k": [1]}));
    }
}

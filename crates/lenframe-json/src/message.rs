use bytes::BytesMut;
use lenframe_frame::{encode_frame, PrefixWidth};
use serde::Serialize;
use serde_json::Value;

use crate::error::{JsonFrameError, Result};

/// What top-level values may be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePolicy {
    /// Require an object, array or `null` at the top level.
    ///
    /// Default `true`; strings, numbers and booleans are refused with
    /// [`JsonFrameError::InvalidMessage`].
    pub require_structured: bool,
}

impl MessagePolicy {
    /// Accept any JSON value, scalars included.
    pub fn any_value() -> Self {
        Self {
            require_structured: false,
        }
    }

    /// Check a serialized value against the policy.
    pub fn check(&self, value: &Value) -> Result<()> {
        let structured = value.is_object() || value.is_array() || value.is_null();
        if self.require_structured && !structured {
            return Err(JsonFrameError::InvalidMessage(format!(
                "message must be a JSON object, array or null, got {}",
                kind_name(value)
            )));
        }
        Ok(())
    }
}

impl Default for MessagePolicy {
    fn default() -> Self {
        Self {
            require_structured: true,
        }
    }
}

/// Serialize one value into a self-contained JSON payload.
pub fn serialize_message<T>(value: &T, policy: MessagePolicy) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(value).map_err(|err| JsonFrameError::InvalidMessage(err.to_string()))?;
    policy.check(&value)?;
    serde_json::to_vec(&value).map_err(|err| JsonFrameError::InvalidMessage(err.to_string()))
}

/// Serialize `value` and append it to `dst` as one frame.
///
/// `dst` is untouched unless the whole frame can be produced.
pub fn encode_message<T>(
    value: &T,
    prefix_width: PrefixWidth,
    policy: MessagePolicy,
    dst: &mut BytesMut,
) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let payload = serialize_message(value, policy)?;
    encode_frame(&payload, prefix_width, dst)?;
    Ok(())
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use lenframe_frame::FrameError;
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_object_with_prefix() {
        let mut dst = BytesMut::new();
        encode_message(
            &json!({"eight": "bit"}),
            PrefixWidth::new(1).unwrap(),
            MessagePolicy::default(),
            &mut dst,
        )
        .unwrap();

        assert_eq!(dst[0], 0x0F);
        assert_eq!(&dst[1..], br#"{"eight":"bit"}"#);
    }

    #[test]
    fn structured_policy_refuses_scalars() {
        for value in [json!("text"), json!(3), json!(true)] {
            let err = serialize_message(&value, MessagePolicy::default()).unwrap_err();
            assert!(matches!(err, JsonFrameError::InvalidMessage(_)), "{value}");
        }
        assert!(serialize_message(&json!([1, 2]), MessagePolicy::default()).is_ok());
    }

    #[test]
    fn structured_policy_accepts_null() {
        let payload = serialize_message(&json!(null), MessagePolicy::default()).unwrap();
        assert_eq!(payload, b"null");

        let mut dst = BytesMut::new();
        let none: Option<u8> = None;
        encode_message(&none, PrefixWidth::new(1).unwrap(), MessagePolicy::default(), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"\x04null");
    }

    #[test]
    fn permissive_policy_accepts_scalars() {
        let payload = serialize_message(&json!("text"), MessagePolicy::any_value()).unwrap();
        assert_eq!(payload, br#""text""#);
    }

    #[test]
    fn unserializable_value_is_invalid_message() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "non-string key");

        let mut dst = BytesMut::new();
        let err = encode_message(
            &map,
            PrefixWidth::DEFAULT,
            MessagePolicy::default(),
            &mut dst,
        )
        .unwrap_err();

        assert!(matches!(err, JsonFrameError::InvalidMessage(_)));
        assert!(dst.is_empty());
    }

    #[test]
    fn too_large_for_prefix_writes_nothing() {
        let big = json!({ "blob": "x".repeat(300) });
        let mut dst = BytesMut::new();
        let err = encode_message(
            &big,
            PrefixWidth::new(1).unwrap(),
            MessagePolicy::default(),
            &mut dst,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            JsonFrameError::Frame(FrameError::FrameTooLarge { max: 255, .. })
        ));
        assert!(dst.is_empty());
    }
}

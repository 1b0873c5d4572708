//! Blob codec for the remote content store.
//!
//! Collections travel as base64-encoded JSON inside the provider's content
//! objects. Decoding is shape-tolerant: a JSON array maps to itself, a single
//! JSON object is coerced to a one-element list, and any other shape decodes
//! to an empty list. Encoding always produces pretty-printed JSON so the
//! stored files stay reviewable in the hosting repository.

use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

/// Decode a base64-encoded JSON blob into a list of records.
///
/// The content API wraps base64 payloads with newlines; whitespace is
/// stripped before decoding.
pub fn decode_records(content: &str) -> Result<Vec<Value>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(Vec::new());
    }
    let bytes = STANDARD.decode(compact.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    let data: Value = serde_json::from_str(&text)?;
    Ok(coerce_to_list(data))
}

/// Serialize records as the pretty JSON document stored remotely.
pub fn to_pretty_json(records: &[Value]) -> String {
    // Vec<Value> serialization cannot fail
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

/// Encode records as a base64 blob for a content-API write.
pub fn encode_records(records: &[Value]) -> String {
    STANDARD.encode(to_pretty_json(records).as_bytes())
}

fn coerce_to_list(data: Value) -> Vec<Value> {
    match data {
        Value::Array(items) => items,
        Value::Object(_) => vec![data],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trip_preserves_records() {
        let records = vec![
            json!({"id": "1", "nome": "Ana", "setores": ["Frente de loja"]}),
            json!({"id": "2", "nome": "Bia", "ativo": true, "salario": 2450.5}),
        ];
        let encoded = encode_records(&records);
        let decoded = decode_records(&encoded).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn singleton_object_coerces_to_list() {
        let encoded = STANDARD.encode(r#"{"id": "1", "nome": "Ana"}"#);
        let decoded = decode_records(&encoded).unwrap();
        assert_eq!(decoded, vec![json!({"id": "1", "nome": "Ana"})]);
    }

    #[test]
    fn scalar_content_decodes_to_empty_list() {
        let encoded = STANDARD.encode("42");
        assert!(decode_records(&encoded).unwrap().is_empty());

        let encoded = STANDARD.encode(r#""texto""#);
        assert!(decode_records(&encoded).unwrap().is_empty());
    }

    #[test]
    fn empty_content_decodes_to_empty_list() {
        assert!(decode_records("").unwrap().is_empty());
        assert!(decode_records("\n").unwrap().is_empty());
    }

    #[test]
    fn newline_wrapped_base64_is_accepted() {
        // The contents API inserts line breaks every 60 characters.
        let raw = STANDARD.encode(r#"[{"id": "1", "nome": "Ana Beatriz da Silva Costa"}]"#);
        let wrapped: String = raw
            .as_bytes()
            .chunks(20)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let decoded = decode_records(&wrapped).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(decode_records("not base64 at all!!!").is_err());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let encoded = STANDARD.encode("{broken");
        assert!(decode_records(&encoded).is_err());
    }

    #[test]
    fn unicode_survives_the_round_trip() {
        let records = vec![json!({"nome": "João", "funcao": "Açougueiro", "setor": "Açougue"})];
        let decoded = decode_records(&encode_records(&records)).unwrap();
        assert_eq!(decoded, records);
    }
}

//! Identity functions for deduplicating records.
//!
//! Every collection carries an identity function that maps a record to a
//! stable string key. Records are untyped JSON objects; the `id` field is
//! preferred, with per-collection fallbacks composed from domain fields when
//! it is absent. A blank key means the record cannot be identified and is
//! never treated as a duplicate.

use serde_json::Value;

/// Per-collection identity function.
///
/// Each variant encodes the fallback used when a record has no `id`:
///
/// - [`Employee`](Identity::Employee): CPF with separators stripped
/// - [`Applicant`](Identity::Applicant): CPF + submission timestamp
/// - [`Company`](Identity::Company): CNPJ, else legal name, else trade name
/// - [`Named`](Identity::Named): the `nome` field
/// - [`Warning`](Identity::Warning): CPF + warning date
/// - [`Rejection`](Identity::Rejection): CPF + rejection timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Employee,
    Applicant,
    Company,
    Named,
    Warning,
    Rejection,
}

impl Identity {
    /// Compute the identity key for a record.
    ///
    /// Returns an empty string when neither `id` nor the fallback fields
    /// yield anything usable.
    pub fn key_of(&self, record: &Value) -> String {
        let id = field(record, "id");
        if !id.is_empty() {
            return id;
        }
        match self {
            Identity::Employee => strip_cpf(&field(record, "cpf")),
            Identity::Applicant => composite(record, "cpf", &["enviado_em"]),
            Identity::Company => first_of(record, &["cnpj", "razao_social", "nome_fantasia"]),
            Identity::Named => field(record, "nome"),
            Identity::Warning => composite(record, "cpf", &["data", "data_adv"]),
            Identity::Rejection => composite(record, "cpf", &["reprovado_em"]),
        }
    }
}

/// Trimmed string value of a field, or empty when missing or non-string.
fn field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn first_of(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| field(record, key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// `cpf::stamp` composite; blank when both halves are blank.
fn composite(record: &Value, cpf_key: &str, stamp_keys: &[&str]) -> String {
    let cpf = field(record, cpf_key);
    let stamp = first_of(record, stamp_keys);
    if cpf.is_empty() && stamp.is_empty() {
        return String::new();
    }
    format!("{cpf}::{stamp}")
}

fn strip_cpf(cpf: &str) -> String {
    cpf.replace(['.', '-'], "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_field_wins_when_present() {
        let record = json!({"id": "abc123", "cpf": "111.222.333-44"});
        assert_eq!(Identity::Employee.key_of(&record), "abc123");
    }

    #[test]
    fn id_is_trimmed() {
        let record = json!({"id": "  abc123  "});
        assert_eq!(Identity::Named.key_of(&record), "abc123");
    }

    #[test]
    fn blank_id_falls_through() {
        let record = json!({"id": "   ", "nome": "Padaria"});
        assert_eq!(Identity::Named.key_of(&record), "Padaria");
    }

    #[test]
    fn employee_falls_back_to_normalized_cpf() {
        let record = json!({"cpf": "111.222.333-44"});
        assert_eq!(Identity::Employee.key_of(&record), "11122233344");
    }

    #[test]
    fn applicant_combines_cpf_and_submission() {
        let record = json!({"cpf": "11122233344", "enviado_em": "2024-03-01T10:00:00"});
        assert_eq!(
            Identity::Applicant.key_of(&record),
            "11122233344::2024-03-01T10:00:00"
        );
    }

    #[test]
    fn company_tries_cnpj_then_names() {
        assert_eq!(
            Identity::Company.key_of(&json!({"cnpj": "00111222000133"})),
            "00111222000133"
        );
        assert_eq!(
            Identity::Company.key_of(&json!({"razao_social": "Mercado Central LTDA"})),
            "Mercado Central LTDA"
        );
        assert_eq!(
            Identity::Company.key_of(&json!({"nome_fantasia": "Mercado Central"})),
            "Mercado Central"
        );
    }

    #[test]
    fn warning_accepts_either_date_field() {
        let record = json!({"cpf": "1", "data_adv": "2024-01-02"});
        assert_eq!(Identity::Warning.key_of(&record), "1::2024-01-02");
    }

    #[test]
    fn unidentifiable_record_yields_empty_key() {
        assert_eq!(Identity::Employee.key_of(&json!({"nome": "sem cpf"})), "");
        assert_eq!(Identity::Applicant.key_of(&json!({})), "");
        assert_eq!(Identity::Named.key_of(&json!({"descricao": "x"})), "");
    }

    #[test]
    fn non_object_records_yield_empty_key() {
        assert_eq!(Identity::Named.key_of(&json!("texto")), "");
        assert_eq!(Identity::Named.key_of(&json!(null)), "");
    }
}

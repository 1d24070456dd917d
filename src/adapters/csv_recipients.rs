use crate::domain::model::Recipient;
use crate::utils::error::{DispatchError, Result};
use serde::Deserialize;

const SAMPLE_CSV: &str = "email,first_name,last_name,company_name\n\
john@example.com,John,Doe,Example Corp\n\
jane@example.com,Jane,Smith,Sample Inc\n";

#[derive(Debug, Deserialize)]
struct RecipientRow {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Reads recipients (without sequences) from a CSV with an `email` column and
/// optional `first_name`, `last_name`, `company_name` columns.
pub fn parse_recipients(data: &[u8]) -> Result<Vec<Recipient>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "email") {
        return Err(DispatchError::validation("CSV is missing an 'email' column"));
    }

    let mut recipients = Vec::new();
    for (index, row) in reader.deserialize::<RecipientRow>().enumerate() {
        let row = row?;
        // header is line 1
        let line = index + 2;

        let email = non_empty(row.email)
            .ok_or_else(|| DispatchError::validation(format!("CSV line {} has no email", line)))?;

        recipients.push(Recipient {
            email,
            first_name: non_empty(row.first_name),
            last_name: non_empty(row.last_name),
            company_name: non_empty(row.company_name),
            ..Default::default()
        });
    }

    tracing::debug!("Parsed {} recipients from CSV", recipients.len());
    Ok(recipients)
}

pub fn sample_csv() -> &'static str {
    SAMPLE_CSV
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_csv_parses() {
        let recipients = parse_recipients(sample_csv().as_bytes()).unwrap();
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].email, "john@example.com");
        assert_eq!(recipients[1].company_name.as_deref(), Some("Sample Inc"));
    }

    #[test]
    fn test_optional_columns_may_be_absent_or_blank() {
        let data = "email,first_name\n  ana@example.com , \nbo@example.com,Bo\n";
        let recipients = parse_recipients(data.as_bytes()).unwrap();

        assert_eq!(recipients[0].email, "ana@example.com");
        assert_eq!(recipients[0].first_name, None);
        assert_eq!(recipients[0].last_name, None);
        assert_eq!(recipients[1].first_name.as_deref(), Some("Bo"));
    }

    #[test]
    fn test_row_without_email_is_rejected() {
        let data = "email,first_name\nana@example.com,Ana\n,Nobody\n";
        match parse_recipients(data.as_bytes()) {
            Err(DispatchError::ValidationError { message }) => {
                assert_eq!(message, "CSV line 3 has no email")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_email_column_is_rejected() {
        let data = "name,company\nAna,Acme\n";
        assert!(matches!(
            parse_recipients(data.as_bytes()),
            Err(DispatchError::ValidationError { .. })
        ));
    }
}

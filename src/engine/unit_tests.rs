use crate::config::{EntityKind, FieldMapping, ImportConfig};
use crate::contact::CreateContactRequest;
use crate::engine::kind::{ContactImport, ImportKind, RowProblem, ValueImport};
use crate::row::Row;
use crate::value::{Balance, CreateValueRequest};

fn row(pairs: &[(&str, &str)]) -> Row {
    Row::new(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod contact_check_tests {
    use super::*;

    fn config() -> ImportConfig {
        let fields = FieldMapping {
            id: Some("System ID".to_string()),
            email: Some("Email".to_string()),
            ..Default::default()
        };
        ImportConfig::new(EntityKind::Contact, "contacts.csv", fields)
    }

    #[test]
    fn test_valid_contact_passes() {
        let request = ContactImport.map_row(
            &row(&[("System ID", "1"), ("Email", "jbutt@gmail.com")]),
            &config(),
        );
        assert_eq!(ContactImport.check(&request), None);
    }

    #[test]
    fn test_missing_id_reported_first() {
        let request = ContactImport.map_row(&row(&[("System ID", ""), ("Email", "nope")]), &config());
        assert_eq!(ContactImport.check(&request), Some(RowProblem::MissingId));
    }

    #[test]
    fn test_missing_id_column_in_row() {
        let request = ContactImport.map_row(&row(&[("Email", "a@b.c")]), &config());
        assert_eq!(request.id, "");
        assert_eq!(ContactImport.check(&request), Some(RowProblem::MissingId));
    }

    #[test]
    fn test_email_without_at_is_invalid() {
        let request = CreateContactRequest {
            id: "7".to_string(),
            email: Some("jbutt.gmail.com".to_string()),
            ..Default::default()
        };
        assert_eq!(ContactImport.check(&request), Some(RowProblem::InvalidEmail));
    }
}

#[cfg(test)]
mod value_check_tests {
    use super::*;

    fn request() -> CreateValueRequest {
        CreateValueRequest {
            id: "v1".to_string(),
            balance: Some(Balance::Amount(100)),
            currency: "USD".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_value_passes() {
        assert_eq!(ValueImport.check(&request()), None);
    }

    #[test]
    fn test_missing_currency() {
        let mut request = request();
        request.currency = String::new();
        assert_eq!(ValueImport.check(&request), Some(RowProblem::InvalidCurrency));
    }

    #[test]
    fn test_non_numeric_balance() {
        let mut request = request();
        request.balance = Some(Balance::NotANumber("ten".to_string()));
        assert_eq!(ValueImport.check(&request), Some(RowProblem::InvalidBalance));
    }

    #[test]
    fn test_absent_balance_is_fine() {
        let mut request = request();
        request.balance = None;
        assert_eq!(ValueImport.check(&request), None);
    }

    #[test]
    fn test_map_row_uses_fixed_currency() {
        let fields = FieldMapping {
            id: Some("id".to_string()),
            ..Default::default()
        };
        let mut config = ImportConfig::new(EntityKind::Value, "values.csv", fields);
        config.fixed_currency = Some("PNTS".to_string());

        let request = ValueImport.map_row(&row(&[("id", "v9"), ("Currency", "USD")]), &config);
        assert_eq!(request.currency, "PNTS");
        assert_eq!(request.id, "v9");
    }
}

#[cfg(test)]
mod row_problem_tests {
    use super::*;

    #[test]
    fn test_describe_uses_noun() {
        assert_eq!(
            RowProblem::MissingId.describe(ValueImport.noun()),
            "is missing a Value ID"
        );
        assert_eq!(
            RowProblem::MissingId.describe(ContactImport.noun()),
            "is missing a Contact ID"
        );
        assert_eq!(
            RowProblem::InvalidBalance.describe("Value"),
            "does not have a valid balance"
        );
    }
}

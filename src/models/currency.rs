use serde::Serialize;

use crate::validation::ValidationError;

use super::text_enum;

text_enum! {
    /// Currencies the app can budget in and convert between.
    Currency as "currency" { USD, EUR, GBP, HKD, JPY }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::HKD => "HK$",
            Currency::JPY => "¥",
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.as_str(), self.symbol())
    }

    /// Parses user input, reporting unsupported codes as a validation failure.
    pub fn parse_input(raw: &str) -> Result<Self, ValidationError> {
        raw.trim()
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| ValidationError::UnsupportedCurrency(raw.trim().to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrencyOption {
    pub code: Currency,
    pub symbol: &'static str,
    pub label: String,
}

pub fn currency_options() -> Vec<CurrencyOption> {
    Currency::ALL
        .iter()
        .map(|code| CurrencyOption {
            code: *code,
            symbol: code.symbol(),
            label: code.label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_include_symbol() {
        assert_eq!(Currency::HKD.label(), "HKD (HK$)");
        assert_eq!(currency_options().len(), 5);
    }

    #[test]
    fn input_is_case_insensitive() {
        assert_eq!(Currency::parse_input(" eur "), Ok(Currency::EUR));
        assert_eq!(
            Currency::parse_input("CHF"),
            Err(ValidationError::UnsupportedCurrency("CHF".into()))
        );
    }
}

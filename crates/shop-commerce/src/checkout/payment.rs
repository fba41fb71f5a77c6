//! Payment input and its validated form.

use std::fmt;

use crate::error::{CardField, ValidationError};

/// Payment details as entered by the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInput {
    /// Instant transfer; no card fields.
    Pix,
    /// Credit card.
    Card(CardInput),
}

/// Raw card form. Nothing here has been checked yet.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardInput {
    /// Card number.
    pub number: String,
    /// Name printed on the card.
    pub holder_name: String,
    /// Expiry as `MMYY` (a `MM/YY` separator is accepted).
    pub expiry: String,
    /// Security code.
    pub cvv: String,
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("number", &mask(&self.number))
            .field("holder_name", &self.holder_name)
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// A payment method that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Instant transfer.
    Pix,
    /// Credit card with a parsed expiry.
    Card(CardDetails),
}

impl PaymentMethod {
    /// Short name used in logs and in the order endpoint path.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Card(_) => "card",
        }
    }
}

/// Validated card fields.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub holder_name: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &mask(&self.number))
            .field("holder_name", &self.holder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .finish()
    }
}

impl PaymentInput {
    /// Short name of the chosen method.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentInput::Pix => "pix",
            PaymentInput::Card(_) => "card",
        }
    }

    /// Check required fields and parse the expiry.
    pub fn validate(&self) -> Result<PaymentMethod, ValidationError> {
        let card = match self {
            PaymentInput::Pix => return Ok(PaymentMethod::Pix),
            PaymentInput::Card(card) => card,
        };

        let required = [
            (CardField::Number, &card.number),
            (CardField::HolderName, &card.holder_name),
            (CardField::Expiry, &card.expiry),
            (CardField::Cvv, &card.cvv),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::MissingField(*field));
        }

        let (expiry_month, expiry_year) = parse_expiry(&card.expiry)?;
        Ok(PaymentMethod::Card(CardDetails {
            number: card.number.split_whitespace().collect(),
            holder_name: card.holder_name.trim().to_string(),
            expiry_month,
            expiry_year,
            cvv: card.cvv.trim().to_string(),
        }))
    }
}

/// Parse `MMYY` into `(month, 2000 + YY)`.
///
/// ```
/// use shop_commerce::checkout::parse_expiry;
/// assert_eq!(parse_expiry("0928").unwrap(), (9, 2028));
/// assert!(parse_expiry("1328").is_err());
/// ```
pub fn parse_expiry(expiry: &str) -> Result<(u8, u16), ValidationError> {
    let invalid = || ValidationError::InvalidExpiry(expiry.to_string());

    let trimmed = expiry.trim();
    let digits = match trimmed.split_once('/') {
        Some((mm, yy)) if mm.len() == 2 && yy.len() == 2 => format!("{}{}", mm, yy),
        Some(_) => return Err(invalid()),
        None => trimmed.to_string(),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let month: u8 = digits[..2].parse().map_err(|_| invalid())?;
    let year: u16 = digits[2..].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((month, 2000 + year))
}

fn mask(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(|c| !c.is_whitespace()).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardInput {
        CardInput {
            number: "4111 1111 1111 1111".to_string(),
            holder_name: "Maria Silva".to_string(),
            expiry: "0928".to_string(),
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_pix_needs_nothing() {
        assert_eq!(PaymentInput::Pix.validate().unwrap(), PaymentMethod::Pix);
    }

    #[test]
    fn test_card_validates_and_parses() {
        let method = PaymentInput::Card(card()).validate().unwrap();
        let PaymentMethod::Card(details) = method else {
            panic!("expected card");
        };
        assert_eq!(details.number, "4111111111111111");
        assert_eq!(details.expiry_month, 9);
        assert_eq!(details.expiry_year, 2028);
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut input = card();
        input.holder_name = "  ".to_string();
        input.cvv = String::new();
        assert_eq!(
            PaymentInput::Card(input).validate(),
            Err(ValidationError::MissingField(CardField::HolderName))
        );

        let mut input = card();
        input.cvv = String::new();
        assert_eq!(
            PaymentInput::Card(input).validate(),
            Err(ValidationError::MissingField(CardField::Cvv))
        );
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("0128").unwrap(), (1, 2028));
        assert_eq!(parse_expiry("12/30").unwrap(), (12, 2030));
        assert_eq!(parse_expiry(" 0531 ").unwrap(), (5, 2031));

        for bad in ["0028", "1328", "128", "12345", "ab12", "1/234", "12-30"] {
            assert!(
                matches!(parse_expiry(bad), Err(ValidationError::InvalidExpiry(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_debug_masks_card() {
        let printed = format!("{:?}", card());
        assert!(printed.contains("****1111"));
        assert!(!printed.contains("4111 1111"));
        assert!(!printed.contains("123"));
    }
}

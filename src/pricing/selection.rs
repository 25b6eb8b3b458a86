use crate::pricing::PricingError;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// How many of an option a quote carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u8);

impl Quantity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity(Self::MIN)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = PricingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(quantity) if (Self::MIN..=Self::MAX).contains(&quantity) => Ok(Quantity(quantity)),
            _ => Err(PricingError::QuantityOutOfRange(value)),
        }
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An option chosen for the quote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub option: String,
    pub quantity: Quantity,
}

impl Selection {
    pub fn new(option: &str, quantity: Quantity) -> Selection {
        Selection {
            option: option.trim().to_owned(),
            quantity,
        }
    }
}

/// Parses `NAME` or `NAME:QTY`; the quantity defaults to one.
///
/// Only the last colon separates the quantity, so option names may contain colons
/// as long as a quantity is given.
impl FromStr for Selection {
    type Err = PricingError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (option, quantity) = match text.rsplit_once(':') {
            Some((option, quantity)) => {
                let quantity = quantity
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| PricingError::InvalidSelection(text.to_owned()))?;
                (option, Quantity::try_from(quantity)?)
            }
            None => (text, Quantity::default()),
        };
        if option.trim().is_empty() {
            Err(PricingError::InvalidSelection(text.to_owned()))?
        }
        Ok(Selection::new(option, quantity))
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.option, self.quantity)
    }
}

//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

mod size;

pub use size::{SizeDescriptor, NOT_APPLICABLE};

/// Product identifier, e.g. `P001`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub const PREFIX: char = 'P';

    pub fn new(value: impl Into<String>) -> Self { Self(value.into().trim().to_string()) }
    pub fn as_str(&self) -> &str { &self.0 }

    /// Numeric part of a `P<digits>` id; anything unparsable counts as zero.
    pub fn number(&self) -> u32 {
        self.0.replace(Self::PREFIX, "").parse().unwrap_or(0)
    }

    pub fn from_number(n: u32) -> Self { Self(format!("{}{:03}", Self::PREFIX, n)) }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self { Self::new(value) }
}

/// Money value object. Colombian pesos are whole units, there are no cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn cop(amount: u64) -> Self { Self(amount) }
    pub fn amount(&self) -> u64 { self.0 }
    pub fn add(&self, other: Money) -> Money { Money(self.0.saturating_add(other.0)) }
    pub fn multiply(&self, qty: u32) -> Money { Money(self.0.saturating_mul(u64::from(qty))) }

    /// es-CO grouping: `100000` renders as `100.000`.
    pub fn format_cop(&self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        out
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "${}", self.format_cop()) }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::ZERO, |acc, m| acc.add(m)) }
}

/// Contact and delivery details collected before the hand-off.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Customer {
    #[validate(length(min = 1, message = "nombre is required"))]
    pub nombre: String,
    #[validate(length(min = 1, message = "telefono is required"))]
    pub telefono: String,
    #[validate(length(min = 1, message = "direccion is required"))]
    pub direccion: String,
    #[validate(length(min = 1, message = "barrio is required"))]
    pub barrio: String,
}

impl Customer {
    pub fn new(
        nombre: impl Into<String>,
        telefono: impl Into<String>,
        direccion: impl Into<String>,
        barrio: impl Into<String>,
    ) -> Self {
        Self {
            nombre: nombre.into(),
            telefono: telefono.into(),
            direccion: direccion.into(),
            barrio: barrio.into(),
        }
    }

    /// Form inputs are trimmed before validation, so whitespace-only fields fail.
    pub fn trimmed(&self) -> Self {
        Self::new(self.nombre.trim(), self.telefono.trim(), self.direccion.trim(), self.barrio.trim())
    }
}

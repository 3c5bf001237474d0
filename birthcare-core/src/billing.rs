//! Statement of account (SOA)
//!
//! Totals computed here are for display only. The backend totals are
//! authoritative when present.

use crate::models::{Id, Patient};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

/// Amount in centavos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Round a decimal peso amount to the nearest centavo
    pub fn from_pesos(pesos: f64) -> Self {
        Money((pesos * 100.0).round() as i64)
    }

    pub fn centavos(&self) -> i64 {
        self.0
    }

    pub fn as_pesos(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul<f64> for Money {
    type Output = Money;
    fn mul(self, rhs: f64) -> Money {
        Money((self.0 as f64 * rhs).round() as i64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// `₱1,234.50`, with a leading minus for negative amounts
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let pesos = (abs / 100).to_string();
        let mut grouped = String::with_capacity(pesos.len() + pesos.len() / 3);
        for (i, ch) in pesos.chars().enumerate() {
            if i > 0 && (pesos.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{}₱{}.{:02}", sign, grouped, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_pesos())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(f64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Ok(Money::from_pesos(n)),
            Wire::Text(s) => s
                .replace(',', "")
                .trim()
                .parse::<f64>()
                .map(Money::from_pesos)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeItem {
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "one")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: Money,
    /// Line amount as priced by the backend
    #[serde(default)]
    pub amount: Option<Money>,
}

fn one() -> f64 {
    1.0
}

impl ChargeItem {
    pub fn line_total(&self) -> Money {
        self.amount.unwrap_or(self.unit_price * self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Id,
    pub paid_at: String,
    pub amount: Money,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Totals as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoaTotals {
    pub total_charges: Money,
    #[serde(default)]
    pub total_payments: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementOfAccount {
    pub patient: Patient,
    #[serde(default)]
    pub admission_id: Option<Id>,
    #[serde(default)]
    pub charges: Vec<ChargeItem>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub totals: Option<SoaTotals>,
}

/// Client-side totals of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoaSummary {
    pub total_charges: Money,
    pub total_payments: Money,
    pub balance: Money,
}

impl SoaSummary {
    pub fn compute(soa: &StatementOfAccount) -> Self {
        let total_charges: Money = soa.charges.iter().map(ChargeItem::line_total).sum();
        let total_payments: Money = soa.payments.iter().map(|p| p.amount).sum();
        Self {
            total_charges,
            total_payments,
            balance: total_charges - total_payments,
        }
    }

    /// True when the backend reported no totals or agrees with ours
    pub fn matches_backend(&self, soa: &StatementOfAccount) -> bool {
        match soa.totals {
            Some(t) => {
                t.total_charges == self.total_charges
                    && t.total_payments == self.total_payments
                    && t.balance == self.balance
            }
            None => true,
        }
    }

    /// Totals to show: backend first, computed otherwise
    pub fn display_totals(soa: &StatementOfAccount) -> SoaTotals {
        soa.totals.unwrap_or_else(|| {
            let computed = Self::compute(soa);
            SoaTotals {
                total_charges: computed.total_charges,
                total_payments: computed.total_payments,
                balance: computed.balance,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statement(totals: Option<serde_json::Value>) -> StatementOfAccount {
        let mut value = json!({
            "patient": {"id": 1, "first_name": "Ana", "last_name": "Reyes"},
            "charges": [
                {"description": "Room and board", "quantity": 2, "unit_price": 1500.0},
                {"description": "Normal delivery package", "unit_price": "8,000.00", "amount": 7500.5},
                {"description": "Medicines", "quantity": 3, "unit_price": 33.33}
            ],
            "payments": [
                {"id": 1, "paid_at": "2024-06-02", "amount": 5000, "method": "cash"}
            ]
        });
        if let Some(t) = totals {
            value["totals"] = t;
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_compute_summary() {
        let summary = SoaSummary::compute(&statement(None));
        // 3000.00 + 7500.50 + 99.99
        assert_eq!(summary.total_charges, Money::from_centavos(1_060_049));
        assert_eq!(summary.total_payments, Money::from_pesos(5000.0));
        assert_eq!(summary.balance, Money::from_centavos(560_049));
    }

    #[test]
    fn test_backend_totals_take_precedence() {
        let soa = statement(Some(json!({
            "total_charges": 10000, "total_payments": 5000, "balance": 5000
        })));
        let summary = SoaSummary::compute(&soa);
        assert!(!summary.matches_backend(&soa));
        assert_eq!(
            SoaSummary::display_totals(&soa).balance,
            Money::from_pesos(5000.0)
        );

        let soa = statement(None);
        assert!(SoaSummary::compute(&soa).matches_backend(&soa));
        assert_eq!(
            SoaSummary::display_totals(&soa).balance,
            Money::from_centavos(560_049)
        );
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_centavos(123_450).to_string(), "₱1,234.50");
        assert_eq!(Money::from_centavos(5).to_string(), "₱0.05");
        assert_eq!(Money::from_centavos(-100_000_000).to_string(), "-₱1,000,000.00");
    }

    #[test]
    fn test_money_serializes_as_pesos() {
        assert_eq!(
            serde_json::to_value(Money::from_centavos(250)).unwrap(),
            json!(2.5)
        );
        let parsed: Money = serde_json::from_value(json!("1,200.75")).unwrap();
        assert_eq!(parsed, Money::from_centavos(120_075));
    }
}

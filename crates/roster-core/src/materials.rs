//! Fixed-schema materials vectors and their pointwise algebra.

use crate::error::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A game material tracked by every vector, in schema order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Currency. The only field allowed to be "not applicable".
    Gold,
    Silver,
    /// Honor shards.
    Shards,
    Leapstones,
    /// Destruction stones.
    Destruction,
    /// Guardian stones.
    Guardian,
    /// Fusion material.
    Fusion,
    /// Solar grace.
    Grace,
    /// Solar blessing.
    Blessing,
    /// Solar protection.
    Protection,
}

impl Material {
    /// Every material in schema order.
    pub const ALL: [Material; 10] = [
        Material::Gold,
        Material::Silver,
        Material::Shards,
        Material::Leapstones,
        Material::Destruction,
        Material::Guardian,
        Material::Fusion,
        Material::Grace,
        Material::Blessing,
        Material::Protection,
    ];

    /// The currency field; valuations count it at face value.
    pub const CURRENCY: Material = Material::Gold;

    /// Materials that carry a market price (everything but the currency).
    pub fn priced() -> impl Iterator<Item = Material> {
        Self::ALL.into_iter().filter(|m| *m != Self::CURRENCY)
    }

    /// Whether this field may hold the "not applicable" sentinel.
    pub fn allows_not_applicable(self) -> bool {
        self == Self::CURRENCY
    }

    pub fn name(self) -> &'static str {
        match self {
            Material::Gold => "gold",
            Material::Silver => "silver",
            Material::Shards => "shards",
            Material::Leapstones => "leapstones",
            Material::Destruction => "destruction",
            Material::Guardian => "guardian",
            Material::Fusion => "fusion",
            Material::Grace => "grace",
            Material::Blessing => "blessing",
            Material::Protection => "protection",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ValidationError::UnknownMaterial(s.to_string()))
    }
}

/// Largest quantity, price or factor accepted from input or a save file.
///
/// At this bound every goal sum of a full roster stays below 10^15, and
/// price times quantity over all materials stays far below `Decimal::MAX`.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Reject negative or oversized input values.
pub fn check_quantity(value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::NegativeQuantity);
    }
    if value > MAX_QUANTITY {
        return Err(ValidationError::QuantityTooLarge(MAX_QUANTITY));
    }
    Ok(value)
}

/// One field of a materials vector: a quantity or the "not applicable" sentinel.
///
/// Serialized as a decimal, with `null` standing for the sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Option<Decimal>);

impl Amount {
    pub const ZERO: Amount = Amount(Some(Decimal::ZERO));
    pub const NOT_APPLICABLE: Amount = Amount(None);

    pub fn new(value: Decimal) -> Self {
        Amount(Some(value))
    }

    /// The numeric value, or `None` for the sentinel.
    pub fn value(self) -> Option<Decimal> {
        self.0
    }

    pub fn is_not_applicable(self) -> bool {
        self.0.is_none()
    }

    /// The numeric value with the sentinel read as zero.
    pub fn or_zero(self) -> Decimal {
        self.0.unwrap_or(Decimal::ZERO)
    }

    /// Sum where the sentinel is the identity element.
    fn plus(self, other: Amount) -> Amount {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Amount(Some(a.saturating_add(b))),
            (Some(a), None) | (None, Some(a)) => Amount(Some(a)),
            (None, None) => Amount(None),
        }
    }

    /// Difference floored at zero; the sentinel on either side wins.
    fn minus_floored(self, other: Amount) -> Amount {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Amount(Some((a - b).max(Decimal::ZERO))),
            _ => Amount(None),
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v.normalize()),
            None => f.write_str("n/a"),
        }
    }
}

/// A full set of material quantities. Every field is always present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialsVector {
    pub gold: Amount,
    pub silver: Amount,
    pub shards: Amount,
    pub leapstones: Amount,
    pub destruction: Amount,
    pub guardian: Amount,
    pub fusion: Amount,
    pub grace: Amount,
    pub blessing: Amount,
    pub protection: Amount,
}

impl MaterialsVector {
    /// Vector with every field 0.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, material: Material) -> Amount {
        match material {
            Material::Gold => self.gold,
            Material::Silver => self.silver,
            Material::Shards => self.shards,
            Material::Leapstones => self.leapstones,
            Material::Destruction => self.destruction,
            Material::Guardian => self.guardian,
            Material::Fusion => self.fusion,
            Material::Grace => self.grace,
            Material::Blessing => self.blessing,
            Material::Protection => self.protection,
        }
    }

    pub fn set(&mut self, material: Material, amount: impl Into<Amount>) {
        let amount = amount.into();
        let slot = match material {
            Material::Gold => &mut self.gold,
            Material::Silver => &mut self.silver,
            Material::Shards => &mut self.shards,
            Material::Leapstones => &mut self.leapstones,
            Material::Destruction => &mut self.destruction,
            Material::Guardian => &mut self.guardian,
            Material::Fusion => &mut self.fusion,
            Material::Grace => &mut self.grace,
            Material::Blessing => &mut self.blessing,
            Material::Protection => &mut self.protection,
        };
        *slot = amount;
    }

    /// Builder-style `set`.
    pub fn with(mut self, material: Material, amount: impl Into<Amount>) -> Self {
        self.set(material, amount);
        self
    }

    /// Fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Material, Amount)> + '_ {
        Material::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    fn zip_with(&self, other: &Self, f: impl Fn(Amount, Amount) -> Amount) -> Self {
        let mut out = Self::zero();
        for m in Material::ALL {
            out.set(m, f(self.get(m), other.get(m)));
        }
        out
    }

    /// Pointwise sum.
    pub fn add(&self, other: &Self) -> Self {
        self.zip_with(other, Amount::plus)
    }

    /// Pointwise `max(0, self - other)`, propagating the sentinel.
    pub fn subtract(&self, other: &Self) -> Self {
        self.zip_with(other, Amount::minus_floored)
    }

    /// Currency plus priced materials at market price, rounded once at the end.
    pub fn valuation(&self, prices: &MarketPrices) -> Decimal {
        Material::priced()
            .map(|m| prices.get(m).saturating_mul(self.get(m).or_zero()))
            .fold(self.get(Material::CURRENCY).or_zero(), Decimal::saturating_add)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Reject negative or oversized fields and misplaced sentinels.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (m, amount) in self.iter() {
            match amount.value() {
                Some(v) => {
                    check_quantity(v)?;
                }
                None if !m.allows_not_applicable() => {
                    return Err(ValidationError::NotApplicableNotAllowed(m))
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// Effective unit price per priced material, in currency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPrices(BTreeMap<Material, Decimal>);

impl MarketPrices {
    /// Unit price of `material`; unknown materials are worth nothing.
    pub fn get(&self, material: Material) -> Decimal {
        self.0.get(&material).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, material: Material, price: Decimal) {
        self.0.insert(material, price);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Material, Decimal)> + '_ {
        self.0.iter().map(|(m, p)| (*m, *p))
    }
}

/// Parse a user-entered quantity. Blank text reads as zero.
pub fn parse_quantity(text: &str) -> Result<Decimal, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value =
        Decimal::from_str(trimmed).map_err(|_| ValidationError::InvalidNumber(text.to_string()))?;
    check_quantity(value)
}

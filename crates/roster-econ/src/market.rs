//! Manually entered market listings and the effective prices derived from them.

use crate::EconError;
use roster_core::{check_quantity, validate_name, MarketPrices, Material, Named, MAX_QUANTITY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A listing: `price` currency buys `div` units of a material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSource {
    pub id: String,
    pub price: Decimal,
    /// Units per listing (> 0).
    pub div: Decimal,
    /// Whether the listing takes part in the optimal price.
    pub sel: bool,
}

impl Named for PriceSource {
    fn name(&self) -> &str {
        &self.id
    }
}

impl PriceSource {
    pub fn new(id: impl Into<String>, price: Decimal, div: Decimal) -> Self {
        Self {
            id: id.into(),
            price,
            div,
            sel: true,
        }
    }

    pub fn unit_price(&self) -> Decimal {
        if self.div > Decimal::ZERO {
            self.price.checked_div(self.div).unwrap_or(Decimal::MAX)
        } else {
            self.price
        }
    }

    fn validate(&self) -> Result<(), EconError> {
        check_quantity(self.price)?;
        if self.div <= Decimal::ZERO || self.div > MAX_QUANTITY {
            return Err(EconError::InvalidFactor);
        }
        Ok(())
    }
}

/// Every listing known for one material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub material: Material,
    pub sources: Vec<PriceSource>,
}

impl MarketEntry {
    /// Cheapest active, non-zero unit price. Active listings that are all
    /// free price the material at zero; with nothing active the first
    /// listing's price stands.
    pub fn optimal_price(&self) -> Decimal {
        let mut active = self.sources.iter().filter(|s| s.sel).peekable();
        if active.peek().is_none() {
            return self
                .sources
                .first()
                .map(PriceSource::unit_price)
                .unwrap_or(Decimal::ZERO);
        }
        active
            .map(PriceSource::unit_price)
            .filter(|p| *p > Decimal::ZERO)
            .min()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Market listings for every priced material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketData {
    pub entries: Vec<MarketEntry>,
}

/// Id of the listing edited by `set_price`.
const DEFAULT_LISTING: &str = "Market";

impl Default for MarketData {
    fn default() -> Self {
        Self {
            entries: Material::priced()
                .map(|material| MarketEntry {
                    material,
                    sources: vec![PriceSource::new(DEFAULT_LISTING, Decimal::ZERO, Decimal::ONE)],
                })
                .collect(),
        }
    }
}

impl MarketData {
    pub fn entry(&self, material: Material) -> Option<&MarketEntry> {
        self.entries.iter().find(|e| e.material == material)
    }

    fn entry_mut(&mut self, material: Material) -> &mut MarketEntry {
        let pos = match self.entries.iter().position(|e| e.material == material) {
            Some(pos) => pos,
            None => {
                self.entries.push(MarketEntry {
                    material,
                    sources: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos]
    }

    /// Lookup only; never creates an entry.
    fn source_mut(&mut self, material: Material, index: usize) -> Result<&mut PriceSource, EconError> {
        self.entries
            .iter_mut()
            .find(|e| e.material == material)
            .and_then(|e| e.sources.get_mut(index))
            .ok_or(EconError::SourceNotFound(index))
    }

    pub fn optimal_price(&self, material: Material) -> Decimal {
        self.entry(material)
            .map(MarketEntry::optimal_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Effective unit price of every priced material.
    pub fn prices(&self) -> MarketPrices {
        let mut prices = MarketPrices::default();
        for m in Material::priced() {
            prices.set(m, self.optimal_price(m));
        }
        prices
    }

    /// Set the unit price of the material's first listing, creating it if needed.
    pub fn set_price(&mut self, material: Material, price: Decimal) -> Result<(), EconError> {
        check_quantity(price)?;
        let entry = self.entry_mut(material);
        match entry.sources.first_mut() {
            Some(first) => {
                first.price = price;
                first.div = Decimal::ONE;
            }
            None => entry
                .sources
                .push(PriceSource::new(DEFAULT_LISTING, price, Decimal::ONE)),
        }
        Ok(())
    }

    pub fn add_source(&mut self, material: Material, source: PriceSource) -> Result<usize, EconError> {
        source.validate()?;
        let entry = self.entry_mut(material);
        validate_name(&source.id, &entry.sources, None)?;
        entry.sources.push(source);
        Ok(entry.sources.len() - 1)
    }

    pub fn remove_source(&mut self, material: Material, index: usize) -> Result<PriceSource, EconError> {
        self.source_mut(material, index)?;
        Ok(self.entry_mut(material).sources.remove(index))
    }

    pub fn set_source_price(
        &mut self,
        material: Material,
        index: usize,
        price: Decimal,
        div: Decimal,
    ) -> Result<(), EconError> {
        let source = self.source_mut(material, index)?;
        let updated = PriceSource {
            price,
            div,
            ..source.clone()
        };
        updated.validate()?;
        *source = updated;
        Ok(())
    }

    pub fn set_source_selected(
        &mut self,
        material: Material,
        index: usize,
        selected: bool,
    ) -> Result<(), EconError> {
        self.source_mut(material, index)?.sel = selected;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EconError> {
        for entry in &self.entries {
            for (i, s) in entry.sources.iter().enumerate() {
                validate_name(&s.id, &entry.sources, Some(i))?;
                s.validate()?;
            }
        }
        Ok(())
    }
}

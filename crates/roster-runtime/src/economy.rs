//! Edits to the roster storage table and the market listings.
//!
//! Both feed every character view and every roster goal, so a change that
//! moves the pool or a price refreshes all character views at once and
//! marks every non-empty roster goal stale.

use crate::error::{rejected, TrackerError};
use crate::tracker::Tracker;
use crate::view::{ViewId, ViewStatus};
use roster_core::{parse_quantity, Material};
use roster_econ::{EconError, MarketData, PriceSource, Source, StorageTable};
use rust_decimal::Decimal;
use tracing::debug;

impl Tracker {
    fn storage_edit<T>(
        &mut self,
        op: &'static str,
        edit: impl FnOnce(&mut StorageTable) -> Result<T, EconError>,
    ) -> Result<T, TrackerError> {
        let before = self.storage.pool();
        let out = edit(&mut self.storage).map_err(|e| rejected(op, e))?;
        for status in [ViewStatus::Stale, ViewStatus::Recomputing, ViewStatus::Fresh] {
            self.observers.emit(ViewId::RosterStorage, status);
        }
        if self.storage.pool() != before {
            self.after_roster_input_change();
            debug!(op, "roster storage changed");
        }
        Ok(out)
    }

    fn market_edit<T>(
        &mut self,
        op: &'static str,
        edit: impl FnOnce(&mut MarketData) -> Result<T, EconError>,
    ) -> Result<T, TrackerError> {
        let out = edit(&mut self.market).map_err(|e| rejected(op, e))?;
        self.observers.emit(ViewId::MarketPrices, ViewStatus::Stale);
        self.observers.emit(ViewId::MarketPrices, ViewStatus::Recomputing);
        let prices = self.market.prices();
        let changed = prices != self.prices;
        self.prices = prices;
        self.observers.emit(ViewId::MarketPrices, ViewStatus::Fresh);
        if changed {
            self.after_roster_input_change();
            debug!(op, "market prices changed");
        }
        Ok(out)
    }

    fn after_roster_input_change(&mut self) {
        self.refresh_characters(0..self.characters.len());
        self.invalidate_roster_goals_where(|rg| !rg.is_empty());
    }

    pub fn add_source(&mut self, source: Source) -> Result<usize, TrackerError> {
        self.storage_edit("add_source", |t| t.add_source(source))
    }

    pub fn remove_source(&mut self, index: usize) -> Result<Source, TrackerError> {
        self.storage_edit("remove_source", |t| t.remove_source(index))
    }

    pub fn rename_source(&mut self, index: usize, name: &str) -> Result<(), TrackerError> {
        self.storage
            .rename_source(index, name)
            .map_err(|e| rejected("rename_source", e))
    }

    /// Set a source's raw quantity of one material from user-entered text.
    pub fn set_source_quantity(
        &mut self,
        index: usize,
        material: Material,
        value: &str,
    ) -> Result<(), TrackerError> {
        let value = parse_quantity(value).map_err(|e| rejected("set_source_quantity", e))?;
        self.storage_edit("set_source_quantity", |t| {
            t.set_quantity(index, material, value)
        })
    }

    pub fn set_source_selected(&mut self, index: usize, selected: bool) -> Result<(), TrackerError> {
        self.storage_edit("set_source_selected", |t| t.set_selected(index, selected))
    }

    pub fn set_source_factors(
        &mut self,
        index: usize,
        mult: Option<Decimal>,
        div: Option<Decimal>,
    ) -> Result<(), TrackerError> {
        self.storage_edit("set_source_factors", |t| t.set_factors(index, mult, div))
    }

    /// Allocate part of a selection source to `material`; the other material gets the rest.
    pub fn set_source_split_use(
        &mut self,
        index: usize,
        material: Material,
        value: &str,
    ) -> Result<(), TrackerError> {
        let value = parse_quantity(value).map_err(|e| rejected("set_source_split_use", e))?;
        self.storage_edit("set_source_split_use", |t| {
            t.set_split_use(index, material, value)
        })
    }

    pub fn set_source_split_raw(&mut self, index: usize, value: &str) -> Result<(), TrackerError> {
        let value = parse_quantity(value).map_err(|e| rejected("set_source_split_raw", e))?;
        self.storage_edit("set_source_split_raw", |t| t.set_split_raw(index, value))
    }

    /// Set the unit price of a material's first listing from user-entered text.
    pub fn set_market_price(&mut self, material: Material, value: &str) -> Result<(), TrackerError> {
        if material == Material::CURRENCY {
            return Err(rejected(
                "set_market_price",
                TrackerError::CurrencyNotPriced(material),
            ));
        }
        let value = parse_quantity(value).map_err(|e| rejected("set_market_price", e))?;
        self.market_edit("set_market_price", |m| m.set_price(material, value))
    }

    pub fn add_price_source(
        &mut self,
        material: Material,
        source: PriceSource,
    ) -> Result<usize, TrackerError> {
        if material == Material::CURRENCY {
            return Err(TrackerError::CurrencyNotPriced(material));
        }
        self.market_edit("add_price_source", |m| m.add_source(material, source))
    }

    pub fn remove_price_source(
        &mut self,
        material: Material,
        index: usize,
    ) -> Result<PriceSource, TrackerError> {
        self.market_edit("remove_price_source", |m| m.remove_source(material, index))
    }

    /// Set a listing's price and bundle size from user-entered text.
    pub fn set_price_source(
        &mut self,
        material: Material,
        index: usize,
        price: &str,
        div: &str,
    ) -> Result<(), TrackerError> {
        let price = parse_quantity(price).map_err(|e| rejected("set_price_source", e))?;
        let div = parse_quantity(div).map_err(|e| rejected("set_price_source", e))?;
        self.market_edit("set_price_source", |m| {
            m.set_source_price(material, index, price, div)
        })
    }

    pub fn set_price_source_selected(
        &mut self,
        material: Material,
        index: usize,
        selected: bool,
    ) -> Result<(), TrackerError> {
        self.market_edit("set_price_source_selected", |m| {
            m.set_source_selected(material, index, selected)
        })
    }
}

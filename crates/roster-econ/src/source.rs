//! Roster storage sources and the pool they add up to.

use crate::EconError;
use roster_core::{
    check_quantity, validate_name, Material, MaterialsVector, Named, ValidationError,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Id of the distinguished row summing every other source of a table.
pub const TOTAL_SOURCE_ID: &str = "Total";

/// A selection source: one raw quantity shared between two materials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Units available for allocation.
    pub raw: Decimal,
    pub materials: [Material; 2],
    /// Units allocated to each material; never sums above `raw`.
    pub used: [Decimal; 2],
}

impl Split {
    /// A split with everything allocated to the first material.
    pub fn new(first: Material, second: Material, raw: Decimal) -> Result<Self, EconError> {
        if first == second {
            return Err(EconError::SplitMaterialsEqual);
        }
        check_quantity(raw)?;
        Ok(Self {
            raw,
            materials: [first, second],
            used: [raw, Decimal::ZERO],
        })
    }

    fn slot(&self, material: Material) -> Option<usize> {
        self.materials.iter().position(|m| *m == material)
    }

    /// Allocate `value` to `material`, clamped to `[0, raw]`; the other gets the rest.
    pub fn set_use(&mut self, material: Material, value: Decimal) -> Result<(), EconError> {
        let slot = self
            .slot(material)
            .ok_or(EconError::NotSplitMaterial(material))?;
        let value = value.max(Decimal::ZERO).min(self.raw);
        self.used[slot] = value;
        self.used[1 - slot] = self.raw - value;
        Ok(())
    }

    /// Change the raw quantity, keeping the first allocation where it still fits.
    pub fn set_raw(&mut self, raw: Decimal) {
        let raw = raw.max(Decimal::ZERO);
        self.raw = raw;
        self.used[0] = self.used[0].min(raw);
        self.used[1] = raw - self.used[0];
    }
}

/// One contributor to the roster storage pool.
///
/// `amt` is derived: it is always `compute_amounts()` of the other fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    /// Raw input amounts, e.g. number of chests owned.
    pub qty: MaterialsVector,
    /// Contribution to the pool.
    #[serde(default)]
    pub amt: MaterialsVector,
    /// Activation flag; `None` means always active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<Split>,
    /// Units granted per raw unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mult: Option<Decimal>,
    /// Raw units consumed per conversion; remainders are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub div: Option<Decimal>,
}

impl Named for Source {
    fn name(&self) -> &str {
        &self.id
    }
}

impl Source {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            qty: MaterialsVector::zero(),
            amt: MaterialsVector::zero(),
            sel: None,
            split: None,
            mult: None,
            div: None,
        }
    }

    pub fn with_quantity(mut self, material: Material, qty: Decimal) -> Self {
        self.qty.set(material, qty);
        self.refresh();
        self
    }

    pub fn with_factors(mut self, mult: Option<Decimal>, div: Option<Decimal>) -> Self {
        self.mult = mult;
        self.div = div;
        self.refresh();
        self
    }

    pub fn with_split(mut self, split: Split) -> Self {
        self.split = Some(split);
        self.refresh();
        self
    }

    pub fn is_active(&self) -> bool {
        self.sel.unwrap_or(true)
    }

    /// Saturates at `Decimal::MAX` when a tiny divisor or large multiplier overflows.
    fn convert(&self, base: Decimal) -> Decimal {
        let mut v = base;
        if let Some(div) = self.div.filter(|d| *d > Decimal::ZERO) {
            v = v.checked_div(div).unwrap_or(Decimal::MAX).floor();
        }
        if let Some(mult) = self.mult {
            v = v.saturating_mul(mult);
        }
        v
    }

    /// Contribution implied by the current inputs.
    pub fn compute_amounts(&self) -> MaterialsVector {
        let mut amt = MaterialsVector::zero();
        if !self.is_active() {
            return amt;
        }
        match &self.split {
            Some(split) => {
                for (m, used) in split.materials.iter().zip(split.used) {
                    amt.set(*m, self.convert(used));
                }
            }
            None => {
                for (m, q) in self.qty.iter() {
                    amt.set(m, self.convert(q.or_zero()));
                }
            }
        }
        amt
    }

    pub fn refresh(&mut self) {
        self.amt = self.compute_amounts();
    }

    pub fn validate(&self) -> Result<(), EconError> {
        self.qty.validate()?;
        if self.qty.iter().any(|(_, a)| a.is_not_applicable()) {
            return Err(ValidationError::NotApplicableNotAllowed(Material::CURRENCY).into());
        }
        validate_factors(self.mult, self.div)?;
        if let Some(split) = &self.split {
            if split.materials[0] == split.materials[1] {
                return Err(EconError::SplitMaterialsEqual);
            }
            check_quantity(split.raw)?;
            for used in split.used {
                check_quantity(used)?;
            }
            if split.used[0] + split.used[1] > split.raw {
                return Err(EconError::SplitOverAllocated);
            }
        }
        Ok(())
    }
}

fn validate_factors(mult: Option<Decimal>, div: Option<Decimal>) -> Result<(), EconError> {
    let in_range = |f: Decimal| f <= roster_core::MAX_QUANTITY;
    if mult.map(|m| (m.is_sign_negative() && !m.is_zero()) || !in_range(m)).unwrap_or(false) {
        return Err(EconError::InvalidFactor);
    }
    if div.map(|d| d <= Decimal::ZERO || !in_range(d)).unwrap_or(false) {
        return Err(EconError::InvalidFactor);
    }
    Ok(())
}

/// The roster storage table: its sources and their Total row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageTable {
    pub sources: Vec<Source>,
    /// Sum of every active source; derived.
    #[serde(default = "total_source")]
    pub total: Source,
}

fn total_source() -> Source {
    Source::new(TOTAL_SOURCE_ID)
}

impl Default for StorageTable {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            total: total_source(),
        }
    }
}

impl StorageTable {
    /// The roster storage pool.
    pub fn pool(&self) -> MaterialsVector {
        self.total.amt
    }

    /// Recompute every source's contribution and the Total row.
    pub fn recompute(&mut self) {
        for s in &mut self.sources {
            s.refresh();
        }
        self.total.amt = self
            .sources
            .iter()
            .fold(MaterialsVector::zero(), |acc, s| acc.add(&s.amt));
        debug!(sources = self.sources.len(), "storage pool recomputed");
    }

    pub fn source(&self, index: usize) -> Result<&Source, EconError> {
        self.sources
            .get(index)
            .ok_or(EconError::SourceNotFound(index))
    }

    fn source_mut(&mut self, index: usize) -> Result<&mut Source, EconError> {
        self.sources
            .get_mut(index)
            .ok_or(EconError::SourceNotFound(index))
    }

    /// Append a source. Its id must be unique and not the Total row's.
    pub fn add_source(&mut self, source: Source) -> Result<usize, EconError> {
        validate_name(&source.id, &self.sources, None)?;
        if source.id == TOTAL_SOURCE_ID {
            return Err(ValidationError::DuplicateName(source.id).into());
        }
        source.validate()?;
        self.sources.push(source);
        self.recompute();
        Ok(self.sources.len() - 1)
    }

    pub fn remove_source(&mut self, index: usize) -> Result<Source, EconError> {
        self.source(index)?;
        let removed = self.sources.remove(index);
        self.recompute();
        Ok(removed)
    }

    pub fn rename_source(&mut self, index: usize, id: &str) -> Result<(), EconError> {
        self.source(index)?;
        validate_name(id, &self.sources, Some(index))?;
        if id == TOTAL_SOURCE_ID {
            return Err(ValidationError::DuplicateName(id.to_string()).into());
        }
        self.sources[index].id = id.to_string();
        Ok(())
    }

    pub fn set_quantity(
        &mut self,
        index: usize,
        material: Material,
        qty: Decimal,
    ) -> Result<(), EconError> {
        check_quantity(qty)?;
        let source = self.source_mut(index)?;
        if source.split.is_some() {
            return Err(EconError::QuantityIsSplit);
        }
        source.qty.set(material, qty);
        self.recompute();
        Ok(())
    }

    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<(), EconError> {
        self.source_mut(index)?.sel = Some(selected);
        self.recompute();
        Ok(())
    }

    pub fn set_factors(
        &mut self,
        index: usize,
        mult: Option<Decimal>,
        div: Option<Decimal>,
    ) -> Result<(), EconError> {
        validate_factors(mult, div)?;
        let source = self.source_mut(index)?;
        source.mult = mult;
        source.div = div;
        self.recompute();
        Ok(())
    }

    pub fn set_split_use(
        &mut self,
        index: usize,
        material: Material,
        value: Decimal,
    ) -> Result<(), EconError> {
        let source = self.source_mut(index)?;
        let split = source
            .split
            .as_mut()
            .ok_or(EconError::NotSplitMaterial(material))?;
        split.set_use(material, value)?;
        self.recompute();
        Ok(())
    }

    pub fn set_split_raw(&mut self, index: usize, raw: Decimal) -> Result<(), EconError> {
        check_quantity(raw)?;
        let source = self.source_mut(index)?;
        match source.split.as_mut() {
            Some(split) => split.set_raw(raw),
            None => return Err(EconError::InvalidFactor),
        }
        self.recompute();
        Ok(())
    }

    /// Reject invalid sources loaded from outside.
    pub fn validate(&self) -> Result<(), EconError> {
        for (i, s) in self.sources.iter().enumerate() {
            validate_name(&s.id, &self.sources, Some(i))?;
            s.validate()?;
        }
        Ok(())
    }
}

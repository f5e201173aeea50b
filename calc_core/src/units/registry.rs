//! # Unit Registry
//!
//! Read-only table of units per [`QuantityFamily`] with two pure conversion
//! functions: [`UnitRegistry::to_base`] and [`UnitRegistry::from_base`].
//!
//! The table ships as TOML embedded in the crate and is parsed once, on first
//! use. A malformed embedded table panics with the validation message at that
//! point; nothing is validated lazily during a solve.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{QuantityFamily, UnitRegistry};
//!
//! let units = UnitRegistry::global();
//! let kelvin = units.to_base(25.0, QuantityFamily::Temperature, "°C").unwrap();
//! assert!((kelvin - 298.15).abs() < 1e-9);
//!
//! let mph = units.from_base(1.0, QuantityFamily::Velocity, "mph").unwrap();
//! assert!((mph - 2.2369362920544).abs() < 1e-9);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{CalcError, CalcResult};

use super::family::QuantityFamily;

/// Unit table compiled into the crate
pub const EMBEDDED_UNITS: &str = include_str!("units.toml");

static UNITS: Lazy<UnitRegistry> = Lazy::new(|| match UnitRegistry::from_toml_str(EMBEDDED_UNITS) {
    Ok(registry) => {
        info!(units = registry.unit_count(), "unit registry loaded");
        registry
    }
    Err(e) => panic!("embedded unit table is invalid: {}", e),
});

// ============================================================================
// Units
// ============================================================================

/// How a unit maps onto its family's base unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conversion {
    /// `base = raw * factor`
    Linear { factor: f64 },
    /// `base = raw * scale + offset`
    Affine { scale: f64, offset: f64 },
}

impl Conversion {
    #[inline]
    pub fn to_base(&self, raw: f64) -> f64 {
        match *self {
            Conversion::Linear { factor } => raw * factor,
            Conversion::Affine { scale, offset } => raw * scale + offset,
        }
    }

    #[inline]
    pub fn from_base(&self, base: f64) -> f64 {
        match *self {
            Conversion::Linear { factor } => base / factor,
            Conversion::Affine { scale, offset } => (base - offset) / scale,
        }
    }

    /// Multiplier applied to the raw value
    pub fn scale(&self) -> f64 {
        match *self {
            Conversion::Linear { factor } => factor,
            Conversion::Affine { scale, .. } => scale,
        }
    }
}

/// A registered unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Canonical symbol, used in traces (e.g., "kPa")
    pub symbol: String,
    /// Spelled-out name (e.g., "kilopascal")
    pub name: String,
    /// Alternative spellings accepted on input
    pub aliases: Vec<String>,
    pub conversion: Conversion,
}

impl Unit {
    #[inline]
    pub fn to_base(&self, raw: f64) -> f64 {
        self.conversion.to_base(raw)
    }

    #[inline]
    pub fn from_base(&self, base: f64) -> f64 {
        self.conversion.from_base(base)
    }

    /// True when this unit converts to the base unit by a factor of one
    pub fn is_identity(&self) -> bool {
        self.conversion == Conversion::Linear { factor: 1.0 }
    }
}

// ============================================================================
// TOML layout
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FamilyTable {
    base: String,
    units: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    symbol: String,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    factor: Option<f64>,
    scale: Option<f64>,
    offset: Option<f64>,
}

impl UnitEntry {
    fn conversion(&self, family: &str) -> CalcResult<Conversion> {
        let context = || format!("[{}] unit '{}'", family, self.symbol);
        let conversion = match (self.factor, self.scale, self.offset) {
            (Some(factor), None, None) => Conversion::Linear { factor },
            (None, Some(scale), offset) => Conversion::Affine {
                scale,
                offset: offset.unwrap_or(0.0),
            },
            (Some(_), _, _) => {
                return Err(CalcError::configuration(
                    context(),
                    "'factor' cannot be combined with 'scale' or 'offset'",
                ))
            }
            (None, None, _) => {
                return Err(CalcError::configuration(context(), "needs 'factor' or 'scale'"))
            }
        };

        let multiplier = conversion.scale();
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(CalcError::configuration(
                context(),
                format!("factor must be finite and positive, got {}", multiplier),
            ));
        }
        if let Conversion::Affine { offset, .. } = conversion {
            if !offset.is_finite() {
                return Err(CalcError::configuration(context(), "offset must be finite"));
            }
        }
        Ok(conversion)
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone)]
struct FamilyUnits {
    base: String,
    units: Vec<Unit>,
    /// Symbol or alias -> position in `units`
    lookup: HashMap<String, usize>,
}

/// Units grouped by quantity family.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    families: HashMap<QuantityFamily, FamilyUnits>,
}

impl UnitRegistry {
    /// The shared registry built from the embedded table.
    pub fn global() -> &'static UnitRegistry {
        &UNITS
    }

    /// Parse and validate a unit table.
    ///
    /// Every [`QuantityFamily`] must be present, its base unit must be listed
    /// with factor 1, and symbols and aliases must be unique within a family.
    pub fn from_toml_str(source: &str) -> CalcResult<Self> {
        let tables: BTreeMap<String, FamilyTable> = toml::from_str(source)
            .map_err(|e| CalcError::configuration("unit table", e.to_string()))?;

        let mut families = HashMap::new();
        for (key, table) in tables {
            let family = QuantityFamily::from_key(&key).ok_or_else(|| {
                CalcError::configuration("unit table", format!("unknown quantity family [{}]", key))
            })?;
            families.insert(family, Self::build_family(&key, table)?);
        }

        if let Some(missing) = QuantityFamily::ALL.iter().find(|f| !families.contains_key(*f)) {
            return Err(CalcError::configuration(
                "unit table",
                format!("missing quantity family [{}]", missing.key()),
            ));
        }

        Ok(UnitRegistry { families })
    }

    fn build_family(key: &str, table: FamilyTable) -> CalcResult<FamilyUnits> {
        let mut units = Vec::with_capacity(table.units.len());
        let mut lookup = HashMap::new();
        let mut canonical = HashSet::new();

        for entry in table.units {
            let conversion = entry.conversion(key)?;
            let index = units.len();
            canonical.insert(entry.symbol.clone());

            for spelling in std::iter::once(&entry.symbol).chain(entry.aliases.iter()) {
                if spelling.trim().is_empty() || spelling.trim() != spelling {
                    return Err(CalcError::configuration(
                        format!("[{}] unit '{}'", key, entry.symbol),
                        format!("invalid spelling '{}'", spelling),
                    ));
                }
                if lookup.insert(spelling.clone(), index).is_some() {
                    return Err(CalcError::configuration(
                        format!("[{}]", key),
                        format!("'{}' is registered twice", spelling),
                    ));
                }
            }

            units.push(Unit {
                symbol: entry.symbol,
                name: entry.name,
                aliases: entry.aliases,
                conversion,
            });
        }

        match lookup.get(&table.base).map(|&i| &units[i]) {
            Some(base) if base.is_identity() && canonical.contains(&table.base) => {}
            Some(_) => {
                return Err(CalcError::configuration(
                    format!("[{}]", key),
                    format!("base unit '{}' must be listed with factor 1", table.base),
                ))
            }
            None => {
                return Err(CalcError::configuration(
                    format!("[{}]", key),
                    format!("base unit '{}' is not listed", table.base),
                ))
            }
        }

        Ok(FamilyUnits {
            base: table.base,
            units,
            lookup,
        })
    }

    fn family(&self, family: QuantityFamily) -> CalcResult<&FamilyUnits> {
        self.families
            .get(&family)
            .ok_or_else(|| CalcError::internal(format!("family {} is not registered", family.key())))
    }

    /// Find a unit by symbol or alias within `family`.
    ///
    /// Surrounding whitespace is ignored; matching is case-sensitive so that
    /// `mm` and `Mm` stay distinct.
    pub fn unit(&self, family: QuantityFamily, symbol: &str) -> CalcResult<&Unit> {
        let entry = self.family(family)?;
        entry
            .lookup
            .get(symbol.trim())
            .map(|&i| &entry.units[i])
            .ok_or_else(|| CalcError::unknown_unit(family.display_name(), symbol))
    }

    /// Convert `value` in `unit` to the family's base unit.
    pub fn to_base(&self, value: f64, family: QuantityFamily, unit: &str) -> CalcResult<f64> {
        Ok(self.unit(family, unit)?.to_base(value))
    }

    /// Convert a base-unit `value` to `unit`.
    pub fn from_base(&self, value: f64, family: QuantityFamily, unit: &str) -> CalcResult<f64> {
        Ok(self.unit(family, unit)?.from_base(value))
    }

    /// Symbol of the family's base unit
    pub fn base_unit(&self, family: QuantityFamily) -> CalcResult<&str> {
        Ok(&self.family(family)?.base)
    }

    /// Every unit registered for `family`, in table order
    pub fn units_in(&self, family: QuantityFamily) -> CalcResult<&[Unit]> {
        Ok(&self.family(family)?.units)
    }

    /// Total number of registered units
    pub fn unit_count(&self) -> usize {
        self.families.values().map(|f| f.units.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn units() -> &'static UnitRegistry {
        UnitRegistry::global()
    }

    #[test]
    fn test_embedded_table_loads() {
        assert!(units().unit_count() > 80);
        for family in QuantityFamily::ALL {
            let base = units().base_unit(family).unwrap();
            assert!(units().unit(family, base).unwrap().is_identity());
        }
    }

    #[test]
    fn test_linear_conversions() {
        assert_relative_eq!(units().to_base(50.0, QuantityFamily::Length, "mm").unwrap(), 0.05);
        assert_relative_eq!(units().to_base(100.0, QuantityFamily::Pressure, "kPa").unwrap(), 1.0e5);
        assert_relative_eq!(units().to_base(1.0, QuantityFamily::Mass, "lb").unwrap(), 0.45359237);
        assert_relative_eq!(
            units().to_base(36.0, QuantityFamily::Velocity, "km/h").unwrap(),
            10.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_affine_temperature() {
        assert_relative_eq!(units().to_base(0.0, QuantityFamily::Temperature, "°C").unwrap(), 273.15);
        assert_relative_eq!(
            units().to_base(32.0, QuantityFamily::Temperature, "°F").unwrap(),
            273.15,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            units().from_base(373.15, QuantityFamily::Temperature, "°F").unwrap(),
            212.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            units().to_base(491.67, QuantityFamily::Temperature, "°R").unwrap(),
            273.15,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_temperature_difference_has_no_offset() {
        assert_relative_eq!(
            units().to_base(10.0, QuantityFamily::TemperatureDifference, "°C").unwrap(),
            10.0
        );
        assert_relative_eq!(
            units().to_base(9.0, QuantityFamily::TemperatureDifference, "°F").unwrap(),
            5.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_gauge_pressure() {
        let pa = units().to_base(0.0, QuantityFamily::AbsolutePressure, "psig").unwrap();
        let psia = units().from_base(pa, QuantityFamily::AbsolutePressure, "psia").unwrap();
        assert_relative_eq!(psia, 14.7, max_relative = 1e-12);

        // every gauge unit shares the same zero
        for symbol in ["barg", "kPag", "Pag"] {
            let zero = units().to_base(0.0, QuantityFamily::AbsolutePressure, symbol).unwrap();
            assert_relative_eq!(zero, pa, max_relative = 1e-12);
        }
        let kpag = units().to_base(100.0, QuantityFamily::AbsolutePressure, "kPag").unwrap();
        assert_relative_eq!(kpag, pa + 1.0e5, max_relative = 1e-12);
    }

    #[test]
    fn test_aliases_and_whitespace() {
        let ohm = units().unit(QuantityFamily::Resistance, "kohm").unwrap();
        assert_eq!(ohm.symbol, "kΩ");
        let uf = units().unit(QuantityFamily::Capacitance, " uF ").unwrap();
        assert_eq!(uf.symbol, "µF");
    }

    #[test]
    fn test_unknown_unit() {
        let err = units().to_base(1.0, QuantityFamily::Mass, "m/s").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_UNIT");

        // Units belong to exactly one family
        assert!(units().unit(QuantityFamily::Pressure, "psig").is_err());
    }

    #[test]
    fn test_round_trip_every_unit() {
        for family in QuantityFamily::ALL {
            for unit in units().units_in(family).unwrap() {
                for &x in &[-250.0, -1.0, 0.0, 1.0e-6, 0.3, 1.0, 42.5, 1.0e7] {
                    let back = unit.from_base(unit.to_base(x));
                    let tolerance = 1e-9 * f64::max(x.abs(), 1.0);
                    assert!(
                        (back - x).abs() <= tolerance,
                        "{} {}: {} -> {}",
                        family.key(),
                        unit.symbol,
                        x,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_rejects_missing_base_unit() {
        let bad = EMBEDDED_UNITS.replacen("base = \"kg\"", "base = \"stone\"", 1);
        let err = UnitRegistry::from_toml_str(&bad).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("stone"));
    }

    #[test]
    fn test_rejects_duplicate_alias() {
        let bad = EMBEDDED_UNITS.replacen("aliases = [\"lbs\", \"lbm\"]", "aliases = [\"lbs\", \"kg\"]", 1);
        let err = UnitRegistry::from_toml_str(&bad).unwrap_err();
        assert!(err.to_string().contains("registered twice"));
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        let bad = EMBEDDED_UNITS.replacen("factor = 0.45359237", "factor = -0.45359237", 1);
        let err = UnitRegistry::from_toml_str(&bad).unwrap_err();
        assert!(err.to_string().contains("finite and positive"));
    }

    #[test]
    fn test_rejects_missing_family() {
        let err = UnitRegistry::from_toml_str("[mass]\nbase = \"kg\"\nunits = [{ symbol = \"kg\", name = \"kilogram\", factor = 1.0 }]\n")
            .unwrap_err();
        assert!(err.to_string().contains("missing quantity family"));
    }
}

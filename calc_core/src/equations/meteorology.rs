//! # Meteorology
//!
//! Convective cloud base and dew point.
//!
//! ## Cloud base
//!
//! Rising unsaturated air cools about 8 °C per 1000 m faster than its dew
//! point, so the lifting condensation level sits roughly 125 m above the
//! surface for every kelvin of dew point spread:
//!
//! ```text
//! H = 125 m/K · (T − Td)
//! ```
//!
//! ## Dew point
//!
//! Magnus approximation (Alduchov and Eskridge coefficients), with
//! temperatures in °C and relative humidity as a fraction:
//!
//! ```text
//! γ  = ln(RH) + a·T/(b + T)
//! Td = b·γ/(a − γ)           a = 17.625, b = 243.04 °C
//! ```

use crate::errors::CalcResult;
use crate::units::QuantityFamily;

use super::derivation::{BaseValues, Derivation, StepUnit};
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

/// Cloud base height per kelvin of dew point spread (m/K)
pub const CLOUD_BASE_M_PER_K: f64 = 125.0;

/// Magnus coefficient `a` (dimensionless)
pub const MAGNUS_A: f64 = 17.625;

/// Magnus coefficient `b` (°C)
pub const MAGNUS_B: f64 = 243.04;

const KELVIN_OFFSET: f64 = 273.15;

/// Magnus saturation term `a·T/(b + T)` for a temperature in °C
#[inline]
pub fn magnus_term(t_c: f64) -> f64 {
    MAGNUS_A * t_c / (MAGNUS_B + t_c)
}

/// Dew point in °C from air temperature (°C) and relative humidity (fraction).
///
/// # Example
///
/// ```rust
/// use calc_core::equations::meteorology::dew_point_celsius;
///
/// let td = dew_point_celsius(20.0, 0.6);
/// assert!((td - 12.0).abs() < 0.01);
/// ```
#[inline]
pub fn dew_point_celsius(t_c: f64, rh: f64) -> f64 {
    let gamma = rh.ln() + magnus_term(t_c);
    MAGNUS_B * gamma / (MAGNUS_A - gamma)
}

/// Relative humidity (fraction) from air temperature and dew point, both °C
#[inline]
pub fn relative_humidity(t_c: f64, td_c: f64) -> f64 {
    (magnus_term(td_c) - magnus_term(t_c)).exp()
}

/// Cloud base height above the surface from the dew point spread in kelvin
#[inline]
pub fn cloud_base_height(spread_k: f64) -> f64 {
    CLOUD_BASE_M_PER_K * spread_k
}

fn humidity_positive(v: &BaseValues) -> CalcResult<bool> {
    Ok(v.get("RH")? > 0.0)
}

const RH_REASON: &str = "relative humidity must be above 0 % to define a dew point";

fn temperature(symbol: &'static str, name: &'static str) -> FormulaVariable {
    FormulaVariable::new(symbol, name, QuantityFamily::Temperature, Constraint::Positive, "°C")
}

fn humidity() -> FormulaVariable {
    FormulaVariable::new(
        "RH",
        "Relative humidity",
        QuantityFamily::Dimensionless,
        Constraint::Percentage,
        "%",
    )
}

fn height() -> FormulaVariable {
    FormulaVariable::new(
        "H",
        "Cloud base height above ground",
        QuantityFamily::Length,
        Constraint::NonNegative,
        "m",
    )
}

fn record_celsius(d: &mut Derivation, kelvin: &str, celsius: &str, label: &str) -> CalcResult<f64> {
    let t = d.get(kelvin)? - KELVIN_OFFSET;
    let template = format!("{{{}}} − 273.15", kelvin);
    d.step(celsius, label, &template, t, StepUnit::Custom("°C"))
}

/// Records `t`, `gamma` and `td` (°C) from `T` and `RH`.
fn record_magnus_dew_point(d: &mut Derivation) -> CalcResult<f64> {
    let t = record_celsius(d, "T", "t", "Air temperature")?;
    let gamma = d.get("RH")?.ln() + magnus_term(t);
    d.step(
        "gamma",
        "Magnus term",
        "ln({RH}) + 17.625·{t}/(243.04 + {t})",
        gamma,
        StepUnit::None,
    )?;
    d.step(
        "td",
        "Dew point",
        "243.04·{gamma}/(17.625 − {gamma})",
        MAGNUS_B * gamma / (MAGNUS_A - gamma),
        StepUnit::Custom("°C"),
    )
}

/// Records `t` and `td` (°C) from `T` and `Td`, returns the humidity fraction.
fn humidity_from_temperatures(d: &mut Derivation) -> CalcResult<f64> {
    let t = record_celsius(d, "T", "t", "Air temperature")?;
    let td = record_celsius(d, "Td", "td", "Dew point")?;
    Ok(relative_humidity(t, td))
}

const HUMIDITY_FORMULA: &str = "exp(17.625·{td}/(243.04 + {td}) − 17.625·{t}/(243.04 + {t}))";

/// Cloud base from the dew point spread, `H = 125·(T − Td)`.
pub fn cloud_base() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::CloudBase)
        .variable(temperature("T", "Surface air temperature"))
        .variable(temperature("Td", "Surface dew point"))
        .variable(height())
        .rearrangement(Rearrangement::new("H", "125·{spread}", |d| {
            let spread = d.get("T")? - d.get("Td")?;
            d.step(
                "spread",
                "Dew point spread",
                "{T} − {Td}",
                spread,
                StepUnit::Family(QuantityFamily::TemperatureDifference),
            )?;
            Ok(cloud_base_height(spread))
        }))
        .rearrangement(Rearrangement::new("Td", "{T} − {H}/125", |d| {
            Ok(d.get("T")? - d.get("H")? / CLOUD_BASE_M_PER_K)
        }))
        .rearrangement(Rearrangement::new("T", "{Td} + {H}/125", |d| {
            Ok(d.get("Td")? + d.get("H")? / CLOUD_BASE_M_PER_K)
        }))
        .sample(&[("T", 293.15), ("Td", 283.15), ("H", 1250.0)])
}

/// Cloud base from a known spread, `H = 125·ΔT`.
pub fn cloud_base_spread() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::CloudBaseSpread)
        .variable(FormulaVariable::new(
            "spread",
            "Dew point spread",
            QuantityFamily::TemperatureDifference,
            Constraint::Signed,
            "°C",
        ))
        .variable(height())
        .rearrangement(Rearrangement::new("H", "125·{spread}", |d| {
            Ok(cloud_base_height(d.get("spread")?))
        }))
        .rearrangement(Rearrangement::new("spread", "{H}/125", |d| {
            Ok(d.get("H")? / CLOUD_BASE_M_PER_K)
        }))
        .sample(&[("spread", 8.0), ("H", 1000.0)])
}

/// Magnus dew point from temperature and relative humidity.
pub fn dew_point() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::DewPoint)
        .variable(temperature("T", "Air temperature"))
        .variable(humidity())
        .variable(temperature("Td", "Dew point"))
        .rearrangement(
            Rearrangement::new("Td", "{td} + 273.15", |d| Ok(record_magnus_dew_point(d)? + KELVIN_OFFSET))
                .requires("RH", RH_REASON, humidity_positive)
                .nonzero("243.04 °C + T", |v| Ok(MAGNUS_B + v.get("T")? - KELVIN_OFFSET)),
        )
        .rearrangement(Rearrangement::new("RH", HUMIDITY_FORMULA, humidity_from_temperatures))
        .rearrangement(
            Rearrangement::new("T", "{t} + 273.15", |d| {
                let td = record_celsius(d, "Td", "td", "Dew point")?;
                let g = magnus_term(td) - d.get("RH")?.ln();
                d.step(
                    "g",
                    "Saturation term at air temperature",
                    "17.625·{td}/(243.04 + {td}) − ln({RH})",
                    g,
                    StepUnit::None,
                )?;
                let t = d.step(
                    "t",
                    "Air temperature",
                    "243.04·{g}/(17.625 − {g})",
                    MAGNUS_B * g / (MAGNUS_A - g),
                    StepUnit::Custom("°C"),
                )?;
                Ok(t + KELVIN_OFFSET)
            })
            .requires("RH", RH_REASON, humidity_positive),
        )
        .sample(&[("T", 293.15), ("RH", 0.6), ("Td", 285.14989461574544)])
}

/// Cloud base straight from temperature and relative humidity.
///
/// Air temperature cannot be isolated in closed form here, so only `H` and
/// `RH` are solvable.
pub fn cloud_base_humidity() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::CloudBaseHumidity)
        .variable(temperature("T", "Surface air temperature"))
        .variable(humidity())
        .variable(height())
        .rearrangement(
            Rearrangement::new("H", "125·{spread}", |d| {
                let td = record_magnus_dew_point(d)?;
                d.step(
                    "Td",
                    "Dew point",
                    "{td} + 273.15",
                    td + KELVIN_OFFSET,
                    StepUnit::Family(QuantityFamily::Temperature),
                )?;
                let mut spread = d.get("T")? - d.get("Td")?;
                if spread < 0.0 && spread > -1e-9 {
                    spread = 0.0;
                    d.note("Saturated air, cloud base at the surface");
                }
                d.step(
                    "spread",
                    "Dew point spread",
                    "{T} − {Td}",
                    spread,
                    StepUnit::Family(QuantityFamily::TemperatureDifference),
                )?;
                Ok(cloud_base_height(spread))
            })
            .requires("RH", RH_REASON, humidity_positive),
        )
        .rearrangement(Rearrangement::new("RH", HUMIDITY_FORMULA, |d| {
            let spread = d.get("H")? / CLOUD_BASE_M_PER_K;
            d.step(
                "spread",
                "Dew point spread",
                "{H}/125",
                spread,
                StepUnit::Family(QuantityFamily::TemperatureDifference),
            )?;
            let td = d.get("T")? - spread;
            d.step(
                "Td",
                "Dew point",
                "{T} − {spread}",
                td,
                StepUnit::Family(QuantityFamily::Temperature),
            )?;
            humidity_from_temperatures(d)
        }))
        .sample(&[("T", 293.15), ("RH", 0.6), ("H", 1000.0131730318174)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitRegistry;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON * b.abs().max(1.0)
    }

    #[test]
    fn test_descriptors_validate() {
        let units = UnitRegistry::global();
        cloud_base().validate(units).unwrap();
        cloud_base_spread().validate(units).unwrap();
        dew_point().validate(units).unwrap();
        cloud_base_humidity().validate(units).unwrap();
    }

    #[test]
    fn test_saturated_air_dew_point_equals_temperature() {
        for &t in &[-20.0, 0.0, 15.0, 35.0] {
            assert!(approx_eq(dew_point_celsius(t, 1.0), t));
        }
    }

    #[test]
    fn test_humidity_inverts_dew_point() {
        let td = dew_point_celsius(28.0, 0.45);
        assert!(approx_eq(relative_humidity(28.0, td), 0.45));
    }

    #[test]
    fn test_cloud_base_ten_degree_spread() {
        let values = BaseValues::from_pairs(&[("T", 298.15), ("Td", 288.15)]);
        let h = cloud_base().rearrangement_for("H").unwrap().evaluate(&values).unwrap();
        assert!((h - 1250.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_humidity_has_no_dew_point() {
        let values = BaseValues::from_pairs(&[("T", 293.15), ("RH", 0.0)]);
        let err = dew_point().rearrangement_for("Td").unwrap().evaluate(&values).unwrap_err();
        assert_eq!(err.error_code(), "OUT_OF_RANGE");
        assert_eq!(err.field(), Some("RH"));
    }

    #[test]
    fn test_temperature_not_solvable_from_humidity_and_height() {
        let err = cloud_base_humidity().rearrangement_for("T").unwrap_err();
        assert_eq!(err.error_code(), "NOT_SOLVABLE");
    }

    #[test]
    fn test_saturated_cloud_base_is_surface() {
        let values = BaseValues::from_pairs(&[("T", 288.15), ("RH", 1.0)]);
        let h = cloud_base_humidity().rearrangement_for("H").unwrap().evaluate(&values).unwrap();
        assert!(h.abs() < 1e-6);
    }
}

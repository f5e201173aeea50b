//! # Momentum
//!
//! One-dimensional collision of two bodies and linear momentum of a single
//! body. Velocities are signed along a common axis; masses must be positive.
//!
//! ## Conservation of momentum
//!
//! ```text
//! m1·v1i + m2·v2i = m1·v1f + m2·v2f
//! ```
//!
//! Any one of the six quantities can be solved for. Solving for a mass needs
//! the other body's velocity to change, otherwise the denominator is zero.
//!
//! ## Single body
//!
//! ```text
//! p  = m·v                      linear momentum
//! F·t = m·(v2 − v1)             impulse-momentum theorem
//! Δp = m·(v2 − v1)              momentum change
//! ```
//!
//! ## Perfectly inelastic collision
//!
//! ```text
//! m1·v1 + m2·v2 = (m1 + m2)·vf
//! ```
//!
//! The bodies move together afterwards. Kinetic energy before and after is
//! recorded in the trace along with the energy lost.

use crate::errors::CalcResult;
use crate::units::QuantityFamily;

use super::derivation::{Derivation, StepUnit};
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

/// Total momentum of two bodies: `m1·v1 + m2·v2`
#[inline]
pub fn total_momentum(m1: f64, v1: f64, m2: f64, v2: f64) -> f64 {
    m1 * v1 + m2 * v2
}

/// Velocity of one body after the collision, given the total momentum.
///
/// # Formula
///
/// `v = (p_total - m_other·v_other) / m`
///
/// # Example
///
/// ```rust
/// use calc_core::equations::momentum::{remaining_velocity, total_momentum};
///
/// let p = total_momentum(2.0, 5.0, 3.0, -2.0);
/// let v2f = remaining_velocity(p, 2.0, 1.0, 3.0);
/// assert!((v2f - 2.0 / 3.0).abs() < 1e-12);
/// ```
#[inline]
pub fn remaining_velocity(p_total: f64, m_other: f64, v_other: f64, m: f64) -> f64 {
    (p_total - m_other * v_other) / m
}

/// Mass of a body from the velocity change of both bodies.
///
/// # Formula
///
/// `m = m_other·Δv_other / Δv`, where `Δv = v_i - v_f` of the unknown body
/// and `Δv_other = v_f - v_i` of the other one.
#[inline]
pub fn mass_from_velocity_changes(m_other: f64, dv_other: f64, dv: f64) -> f64 {
    m_other * dv_other / dv
}

/// Kinetic energy of one body: `½·m·v²`
#[inline]
pub fn kinetic_energy(m: f64, v: f64) -> f64 {
    0.5 * m * v * v
}

/// Common velocity after a perfectly inelastic collision.
///
/// # Formula
///
/// `vf = (m1·v1 + m2·v2) / (m1 + m2)`
///
/// # Example
///
/// ```rust
/// use calc_core::equations::momentum::inelastic_final_velocity;
///
/// let vf = inelastic_final_velocity(5.0, 20.0, 3.0, 15.0);
/// assert!((vf - 18.125).abs() < 1e-12);
/// ```
#[inline]
pub fn inelastic_final_velocity(m1: f64, v1: f64, m2: f64, v2: f64) -> f64 {
    total_momentum(m1, v1, m2, v2) / (m1 + m2)
}

fn velocity(symbol: &'static str, name: &'static str) -> FormulaVariable {
    FormulaVariable::new(symbol, name, QuantityFamily::Velocity, Constraint::Signed, "m/s")
}

fn mass(symbol: &'static str, name: &'static str) -> FormulaVariable {
    FormulaVariable::new(symbol, name, QuantityFamily::Mass, Constraint::Positive, "kg")
}

fn initial_momentum(d: &mut Derivation) -> CalcResult<f64> {
    let p = total_momentum(d.get("m1")?, d.get("v1i")?, d.get("m2")?, d.get("v2i")?);
    d.step(
        "p",
        "Total momentum before collision",
        "{m1}·{v1i} + {m2}·{v2i}",
        p,
        StepUnit::Family(QuantityFamily::Momentum),
    )
}

fn final_momentum(d: &mut Derivation) -> CalcResult<f64> {
    let p = total_momentum(d.get("m1")?, d.get("v1f")?, d.get("m2")?, d.get("v2f")?);
    d.step(
        "p",
        "Total momentum after collision",
        "{m1}·{v1f} + {m2}·{v2f}",
        p,
        StepUnit::Family(QuantityFamily::Momentum),
    )
}

/// Two-body collision, `m1·v1i + m2·v2i = m1·v1f + m2·v2f`.
pub fn conservation_of_momentum() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::ConservationOfMomentum)
        .variable(mass("m1", "Mass of object 1"))
        .variable(velocity("v1i", "Initial velocity of object 1"))
        .variable(mass("m2", "Mass of object 2"))
        .variable(velocity("v2i", "Initial velocity of object 2"))
        .variable(velocity("v1f", "Final velocity of object 1"))
        .variable(velocity("v2f", "Final velocity of object 2"))
        .rearrangement(
            Rearrangement::new("v2f", "({p} - {m1}·{v1f}) / {m2}", |d| {
                let p = initial_momentum(d)?;
                Ok(remaining_velocity(p, d.get("m1")?, d.get("v1f")?, d.get("m2")?))
            })
            .nonzero("m2", |v| v.get("m2")),
        )
        .rearrangement(
            Rearrangement::new("v1f", "({p} - {m2}·{v2f}) / {m1}", |d| {
                let p = initial_momentum(d)?;
                Ok(remaining_velocity(p, d.get("m2")?, d.get("v2f")?, d.get("m1")?))
            })
            .nonzero("m1", |v| v.get("m1")),
        )
        .rearrangement(
            Rearrangement::new("v1i", "({p} - {m2}·{v2i}) / {m1}", |d| {
                let p = final_momentum(d)?;
                Ok(remaining_velocity(p, d.get("m2")?, d.get("v2i")?, d.get("m1")?))
            })
            .nonzero("m1", |v| v.get("m1")),
        )
        .rearrangement(
            Rearrangement::new("v2i", "({p} - {m1}·{v1i}) / {m2}", |d| {
                let p = final_momentum(d)?;
                Ok(remaining_velocity(p, d.get("m1")?, d.get("v1i")?, d.get("m2")?))
            })
            .nonzero("m2", |v| v.get("m2")),
        )
        .rearrangement(
            Rearrangement::new("m1", "{m2}·({v2f} - {v2i}) / ({v1i} - {v1f})", |d| {
                let dv2 = d.get("v2f")? - d.get("v2i")?;
                let dv1 = d.get("v1i")? - d.get("v1f")?;
                Ok(mass_from_velocity_changes(d.get("m2")?, dv2, dv1))
            })
            .nonzero("v1i - v1f", |v| Ok(v.get("v1i")? - v.get("v1f")?)),
        )
        .rearrangement(
            Rearrangement::new("m2", "{m1}·({v1i} - {v1f}) / ({v2f} - {v2i})", |d| {
                let dv1 = d.get("v1i")? - d.get("v1f")?;
                let dv2 = d.get("v2f")? - d.get("v2i")?;
                Ok(mass_from_velocity_changes(d.get("m1")?, dv1, dv2))
            })
            .nonzero("v2f - v2i", |v| Ok(v.get("v2f")? - v.get("v2i")?)),
        )
        .mode("final-velocities", "Final velocity (either object)", &["v1f", "v2f"])
        .mode("initial-velocities", "Initial velocity (either object)", &["v1i", "v2i"])
        .mode("masses", "Mass (either object)", &["m1", "m2"])
        .sample(&[
            ("m1", 2.0),
            ("v1i", 5.0),
            ("m2", 3.0),
            ("v2i", -2.0),
            ("v1f", 1.0),
            ("v2f", 2.0 / 3.0),
        ])
}

fn record_kinetic_energy(d: &mut Derivation) -> CalcResult<()> {
    let ke = kinetic_energy(d.get("m")?, d.get("v")?);
    d.step("KE", "Kinetic energy", "½·{m}·{v}²", ke, StepUnit::Custom("J"))?;
    Ok(())
}

/// Momentum of one body, `p = m·v`.
pub fn linear_momentum() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::LinearMomentum)
        .variable(FormulaVariable::new(
            "p",
            "Momentum",
            QuantityFamily::Momentum,
            Constraint::Signed,
            "kg·m/s",
        ))
        .variable(mass("m", "Mass"))
        .variable(velocity("v", "Velocity"))
        .rearrangement(
            Rearrangement::new("p", "{m}·{v}", |d| Ok(d.get("m")? * d.get("v")?)).then(record_kinetic_energy),
        )
        .rearrangement(
            Rearrangement::new("m", "{p} / {v}", |d| Ok(d.get("p")? / d.get("v")?))
                .nonzero("v", |v| v.get("v"))
                .then(record_kinetic_energy),
        )
        .rearrangement(
            Rearrangement::new("v", "{p} / {m}", |d| Ok(d.get("p")? / d.get("m")?))
                .nonzero("m", |v| v.get("m"))
                .then(record_kinetic_energy),
        )
        .sample(&[("p", 6.0), ("m", 2.0), ("v", 3.0)])
}

fn record_impulse(d: &mut Derivation) -> CalcResult<f64> {
    let impulse = d.get("F")? * d.get("t")?;
    d.step("J", "Impulse", "{F}·{t}", impulse, StepUnit::Family(QuantityFamily::Momentum))
}

fn record_body_momentum_change(d: &mut Derivation) -> CalcResult<f64> {
    let dp = d.get("m")? * (d.get("v2")? - d.get("v1")?);
    d.step(
        "dp",
        "Momentum change",
        "{m}·({v2} - {v1})",
        dp,
        StepUnit::Family(QuantityFamily::Momentum),
    )
}

fn record_velocity_change(d: &mut Derivation) -> CalcResult<f64> {
    let impulse = record_impulse(d)?;
    let dv = impulse / d.get("m")?;
    d.step("dv", "Velocity change", "{J}/{m}", dv, StepUnit::Family(QuantityFamily::Velocity))
}

/// Impulse-momentum theorem, `F·t = m·(v2 − v1)`.
///
/// A constant force `F` acting for `t` changes the body's velocity from `v1`
/// to `v2`.
pub fn impulse_momentum() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::ImpulseMomentum)
        .variable(FormulaVariable::new("F", "Average force", QuantityFamily::Force, Constraint::Signed, "N"))
        .variable(FormulaVariable::new("t", "Time interval", QuantityFamily::Time, Constraint::Positive, "s"))
        .variable(mass("m", "Mass"))
        .variable(velocity("v1", "Initial velocity"))
        .variable(velocity("v2", "Final velocity"))
        .rearrangement(
            Rearrangement::new("F", "{dp}/{t}", |d| {
                let dp = record_body_momentum_change(d)?;
                Ok(dp / d.get("t")?)
            })
            .nonzero("t", |v| v.get("t")),
        )
        .rearrangement(
            Rearrangement::new("t", "{dp}/{F}", |d| {
                let dp = record_body_momentum_change(d)?;
                Ok(dp / d.get("F")?)
            })
            .nonzero("F", |v| v.get("F")),
        )
        .rearrangement(
            Rearrangement::new("m", "{J}/({v2} - {v1})", |d| {
                let impulse = record_impulse(d)?;
                Ok(impulse / (d.get("v2")? - d.get("v1")?))
            })
            .nonzero("v2 - v1", |v| Ok(v.get("v2")? - v.get("v1")?)),
        )
        .rearrangement(Rearrangement::new("v1", "{v2} - {dv}", |d| {
            let dv = record_velocity_change(d)?;
            Ok(d.get("v2")? - dv)
        }))
        .rearrangement(Rearrangement::new("v2", "{v1} + {dv}", |d| {
            let dv = record_velocity_change(d)?;
            Ok(d.get("v1")? + dv)
        }))
        .sample(&[("F", 100.0), ("t", 2.0), ("m", 5.0), ("v1", -20.0), ("v2", 20.0)])
}

fn note_direction(d: &mut Derivation) -> CalcResult<()> {
    let dp = d.get("dp")?;
    let direction = if dp > 0.0 {
        "Momentum increased (accelerating along +v)"
    } else if dp < 0.0 {
        "Momentum decreased (decelerating along +v)"
    } else {
        "Momentum unchanged (constant velocity)"
    };
    d.note(direction);
    Ok(())
}

/// Change of one body's momentum, `Δp = m·(v2 − v1)`.
pub fn momentum_change() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::MomentumChange)
        .variable(FormulaVariable::new(
            "dp",
            "Momentum change",
            QuantityFamily::Momentum,
            Constraint::Signed,
            "kg·m/s",
        ))
        .variable(mass("m", "Mass"))
        .variable(velocity("v1", "Initial velocity"))
        .variable(velocity("v2", "Final velocity"))
        .rearrangement(
            Rearrangement::new("dp", "{p2} - {p1}", |d| {
                let m = d.get("m")?;
                let p1 = d.step(
                    "p1",
                    "Initial momentum",
                    "{m}·{v1}",
                    m * d.get("v1")?,
                    StepUnit::Family(QuantityFamily::Momentum),
                )?;
                let p2 = d.step(
                    "p2",
                    "Final momentum",
                    "{m}·{v2}",
                    m * d.get("v2")?,
                    StepUnit::Family(QuantityFamily::Momentum),
                )?;
                Ok(p2 - p1)
            })
            .then(note_direction),
        )
        .rearrangement(
            Rearrangement::new("m", "{dp}/({v2} - {v1})", |d| {
                Ok(d.get("dp")? / (d.get("v2")? - d.get("v1")?))
            })
            .nonzero("v2 - v1", |v| Ok(v.get("v2")? - v.get("v1")?))
            .then(note_direction),
        )
        .rearrangement(
            Rearrangement::new("v1", "{v2} - {dp}/{m}", |d| Ok(d.get("v2")? - d.get("dp")? / d.get("m")?))
                .then(note_direction),
        )
        .rearrangement(
            Rearrangement::new("v2", "{v1} + {dp}/{m}", |d| Ok(d.get("v1")? + d.get("dp")? / d.get("m")?))
                .then(note_direction),
        )
        .sample(&[("dp", -25.0), ("m", 5.0), ("v1", 20.0), ("v2", 15.0)])
}

fn record_collision_energy(d: &mut Derivation) -> CalcResult<()> {
    let (m1, v1, m2, v2, vf) = (d.get("m1")?, d.get("v1")?, d.get("m2")?, d.get("v2")?, d.get("vf")?);
    let before = d.step(
        "KE1",
        "Kinetic energy before collision",
        "½·{m1}·{v1}² + ½·{m2}·{v2}²",
        kinetic_energy(m1, v1) + kinetic_energy(m2, v2),
        StepUnit::Custom("J"),
    )?;
    let after = d.step(
        "KE2",
        "Kinetic energy after collision",
        "½·({m1} + {m2})·{vf}²",
        kinetic_energy(m1 + m2, vf),
        StepUnit::Custom("J"),
    )?;
    d.step("dE", "Energy lost in collision", "{KE1} - {KE2}", before - after, StepUnit::Custom("J"))?;
    Ok(())
}

fn momentum_after_sticking(d: &mut Derivation) -> CalcResult<f64> {
    let p = (d.get("m1")? + d.get("m2")?) * d.get("vf")?;
    d.step(
        "p",
        "Total momentum after collision",
        "({m1} + {m2})·{vf}",
        p,
        StepUnit::Family(QuantityFamily::Momentum),
    )
}

/// Perfectly inelastic collision, `m1·v1 + m2·v2 = (m1 + m2)·vf`.
pub fn inelastic_collision() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::InelasticCollision)
        .variable(mass("m1", "Mass of object 1"))
        .variable(velocity("v1", "Velocity of object 1 before impact"))
        .variable(mass("m2", "Mass of object 2"))
        .variable(velocity("v2", "Velocity of object 2 before impact"))
        .variable(velocity("vf", "Common velocity after impact"))
        .rearrangement(
            Rearrangement::new("vf", "{p}/{M}", |d| {
                let (m1, v1, m2, v2) = (d.get("m1")?, d.get("v1")?, d.get("m2")?, d.get("v2")?);
                d.step(
                    "p",
                    "Total momentum before collision",
                    "{m1}·{v1} + {m2}·{v2}",
                    total_momentum(m1, v1, m2, v2),
                    StepUnit::Family(QuantityFamily::Momentum),
                )?;
                d.step("M", "Combined mass", "{m1} + {m2}", m1 + m2, StepUnit::Family(QuantityFamily::Mass))?;
                Ok(inelastic_final_velocity(m1, v1, m2, v2))
            })
            .then(record_collision_energy),
        )
        .rearrangement(
            Rearrangement::new("v1", "({p} - {m2}·{v2}) / {m1}", |d| {
                let p = momentum_after_sticking(d)?;
                Ok(remaining_velocity(p, d.get("m2")?, d.get("v2")?, d.get("m1")?))
            })
            .then(record_collision_energy),
        )
        .rearrangement(
            Rearrangement::new("v2", "({p} - {m1}·{v1}) / {m2}", |d| {
                let p = momentum_after_sticking(d)?;
                Ok(remaining_velocity(p, d.get("m1")?, d.get("v1")?, d.get("m2")?))
            })
            .then(record_collision_energy),
        )
        .rearrangement(
            Rearrangement::new("m1", "{m2}·({v2} - {vf}) / ({vf} - {v1})", |d| {
                let dv2 = d.get("v2")? - d.get("vf")?;
                let dv1 = d.get("vf")? - d.get("v1")?;
                Ok(mass_from_velocity_changes(d.get("m2")?, dv2, dv1))
            })
            .nonzero("vf - v1", |v| Ok(v.get("vf")? - v.get("v1")?))
            .then(record_collision_energy),
        )
        .rearrangement(
            Rearrangement::new("m2", "{m1}·({v1} - {vf}) / ({vf} - {v2})", |d| {
                let dv1 = d.get("v1")? - d.get("vf")?;
                let dv2 = d.get("vf")? - d.get("v2")?;
                Ok(mass_from_velocity_changes(d.get("m1")?, dv1, dv2))
            })
            .nonzero("vf - v2", |v| Ok(v.get("vf")? - v.get("v2")?))
            .then(record_collision_energy),
        )
        .mode("final-velocity", "Common final velocity", &["vf"])
        .sample(&[("m1", 5.0), ("v1", 20.0), ("m2", 3.0), ("v2", 15.0), ("vf", 18.125)])
}

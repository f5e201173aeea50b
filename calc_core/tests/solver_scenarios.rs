//! End-to-end solves through the public API.

use approx::assert_relative_eq;
use calc_core::equations::{Formula, ALL_FORMULAS};
use calc_core::solver::{solve, solve_with, SolveRequest, DEFAULTED, GIVEN};
use calc_core::{CalcError, QuantityFamily, SolverSettings, UnitRegistry};

fn momentum_request() -> SolveRequest {
    SolveRequest::new(Formula::ConservationOfMomentum)
        .given("m1", "2", "kg")
        .given("v1i", "5", "m/s")
        .given("m2", "3", "kg")
        .given("v2i", "-2", "m/s")
        .given("v1f", "1", "m/s")
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn momentum_final_velocity() {
    let solution = solve(&momentum_request().unknown("v2f")).unwrap();
    assert_relative_eq!(solution.value, 0.6667, epsilon = 1e-4);
    assert_eq!(solution.unit, "m/s");
}

#[test]
fn momentum_final_velocity_by_mode() {
    let solution = solve(&momentum_request().blank("v2f").mode("final-velocities")).unwrap();
    assert_eq!(solution.unknown, "v2f");
    assert_relative_eq!(solution.value, 2.0 / 3.0, max_relative = 1e-12);
}

#[test]
fn voltage_divider_output() {
    let request = SolveRequest::new(Formula::VoltageDivider)
        .given("Vin", "12", "V")
        .given("R1", "1", "kΩ")
        .given("R2", "2", "kΩ")
        .unknown("Vout");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value, 8.0, max_relative = 1e-12);
    assert_eq!(solution.formatted, "8 V");

    let step = solution.trace.iter().find(|s| s.label == "Solve for Vout").unwrap();
    assert_eq!(step.base_expression, "Vout = Vin·R2/(R1 + R2) = 12·2000/(1000 + 2000) = 8 V");

    // current and dissipation follow the solved value
    let labels: Vec<&str> = solution.derivation().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Solve for Vout", "Divider current", "Power in R1", "Power in R2", "Total power"]
    );
    let current = solution.trace.iter().find(|s| s.label == "Divider current").unwrap();
    assert_relative_eq!(current.value.unwrap(), 0.004, max_relative = 1e-12);
}

#[test]
fn voltage_divider_top_resistor() {
    let request = SolveRequest::new(Formula::VoltageDivider)
        .given("Vin", "12", "V")
        .given("Vout", "5", "V")
        .given("R2", "10", "kΩ")
        .unknown("R1");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value_base, 14_000.0, max_relative = 1e-12);
    assert_eq!(solution.formatted, "14 kΩ");
}

#[test]
fn orifice_flow_rate() {
    let request = SolveRequest::new(Formula::OrificeFlow)
        .given("d", "50", "mm")
        .given("dP", "100", "kPa")
        .given("rho", "998", "kg/m³")
        .given("Cd", "0.61", "1")
        .unknown("Q")
        .display_unit("m³/s");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value, 0.01695, epsilon = 1e-5);

    let labels: Vec<&str> = solution.derivation().map(|s| s.label.as_str()).collect();
    assert!(labels.contains(&"Orifice area"));
    assert!(labels.contains(&"Ideal jet velocity"));
}

#[test]
fn api_gravity_of_water() {
    let request = SolveRequest::new(Formula::ApiGravity).given("sg", "1.0", "1").unknown("api");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value, 10.0, max_relative = 1e-12);
    assert_eq!(solution.formatted, "10 °API");
    assert!(solution.trace.iter().any(|s| s.base_expression == "Classified as heavy crude"));
}

#[test]
fn standard_flow_from_actual() {
    let request = SolveRequest::new(Formula::StandardFlow)
        .given("acfm", "100", "cfm")
        .given("P", "114.7", "psia")
        .given("T", "539.67", "°R")
        .given("P_std", "14.7", "psia")
        .given("T_std", "520", "°R")
        .unknown("scfm");
    let solution = solve(&request).unwrap();
    assert_eq!(solution.unit, "cfm");
    assert!((solution.value - 752.0).abs() < 0.5, "got {}", solution.value);
}

#[test]
fn linear_momentum_reports_kinetic_energy() {
    let request = SolveRequest::new(Formula::LinearMomentum)
        .given("m", "5", "kg")
        .given("v", "20", "m/s")
        .unknown("p");
    let solution = solve(&request).unwrap();
    assert_eq!(solution.formatted, "100 kg·m/s");

    let ke = solution.trace.iter().find(|s| s.label == "Kinetic energy").unwrap();
    assert_eq!(ke.base_expression, "KE = ½·m·v² = ½·5·20² = 1000 J");
}

#[test]
fn impulse_with_imperial_force() {
    let request = SolveRequest::new(Formula::ImpulseMomentum)
        .given("F", "10", "lbf")
        .given("t", "500", "ms")
        .given("m", "2", "kg")
        .given("v1", "0", "m/s")
        .unknown("v2");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value, 4.4482216152605 * 0.5 / 2.0, max_relative = 1e-12);

    let impulse = solution.trace.iter().find(|s| s.label == "Impulse").unwrap();
    assert_relative_eq!(impulse.value.unwrap(), 2.22411080763025, max_relative = 1e-12);
}

#[test]
fn impulse_time_must_come_out_positive() {
    // force opposes the velocity change
    let request = SolveRequest::new(Formula::ImpulseMomentum)
        .given("F", "-100", "N")
        .given("m", "5", "kg")
        .given("v1", "0", "m/s")
        .given("v2", "10", "m/s")
        .unknown("t");
    assert_eq!(solve(&request).unwrap_err().error_code(), "IMPLAUSIBLE_RESULT");
}

#[test]
fn inelastic_collision_reports_energy_loss() {
    let request = SolveRequest::new(Formula::InelasticCollision)
        .given("m1", "5", "kg")
        .given("v1", "20", "m/s")
        .given("m2", "3", "kg")
        .given("v2", "15", "m/s")
        .unknown("vf");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value, 18.125, max_relative = 1e-12);

    let labels: Vec<&str> = solution.derivation().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Total momentum before collision",
            "Combined mass",
            "Solve for vf",
            "Kinetic energy before collision",
            "Kinetic energy after collision",
            "Energy lost in collision",
        ]
    );
    let lost = solution.trace.iter().find(|s| s.label == "Energy lost in collision").unwrap();
    assert!(lost.base_expression.ends_with("= 23.4375 J"), "{}", lost.base_expression);
}

#[test]
fn momentum_change_from_speeds_in_km_per_hour() {
    let request = SolveRequest::new(Formula::MomentumChange)
        .given("m", "1200", "kg")
        .given("v1", "90", "km/h")
        .given("v2", "54", "km/h")
        .unknown("dp");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value, -12_000.0, max_relative = 1e-9);
    assert!(solution
        .trace
        .iter()
        .any(|s| s.base_expression.starts_with("Momentum decreased")));
}

// ============================================================================
// Properties across the catalog
// ============================================================================

#[test]
fn every_unit_round_trips() {
    let units = UnitRegistry::global();
    for family in QuantityFamily::ALL {
        for unit in units.units_in(family).unwrap() {
            for &x in &[-1234.5, -1.0, 0.0, 0.003, 1.0, 98_765.4321] {
                let back = units
                    .from_base(units.to_base(x, family, &unit.symbol).unwrap(), family, &unit.symbol)
                    .unwrap();
                assert!(
                    (back - x).abs() <= 1e-9 * x.abs().max(1.0),
                    "{} {} came back as {}",
                    x,
                    unit.symbol,
                    back
                );
            }
        }
    }
}

#[test]
fn every_rearrangement_reproduces_its_sample() {
    let units = UnitRegistry::global();
    for formula in ALL_FORMULAS {
        let descriptor = formula.descriptor();
        let sample = descriptor.sample_values();

        for target in descriptor.solvable() {
            let mut request = SolveRequest::new(*formula).unknown(target);
            for var in descriptor.variables.iter().filter(|v| v.symbol != target) {
                let base_unit = units.base_unit(var.family).unwrap();
                let value = sample.get(var.symbol).unwrap();
                request = request.given(var.symbol, value.to_string(), base_unit);
            }
            let base_unit = units.base_unit(descriptor.find_variable(target).unwrap().family).unwrap();
            request = request.display_unit(base_unit);

            let solution = solve(&request).unwrap_or_else(|e| panic!("{} solving {}: {}", formula, target, e));
            assert_relative_eq!(
                solution.value_base,
                sample.get(target).unwrap(),
                epsilon = 1e-12,
                max_relative = 1e-8
            );
        }
    }
}

#[test]
fn identical_requests_give_identical_solutions() {
    let request = momentum_request().unknown("v2f");
    assert_eq!(solve(&request).unwrap(), solve(&request).unwrap());
}

#[test]
fn concurrent_solves_agree() {
    let request = momentum_request().unknown("v2f");
    let expected = solve(&request).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let request = request.clone();
            std::thread::spawn(move || solve(&request))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), expected);
    }
}

// ============================================================================
// Domain errors
// ============================================================================

#[test]
fn negative_mass_is_rejected() {
    let request = momentum_request().given("m1", "-2", "kg").unknown("v2f");
    let err = solve(&request).unwrap_err();
    assert_eq!(err, CalcError::non_positive_input("m1", -2.0));
    assert_eq!(err.to_string(), "'m1' must be greater than zero (got -2)");
}

#[test]
fn equal_velocities_cannot_give_a_mass() {
    let request = SolveRequest::new(Formula::ConservationOfMomentum)
        .given("v1i", "3", "m/s")
        .given("v1f", "3", "m/s")
        .given("m2", "3", "kg")
        .given("v2i", "-2", "m/s")
        .given("v2f", "1", "m/s")
        .unknown("m1");
    assert_eq!(solve(&request).unwrap_err().error_code(), "DIVISION_BY_ZERO");
}

#[test]
fn divider_output_must_be_below_input() {
    let request = SolveRequest::new(Formula::VoltageDivider)
        .given("Vin", "5", "V")
        .given("Vout", "12", "V")
        .given("R2", "10", "kΩ")
        .unknown("R1");
    let err = solve(&request).unwrap_err();
    assert_eq!(err.error_code(), "OUT_OF_RANGE");
    assert_eq!(err.field(), Some("Vout"));
}

#[test]
fn discharge_coefficient_above_one() {
    let request = SolveRequest::new(Formula::OrificeFlow)
        .given("d", "50", "mm")
        .given("dP", "100", "kPa")
        .given("rho", "998", "kg/m³")
        .given("Cd", "1.2", "1")
        .unknown("Q");
    assert_eq!(solve(&request).unwrap_err(), CalcError::invalid_coefficient("Cd", 1.2));
}

#[test]
fn humidity_over_hundred_percent() {
    let request = SolveRequest::new(Formula::DewPoint)
        .given("T", "20", "°C")
        .given("RH", "120", "%")
        .unknown("Td");
    let err = solve(&request).unwrap_err();
    assert_eq!(err.error_code(), "OUT_OF_RANGE");
    assert_eq!(err.field(), Some("RH"));
}

#[test]
fn dew_point_above_temperature_gives_no_cloud_base() {
    let request = SolveRequest::new(Formula::CloudBase)
        .given("T", "10", "°C")
        .given("Td", "15", "°C")
        .unknown("H");
    assert_eq!(solve(&request).unwrap_err().error_code(), "IMPLAUSIBLE_RESULT");
}

#[test]
fn zero_vector_has_no_angle() {
    let request = SolveRequest::new(Formula::VectorAngle)
        .given("ax", "0", "1")
        .given("ay", "0", "1")
        .given("bx", "1", "1")
        .given("by", "2", "1")
        .unknown("theta");
    assert_eq!(solve(&request).unwrap_err(), CalcError::division_by_zero("|a|·|b|"));
}

#[test]
fn temperature_from_humidity_has_no_closed_form() {
    let request = SolveRequest::new(Formula::CloudBaseHumidity)
        .given("RH", "60", "%")
        .given("H", "1000", "m")
        .unknown("T");
    assert_eq!(
        solve(&request).unwrap_err(),
        CalcError::not_solvable("cloud_base_humidity", "T")
    );
}

#[test]
fn errors_serialize_with_type_tag() {
    let err = solve(&momentum_request().given("m1", "-2", "kg").unknown("v2f")).unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["type"], "NonPositiveInput");
    assert_eq!(json["details"]["field"], "m1");
}

// ============================================================================
// Units, defaults and presentation
// ============================================================================

#[test]
fn gauge_pressure_is_offset_by_standard_pressure() {
    let base = SolveRequest::new(Formula::StandardFlow)
        .given("acfm", "100", "cfm")
        .given("T", "60", "°F")
        .unknown("scfm");
    let gauge = solve(&base.clone().given("P", "100", "psig")).unwrap();
    let absolute = solve(&base.given("P", "114.7", "psia")).unwrap();
    assert_relative_eq!(gauge.value, absolute.value, max_relative = 1e-12);
}

#[test]
fn zero_gauge_at_standard_temperature_leaves_flow_unchanged() {
    for unit in ["psig", "barg", "kPag", "Pag"] {
        let request = SolveRequest::new(Formula::StandardFlow)
            .given("acfm", "100", "cfm")
            .given("P", "0", unit)
            .given("T", "60", "°F")
            .unknown("scfm");
        let solution = solve(&request).unwrap();
        assert_relative_eq!(solution.value, 100.0, max_relative = 1e-12);
        assert_eq!(solution.formatted, "100 cfm");
    }
}

#[test]
fn blank_density_defaults_to_water() {
    let request = SolveRequest::new(Formula::EvaporationVolume)
        .given("V", "3", "L")
        .given("t", "2", "h")
        .unknown("E");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value, 1.5, max_relative = 1e-12);
    assert_eq!(solution.unit, "kg/h");

    let rho = solution.trace.iter().find(|s| s.base_expression.starts_with("rho")).unwrap();
    assert_eq!(rho.label, DEFAULTED);
}

#[test]
fn planar_vector_angle_in_degrees() {
    let request = SolveRequest::new(Formula::VectorAngle)
        .given("ax", "1", "1")
        .given("ay", "0", "1")
        .given("bx", "1", "1")
        .given("by", "1", "1")
        .unknown("theta");
    let solution = solve(&request).unwrap();
    assert_eq!(solution.unit, "°");
    assert_relative_eq!(solution.value, 45.0, max_relative = 1e-12);
}

#[test]
fn cloud_base_in_feet() {
    let request = SolveRequest::new(Formula::CloudBase)
        .given("T", "25", "°C")
        .given("Td", "15", "°C")
        .unknown("H")
        .display_unit("ft");
    let solution = solve(&request).unwrap();
    assert_relative_eq!(solution.value_base, 1250.0, max_relative = 1e-9);
    assert_relative_eq!(solution.value, 1250.0 / 0.3048, max_relative = 1e-9);

    let step = solution.trace.iter().find(|s| s.label == "Solve for H").unwrap();
    assert!(step.display_expression.as_deref().unwrap().ends_with(" ft"));
}

#[test]
fn settings_control_trace_rendering() {
    let settings = SolverSettings::from_toml_str(
        r#"
        include_given_values = false

        [number_format]
        significant_digits = 3
        "#,
    )
    .unwrap();
    let solution = solve_with(&momentum_request().unknown("v2f"), &settings).unwrap();

    assert_eq!(solution.formatted, "0.667 m/s");
    assert!(solution.trace.iter().all(|s| s.label != GIVEN));
    // full precision regardless of formatting
    assert_relative_eq!(solution.value, 2.0 / 3.0, max_relative = 1e-15);
}

#[test]
fn solution_serializes_to_json() {
    let solution = solve(&momentum_request().unknown("v2f")).unwrap();
    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(json["formula"], "conservation_of_momentum");
    assert_eq!(json["unknown"], "v2f");
    assert!(json["trace"].as_array().unwrap().len() > 5);
}

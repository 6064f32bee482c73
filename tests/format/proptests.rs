//! Property tests for the round-trip law
//!
//! Every observation of every type in both dialects must parse back from its
//! formatted line. Angles on the hundredth-of-a-second grid the text form can
//! express come back within floating-point tolerance. Angles off that grid,
//! including the last value below an exclusive maximum, truncate to a nearby
//! grid point that still validates and formats to the same line again.

use std::f64::consts::TAU;
use std::sync::Arc;

use maka_dialect::{Dialect, hmmc, mmrp};
use maka_foundation::angle::degrees_to_radians;
use maka_foundation::{Decimal, Kind, Value};
use maka_schema::{FieldDescriptor, FieldValues, Observation, ObservationType};
use proptest::prelude::*;
use time::{Date, Month, Time};

/// Hundredths of an arc-second per degree.
const DMS_UNITS: f64 = 360_000.0;

/// One hundredth of an arc-second, in radians.
const ANGLE_UNIT: f64 = std::f64::consts::PI / 180.0 / DMS_UNITS;

fn bound(value: &Value) -> f64 {
    match value {
        Value::Integer(n) => *n as f64,
        Value::Float(x) => *x,
        Value::Decimal(d) => d.to_string().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Returns the field's bounds as an inclusive range of scaled integers.
fn scaled_range(field: &FieldDescriptor, scale: f64, default: (f64, f64)) -> (i64, i64) {
    let lo = field.min.as_ref().map_or(default.0, bound);
    let hi = field.max.as_ref().map_or(default.1, bound);
    let lo = (lo * scale).ceil() as i64;
    let hi = (hi * scale).floor() as i64;
    let hi = if field.max.is_some() && !field.max_inclusive { hi - 1 } else { hi };
    (lo, hi)
}

/// The largest float below `x`.
fn just_below(x: f64) -> f64 {
    if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else if x < 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        -f64::from_bits(1)
    }
}

/// Arbitrary angles in the field's range, weighted towards its ends.
fn off_grid_angle(field: &FieldDescriptor) -> BoxedStrategy<Value> {
    let lo = field.min.as_ref().map_or(-TAU, bound);
    let hi = field.max.as_ref().map_or(TAU, bound);
    let hi = if field.max.is_some() && !field.max_inclusive { just_below(hi) } else { hi };
    prop_oneof![
        6 => (lo..=hi).prop_map(Value::Float),
        1 => Just(Value::Float(lo)),
        1 => Just(Value::Float(hi)),
    ]
    .boxed()
}

fn present_value(field: &FieldDescriptor, on_grid: bool) -> BoxedStrategy<Value> {
    match field.kind {
        Kind::String => match &field.values {
            Some(values) => prop::sample::select(values.clone())
                .prop_map(Value::String)
                .boxed(),
            None => "[ -~]{1,12}".prop_map(Value::String).boxed(),
        },
        Kind::Integer => {
            let (lo, hi) = scaled_range(field, 1.0, (-1_000.0, 100_000.0));
            (lo..=hi).prop_map(Value::Integer).boxed()
        }
        Kind::Decimal => {
            let field = field.clone();
            (0_u32..=3)
                .prop_flat_map(move |scale| {
                    let (lo, hi) = scaled_range(&field, 10_f64.powi(scale as i32), (-1_000.0, 1_000.0));
                    (lo..=hi).prop_map(move |m| Value::Decimal(Decimal::new(m, scale)))
                })
                .boxed()
        }
        Kind::Float => (-1_000.0_f64..1_000.0).prop_map(Value::Float).boxed(),
        Kind::Angle if !on_grid => off_grid_angle(field),
        Kind::Angle => {
            let lo = field.min.as_ref().map_or(-360.0, |v| bound(v).to_degrees());
            let hi = field.max.as_ref().map_or(360.0, |v| bound(v).to_degrees());
            let lo = (lo * DMS_UNITS).round() as i64;
            let hi = (hi * DMS_UNITS).round() as i64;
            let hi = if field.max.is_some() && !field.max_inclusive { hi - 1 } else { hi };
            (lo..=hi)
                .prop_map(|units| Value::Float(degrees_to_radians(units as f64 / DMS_UNITS)))
                .boxed()
        }
        Kind::Date => (1900_i32..2100, 1_u8..=12, 1_u8..=28)
            .prop_map(|(y, m, d)| {
                let month = Month::try_from(m).unwrap();
                Value::Date(Date::from_calendar_date(y, month, d).unwrap())
            })
            .boxed(),
        Kind::Time => (0_u8..24, 0_u8..60, 0_u8..60)
            .prop_map(|(h, m, s)| Value::Time(Time::from_hms(h, m, s).unwrap()))
            .boxed(),
    }
}

fn field_value(field: &FieldDescriptor, on_grid: bool) -> BoxedStrategy<Option<Value>> {
    prop_oneof![
        1 => Just(None),
        5 => present_value(field, on_grid).prop_map(Some),
    ]
    .boxed()
}

fn observation(dialect: Dialect) -> impl Strategy<Value = Observation> {
    observation_with(dialect, true)
}

fn observation_with(dialect: Dialect, on_grid: bool) -> impl Strategy<Value = Observation> {
    let types: Vec<Arc<ObservationType>> = dialect.schema().concrete_types().cloned().collect();
    prop::sample::select(types)
        .prop_flat_map(move |observation_type| {
            let values: Vec<_> = observation_type
                .fields()
                .iter()
                .map(|field| field_value(field, on_grid))
                .collect();
            (Just(observation_type), values)
        })
        .prop_map(|(observation_type, values)| {
            let values: FieldValues = observation_type
                .field_names()
                .map(String::from)
                .zip(values)
                .collect();
            observation_type.construct(values).unwrap()
        })
}

fn assert_same(expected: &Observation, actual: &Observation) -> Result<(), TestCaseError> {
    assert_close(expected, actual, 1e-9)
}

fn assert_close(
    expected: &Observation,
    actual: &Observation,
    tolerance: f64,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(expected.type_name(), actual.type_name());
    for ((field, a), b) in expected.fields().zip(actual.values()) {
        match (a, b.as_ref()) {
            (Some(Value::Float(x)), Some(Value::Float(y))) => {
                prop_assert!((x - y).abs() < tolerance, "{}: {} != {}", field.name, x, y);
            }
            (a, b) => prop_assert_eq!(a, b, "field {}", field.name),
        }
    }
    Ok(())
}

fn reopens_near_the_grid(dialect: &Dialect, obs: &Observation) -> Result<(), TestCaseError> {
    let format = dialect.document_format();
    let line = format.format_observation(obs).unwrap();
    let parsed = format
        .parse_observation(&line, 1)
        .map_err(|err| TestCaseError::fail(format!("{line}: {err}")))?;
    assert_close(obs, &parsed, 2.0 * ANGLE_UNIT)?;
    prop_assert_eq!(format.format_observation(&parsed).unwrap(), line);
    Ok(())
}

proptest! {
    #[test]
    fn hmmc_lines_round_trip(obs in observation(hmmc().unwrap())) {
        let dialect = hmmc().unwrap();
        let format = dialect.document_format();
        let line = format.format_observation(&obs).unwrap();
        let parsed = format.parse_observation(&line, 1).unwrap();
        assert_same(&obs, &parsed)?;
        prop_assert_eq!(format.format_observation(&parsed).unwrap(), line);
    }

    #[test]
    fn mmrp_lines_round_trip(obs in observation(mmrp().unwrap())) {
        let dialect = mmrp().unwrap();
        let format = dialect.document_format();
        let line = format.format_observation(&obs).unwrap();
        let parsed = format.parse_observation(&line, 1).unwrap();
        assert_same(&obs, &parsed)?;
        prop_assert_eq!(format.format_observation(&parsed).unwrap(), line);
    }

    #[test]
    fn hmmc_off_grid_angles_reopen(obs in observation_with(hmmc().unwrap(), false)) {
        reopens_near_the_grid(&hmmc().unwrap(), &obs)?;
    }

    #[test]
    fn mmrp_off_grid_angles_reopen(obs in observation_with(mmrp().unwrap(), false)) {
        reopens_near_the_grid(&mmrp().unwrap(), &obs)?;
    }

    #[test]
    fn documents_round_trip(
        observations in prop::collection::vec(observation(hmmc().unwrap()), 0..20)
    ) {
        let dialect = hmmc().unwrap();
        let format = dialect.document_format();
        let text = format.format_document(&observations).unwrap();
        let parsed = format.parse_document(&text, 3).unwrap();
        prop_assert_eq!(parsed.len(), observations.len());
        for (expected, actual) in observations.iter().zip(&parsed) {
            assert_same(expected, actual)?;
        }
    }
}

//! Field descriptors shared by the dialects.

use maka_foundation::Decimal;
use maka_schema::FieldDescriptor;

/// A theodolite declination in `[0, 360)` degrees.
#[must_use]
pub fn declination() -> FieldDescriptor {
    FieldDescriptor::angle("declination")
        .with_units("degrees below zenith")
        .with_degree_range(0.0, 360.0, false)
}

/// An azimuth angle in `[0, 360)` degrees.
#[must_use]
pub fn azimuth(name: &str) -> FieldDescriptor {
    FieldDescriptor::angle(name)
        .with_units("degrees clockwise from magnetic north")
        .with_degree_range(0.0, 360.0, false)
}

/// An azimuth read off a binocular compass, in decimal degrees `[0, 360)`.
#[must_use]
pub fn compass_azimuth() -> FieldDescriptor {
    FieldDescriptor::decimal("azimuth")
        .with_units("degrees clockwise from magnetic north")
        .with_min(Decimal::ZERO)
        .with_max_exclusive(Decimal::from(360))
}

/// An unrestricted angle.
#[must_use]
pub fn angle(name: &str, units: &str) -> FieldDescriptor {
    FieldDescriptor::angle(name).with_units(units)
}

/// Visibility on a 0 to 6 scale.
#[must_use]
pub fn visibility() -> FieldDescriptor {
    FieldDescriptor::integer("visibility").with_min(0_i64).with_max(6_i64)
}

/// Sea state on the Beaufort scale, 0 to 6.
#[must_use]
pub fn beaufort() -> FieldDescriptor {
    FieldDescriptor::integer("beaufort").with_min(0_i64).with_max(6_i64)
}

/// Swell height in meters.
#[must_use]
pub fn swell_height() -> FieldDescriptor {
    FieldDescriptor::decimal("swellHeight")
        .with_units("meters")
        .with_min(Decimal::ZERO)
}

/// Pod heading in whole degrees.
#[must_use]
pub fn orientation() -> FieldDescriptor {
    FieldDescriptor::integer("orientation")
        .with_units("degrees clockwise from magnetic north")
        .with_min(0_i64)
        .with_max(359_i64)
}

/// Pod speed on a 0 to 3 scale.
#[must_use]
pub fn speed() -> FieldDescriptor {
    FieldDescriptor::integer("speed").with_min(0_i64).with_max(3_i64)
}

/// Playback type, 0 or 1.
#[must_use]
pub fn playback_type() -> FieldDescriptor {
    FieldDescriptor::integer("playbackType").with_min(0_i64).with_max(1_i64)
}

/// The station fields, with the id field supplied by the dialect.
#[must_use]
pub fn station(id: FieldDescriptor) -> Vec<FieldDescriptor> {
    vec![
        id,
        FieldDescriptor::string("name"),
        FieldDescriptor::integer("latitudeDegrees")
            .with_units("degrees north of equator")
            .with_min(-90_i64)
            .with_max(90_i64),
        minutes("latitudeMinutes"),
        FieldDescriptor::integer("longitudeDegrees")
            .with_units("degrees east")
            .with_min(-180_i64)
            .with_max(180_i64),
        minutes("longitudeMinutes"),
        FieldDescriptor::decimal("elevation").with_units("meters above sea level"),
        angle("magneticDeclination", "degrees clockwise from geographic north"),
    ]
}

fn minutes(name: &str) -> FieldDescriptor {
    FieldDescriptor::decimal(name)
        .with_units("minutes")
        .with_min(Decimal::ZERO)
        .with_max_exclusive(Decimal::from(60))
}

/// The theodolite fields, with the id field supplied by the dialect.
#[must_use]
pub fn theodolite(id: FieldDescriptor) -> Vec<FieldDescriptor> {
    vec![
        id,
        FieldDescriptor::string("name"),
        angle("azimuthOffset", "degrees"),
        angle("declinationOffset", "degrees"),
    ]
}

/// The reference fields, with the id field supplied by the dialect.
#[must_use]
pub fn reference(id: FieldDescriptor) -> Vec<FieldDescriptor> {
    vec![id, FieldDescriptor::string("name"), azimuth("azimuth")]
}

/// The lag in seconds, 3 unless given.
#[must_use]
pub fn lag() -> FieldDescriptor {
    FieldDescriptor::decimal("lag")
        .with_units("seconds")
        .with_default(Decimal::from(3))
}

//! The HMMC 1.01 dialect.

use std::sync::Arc;

use maka_command::{CommandSpec, DefaultRule, Grammar, Supplier};
use maka_foundation::{Decimal, Result};
use maka_format::DocumentFormat;
use maka_schema::{FieldDescriptor, NDT, Schema};

use crate::{Dialect, fields, prototypes};

/// Name of the HMMC document format.
pub const HMMC_FORMAT_NAME: &str = "HMMC Document Format 1.01";

/// Name of the HMMC command grammar.
pub const HMMC_GRAMMAR_NAME: &str = "HMMC Command Interpreter 1.01";

fn id(name: &str) -> FieldDescriptor {
    FieldDescriptor::integer(name).with_min(0_i64)
}

fn count(name: &str) -> FieldDescriptor {
    FieldDescriptor::integer(name).with_min(0_i64)
}

fn string(name: &str) -> FieldDescriptor {
    FieldDescriptor::string(name)
}

/// Builds the HMMC observation types.
///
/// # Errors
///
/// Returns a grammar error if a type definition is inconsistent.
pub fn schema() -> Result<Schema> {
    let mut schema = Schema::with_ndt_bases("HMMC Document 1.01")?;

    schema.define("Station", &[], fields::station(id("id")))?;
    schema.define("Theodolite", &[], fields::theodolite(id("id")))?;
    schema.define("Reference", &[], fields::reference(id("id")))?;
    schema.define("Observer", &[], vec![string("initials"), string("name")])?;
    schema.define(
        "Pod",
        &[],
        vec![id("id"), count("numWhales"), count("numCalves"), count("numSingers")],
    )?;

    schema.define("Vessel", &[NDT], vec![id("id"), string("type")])?;
    schema.define("Start", &[NDT], vec![])?;
    schema.define("End", &[NDT], vec![])?;
    schema.define("Comment", &[NDT], vec![id("id"), string("text")])?;
    schema.define(
        "EyepieceHeight",
        &[NDT],
        vec![
            FieldDescriptor::decimal("eyepieceHeight")
                .with_units("centimeters")
                .with_min(Decimal::ZERO),
        ],
    )?;
    schema.define("BubbleCheck", &[NDT], vec![])?;
    schema.define("Rebalance", &[NDT], vec![])?;
    schema.define("Role", &[NDT], vec![string("observer"), string("role")])?;
    schema.define(
        "TheoData",
        &[NDT],
        vec![fields::declination(), fields::azimuth("azimuth")],
    )?;
    schema.define(
        "Fix",
        &[NDT],
        vec![
            fields::declination().with_doc("the declination of this fix in degrees from the zenith"),
            fields::azimuth("azimuth").with_doc("the azimuth of this fix in degrees clockwise from zero"),
            string("subjectType").with_doc("the type of the subject of this fix"),
            id("subjectId").with_doc("the ID of the subject of this fix"),
            string("subjectState").with_doc("the behavioral state of the subject of this fix"),
        ],
    )?;
    schema.define(
        "BinocularFix",
        &[NDT],
        vec![
            string("subjectType"),
            id("subjectId"),
            FieldDescriptor::decimal("reticle")
                .with_units("reticle number")
                .with_min(Decimal::ZERO),
            fields::compass_azimuth(),
            string("behavioralState"),
        ],
    )?;
    schema.define(
        "StartScan",
        &[NDT],
        vec![
            id("id"),
            fields::visibility(),
            fields::beaufort(),
            fields::swell_height(),
            count("numVessels"),
            count("numPods"),
        ],
    )?;
    schema.define("EndScan", &[NDT], vec![])?;
    schema.define("StartVesselScan", &[NDT], vec![])?;
    schema.define("EndVesselScan", &[NDT], vec![])?;
    schema.define(
        "StartFocalSession",
        &[NDT],
        vec![
            id("sessionId"),
            id("podId"),
            fields::orientation(),
            fields::speed(),
            fields::visibility(),
            fields::beaufort(),
            fields::swell_height(),
            count("numVessels"),
            count("aircraftDisturbance"),
            fields::playback_type(),
        ],
    )?;
    schema.define("EndFocalSession", &[NDT], vec![])?;
    schema.define("StartPlayback", &[NDT], vec![])?;
    schema.define("EndPlayback", &[NDT], vec![])?;
    schema.define(
        "Environment",
        &[NDT],
        vec![fields::visibility(), fields::beaufort(), fields::swell_height()],
    )?;
    schema.define(
        "Behavior",
        &[NDT],
        vec![string("code"), string("behavior"), id("podId"), string("individualId")],
    )?;
    schema.define(
        "PodEvent",
        &[NDT],
        vec![string("code"), string("event"), id("podId")],
    )?;
    schema.define("Lag", &[NDT], vec![fields::lag()])?;
    schema.define("DeleteLastEntry", &[NDT], vec![])?;

    Ok(schema)
}

const NDT_PREFIX: &str = "{observationNum:05d} {date} {time}";

const PLAIN_TEMPLATES: [(&str, &str); 5] = [
    (
        "Station",
        "Station* {id} {name} Lat {latitudeDegrees} {latitudeMinutes} \
         Lon {longitudeDegrees} {longitudeMinutes} El {elevation} MagDec {magneticDeclination}",
    ),
    (
        "Theodolite",
        "Theodolite* {id} {name} AzOffset {azimuthOffset} DecOffset {declinationOffset}",
    ),
    ("Reference", "Reference* {id} {name} Azimuth {azimuth}"),
    ("Observer", "Observer* {initials} {name}"),
    (
        "Pod",
        "Pod* {id} Whales {numWhales} Calves {numCalves} Singers {numSingers}",
    ),
];

const NDT_TEMPLATES: [(&str, &str); 24] = [
    ("Vessel", "Vessel* {id} Type {type}"),
    ("Start", "Start*"),
    ("End", "End*"),
    ("Comment", "Comment* {id} {text}"),
    ("EyepieceHeight", "EyepieceHeight* {eyepieceHeight}"),
    ("BubbleCheck", "BubbleCheck*"),
    ("Rebalance", "Rebalance*"),
    ("Role", "Role* {observer} {role}"),
    ("TheoData", "TheoData* Dec {declination} Az {azimuth}"),
    (
        "Fix",
        "Fix* Dec {declination} Az {azimuth} {subjectType} {subjectId} State {subjectState}",
    ),
    (
        "BinocularFix",
        "BinocularFix* {subjectType} {subjectId} Ret {reticle} Az {azimuth} State {behavioralState}",
    ),
    (
        "StartScan",
        "StartScan* {id} Visibility {visibility} Beaufort {beaufort} Swell {swellHeight} \
         Vessels {numVessels} Pods {numPods}",
    ),
    ("EndScan", "EndScan*"),
    ("StartVesselScan", "StartVesselScan*"),
    ("EndVesselScan", "EndVesselScan*"),
    (
        "StartFocalSession",
        "StartFocalSession* {sessionId} Pod {podId} Or {orientation} {speed} \
         Env {visibility} {beaufort} {swellHeight} \
         Dist {numVessels} {aircraftDisturbance} {playbackType}",
    ),
    ("EndFocalSession", "EndFocalSession*"),
    ("StartPlayback", "StartPlayback*"),
    ("EndPlayback", "EndPlayback*"),
    (
        "Environment",
        "Environment* Visibility {visibility} Beaufort {beaufort} Swell {swellHeight}",
    ),
    ("Behavior", "Behavior* {code} {behavior} Pod {podId} {individualId}"),
    ("PodEvent", "PodEvent* {code} {event} Pod {podId}"),
    ("Lag", "Lag* {lag}"),
    ("DeleteLastEntry", "DeleteLastEntry*"),
];

/// Builds the HMMC document format over `schema`.
///
/// # Errors
///
/// Returns a grammar error if a template is inconsistent with its type.
pub fn document_format(schema: Arc<Schema>) -> Result<DocumentFormat> {
    let mut format = DocumentFormat::new(HMMC_FORMAT_NAME, schema);
    for (type_name, pattern) in PLAIN_TEMPLATES {
        format.add_template(type_name, pattern)?;
    }
    for (type_name, pattern) in NDT_TEMPLATES {
        format.add_template(type_name, &format!("{NDT_PREFIX} {pattern}"))?;
    }
    Ok(format)
}

/// Fix command names and the subject type each one records.
pub const FIX_COMMANDS: [(&str, &str); 8] = [
    ("p", "Pod"),
    ("v", "Vessel"),
    ("sp", "Spinner pod"),
    ("bn", "Tursiops pod"),
    ("tu", "Turtle pod"),
    ("r", "Reference"),
    ("by", "Buoy"),
    ("os", "Other"),
];

/// Builds the HMMC command grammar over `schema`.
///
/// # Errors
///
/// Returns a grammar error if a command is inconsistent with its type.
pub fn grammar(schema: Arc<Schema>) -> Result<Grammar> {
    let ndt = prototypes::ndt();
    let fix = prototypes::fix(&ndt);

    let mut specs = vec![
        CommandSpec::from_format("c text id", "Comment")?
            .with_prototype(&ndt)
            .with_default(DefaultRule::supplied(&["id"], Supplier::NextCommentId)),
        prototypes::theodolite_read_rules()
            .into_iter()
            .fold(CommandSpec::new("z", "TheoData").with_prototype(&ndt), CommandSpec::with_default),
    ];
    for (name, subject_type) in FIX_COMMANDS {
        specs.push(
            CommandSpec::new(name, "Fix")
                .with_fields(["subjectId", "subjectState"])
                .with_prototype(&fix)
                .with_default(DefaultRule::literal("subjectType", subject_type)),
        );
    }

    Grammar::new(HMMC_GRAMMAR_NAME, schema).with_commands(specs)
}

/// Builds the HMMC dialect.
///
/// # Errors
///
/// Returns a grammar error if any part of the dialect is inconsistent.
pub fn dialect() -> Result<Dialect> {
    let schema = Arc::new(schema()?);
    Dialect::new(document_format(Arc::clone(&schema))?, grammar(schema)?)
}

//! The '96 MMRP 1.01 dialect.
//!
//! MMRP documents share the theodolite and station records of HMMC but add
//! sightings, individual behaviors, pod behavioral states, affiliations and
//! closest approaches. Several string fields accept short aliases when typed,
//! e.g. `t` for the `trav` behavioral state.

use std::sync::Arc;

use maka_command::{CommandSpec, DefaultRule, Grammar, Supplier};
use maka_foundation::{Decimal, Result};
use maka_format::DocumentFormat;
use maka_schema::{FieldDescriptor, NDT, Schema};

use crate::{Dialect, fields, prototypes};

/// Name of the MMRP document format.
pub const MMRP_FORMAT_NAME: &str = "'96 MMRP Grammar 1.01";

/// Name of the MMRP command grammar.
pub const MMRP_GRAMMAR_NAME: &str = "MMRP Command Interpreter 1.01";

const OBSERVER_INITIALS: [(&str, &str); 8] = [
    ("Adam", "asf"),
    ("adam", "asf"),
    ("Chris", "cmg"),
    ("chris", "cmg"),
    ("Yin", "sey"),
    ("yin", "sey"),
    ("Susan", "shr"),
    ("susan", "shr"),
];

const ROLES: [(&str, &str); 5] = [
    ("o", "Observer"),
    ("t", "Theodolite operator"),
    ("c", "Computer operator"),
    ("n", "Notetaker"),
    ("m", "Map reticle person"),
];

const OBJECT_TYPES: [(&str, &str); 7] = [
    ("p", "Pod"),
    ("v", "Vessel"),
    ("s", "Spinner pod"),
    ("b", "Tursiops pod"),
    ("t", "Turtle pod"),
    ("r", "Reference"),
    ("o", "Other"),
];

const INDIVIDUALS: [(&str, &str); 8] = [
    ("1", "Adult"),
    ("2", "Mom"),
    ("3", "Calf"),
    ("4", "Escort"),
    ("a", "Adult"),
    ("m", "Mom"),
    ("c", "Calf"),
    ("e", "Escort"),
];

const BEHAVIORAL_STATES: [(&str, &str); 14] = [
    ("1", "rest"),
    ("2", "mill"),
    ("3", "trav"),
    ("4", "stat"),
    ("5", "sact"),
    ("6", "unkn"),
    ("7", "wwatch"),
    ("r", "rest"),
    ("m", "mill"),
    ("t", "trav"),
    ("s", "stat"),
    ("a", "sact"),
    ("u", "unkn"),
    ("w", "wwatch"),
];

/// Individual behavior codes and descriptions.
///
/// Each code is both a command name and an input alias for the `behavior`
/// field of `Behavior` observations.
pub const BEHAVIORS: [(&str, &str); 40] = [
    // respiration
    ("fs", "First surface with no blow"),
    ("f", "First surface blow"),
    ("nf", "Not first surfacing"),
    ("b", "Blow"),
    ("n", "No blow rise"),
    ("m", "Missed blow(s)?"),
    // submergence
    ("s", "Slip under"),
    ("a", "Peduncle arch"),
    ("d", "Fluke down dive"),
    ("u", "Fluke up dive"),
    ("sq", "Unidentified submergence"),
    // non-respiratory markers
    ("nr", "Missed non-respiratory behavior(s)?"),
    ("ub", "Unidentified behavior"),
    ("ms", "Missed surfacing"),
    // subsurface exhalations
    ("bc", "Bubble cloud"),
    ("bt", "Linear bubble trail"),
    // vocalizations
    ("tb", "Trumpet blow"),
    ("sr", "Singing reported"),
    ("ss", "Sideslap"),
    // head and leaping
    ("hr", "Head rise"),
    ("hl", "Head lunge"),
    ("mb", "Motorboating"),
    ("hs", "Head slap"),
    ("br", "Breach"),
    ("us", "Unidentified large splash"),
    ("oh", "Other head behavior"),
    ("ap", "Airplane"),
    ("h", "Helicopter"),
    // tail
    ("te", "Tail extension"),
    ("ts", "Tail slap"),
    ("ls", "Lateral tail slap"),
    ("sw", "Tail swish"),
    ("lt", "Lateral tail display"),
    ("ot", "Other tail behavior"),
    // pectoral fin
    ("pe", "Pec extension"),
    ("ps", "Pec slap"),
    ("rp", "Rolling pec slap"),
    ("op", "Other pec behavior"),
    // body contact
    ("sb", "Strike with body part"),
    ("wc", "Whale body contact"),
];

/// Pod behavioral state command names and the state each records.
pub const POD_STATES: [(&str, &str); 14] = [
    ("rest", "rest"),
    ("mill", "mill"),
    ("trav", "trav"),
    ("stat", "stat"),
    ("sact", "sact"),
    ("unkn", "unkn"),
    ("whalewatch", "whalewatch"),
    ("1", "rest"),
    ("2", "mill"),
    ("3", "trav"),
    ("4", "stat"),
    ("5", "sact"),
    ("6", "unkn"),
    ("7", "whalewatch"),
];

const POD_EVENTS: [(&str, &str); 6] = [
    ("pd", "Pod decreases speed"),
    ("pi", "Pod increases speed"),
    ("px", "Pod stops"),
    ("p45", "Pod changes direction 45 to 90 degrees"),
    ("p90", "Pod changes direction 90 to 180 degrees"),
    ("p180", "Pod changes direction 180 degrees"),
];

const VESSEL_EVENTS: [(&str, &str); 3] = [
    ("vs", "Vessel starts"),
    ("vc", "Vessel changes speed"),
    ("vx", "Vessel stops"),
];

/// Fix command names and the object type each one records.
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

const CLOSEST_APPROACHES: [(&str, &str); 3] = [
    ("cpav", "Vessel"),
    ("cpaa", "Airplane"),
    ("cpah", "Helicopter"),
];

fn integer(name: &str) -> FieldDescriptor {
    FieldDescriptor::integer(name)
}

fn string(name: &str) -> FieldDescriptor {
    FieldDescriptor::string(name)
}

fn observer_initials(name: &str) -> FieldDescriptor {
    string(name).with_translations(OBSERVER_INITIALS)
}

fn object_type() -> FieldDescriptor {
    string("objectType").with_translations(OBJECT_TYPES)
}

fn behavioral_state(name: &str) -> FieldDescriptor {
    string(name).with_translations(BEHAVIORAL_STATES)
}

fn events(code_field: &str) -> Vec<FieldDescriptor> {
    vec![string("code"), string("event"), integer(code_field)]
}

/// Builds the MMRP observation types.
///
/// # Errors
///
/// Returns a grammar error if a type definition is inconsistent.
pub fn schema() -> Result<Schema> {
    let mut s = Schema::with_ndt_bases("MMRP Document 1.01")?;

    s.define("Station", &[], fields::station(integer("id")))?;
    s.define("Observer", &[], vec![observer_initials("initials"), string("name")])?;
    s.define("Theodolite", &[], fields::theodolite(integer("id")))?;
    s.define("Reference", &[], fields::reference(integer("id")))?;
    s.define(
        "Role",
        &[NDT],
        vec![observer_initials("observer"), string("role").with_translations(ROLES)],
    )?;
    s.define("Start", &[NDT], vec![])?;
    s.define("End", &[NDT], vec![])?;
    s.define("Comment", &[NDT], vec![integer("id"), string("text")])?;
    s.define(
        "Pod",
        &[],
        vec![integer("id"), integer("numWhales"), integer("numCalves"), integer("numSingers")],
    )?;
    s.define("Vessel", &[NDT], vec![integer("id"), integer("type")])?;

    s.define(
        "Environment",
        &[NDT],
        vec![fields::visibility(), fields::beaufort(), fields::swell_height()],
    )?;
    s.define(
        "StartScan",
        &["Environment"],
        vec![integer("scanId"), integer("numVessels"), integer("numPods")],
    )?;
    s.define("StartWhaleScan", &[NDT], vec![])?;
    s.define("EndScan", &[NDT], vec![])?;
    s.define("StartVesselScan", &[NDT], vec![])?;
    s.define("EndVesselScan", &[NDT], vec![])?;

    s.define("Orientation", &[NDT], vec![fields::orientation(), fields::speed()])?;
    s.define(
        "StartFocalSession",
        &["Environment", "Orientation"],
        vec![
            integer("sessionId"),
            integer("podId"),
            integer("numVessels").with_units("number of vessels in arena"),
            integer("aircraftDisturbance").with_units("number of CPAs"),
            fields::playback_type(),
        ],
    )?;
    s.define("StartPlayback", &[NDT], vec![])?;
    s.define("EndPlayback", &[NDT], vec![])?;
    s.define("EndFocalSession", &[NDT], vec![])?;
    s.define(
        "Confidence",
        &[NDT],
        vec![integer("confidence").with_min(1_i64).with_max(6_i64)],
    )?;

    s.define(
        "BinocularFix",
        &[NDT],
        vec![
            object_type(),
            integer("objectId"),
            FieldDescriptor::decimal("reticle").with_units("reticle number"),
            fields::compass_azimuth(),
            behavioral_state("behavioralState"),
        ],
    )?;
    s.define(
        "TheoData",
        &[NDT],
        vec![fields::declination(), fields::azimuth("azimuth")],
    )?;
    s.define(
        "Fix",
        &[NDT],
        vec![
            fields::declination(),
            fields::azimuth("azimuth"),
            object_type(),
            integer("objectId"),
            behavioral_state("behavioralState"),
        ],
    )?;
    s.define(
        "Sighting",
        &[NDT],
        vec![
            string("observerId"),
            object_type(),
            integer("objectId"),
            behavioral_state("behavioralState"),
        ],
    )?;

    s.define(
        "Behavior",
        &[NDT],
        vec![
            string("code"),
            string("behavior").with_translations(BEHAVIORS),
            integer("podId"),
            string("individualId").with_translations(INDIVIDUALS),
        ],
    )?;
    s.define(
        "BehavioralState",
        &[NDT],
        vec![behavioral_state("state"), integer("podId")],
    )?;
    s.define("BehaviorsSynchronous", &[NDT], vec![])?;
    s.define("BehaviorsAsynchronous", &[NDT], vec![integer("numSurfaceWhales")])?;
    s.define("PodEvent", &[NDT], events("podId"))?;
    s.define("VesselEvent", &[NDT], events("vesselId"))?;
    s.define(
        "Affiliation",
        &[NDT],
        vec![integer("oldPodId1"), integer("oldPodId2"), integer("newPodId")],
    )?;
    s.define(
        "Disaffiliation",
        &[NDT],
        vec![integer("oldPodId"), integer("newPodId1"), integer("newPodId2")],
    )?;
    s.define("SuspectedAffiliation", &[NDT], vec![])?;
    s.define("SuspectedDisaffiliation", &[NDT], vec![])?;
    s.define("FocalPodLost", &[NDT], vec![])?;

    s.define("Lag", &[NDT], vec![fields::lag()])?;
    s.define("DeleteLastEntry", &[NDT], vec![])?;
    s.define("DeleteLastSequence", &[NDT], vec![])?;
    s.define(
        "EyepieceHeight",
        &[NDT],
        vec![
            FieldDescriptor::decimal("height")
                .with_units("inches")
                .with_min(Decimal::ZERO),
        ],
    )?;
    s.define("BubbleCheck", &[NDT], vec![])?;
    s.define("Rebalance", &[NDT], vec![])?;
    s.define(
        "TideHeight",
        &[NDT],
        vec![FieldDescriptor::decimal("height").with_units("meters")],
    )?;
    s.define(
        "ClosestApproach",
        &[NDT],
        vec![object_type(), integer("objectId"), integer("podId")],
    )?;
    s.define("SurfacingNumber", &[NDT], vec![integer("surfacingNum")])?;

    Ok(s)
}

const ENVIRONMENT: &str = "Visibility {visibility} Beaufort {beaufort} Swell {swellHeight}";

const PLAIN_TEMPLATES: [(&str, &str); 5] = [
    (
        "Station",
        "{id} {name} Lat {latitudeDegrees} {latitudeMinutes} \
         Lon {longitudeDegrees} {longitudeMinutes} El {elevation} MagDec {magneticDeclination}",
    ),
    ("Observer", "{initials} {name}"),
    (
        "Theodolite",
        "{id} {name} AzOffset {azimuthOffset} DecOffset {declinationOffset}",
    ),
    ("Reference", "{id} {name} Azimuth {azimuth}"),
    (
        "Pod",
        "{id} Whales {numWhales} Calves {numCalves} Singers {numSingers}",
    ),
];

const NDT_TEMPLATES: [(&str, &str); 41] = [
    ("Role", "{observer} {role}"),
    ("Start", ""),
    ("End", ""),
    ("Comment", "{id} {text}"),
    ("Vessel", "{id} Type {type}"),
    (
        "StartScan",
        "{scanId} Visibility {visibility} Beaufort {beaufort} Swell {swellHeight} \
         Vessels {numVessels} Pods {numPods}",
    ),
    ("StartWhaleScan", ""),
    ("EndScan", ""),
    ("StartVesselScan", ""),
    ("EndVesselScan", ""),
    (
        "StartFocalSession",
        "{sessionId} Pod {podId} Or {orientation} {speed} \
         Env {visibility} {beaufort} {swellHeight} \
         Dist {numVessels} {aircraftDisturbance} {playbackType}",
    ),
    ("StartPlayback", ""),
    ("EndPlayback", ""),
    ("EndFocalSession", ""),
    ("Orientation", "{orientation} Speed {speed}"),
    ("Environment", ENVIRONMENT),
    ("Confidence", "{confidence}"),
    (
        "BinocularFix",
        "{objectType} {objectId} Ret {reticle} Az {azimuth} State {behavioralState}",
    ),
    ("TheoData", "Dec {declination} Az {azimuth}"),
    (
        "Fix",
        "Dec {declination} Az {azimuth} {objectType} {objectId} State {behavioralState}",
    ),
    (
        "Sighting",
        "Observer {observerId} {objectType} {objectId} State {behavioralState}",
    ),
    ("Behavior", "{code} {behavior} Pod {podId} {individualId}"),
    ("BehavioralState", "{state} Pod {podId}"),
    ("BehaviorsSynchronous", ""),
    ("BehaviorsAsynchronous", "{numSurfaceWhales}"),
    ("PodEvent", "{code} {event} Pod {podId}"),
    ("VesselEvent", "{code} {event} Vessel {vesselId}"),
    (
        "Affiliation",
        "First {oldPodId1} Second {oldPodId2} New {newPodId}",
    ),
    (
        "Disaffiliation",
        "Old {oldPodId} First {newPodId1} Second {newPodId2}",
    ),
    ("SuspectedAffiliation", ""),
    ("SuspectedDisaffiliation", ""),
    ("FocalPodLost", ""),
    ("Lag", "{lag}"),
    ("DeleteLastEntry", ""),
    ("DeleteLastSequence", ""),
    ("EyepieceHeight", "{height}"),
    ("BubbleCheck", ""),
    ("Rebalance", ""),
    ("TideHeight", "{height}"),
    ("ClosestApproach", "{objectType} {objectId} Pod {podId}"),
    ("SurfacingNumber", "{surfacingNum}"),
];

fn pattern(prefix: &str, type_name: &str, rest: &str) -> String {
    let mut pattern = String::new();
    if !prefix.is_empty() {
        pattern.push_str(prefix);
        pattern.push(' ');
    }
    pattern.push_str(type_name);
    pattern.push('*');
    if !rest.is_empty() {
        pattern.push(' ');
        pattern.push_str(rest);
    }
    pattern
}

/// Builds the MMRP document format over `schema`.
///
/// # Errors
///
/// Returns a grammar error if a template is inconsistent with its type.
pub fn document_format(schema: Arc<Schema>) -> Result<DocumentFormat> {
    let mut format = DocumentFormat::new(MMRP_FORMAT_NAME, schema);
    for (type_name, rest) in PLAIN_TEMPLATES {
        format.add_template(type_name, &pattern("", type_name, rest))?;
    }
    for (type_name, rest) in NDT_TEMPLATES {
        let ndt = "{observationNum:05d} {date} {time}";
        format.add_template(type_name, &pattern(ndt, type_name, rest))?;
    }
    Ok(format)
}

/// Builds the MMRP command grammar over `schema`.
///
/// # Errors
///
/// Returns a grammar error if a command is inconsistent with its type.
pub fn grammar(schema: Arc<Schema>) -> Result<Grammar> {
    let ndt = prototypes::ndt();
    let fix = prototypes::fix(&ndt);

    let plain = |format: &str, type_name: &str| CommandSpec::from_format(format, type_name);
    let numbered = |format: &str, type_name: &str| {
        CommandSpec::from_format(format, type_name).map(|spec| spec.with_prototype(&ndt))
    };

    let mut specs = vec![
        // station setup
        plain(
            "station id name latitudeDegrees latitudeMinutes longitudeDegrees \
             longitudeMinutes elevation magneticDeclination",
            "Station",
        )?,
        plain("observer initials name", "Observer")?,
        plain("theodolite id name azimuthOffset declinationOffset", "Theodolite")?,
        plain("reference id name azimuth", "Reference")?,
        numbered("role observer role", "Role")?,
        numbered("start", "Start")?,
        numbered("end", "End")?,
        numbered("c text id", "Comment")?
            .with_default(DefaultRule::supplied(&["id"], Supplier::NextCommentId)),
        // tracked objects
        plain("pc id numWhales numCalves numSingers", "Pod")?,
        numbered("vt id type", "Vessel")?,
        // scans and focal sessions
        numbered(
            "ssc scanId visibility beaufort swellHeight numVessels numPods",
            "StartScan",
        )?,
        numbered("sws", "StartWhaleScan")?,
        numbered("esc", "EndScan")?,
        numbered(
            "sfs sessionId podId orientation speed visibility beaufort swellHeight \
             numVessels aircraftDisturbance playbackType",
            "StartFocalSession",
        )?,
        numbered("svs", "StartVesselScan")?,
        numbered("evs", "EndVesselScan")?,
        numbered("efs", "EndFocalSession")?,
        numbered("or orientation speed", "Orientation")?,
        numbered("env visibility beaufort swellHeight", "Environment")?,
        numbered("cnf confidence", "Confidence")?,
        numbered(
            "bf objectType objectId reticle azimuth behavioralState",
            "BinocularFix",
        )?,
        // theodolite fixes
        prototypes::theodolite_read_rules()
            .into_iter()
            .fold(numbered("z", "TheoData")?, CommandSpec::with_default),
        CommandSpec::from_format("fx objectType objectId behavioralState", "Fix")?
            .with_prototype(&fix),
    ];

    for (name, object) in FIX_COMMANDS {
        specs.push(
            CommandSpec::new(name, "Fix")
                .with_fields(["objectId", "behavioralState"])
                .with_prototype(&fix)
                .with_default(DefaultRule::literal("objectType", object)),
        );
    }

    specs.push(numbered(
        "st observerId objectType objectId behavioralState",
        "Sighting",
    )?);

    for (code, behavior) in BEHAVIORS {
        specs.push(
            CommandSpec::new(code, "Behavior")
                .with_fields(["individualId", "podId"])
                .with_prototype(&ndt)
                .with_default(DefaultRule::literal("code", code))
                .with_default(DefaultRule::literal("behavior", behavior)),
        );
    }

    for (name, state) in POD_STATES {
        specs.push(
            CommandSpec::new(name, "BehavioralState")
                .with_fields(["podId"])
                .with_prototype(&ndt)
                .with_default(DefaultRule::literal("state", state)),
        );
    }

    specs.push(numbered("sync", "BehaviorsSynchronous")?);
    specs.push(numbered("asyn", "BehaviorsAsynchronous")?);

    for (events, type_name, id_field) in [
        (&POD_EVENTS[..], "PodEvent", "podId"),
        (&VESSEL_EVENTS[..], "VesselEvent", "vesselId"),
    ] {
        for &(code, event) in events {
            specs.push(
                CommandSpec::new(code, type_name)
                    .with_fields([id_field])
                    .with_prototype(&ndt)
                    .with_default(DefaultRule::literal("code", code))
                    .with_default(DefaultRule::literal("event", event)),
            );
        }
    }

    specs.extend([
        numbered("paf oldPodId1 oldPodId2 newPodId", "Affiliation")?,
        numbered("pds oldPodId newPodId1 newPodId2", "Disaffiliation")?,
        numbered("pl", "FocalPodLost")?,
        // document edits
        numbered("l lag", "Lag")?,
        numbered("x", "DeleteLastEntry")?,
        numbered("xx", "DeleteLastSequence")?,
        // theodolite upkeep
        numbered("eh height", "EyepieceHeight")?,
        numbered("tbc", "BubbleCheck")?,
        numbered("rbt", "Rebalance")?,
        numbered("th height", "TideHeight")?,
    ]);

    for (name, object) in CLOSEST_APPROACHES {
        specs.push(
            CommandSpec::new(name, "ClosestApproach")
                .with_fields(["objectId", "podId"])
                .with_prototype(&ndt)
                .with_default(DefaultRule::literal("objectType", object)),
        );
    }

    specs.push(numbered("sn surfacingNum", "SurfacingNumber")?);

    Grammar::new(MMRP_GRAMMAR_NAME, schema).with_commands(specs)
}

/// Builds the MMRP dialect.
///
/// # Errors
///
/// Returns a grammar error if any part of the dialect is inconsistent.
pub fn dialect() -> Result<Dialect> {
    let schema = Arc::new(schema()?);
    Dialect::new(document_format(Arc::clone(&schema))?, grammar(schema)?)
}

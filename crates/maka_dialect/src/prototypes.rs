//! Command prototypes shared by the dialects.

use std::sync::Arc;

use maka_command::{CommandPrototype, DefaultRule, Supplier};
use maka_schema::{DATE, OBSERVATION_NUM, TIME};

/// Numbered, time-stamped commands: the next observation number and the
/// current date and time.
#[must_use]
pub fn ndt() -> Arc<CommandPrototype> {
    Arc::new(
        CommandPrototype::new("ndt")
            .with_default(DefaultRule::supplied(&[OBSERVATION_NUM], Supplier::NextObservationNum))
            .with_default(DefaultRule::supplied(&[DATE, TIME], Supplier::CurrentDateTime)),
    )
}

/// Fixes: the date, time and angles saved by the last theodolite command.
#[must_use]
pub fn fix(ndt: &Arc<CommandPrototype>) -> Arc<CommandPrototype> {
    Arc::new(
        CommandPrototype::new("fix")
            .with_parent(ndt)
            .with_default(DefaultRule::supplied(&[DATE, TIME], Supplier::SavedDateTime))
            .with_default(DefaultRule::supplied(
                &["declination", "azimuth"],
                Supplier::SavedTheodoliteAngles,
            )),
    )
}

/// Default rules of the theodolite read command: save the current date and
/// time and read fresh angles.
#[must_use]
pub fn theodolite_read_rules() -> [DefaultRule; 2] {
    [
        DefaultRule::supplied(&[DATE, TIME], Supplier::SaveCurrentDateTime),
        DefaultRule::supplied(&["declination", "azimuth"], Supplier::ReadTheodoliteAngles),
    ]
}

//! Per-dialect registry of observation types.

use std::collections::HashMap;
use std::sync::Arc;

use maka_foundation::{Error, Result};

use crate::field::FieldDescriptor;
use crate::observation::ObservationType;

/// Name of the observation number field.
pub const OBSERVATION_NUM: &str = "observationNum";
/// Name of the date field.
pub const DATE: &str = "date";
/// Name of the time field.
pub const TIME: &str = "time";

/// Abstract type carrying an observation number.
pub const NUMBERED: &str = "Numbered";
/// Abstract type carrying a date and time.
pub const TIME_STAMPED: &str = "TimeStamped";
/// Abstract type carrying a number, date and time.
pub const NDT: &str = "Ndt";

/// The observation types of one dialect, in definition order.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    name: String,
    types: Vec<Arc<ObservationType>>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Creates a schema holding the abstract `Numbered`, `TimeStamped`, and
    /// `Ndt` types.
    ///
    /// # Errors
    ///
    /// Never fails in practice; definition errors are propagated.
    pub fn with_ndt_bases(name: impl Into<String>) -> Result<Self> {
        let mut schema = Self::new(name);
        schema.define_abstract(
            NUMBERED,
            &[],
            vec![FieldDescriptor::integer(OBSERVATION_NUM).with_doc("the number of this observation")],
        )?;
        schema.define_abstract(
            TIME_STAMPED,
            &[],
            vec![
                FieldDescriptor::date(DATE).with_doc("the date of this observation"),
                FieldDescriptor::time(TIME).with_doc("the time of this observation"),
            ],
        )?;
        schema.define_abstract(NDT, &[NUMBERED, TIME_STAMPED], vec![])?;
        Ok(schema)
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defines a concrete observation type whose parents are named types of
    /// this schema.
    ///
    /// # Errors
    ///
    /// Returns a grammar error for a duplicate type name, an unknown parent,
    /// or an inconsistent field declaration.
    pub fn define(
        &mut self,
        name: &str,
        parents: &[&str],
        fields: Vec<FieldDescriptor>,
    ) -> Result<Arc<ObservationType>> {
        self.insert(name, parents, fields, false)
    }

    /// Defines an abstract observation type.
    ///
    /// # Errors
    ///
    /// Same as [`Schema::define`].
    pub fn define_abstract(
        &mut self,
        name: &str,
        parents: &[&str],
        fields: Vec<FieldDescriptor>,
    ) -> Result<Arc<ObservationType>> {
        self.insert(name, parents, fields, true)
    }

    fn insert(
        &mut self,
        name: &str,
        parents: &[&str],
        fields: Vec<FieldDescriptor>,
        is_abstract: bool,
    ) -> Result<Arc<ObservationType>> {
        if self.by_name.contains_key(name) {
            return Err(Error::grammar(format!(
                "Observation type \"{name}\" is defined more than once in \"{}\".",
                self.name
            )));
        }

        let parent_types = parents
            .iter()
            .map(|p| {
                self.get(p).ok_or_else(|| {
                    Error::grammar(format!(
                        "Observation type \"{name}\" names unknown parent type \"{p}\"."
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let parent_refs: Vec<&ObservationType> = parent_types.iter().map(|p| Arc::as_ref(p)).collect();

        let observation_type = if is_abstract {
            ObservationType::define_abstract(name, &parent_refs, fields)?
        } else {
            ObservationType::define(name, &parent_refs, fields)?
        };

        let observation_type = Arc::new(observation_type);
        self.by_name.insert(name.to_string(), self.types.len());
        self.types.push(Arc::clone(&observation_type));
        Ok(observation_type)
    }

    /// Returns the named type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ObservationType>> {
        self.by_name.get(name).map(|&i| &self.types[i])
    }

    /// Returns the named type, or an error naming the missing type.
    ///
    /// # Errors
    ///
    /// Returns an error if no such type exists.
    pub fn require(&self, name: &str) -> Result<&Arc<ObservationType>> {
        self.get(name).ok_or_else(|| {
            Error::parse(format!(
                "Unknown observation type \"{name}\" in \"{}\".",
                self.name
            ))
        })
    }

    /// Iterates over all types in definition order.
    pub fn types(&self) -> impl Iterator<Item = &Arc<ObservationType>> {
        self.types.iter()
    }

    /// Iterates over the concrete types in definition order.
    pub fn concrete_types(&self) -> impl Iterator<Item = &Arc<ObservationType>> {
        self.types.iter().filter(|t| !t.is_abstract())
    }

    /// Returns the number of types, abstract ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

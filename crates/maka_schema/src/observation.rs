//! Observation types and observations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use maka_foundation::{Error, Result, Value};

use crate::field::FieldDescriptor;

/// Field values keyed by field name.
///
/// An entry mapped to `None` explicitly clears the field; a missing entry
/// lets the field's default apply.
pub type FieldValues = BTreeMap<String, Option<Value>>;

/// A named, ordered set of fields.
///
/// Fields are inherited from parent types in declaration order, followed by
/// the type's own fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationType {
    name: String,
    parents: Vec<String>,
    fields: Vec<FieldDescriptor>,
    is_abstract: bool,
}

impl ObservationType {
    /// Defines a concrete observation type.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if a field collides with an inherited field
    /// of a different kind, if a field is declared twice, or if a field's
    /// default fails the field's own validation.
    pub fn define(
        name: impl Into<String>,
        parents: &[&ObservationType],
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self> {
        Self::build(name.into(), parents, fields, false)
    }

    /// Defines an abstract observation type, usable only as a parent.
    ///
    /// # Errors
    ///
    /// Same as [`ObservationType::define`].
    pub fn define_abstract(
        name: impl Into<String>,
        parents: &[&ObservationType],
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self> {
        Self::build(name.into(), parents, fields, true)
    }

    fn build(
        name: String,
        parents: &[&ObservationType],
        own: Vec<FieldDescriptor>,
        is_abstract: bool,
    ) -> Result<Self> {
        let mut fields: Vec<FieldDescriptor> = Vec::new();

        for parent in parents {
            for field in &parent.fields {
                match fields.iter().find(|f| f.name == field.name) {
                    None => fields.push(field.clone()),
                    Some(existing) if existing.kind == field.kind => {}
                    Some(existing) => {
                        return Err(Error::grammar(format!(
                            "Observation type \"{name}\" inherits field \"{}\" as both {} and {}.",
                            field.name, existing.kind, field.kind
                        )));
                    }
                }
            }
        }

        let inherited = fields.len();
        let mut declared: Vec<String> = Vec::with_capacity(own.len());
        for field in own {
            if declared.contains(&field.name) {
                return Err(Error::grammar(format!(
                    "Observation type \"{name}\" declares field \"{}\" more than once.",
                    field.name
                )));
            }

            if let Some(default) = &field.default {
                field.validate(Some(default.clone())).map_err(|e| {
                    Error::grammar(format!(
                        "Default value of field \"{}\" of observation type \"{name}\" is invalid: {e}",
                        field.name
                    ))
                })?;
            }

            declared.push(field.name.clone());
            match fields[..inherited].iter().position(|f| f.name == field.name) {
                Some(i) if fields[i].kind == field.kind => fields[i] = field,
                Some(i) => {
                    return Err(Error::grammar(format!(
                        "Observation type \"{name}\" redeclares inherited {} field \"{}\" as {}.",
                        fields[i].kind, field.name, field.kind
                    )));
                }
                None => fields.push(field),
            }
        }

        Ok(Self {
            name,
            parents: parents.iter().map(|p| p.name.clone()).collect(),
            fields,
            is_abstract,
        })
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the names of the direct parent types.
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Returns true if this type can only be used as a parent.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Returns all fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the position of the named field.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns true if the type has the named field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field_index(name).is_some()
    }

    /// Returns the field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Constructs a validated observation of this type.
    ///
    /// Fields absent from `values` take their defaults. Fields are validated
    /// in declaration order and the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown field name or an invalid
    /// value.
    pub fn construct(self: &Arc<Self>, mut values: FieldValues) -> Result<Observation> {
        if let Some(unknown) = values.keys().find(|k| !self.has_field(k)) {
            return Err(Error::validation(
                unknown.clone(),
                "",
                format!("is not a field of observation type \"{}\"", self.name),
            ));
        }

        let mut validated = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match values.remove(&field.name) {
                Some(value) => value,
                None => field.default.clone(),
            };
            validated.push(field.validate(value)?);
        }

        Ok(Observation {
            kind: Arc::clone(self),
            values: validated,
        })
    }
}

/// An immutable, validated record of one observation type.
#[derive(Clone, Debug)]
pub struct Observation {
    kind: Arc<ObservationType>,
    values: Vec<Option<Value>>,
}

impl Observation {
    /// Returns the observation's type.
    #[must_use]
    pub fn observation_type(&self) -> &Arc<ObservationType> {
        &self.kind
    }

    /// Returns the observation's type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.kind.name()
    }

    /// Returns the value of the named field, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.kind
            .field_index(name)
            .and_then(|i| self.values[i].as_ref())
    }

    /// Returns true if the observation's type has the named field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.kind.has_field(name)
    }

    /// Returns the values in field declaration order.
    #[must_use]
    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Iterates over fields paired with their values.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, Option<&Value>)> {
        self.kind
            .fields()
            .iter()
            .zip(self.values.iter().map(Option::as_ref))
    }

    /// Returns every field value keyed by name.
    #[must_use]
    pub fn to_field_values(&self) -> FieldValues {
        self.fields()
            .map(|(f, v)| (f.name.clone(), v.cloned()))
            .collect()
    }

    /// Returns a new observation with some fields replaced.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a change names an unknown field or
    /// supplies an invalid value.
    pub fn with_changes(&self, changes: FieldValues) -> Result<Self> {
        let mut values = self.to_field_values();
        for (name, value) in changes {
            if !self.kind.has_field(&name) {
                return Err(Error::validation(
                    name,
                    "",
                    format!("is not a field of observation type \"{}\"", self.kind.name),
                ));
            }
            values.insert(name, value);
        }
        self.kind.construct(values)
    }
}

impl PartialEq for Observation {
    fn eq(&self, other: &Self) -> bool {
        self.kind.name == other.kind.name && self.values == other.values
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.name)?;
        let mut first = true;
        for (field, value) in self.fields() {
            if let Some(value) = value {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{}={value}", field.name)?;
            }
        }
        write!(f, ")")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Observation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        struct Fields<'a>(&'a Observation);

        impl serde::Serialize for Fields<'_> {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.values.len()))?;
                for (field, value) in self.0.fields() {
                    map.serialize_entry(&field.name, &value)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.type_name())?;
        map.serialize_entry("fields", &Fields(self))?;
        map.end()
    }
}

//! Command grammars: command names, positional fields, and default rules.
//!
//! A command maps its name to an observation type and an ordered list of
//! fields filled from the command's arguments. Fields left unfilled take
//! values from default rules. Rules shared by many commands live on
//! prototypes, which form a chain; a rule nearer the command wins over a
//! rule further up the chain for the same fields.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use maka_foundation::{Error, Result, Value};
use maka_schema::{OBSERVATION_NUM, ObservationType, Schema};

use crate::serial::CounterSpec;

/// A stateful default-value operation provided by the interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Supplier {
    /// The next observation number.
    NextObservationNum,
    /// The next comment id.
    NextCommentId,
    /// The current date and time.
    CurrentDateTime,
    /// The current date and time, also remembered as the saved date and time.
    SaveCurrentDateTime,
    /// The date and time last saved.
    SavedDateTime,
    /// A fresh theodolite reading, also remembered as the saved angles.
    ReadTheodoliteAngles,
    /// The theodolite angles last saved.
    SavedTheodoliteAngles,
}

impl Supplier {
    /// Returns the number of values the supplier produces.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::NextObservationNum | Self::NextCommentId => 1,
            Self::CurrentDateTime
            | Self::SaveCurrentDateTime
            | Self::SavedDateTime
            | Self::ReadTheodoliteAngles
            | Self::SavedTheodoliteAngles => 2,
        }
    }

    /// Returns true if invoking the supplier changes interpreter state.
    #[must_use]
    pub const fn has_side_effects(self) -> bool {
        matches!(
            self,
            Self::NextObservationNum
                | Self::NextCommentId
                | Self::SaveCurrentDateTime
                | Self::ReadTheodoliteAngles
        )
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NextObservationNum => "next observation number",
            Self::NextCommentId => "next comment id",
            Self::CurrentDateTime => "current date and time",
            Self::SaveCurrentDateTime => "save current date and time",
            Self::SavedDateTime => "saved date and time",
            Self::ReadTheodoliteAngles => "read theodolite angles",
            Self::SavedTheodoliteAngles => "saved theodolite angles",
        };
        f.write_str(name)
    }
}

/// The source of a default rule's values.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    /// Fixed values, one per field.
    Literal(Vec<Option<Value>>),
    /// Values from an interpreter operation, one per field.
    Supplied(Supplier),
}

/// Default values for one field or for several fields filled together.
#[derive(Clone, Debug, PartialEq)]
pub struct DefaultRule {
    /// Target fields.
    pub fields: Vec<String>,
    /// Where the values come from.
    pub value: DefaultValue,
}

impl DefaultRule {
    /// A fixed default for one field.
    #[must_use]
    pub fn literal(field: &str, value: impl Into<Value>) -> Self {
        Self {
            fields: vec![field.to_string()],
            value: DefaultValue::Literal(vec![Some(value.into())]),
        }
    }

    /// Fixed defaults for several fields.
    #[must_use]
    pub fn literals(fields: &[&str], values: Vec<Option<Value>>) -> Self {
        Self {
            fields: fields.iter().map(ToString::to_string).collect(),
            value: DefaultValue::Literal(values),
        }
    }

    /// Defaults produced by a supplier.
    #[must_use]
    pub fn supplied(fields: &[&str], supplier: Supplier) -> Self {
        Self {
            fields: fields.iter().map(ToString::to_string).collect(),
            value: DefaultValue::Supplied(supplier),
        }
    }

    fn arity(&self) -> usize {
        match &self.value {
            DefaultValue::Literal(values) => values.len(),
            DefaultValue::Supplied(supplier) => supplier.arity(),
        }
    }
}

/// Default rules shared by a family of commands.
#[derive(Clone, Debug, Default)]
pub struct CommandPrototype {
    name: String,
    parent: Option<Arc<CommandPrototype>>,
    defaults: Vec<DefaultRule>,
}

impl CommandPrototype {
    /// Creates a root prototype.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            defaults: Vec::new(),
        }
    }

    /// Sets the parent prototype.
    #[must_use]
    pub fn with_parent(mut self, parent: &Arc<CommandPrototype>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Adds a default rule.
    #[must_use]
    pub fn with_default(mut self, rule: DefaultRule) -> Self {
        self.defaults.push(rule);
        self
    }

    /// Returns the prototype name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent prototype.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<CommandPrototype>> {
        self.parent.as_ref()
    }

    /// Returns this prototype's own rules.
    #[must_use]
    pub fn defaults(&self) -> &[DefaultRule] {
        &self.defaults
    }

    /// Iterates from this prototype up to the root.
    pub fn ancestry(&self) -> impl Iterator<Item = &CommandPrototype> {
        std::iter::successors(Some(self), |p| p.parent.as_deref())
    }
}

/// The definition of one command, before it is checked against a schema.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    name: String,
    observation_type: String,
    field_order: Vec<String>,
    prototype: Option<Arc<CommandPrototype>>,
    defaults: Vec<DefaultRule>,
}

impl CommandSpec {
    /// Creates a command that takes no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, observation_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            observation_type: observation_type.into(),
            field_order: Vec::new(),
            prototype: None,
            defaults: Vec::new(),
        }
    }

    /// Creates a command from a format of the form `"name field1 field2"`.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if the format is empty.
    pub fn from_format(format: &str, observation_type: impl Into<String>) -> Result<Self> {
        let mut parts = format.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| Error::grammar("Command format is empty."))?;
        Ok(Self::new(name, observation_type).with_fields(parts))
    }

    /// Sets the positional fields.
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_order = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the prototype whose rules this command inherits.
    #[must_use]
    pub fn with_prototype(mut self, prototype: &Arc<CommandPrototype>) -> Self {
        self.prototype = Some(Arc::clone(prototype));
        self
    }

    /// Adds a default rule of the command's own.
    #[must_use]
    pub fn with_default(mut self, rule: DefaultRule) -> Self {
        self.defaults.push(rule);
        self
    }

    /// Returns the command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the observation type the command creates.
    #[must_use]
    pub fn observation_type(&self) -> &str {
        &self.observation_type
    }

    /// Returns the positional fields.
    #[must_use]
    pub fn field_order(&self) -> &[String] {
        &self.field_order
    }

    /// Returns the command's rules followed by its prototypes' rules,
    /// nearest first.
    ///
    /// A rule whose target fields repeat those of a nearer rule exactly is
    /// left out.
    #[must_use]
    pub fn resolved_defaults(&self) -> Vec<DefaultRule> {
        let inherited = self
            .prototype
            .iter()
            .flat_map(|p| p.ancestry())
            .flat_map(|p| p.defaults.iter());

        let mut resolved: Vec<DefaultRule> = Vec::new();
        for rule in self.defaults.iter().chain(inherited) {
            if !resolved.iter().any(|r| r.fields == rule.fields) {
                resolved.push(rule.clone());
            }
        }
        resolved
    }
}

/// A command checked against its observation type.
#[derive(Clone, Debug)]
pub struct Command {
    name: String,
    observation_type: Arc<ObservationType>,
    field_order: Vec<String>,
    defaults: Vec<DefaultRule>,
}

impl Command {
    /// Returns the command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the observation type the command creates.
    #[must_use]
    pub fn observation_type(&self) -> &Arc<ObservationType> {
        &self.observation_type
    }

    /// Returns the positional fields.
    #[must_use]
    pub fn field_order(&self) -> &[String] {
        &self.field_order
    }

    /// Returns the maximum number of arguments.
    #[must_use]
    pub fn max_args(&self) -> usize {
        self.field_order.len()
    }

    /// Returns the default rules, nearest first.
    #[must_use]
    pub fn defaults(&self) -> &[DefaultRule] {
        &self.defaults
    }

    /// Returns a usage line such as `p objectId behavioralState`.
    #[must_use]
    pub fn usage(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.field_order.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The commands of one dialect.
#[derive(Clone, Debug)]
pub struct Grammar {
    name: String,
    schema: Arc<Schema>,
    commands: Vec<Command>,
    by_name: HashMap<String, usize>,
    observation_counter: CounterSpec,
    comment_counter: CounterSpec,
}

impl Grammar {
    /// Creates an empty grammar over a schema.
    ///
    /// Observation numbers are seeded from `observationNum` on any
    /// observation, comment ids from `id` on `Comment` observations, both
    /// starting at 0.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self {
            name: name.into(),
            schema,
            commands: Vec::new(),
            by_name: HashMap::new(),
            observation_counter: CounterSpec::field(OBSERVATION_NUM),
            comment_counter: CounterSpec::field("id").on_type("Comment"),
        }
    }

    /// Replaces how observation numbers are seeded.
    #[must_use]
    pub fn with_observation_counter(mut self, spec: CounterSpec) -> Self {
        self.observation_counter = spec;
        self
    }

    /// Replaces how comment ids are seeded.
    #[must_use]
    pub fn with_comment_counter(mut self, spec: CounterSpec) -> Self {
        self.comment_counter = spec;
        self
    }

    /// Defines commands, chaining.
    ///
    /// # Errors
    ///
    /// Same as [`Grammar::define_command`].
    pub fn with_commands(mut self, specs: impl IntoIterator<Item = CommandSpec>) -> Result<Self> {
        for spec in specs {
            self.define_command(spec)?;
        }
        Ok(self)
    }

    /// Checks a command definition against the schema and adds it.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if the name is taken, the observation type is
    /// unknown or abstract, a positional or default field is not a field of
    /// the type, a positional field repeats, a rule has the wrong number of
    /// values, or a literal default is invalid for its field.
    pub fn define_command(&mut self, spec: CommandSpec) -> Result<()> {
        let name = spec.name.clone();
        if self.by_name.contains_key(&name) {
            return Err(Error::grammar(format!(
                "Command \"{name}\" is defined more than once in \"{}\".",
                self.name
            )));
        }
        if name.is_empty() || name.starts_with('"') || name.contains(char::is_whitespace) {
            return Err(Error::grammar(format!("Bad command name \"{name}\".")));
        }

        let observation_type = self.schema.get(&spec.observation_type).ok_or_else(|| {
            Error::grammar(format!(
                "Command \"{name}\" creates unknown observation type \"{}\".",
                spec.observation_type
            ))
        })?;
        if observation_type.is_abstract() {
            return Err(Error::grammar(format!(
                "Command \"{name}\" creates abstract observation type \"{}\".",
                spec.observation_type
            )));
        }

        let check_field = |field: &str| {
            if observation_type.has_field(field) {
                Ok(())
            } else {
                Err(Error::grammar(format!(
                    "Bad field name \"{field}\" in command \"{name}\". Field name must be a \
                     field of observation type \"{}\".",
                    observation_type.name()
                )))
            }
        };

        for (i, field) in spec.field_order.iter().enumerate() {
            check_field(field)?;
            if spec.field_order[..i].contains(field) {
                return Err(Error::grammar(format!(
                    "Command \"{name}\" takes field \"{field}\" more than once."
                )));
            }
        }

        let defaults = spec.resolved_defaults();
        for rule in &defaults {
            for field in &rule.fields {
                check_field(field)?;
            }
            if rule.fields.is_empty() || rule.arity() != rule.fields.len() {
                return Err(Error::grammar(format!(
                    "Default rule for fields {:?} of command \"{name}\" supplies {} values.",
                    rule.fields,
                    rule.arity()
                )));
            }
            if let DefaultValue::Literal(values) = &rule.value {
                for (field, value) in rule.fields.iter().zip(values) {
                    if let Some(descriptor) = observation_type.field(field) {
                        descriptor.validate(value.clone()).map_err(|e| {
                            Error::grammar(format!(
                                "Default value for field \"{field}\" of command \"{name}\" is invalid: {e}"
                            ))
                        })?;
                    }
                }
            }
        }

        self.by_name.insert(name.clone(), self.commands.len());
        self.commands.push(Command {
            name,
            observation_type: Arc::clone(observation_type),
            field_order: spec.field_order,
            defaults,
        });
        Ok(())
    }

    /// Returns the grammar name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema the commands create observations of.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the named command.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.by_name.get(name).map(|&i| &self.commands[i])
    }

    /// Iterates over commands in definition order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Iterates over command names in definition order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Returns the number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if there are no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns how observation numbers are seeded.
    #[must_use]
    pub fn observation_counter(&self) -> &CounterSpec {
        &self.observation_counter
    }

    /// Returns how comment ids are seeded.
    #[must_use]
    pub fn comment_counter(&self) -> &CounterSpec {
        &self.comment_counter
    }
}

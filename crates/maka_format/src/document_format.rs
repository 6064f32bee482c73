//! Document formats: one template per observation type.

use std::collections::HashMap;
use std::sync::Arc;

use maka_foundation::{Error, ErrorKind, Result};
use maka_schema::{Observation, Schema};
use maka_text::tokenize;
use tracing::debug;

use crate::template::Template;

/// A named document format over a schema.
///
/// Each concrete observation type has one template. A template's first
/// keyword, at its token position, identifies the type of a line.
#[derive(Clone, Debug)]
pub struct DocumentFormat {
    name: String,
    schema: Arc<Schema>,
    templates: Vec<Template>,
    by_type: HashMap<String, usize>,
    by_keyword: HashMap<(usize, String), usize>,
    keyword_positions: Vec<usize>,
}

impl DocumentFormat {
    /// Creates a format with no templates.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self {
            name: name.into(),
            schema,
            templates: Vec::new(),
            by_type: HashMap::new(),
            by_keyword: HashMap::new(),
            keyword_positions: Vec::new(),
        }
    }

    /// Adds the template of a concrete observation type.
    ///
    /// # Errors
    ///
    /// Returns a grammar error if the type is unknown or abstract, already has
    /// a template, the template has no keyword, or its keyword is already used
    /// at the same position.
    pub fn add_template(&mut self, type_name: &str, pattern: &str) -> Result<()> {
        let observation_type = self.schema.get(type_name).ok_or_else(|| {
            Error::grammar(format!(
                "Format \"{}\" has a template for unknown observation type \"{type_name}\".",
                self.name
            ))
        })?;
        if observation_type.is_abstract() {
            return Err(Error::grammar(format!(
                "Format \"{}\" has a template for abstract observation type \"{type_name}\".",
                self.name
            )));
        }
        if self.by_type.contains_key(type_name) {
            return Err(Error::grammar(format!(
                "Format \"{}\" has more than one template for \"{type_name}\".",
                self.name
            )));
        }

        let template = Template::new(Arc::clone(observation_type), pattern)?;
        let Some((position, keyword)) = template.keyword() else {
            return Err(Error::grammar(format!(
                "Template for \"{type_name}\" has no keyword."
            )));
        };

        let key = (position, keyword.to_string());
        if let Some(&other) = self.by_keyword.get(&key) {
            return Err(Error::grammar(format!(
                "Templates for \"{type_name}\" and \"{}\" share keyword \"{keyword}\".",
                self.templates[other].observation_type().name()
            )));
        }

        let index = self.templates.len();
        self.by_keyword.insert(key, index);
        self.by_type.insert(type_name.to_string(), index);
        if !self.keyword_positions.contains(&position) {
            self.keyword_positions.push(position);
            self.keyword_positions.sort_unstable();
        }
        self.templates.push(template);
        Ok(())
    }

    /// Adds templates, chaining.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentFormat::add_template`].
    pub fn with_templates<'a>(
        mut self,
        templates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        for (type_name, pattern) in templates {
            self.add_template(type_name, pattern)?;
        }
        Ok(self)
    }

    /// Checks that every concrete type of the schema has a template.
    ///
    /// # Errors
    ///
    /// Returns a grammar error naming the first type without one.
    pub fn check_complete(&self) -> Result<()> {
        match self
            .schema
            .concrete_types()
            .find(|t| !self.by_type.contains_key(t.name()))
        {
            Some(missing) => Err(Error::grammar(format!(
                "Format \"{}\" has no template for \"{}\".",
                self.name,
                missing.name()
            ))),
            None => Ok(()),
        }
    }

    /// Returns the format name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the template of the named type.
    #[must_use]
    pub fn template(&self, type_name: &str) -> Option<&Template> {
        self.by_type.get(type_name).map(|&i| &self.templates[i])
    }

    /// Iterates over templates in the order they were added.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Formats one observation.
    ///
    /// # Errors
    ///
    /// Returns an error if the observation's type has no template here.
    pub fn format_observation(&self, observation: &Observation) -> Result<String> {
        self.template(observation.type_name())
            .map(|t| t.format(observation))
            .ok_or_else(|| {
                Error::new(ErrorKind::Serialization(format!(
                    "Format \"{}\" cannot write {} observations.",
                    self.name,
                    observation.type_name()
                )))
            })
    }

    /// Parses one line, choosing the template by keyword.
    ///
    /// # Errors
    ///
    /// Returns a document format error carrying `line_num` if no template
    /// matches or the line does not fit the matching template.
    pub fn parse_observation(&self, line: &str, line_num: usize) -> Result<Observation> {
        let tokens = tokenize(line).map_err(|e| Error::document_format(line_num, e.message()))?;

        let template = self
            .keyword_positions
            .iter()
            .filter_map(|&position| {
                let token = tokens.get(position)?;
                self.by_keyword.get(&(position, token.text.clone()))
            })
            .map(|&i| &self.templates[i])
            .next()
            .ok_or_else(|| {
                Error::document_format(line_num, "Unrecognized observation line.")
            })?;

        let values = template.parse_tokens(&tokens, line_num)?;
        template.construct(values, line_num)
    }

    /// Formats observations, one line each.
    ///
    /// # Errors
    ///
    /// Returns an error if an observation's type has no template.
    pub fn format_document<'a>(
        &self,
        observations: impl IntoIterator<Item = &'a Observation>,
    ) -> Result<String> {
        let mut text = String::new();
        for observation in observations {
            text.push_str(&self.format_observation(observation)?);
            text.push('\n');
        }
        Ok(text)
    }

    /// Parses a document, one observation per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. `first_line_num`
    /// is the line number of the first line of `text` within its file.
    ///
    /// # Errors
    ///
    /// Returns the first document format error.
    pub fn parse_document(&self, text: &str, first_line_num: usize) -> Result<Vec<Observation>> {
        let mut observations = Vec::new();
        for (offset, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            observations.push(self.parse_observation(line, first_line_num + offset)?);
        }
        debug!(format = %self.name, count = observations.len(), "parsed document");
        Ok(observations)
    }
}

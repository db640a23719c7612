//! Stored query templates.
//!
//! A template is parsed once into literal segments and substitution slots.
//! Binding it to a [`TemplateFlavor`] assigns every slot a [`Placeholder`]
//! kind and validates the slot count, so rendering itself cannot fail on
//! arity.

use crate::constants::template::{CHART_GROUP, HISTORY_GROUP, PLACEHOLDER};
use crate::error::{Error, Result};
use crate::query::bucket::{TimeBucket, TimeRange};

/// Value a substitution slot is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Bucket,
    From,
    To,
}

/// Which substitution rule applies to a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFlavor {
    /// Direct chart query: two slots (from, to) or none.
    Chart,
    /// History query: repeated (bucket, from, to) groups.
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot,
}

/// A template split into literal text and `%s` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    segments: Vec<Segment>,
    slots: usize,
}

impl QueryTemplate {
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut slots = 0;
        let mut rest = template;

        while let Some(pos) = rest.find(PLACEHOLDER) {
            if pos > 0 {
                segments.push(Segment::Literal(rest[..pos].to_owned()));
            }
            segments.push(Segment::Slot);
            slots += 1;
            rest = &rest[pos + PLACEHOLDER.len()..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Self { segments, slots }
    }

    /// Number of `%s` slots in the template.
    pub fn placeholder_count(&self) -> usize {
        self.slots
    }

    /// Assign placeholder kinds according to `flavor`.
    ///
    /// History templates must have a multiple of three slots. Chart templates
    /// are only substituted when they have exactly two slots; any other count
    /// leaves the text untouched.
    pub fn bind(&self, flavor: TemplateFlavor) -> Result<BoundTemplate> {
        match flavor {
            TemplateFlavor::History => {
                if self.slots % HISTORY_GROUP != 0 {
                    return Err(Error::MalformedTemplate {
                        placeholders: self.slots,
                        group: HISTORY_GROUP,
                    });
                }
                const CYCLE: [Placeholder; HISTORY_GROUP] =
                    [Placeholder::Bucket, Placeholder::From, Placeholder::To];
                Ok(self.assign(|i| CYCLE[i % HISTORY_GROUP]))
            }
            TemplateFlavor::Chart if self.slots == CHART_GROUP => {
                const PAIR: [Placeholder; CHART_GROUP] = [Placeholder::From, Placeholder::To];
                Ok(self.assign(|i| PAIR[i]))
            }
            TemplateFlavor::Chart => Ok(BoundTemplate {
                parts: vec![Part::Literal(self.verbatim())],
            }),
        }
    }

    fn assign(&self, kind: impl Fn(usize) -> Placeholder) -> BoundTemplate {
        let mut index = 0;
        let parts = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Part::Literal(text.clone()),
                Segment::Slot => {
                    let part = Part::Value(kind(index));
                    index += 1;
                    part
                }
            })
            .collect();
        BoundTemplate { parts }
    }

    fn verbatim(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Slot => PLACEHOLDER,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Value(Placeholder),
}

/// A template whose slots have been assigned placeholder kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundTemplate {
    parts: Vec<Part>,
}

impl BoundTemplate {
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.parts.iter().filter_map(|part| match part {
            Part::Value(kind) => Some(*kind),
            Part::Literal(_) => None,
        })
    }

    /// Whether the final query depends on the time range at all.
    pub fn uses_time_range(&self) -> bool {
        self.placeholders().next().is_some()
    }

    /// Produce the final query text.
    pub fn render(&self, bucket: Option<TimeBucket>, from: &str, to: &str) -> Result<String> {
        let mut sql = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => sql.push_str(text),
                Part::Value(Placeholder::From) => sql.push_str(from),
                Part::Value(Placeholder::To) => sql.push_str(to),
                Part::Value(Placeholder::Bucket) => match bucket {
                    Some(bucket) => sql.push_str(bucket.as_str()),
                    None => {
                        return Err(Error::InvalidRequest(
                            "history template rendered without a time bucket".to_owned(),
                        ))
                    }
                },
            }
        }
        Ok(sql)
    }

    pub fn render_range(&self, bucket: Option<TimeBucket>, range: &TimeRange) -> Result<String> {
        self.render(bucket, range.raw_from(), range.raw_to())
    }
}

/// Expand `template` in one step.
///
/// With a bucket the history rule applies (repeated bucket/from/to groups);
/// without one the chart rule applies (exactly two from/to slots, otherwise
/// verbatim).
pub fn expand(template: &str, bucket: Option<TimeBucket>, from: &str, to: &str) -> Result<String> {
    let flavor = match bucket {
        Some(_) => TemplateFlavor::History,
        None => TemplateFlavor::Chart,
    };
    QueryTemplate::parse(template).bind(flavor)?.render(bucket, from, to)
}

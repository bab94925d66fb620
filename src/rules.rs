//! Rename rule configuration.
//!
//! [`RuleFields`] is the flat, raw form every caller fills in (the CLI parses it
//! straight from flags). [`RuleSet::from_fields`] validates it once and turns
//! each group of fields into an `Option` of a concrete rule: `None` when every
//! field of that group still holds its default, `Some` otherwise. The engine
//! only ever looks at the `Option`s.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::is_separator;

/// Case conversion modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// `ALL UPPER`
    Upper,
    /// `all lower`
    Lower,
    /// `Every Word Capitalized`
    Title,
    /// `First character capitalized`
    Sentence,
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaseMode::Upper => "upper",
            CaseMode::Lower => "lower",
            CaseMode::Title => "title",
            CaseMode::Sentence => "sentence",
        };
        f.write_str(name)
    }
}

/// Which side of the crop text survives a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CropSide {
    /// Keep everything up to and including the crop text.
    #[default]
    Before,
    /// Keep the crop text and everything after it.
    After,
}

impl fmt::Display for CropSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropSide::Before => f.write_str("before"),
            CropSide::After => f.write_str("after"),
        }
    }
}

/// Raw rule fields, exactly as a UI or the command line supplies them.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFields {
    /// Replace the whole name with this text
    #[arg(long, default_value = "")]
    pub name: String,

    /// Text to search for
    #[arg(long, default_value = "")]
    pub search: String,

    /// Replacement for every match of --search (empty deletes matches)
    #[arg(long = "replace-with", default_value = "")]
    pub replacement: String,

    /// Case conversion
    #[arg(long, value_enum)]
    pub case: Option<CaseMode>,

    /// Text whose original casing survives case conversion
    #[arg(long, default_value = "")]
    pub case_exceptions: String,

    /// Text to prepend
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Text to insert at --insert-at
    #[arg(long, default_value = "")]
    pub insert: String,

    /// Character offset for --insert (0 disables insertion)
    #[arg(long = "insert-at", default_value_t = 0)]
    pub insert_position: usize,

    /// Text to append
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Remove this many leading characters
    #[arg(long, default_value_t = 0)]
    pub remove_first: usize,

    /// Remove this many trailing characters
    #[arg(long, default_value_t = 0)]
    pub remove_last: usize,

    /// Start of a 1-based, inclusive character range to remove
    #[arg(long, default_value_t = 0)]
    pub remove_from: usize,

    /// End of a 1-based, inclusive character range to remove
    #[arg(long, default_value_t = 0)]
    pub remove_to: usize,

    /// Every one of these characters is removed
    #[arg(long, default_value = "")]
    pub remove_chars: String,

    /// Whitespace-separated words, each removed wherever it occurs
    #[arg(long, default_value = "")]
    pub remove_words: String,

    /// Crop the name at the first occurrence of this text
    #[arg(long = "crop", default_value = "")]
    pub crop_text: String,

    /// Which side of the crop text to keep
    #[arg(long, value_enum, default_value_t = CropSide::Before)]
    pub crop_side: CropSide,

    /// Put the counter in front of the name
    #[arg(long)]
    pub number_prefix: bool,

    /// Put the counter at the end of the name
    #[arg(long)]
    pub number_suffix: bool,

    /// Put the counter at --number-at
    #[arg(long)]
    pub number_insert: bool,

    /// Character offset for --number-insert (0 disables insertion)
    #[arg(long = "number-at", default_value_t = 0)]
    pub number_position: usize,

    /// First counter value
    #[arg(long, default_value_t = 1)]
    pub number_start: u64,

    /// Counter increment per file
    #[arg(long = "number-step", default_value_t = 1)]
    pub number_increment: u64,

    /// Minimum number of digits, zero-padded
    #[arg(long, default_value_t = 0)]
    pub number_pad: usize,

    /// Text between the counter and the name
    #[arg(long = "number-sep", default_value = "")]
    pub number_separator: String,
}

impl Default for RuleFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            search: String::new(),
            replacement: String::new(),
            case: None,
            case_exceptions: String::new(),
            prefix: String::new(),
            insert: String::new(),
            insert_position: 0,
            suffix: String::new(),
            remove_first: 0,
            remove_last: 0,
            remove_from: 0,
            remove_to: 0,
            remove_chars: String::new(),
            remove_words: String::new(),
            crop_text: String::new(),
            crop_side: CropSide::Before,
            number_prefix: false,
            number_suffix: false,
            number_insert: false,
            number_position: 0,
            number_start: 1,
            number_increment: 1,
            number_pad: 0,
            number_separator: String::new(),
        }
    }
}

/// Replaces the whole stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRule {
    pub name: String,
}

/// Replaces every non-overlapping occurrence of `search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceRule {
    pub search: String,
    pub replacement: String,
}

/// Folds the case of the stem, keeping `exceptions` verbatim where it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRule {
    pub mode: CaseMode,
    pub exceptions: Option<String>,
}

/// Text spliced in at a character offset (always greater than zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub text: String,
    pub position: usize,
}

/// Prefix, insertion and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRule {
    pub prefix: String,
    pub insert: Option<Insertion>,
    pub suffix: String,
}

/// A 1-based, inclusive character range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRange {
    pub from: usize,
    pub to: usize,
}

/// Keep one side of the first occurrence of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crop {
    pub text: String,
    pub side: CropSide,
}

/// Character, word and range removal, applied in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRule {
    pub first_n: usize,
    pub last_n: usize,
    pub range: Option<CharRange>,
    pub chars: Vec<char>,
    pub words: Vec<String>,
    pub crop: Option<Crop>,
}

/// Widest zero-padding accepted for the auto-number counter.
pub const MAX_NUMBER_PAD: usize = 64;

/// Batch-wide counter spliced into every name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoNumberRule {
    pub prefix: bool,
    pub suffix: bool,
    /// Insert offset, present only when insertion is enabled with a non-zero offset.
    pub insert_at: Option<usize>,
    pub start: u64,
    pub increment: u64,
    pub pad: usize,
    pub separator: String,
}

impl AutoNumberRule {
    /// Formats a counter value, zero-padded to `pad` digits. Wider values are kept whole.
    pub fn format(&self, counter: u64) -> String {
        format!("{:0width$}", counter, width = self.pad)
    }
}

/// Errors raised while validating rule fields. Every variant is a
/// self-contradictory configuration and rejects the whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The removal range ends before it starts.
    RangeEndBeforeStart { from: usize, to: usize },
    /// The removal range has an end but starts at 0; positions are 1-based.
    RangeStartsAtZero { to: usize },
    /// Auto-numbering is enabled with an increment of 0.
    ZeroIncrement,
    /// A literal that becomes part of a file name contains a path separator.
    PathSeparator { field: &'static str, value: String },
    /// The zero-padding width exceeds [`MAX_NUMBER_PAD`].
    PadTooWide { pad: usize },
    /// The counter would pass `u64::MAX` before the last entry of the batch.
    CounterOverflow {
        start: u64,
        increment: u64,
        count: usize,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::RangeEndBeforeStart { from, to } => write!(
                f,
                "Invalid rule: removal range ends at {} before it starts at {}",
                to, from
            ),
            RuleError::RangeStartsAtZero { to } => write!(
                f,
                "Invalid rule: removal range up to {} must start at position 1 or later",
                to
            ),
            RuleError::ZeroIncrement => {
                write!(f, "Invalid rule: auto-number increment must be at least 1")
            }
            RuleError::PathSeparator { field, value } => write!(
                f,
                "Invalid rule: {} '{}' contains a path separator",
                field, value
            ),
            RuleError::PadTooWide { pad } => write!(
                f,
                "Invalid rule: auto-number padding of {} digits exceeds the maximum of {}",
                pad, MAX_NUMBER_PAD
            ),
            RuleError::CounterOverflow {
                start,
                increment,
                count,
            } => write!(
                f,
                "Invalid rule: counting {} entries from {} in steps of {} overflows the counter",
                count, start, increment
            ),
        }
    }
}

impl std::error::Error for RuleError {}

/// A validated rule configuration. Sub-rules run in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub name: Option<NameRule>,
    pub replace: Option<ReplaceRule>,
    pub case: Option<CaseRule>,
    pub add: Option<AddRule>,
    pub remove: Option<RemoveRule>,
    pub auto_number: Option<AutoNumberRule>,
}

impl RuleSet {
    /// Validates raw fields and builds the rule set.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if the fields contradict each other or would
    /// produce a name containing a path separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use bulk_rename::rules::{RuleFields, RuleSet};
    ///
    /// let fields = RuleFields {
    ///     search: "IMG_".to_string(),
    ///     ..Default::default()
    /// };
    /// let rules = RuleSet::from_fields(&fields).unwrap();
    /// assert!(rules.replace.is_some());
    /// assert!(rules.case.is_none());
    /// ```
    pub fn from_fields(fields: &RuleFields) -> Result<Self, RuleError> {
        check_separator("name", &fields.name)?;
        check_separator("replacement", &fields.replacement)?;
        check_separator("prefix", &fields.prefix)?;
        check_separator("insert", &fields.insert)?;
        check_separator("suffix", &fields.suffix)?;
        check_separator("number separator", &fields.number_separator)?;

        let rules = Self {
            name: name_rule(fields),
            replace: replace_rule(fields),
            case: case_rule(fields),
            add: add_rule(fields),
            remove: remove_rule(fields)?,
            auto_number: auto_number_rule(fields)?,
        };
        tracing::debug!(enabled = ?rules.enabled_rules(), "built rule set");
        Ok(rules)
    }

    /// Names of the enabled sub-rules, in application order.
    pub fn enabled_rules(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("replace", self.replace.is_some()),
            ("case", self.case.is_some()),
            ("add", self.add.is_some()),
            ("remove", self.remove.is_some()),
            ("auto-number", self.auto_number.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }

    /// True when no sub-rule is enabled.
    pub fn is_empty(&self) -> bool {
        self.enabled_rules().is_empty()
    }

    /// Counter value for the first entry of a batch.
    pub fn counter_start(&self) -> u64 {
        self.auto_number.as_ref().map_or(0, |rule| rule.start)
    }

    /// Checks that numbering `count` entries keeps every counter value in range.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::CounterOverflow`] if the value for the last entry
    /// does not fit in a `u64`.
    pub fn check_counter_range(&self, count: usize) -> Result<(), RuleError> {
        let Some(rule) = &self.auto_number else {
            return Ok(());
        };
        let steps = count.saturating_sub(1) as u64;
        rule.increment
            .checked_mul(steps)
            .and_then(|span| rule.start.checked_add(span))
            .map(|_| ())
            .ok_or(RuleError::CounterOverflow {
                start: rule.start,
                increment: rule.increment,
                count,
            })
    }
}

fn check_separator(field: &'static str, value: &str) -> Result<(), RuleError> {
    if value.chars().any(is_separator) {
        return Err(RuleError::PathSeparator {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn name_rule(fields: &RuleFields) -> Option<NameRule> {
    (!fields.name.is_empty()).then(|| NameRule {
        name: fields.name.clone(),
    })
}

fn replace_rule(fields: &RuleFields) -> Option<ReplaceRule> {
    if fields.search.is_empty() {
        if !fields.replacement.is_empty() {
            tracing::debug!("replacement given without search text, ignoring");
        }
        return None;
    }
    Some(ReplaceRule {
        search: fields.search.clone(),
        replacement: fields.replacement.clone(),
    })
}

fn case_rule(fields: &RuleFields) -> Option<CaseRule> {
    fields.case.map(|mode| CaseRule {
        mode,
        exceptions: (!fields.case_exceptions.is_empty()).then(|| fields.case_exceptions.clone()),
    })
}

fn add_rule(fields: &RuleFields) -> Option<AddRule> {
    let insert = (!fields.insert.is_empty() && fields.insert_position > 0).then(|| Insertion {
        text: fields.insert.clone(),
        position: fields.insert_position,
    });

    if fields.prefix.is_empty() && fields.suffix.is_empty() && insert.is_none() {
        return None;
    }

    Some(AddRule {
        prefix: fields.prefix.clone(),
        insert,
        suffix: fields.suffix.clone(),
    })
}

fn remove_rule(fields: &RuleFields) -> Result<Option<RemoveRule>, RuleError> {
    let range = match (fields.remove_from, fields.remove_to) {
        (0, 0) => None,
        (0, to) => return Err(RuleError::RangeStartsAtZero { to }),
        (from, to) if to < from => return Err(RuleError::RangeEndBeforeStart { from, to }),
        (from, to) => Some(CharRange { from, to }),
    };

    let crop = (!fields.crop_text.is_empty()).then(|| Crop {
        text: fields.crop_text.clone(),
        side: fields.crop_side,
    });

    let rule = RemoveRule {
        first_n: fields.remove_first,
        last_n: fields.remove_last,
        range,
        chars: fields.remove_chars.chars().collect(),
        words: fields
            .remove_words
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        crop,
    };

    let is_noop = rule.first_n == 0
        && rule.last_n == 0
        && rule.range.is_none()
        && rule.chars.is_empty()
        && rule.words.is_empty()
        && rule.crop.is_none();

    Ok((!is_noop).then_some(rule))
}

fn auto_number_rule(fields: &RuleFields) -> Result<Option<AutoNumberRule>, RuleError> {
    let insert_at = (fields.number_insert && fields.number_position > 0).then_some(fields.number_position);

    if !fields.number_prefix && !fields.number_suffix && !fields.number_insert {
        return Ok(None);
    }
    if fields.number_increment == 0 {
        return Err(RuleError::ZeroIncrement);
    }
    if fields.number_pad > MAX_NUMBER_PAD {
        return Err(RuleError::PadTooWide {
            pad: fields.number_pad,
        });
    }

    Ok(Some(AutoNumberRule {
        prefix: fields.number_prefix,
        suffix: fields.number_suffix,
        insert_at,
        start: fields.number_start,
        increment: fields.number_increment,
        pad: fields.number_pad,
        separator: fields.number_separator.clone(),
    }))
}

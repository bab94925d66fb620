//! Rule evaluation.
//!
//! [`compute_renames`] turns a batch of entries and a [`RuleSet`] into a
//! [`RenamePlan`] without touching the disk. Sub-rules run in a fixed order:
//! name, replace, case, add, remove, auto-number. The auto-number counter is
//! threaded through the batch as an accumulator: [`rename_stem`] returns the
//! counter for the next entry, and every call to [`compute_renames`] starts
//! again from the configured start value.

use crate::entry::FileEntry;
use crate::rules::{
    AddRule, AutoNumberRule, CaseMode, CaseRule, CropSide, RemoveRule, ReplaceRule, RuleError,
    RuleSet,
};
use serde::Serialize;

/// The proposed new name of one batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRename {
    /// Full original file name (stem and extension).
    pub original_name: String,
    /// Original stem.
    pub original_stem: String,
    /// Extension, carried over unchanged.
    pub extension: String,
    /// Proposed stem.
    pub new_stem: String,
    pub is_directory: bool,
}

impl PlannedRename {
    /// Proposed full file name: new stem followed by the original extension.
    pub fn new_name(&self) -> String {
        format!("{}{}", self.new_stem, self.extension)
    }

    /// True when the rules left the stem as it was.
    pub fn is_unchanged(&self) -> bool {
        self.new_stem == self.original_stem
    }
}

/// Ordered result of a preview: one planned rename per selected entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    renames: Vec<PlannedRename>,
}

impl RenamePlan {
    /// Planned renames in batch order.
    pub fn renames(&self) -> &[PlannedRename] {
        &self.renames
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Number of entries whose stem would change.
    pub fn changed_count(&self) -> usize {
        self.renames.iter().filter(|r| !r.is_unchanged()).count()
    }

    /// Looks up the plan for an original file name (stem and extension).
    pub fn get(&self, original_name: &str) -> Option<&PlannedRename> {
        self.renames.iter().find(|r| r.original_name == original_name)
    }

    /// Original stem to proposed stem, in batch order.
    pub fn stem_mapping(&self) -> Vec<(&str, &str)> {
        self.renames
            .iter()
            .map(|r| (r.original_stem.as_str(), r.new_stem.as_str()))
            .collect()
    }
}

/// Computes the proposed names for every selected entry of `batch`.
///
/// Unselected entries are skipped and do not advance the auto-number counter.
///
/// # Errors
///
/// Returns [`RuleError::CounterOverflow`] if the auto-number counter would
/// run past `u64::MAX` within the selected entries.
///
/// # Examples
///
/// ```
/// use bulk_rename::engine::compute_renames;
/// use bulk_rename::entry::FileEntry;
/// use bulk_rename::rules::{RuleFields, RuleSet};
///
/// let fields = RuleFields {
///     search: "IMG_".to_string(),
///     ..Default::default()
/// };
/// let rules = RuleSet::from_fields(&fields).unwrap();
/// let plan = compute_renames(&[FileEntry::new("IMG_0001.jpg")], &rules).unwrap();
/// assert_eq!(plan.renames()[0].new_name(), "0001.jpg");
/// ```
pub fn compute_renames(batch: &[FileEntry], rules: &RuleSet) -> Result<RenamePlan, RuleError> {
    rules.check_counter_range(batch.iter().filter(|entry| entry.selected).count())?;

    let (renames, _) = batch.iter().filter(|entry| entry.selected).fold(
        (Vec::new(), rules.counter_start()),
        |(mut renames, counter), entry| {
            let (new_stem, next) = rename_stem(&entry.stem, rules, counter);
            tracing::debug!(from = %entry.stem, to = %new_stem, counter, "planned rename");
            renames.push(PlannedRename {
                original_name: entry.file_name(),
                original_stem: entry.stem.clone(),
                extension: entry.extension.clone(),
                new_stem,
                is_directory: entry.is_directory,
            });
            (renames, next)
        },
    );
    Ok(RenamePlan { renames })
}

/// Applies every enabled sub-rule to one stem.
///
/// Returns the new stem and the counter value for the next entry of the batch.
/// The next value saturates at `u64::MAX`; [`compute_renames`] rejects batches
/// that would need a value past it.
pub fn rename_stem(stem: &str, rules: &RuleSet, counter: u64) -> (String, u64) {
    let mut new_stem = match &rules.name {
        Some(rule) => rule.name.clone(),
        None => stem.to_string(),
    };

    if let Some(rule) = &rules.replace {
        new_stem = apply_replace(&new_stem, rule);
    }
    if let Some(rule) = &rules.case {
        new_stem = apply_case(&new_stem, rule);
    }
    if let Some(rule) = &rules.add {
        new_stem = apply_add(&new_stem, rule);
    }
    if let Some(rule) = &rules.remove {
        new_stem = apply_remove(&new_stem, rule);
    }

    match &rules.auto_number {
        Some(rule) => (
            apply_auto_number(&new_stem, rule, counter),
            counter.saturating_add(rule.increment),
        ),
        None => (new_stem, counter),
    }
}

fn apply_replace(stem: &str, rule: &ReplaceRule) -> String {
    stem.replace(&rule.search, &rule.replacement)
}

fn apply_case(stem: &str, rule: &CaseRule) -> String {
    let folded = match rule.mode {
        CaseMode::Upper => stem.to_uppercase(),
        CaseMode::Lower => stem.to_lowercase(),
        CaseMode::Title => title_case(stem),
        CaseMode::Sentence => sentence_case(stem),
    };

    match &rule.exceptions {
        Some(exceptions) => restore_exceptions(stem, &folded, exceptions),
        None => folded,
    }
}

/// Writes `exceptions` back into `folded` at every character offset where it
/// matched `original`.
///
/// Offsets are taken from the pre-fold string, so this is only exact when
/// folding keeps the character count. Spans that no longer fit are skipped.
fn restore_exceptions(original: &str, folded: &str, exceptions: &str) -> String {
    let replacement: Vec<char> = exceptions.chars().collect();
    let mut chars: Vec<char> = folded.chars().collect();

    for (byte_idx, _) in original.match_indices(exceptions) {
        let start = original[..byte_idx].chars().count();
        let end = start + replacement.len();
        if end <= chars.len() {
            chars[start..end].copy_from_slice(&replacement);
        }
    }
    chars.into_iter().collect()
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(stem: &str) -> String {
    let mut result = String::with_capacity(stem.len());
    let mut in_word = false;
    for c in stem.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }
    result
}

/// Upper-cases the first character, lower-cases the rest.
fn sentence_case(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn apply_add(stem: &str, rule: &AddRule) -> String {
    let mut result = format!("{}{}", rule.prefix, stem);
    if let Some(insert) = &rule.insert {
        result = splice(&result, insert.position, &insert.text);
    }
    result.push_str(&rule.suffix);
    result
}

fn apply_remove(stem: &str, rule: &RemoveRule) -> String {
    let mut chars: Vec<char> = stem.chars().skip(rule.first_n).collect();
    chars.truncate(chars.len().saturating_sub(rule.last_n));

    if let Some(range) = rule.range {
        let start = (range.from - 1).min(chars.len());
        let end = range.to.min(chars.len());
        chars.drain(start..end);
    }

    chars.retain(|c| !rule.chars.contains(c));

    let mut result: String = chars.into_iter().collect();
    for word in &rule.words {
        result = result.replace(word.as_str(), "");
    }

    if let Some(crop) = &rule.crop
        && let Some(idx) = result.find(&crop.text)
    {
        result = match crop.side {
            CropSide::Before => result[..idx + crop.text.len()].to_string(),
            CropSide::After => result[idx..].to_string(),
        };
    }

    result
}

fn apply_auto_number(stem: &str, rule: &AutoNumberRule, counter: u64) -> String {
    let number = rule.format(counter);
    let mut result = stem.to_string();

    if let Some(position) = rule.insert_at {
        result = splice(&result, position, &format!("{}{}", rule.separator, number));
    }
    if rule.prefix {
        result = format!("{}{}{}", number, rule.separator, result);
    }
    if rule.suffix {
        result = format!("{}{}{}", result, rule.separator, number);
    }
    result
}

/// Inserts `text` after the first `position` characters of `s`, or at the end
/// if `s` is shorter.
fn splice(s: &str, position: usize, text: &str) -> String {
    let byte_idx = s
        .char_indices()
        .nth(position)
        .map_or(s.len(), |(idx, _)| idx);
    let mut result = String::with_capacity(s.len() + text.len());
    result.push_str(&s[..byte_idx]);
    result.push_str(text);
    result.push_str(&s[byte_idx..]);
    result
}

//! Parsers for the KEGG REST flat-file formats.

use crate::domain::model::KeggListEntry;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const NAME_KEYWORD: &str = "NAME";

/// Text of a `NAME` field, or `None` when the line does not start one.
fn name_field(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(NAME_KEYWORD)?;
    // 關鍵字必須是完整的 token，`NAMEX` 不算
    if rest.is_empty() || rest.starts_with([' ', '\t']) {
        Some(rest)
    } else {
        None
    }
}

/// Indented lines continue the field on the line above.
fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

fn split_names(field: &str) -> BTreeSet<String> {
    field
        .split(';')
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Parse all names from a KEGG reaction description in flat-file format.
///
/// A `NAME` field may wrap over indented continuation lines; those are joined
/// before the field is split on `;`. Returns `Ok(None)` when the block has no
/// `NAME` field and an error when it has more than one.
pub fn parse_reaction_names(block: &str) -> Result<Option<BTreeSet<String>>> {
    let mut found: Option<BTreeSet<String>> = None;
    let mut lines = block.lines().map(|line| line.trim_end_matches('\r')).peekable();

    while let Some(line) = lines.next() {
        let Some(first) = name_field(line) else {
            continue;
        };
        let mut field = first.to_string();
        while let Some(next) = lines.next_if(|next| is_continuation(next)) {
            field.push(' ');
            field.push_str(next);
        }

        let names = split_names(&field);
        if names.is_empty() {
            continue;
        }
        if found.is_some() {
            return Err(EtlError::Parse {
                message: format!("more than one NAME line in block:\n{}", block),
            });
        }
        found = Some(names);
    }

    Ok(found)
}

/// Parse a KEGG `list/<database>` body (`<id>\t<description>` per line).
pub fn parse_list(text: &str) -> Result<Vec<KeggListEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(raw_id) = record.get(0).map(str::trim).filter(|id| !id.is_empty()) else {
            continue;
        };
        // 舊版 API 會帶 `rn:` / `cpd:` 之類的前綴
        let identifier = raw_id
            .split_once(':')
            .map_or(raw_id, |(_, id)| id)
            .to_string();
        entries.push(KeggListEntry {
            identifier,
            description: record.get(1).unwrap_or_default().trim().to_string(),
        });
    }

    Ok(entries)
}

fn release_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Release\s+(\S+?),?(\s|$)").expect("valid regex"))
}

/// Release string from the `info/kegg` body, e.g. `106.0+/05-18`.
pub fn parse_release(info: &str) -> Option<String> {
    release_pattern()
        .captures(info)
        .and_then(|caps| caps.get(1))
        .map(|release| release.as_str().to_string())
}

//! Minimal reader for MDL MOL (V2000) connection tables.
//!
//! Only what the ETL jobs need: rejecting malformed blocks before they are
//! handed to a toolkit, and the formal charge of the molecule.

use crate::utils::error::{EtlError, Result};

const HEADER_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MolAtom {
    pub symbol: String,
    pub charge: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MolBlock {
    pub title: String,
    pub atoms: Vec<MolAtom>,
    pub bond_count: usize,
}

fn invalid(message: impl Into<String>) -> EtlError {
    EtlError::Molfile {
        message: message.into(),
    }
}

fn fixed_width_usize(line: &str, start: usize, end: usize, what: &str) -> Result<usize> {
    line.get(start..end.min(line.len()))
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| invalid(format!("missing {}", what)))?
        .parse()
        .map_err(|_| invalid(format!("{} is not a number", what)))
}

/// Atom-block charge codes: 1=+3, 2=+2, 3=+1, 4=doublet radical, 5=-1, 6=-2, 7=-3.
fn charge_from_code(code: i64) -> i64 {
    match code {
        1..=3 | 5..=7 => 4 - code,
        _ => 0,
    }
}

impl MolBlock {
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        let counts = lines
            .get(HEADER_LINES)
            .ok_or_else(|| invalid("no counts line"))?;

        if counts.contains("V3000") {
            return Err(invalid("V3000 connection tables are not supported"));
        }
        let atom_count = fixed_width_usize(counts, 0, 3, "atom count")?;
        let bond_count = fixed_width_usize(counts, 3, 6, "bond count")?;

        let atom_start = HEADER_LINES + 1;
        let bond_start = atom_start + atom_count;
        let property_start = bond_start + bond_count;
        if lines.len() < property_start {
            return Err(invalid(format!(
                "expected {} atoms and {} bonds but the block has only {} lines",
                atom_count,
                bond_count,
                lines.len()
            )));
        }

        let mut atoms = Vec::with_capacity(atom_count);
        for line in &lines[atom_start..bond_start] {
            let symbol = line
                .get(31..34)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| invalid(format!("atom line without symbol: {:?}", line)))?;
            let code = line
                .get(36..39)
                .and_then(|c| c.trim().parse::<i64>().ok())
                .unwrap_or(0);
            atoms.push(MolAtom {
                symbol: symbol.to_string(),
                charge: charge_from_code(code),
            });
        }

        let mut saw_end = false;
        let mut property_charges: Option<Vec<(usize, i64)>> = None;
        for line in &lines[property_start..] {
            if line.starts_with("M  END") {
                saw_end = true;
                break;
            }
            if let Some(rest) = line.strip_prefix("M  CHG") {
                let fields: Vec<&str> = rest.split_whitespace().collect();
                let pairs = property_charges.get_or_insert_with(Vec::new);
                // 第一個欄位是後面 (atom, charge) 組的數量
                for pair in fields.get(1..).unwrap_or_default().chunks(2) {
                    let [atom, charge] = pair else {
                        return Err(invalid(format!("dangling charge entry: {:?}", line)));
                    };
                    let atom: usize = atom
                        .parse()
                        .map_err(|_| invalid(format!("bad atom index in {:?}", line)))?;
                    let charge: i64 = charge
                        .parse()
                        .map_err(|_| invalid(format!("bad charge in {:?}", line)))?;
                    pairs.push((atom, charge));
                }
            }
        }
        if !saw_end {
            return Err(invalid("missing 'M  END'"));
        }

        // `M  CHG` 出現時會覆蓋 atom block 裡的電荷
        if let Some(pairs) = property_charges {
            for atom in atoms.iter_mut() {
                atom.charge = 0;
            }
            for (index, charge) in pairs {
                let atom = index
                    .checked_sub(1)
                    .and_then(|i| atoms.get_mut(i))
                    .ok_or_else(|| invalid(format!("charge on unknown atom {}", index)))?;
                atom.charge = charge;
            }
        }

        Ok(Self {
            title: lines.first().map(|t| t.trim().to_string()).unwrap_or_default(),
            atoms,
            bond_count,
        })
    }

    pub fn formal_charge(&self) -> i64 {
        self.atoms.iter().map(|atom| atom.charge).sum()
    }
}

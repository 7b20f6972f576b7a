//! Hop/mod tables mapping `(symbol value, hop column)` to a pulse index.

use crate::error::{AudioModemError, Result};

/// How the mod table of a modulator is generated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Hopping {
    #[default]
    /// Column `h` owns the contiguous block of pulses `h*Q .. h*Q + Q`.
    Blocked,
    /// Symbol `s` owns pulses `s*H .. s*H + H`, visited in steps of `pattern`.
    Strided { pattern: usize },
    /// Explicit table, one row of `hop_factor` pulse indices per symbol value.
    Custom { rows: Vec<Vec<usize>> },
}

impl Hopping {
    pub fn build(&self, mod_order: usize, hop_factor: usize) -> Result<ModTable> {
        match self {
            Hopping::Blocked => ModTable::blocked(mod_order, hop_factor),
            Hopping::Strided { pattern } => ModTable::strided(mod_order, hop_factor, *pattern),
            Hopping::Custom { rows } => {
                let table = ModTable::from_rows(rows.clone(), mod_order * hop_factor)?;
                if table.mod_order() != mod_order || table.hop_factor() != hop_factor {
                    return Err(AudioModemError::InvalidConfig(format!(
                        "custom mod table is {}x{}, expected {}x{}",
                        table.mod_order(),
                        table.hop_factor(),
                        mod_order,
                        hop_factor
                    )));
                }
                Ok(table)
            }
        }
    }
}

/// To send symbol `s` at symbol index `t`, transmit pulse `table[s][t % hop_factor]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModTable {
    hop_factor: usize,
    rows: Vec<Vec<usize>>,
}

impl ModTable {
    pub fn blocked(mod_order: usize, hop_factor: usize) -> Result<Self> {
        check_shape(mod_order, hop_factor)?;
        let rows = (0..mod_order)
            .map(|s| (0..hop_factor).map(|h| h * mod_order + s).collect())
            .collect();
        Ok(Self { hop_factor, rows })
    }

    /// `table[s][h] = s*H + (pattern*h mod H)`.
    ///
    /// `pattern` must be coprime with `hop_factor` so that each symbol's hop
    /// sequence visits all of its `hop_factor` pulses once per period.
    pub fn strided(mod_order: usize, hop_factor: usize, pattern: usize) -> Result<Self> {
        check_shape(mod_order, hop_factor)?;
        if gcd(pattern, hop_factor) != 1 {
            return Err(AudioModemError::InvalidConfig(format!(
                "hop pattern {} is not coprime with hop factor {}",
                pattern, hop_factor
            )));
        }
        let rows = (0..mod_order)
            .map(|s| {
                (0..hop_factor)
                    .map(|h| s * hop_factor + (pattern * h) % hop_factor)
                    .collect()
            })
            .collect();
        Ok(Self { hop_factor, rows })
    }

    pub fn from_rows(rows: Vec<Vec<usize>>, pulse_count: usize) -> Result<Self> {
        let hop_factor = rows.first().map(Vec::len).unwrap_or(0);
        check_shape(rows.len(), hop_factor)?;
        if rows.len() * hop_factor != pulse_count {
            return Err(AudioModemError::InvalidConfig(format!(
                "mod table is {}x{} but the pulse bank holds {} pulses",
                rows.len(),
                hop_factor,
                pulse_count
            )));
        }
        for (s, row) in rows.iter().enumerate() {
            if row.len() != hop_factor {
                return Err(AudioModemError::InvalidConfig(format!(
                    "mod table row {} has {} entries, expected {}",
                    s,
                    row.len(),
                    hop_factor
                )));
            }
            if let Some(&bad) = row.iter().find(|&&p| p >= pulse_count) {
                return Err(AudioModemError::InvalidConfig(format!(
                    "mod table row {} references pulse {} of {}",
                    s, bad, pulse_count
                )));
            }
        }
        Ok(Self { hop_factor, rows })
    }

    pub fn mod_order(&self) -> usize {
        self.rows.len()
    }

    pub fn hop_factor(&self) -> usize {
        self.hop_factor
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// Pulse index for `symbol` at symbol index `t`.
    pub fn pulse_index(&self, symbol: u32, t: usize) -> Result<usize> {
        let row = self
            .rows
            .get(symbol as usize)
            .ok_or(AudioModemError::SymbolOutOfRange {
                symbol,
                mod_order: self.rows.len() as u32,
            })?;
        Ok(row[t % self.hop_factor])
    }
}

fn check_shape(mod_order: usize, hop_factor: usize) -> Result<()> {
    if mod_order == 0 || hop_factor == 0 {
        return Err(AudioModemError::InvalidConfig(format!(
            "mod table needs a positive shape, got {}x{}",
            mod_order, hop_factor
        )));
    }
    Ok(())
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_blocked_layout() {
        let table = ModTable::blocked(2, 2).unwrap();
        assert_eq!(table.rows(), &[vec![0, 2], vec![1, 3]]);
        assert_eq!(table.pulse_index(1, 0).unwrap(), 1);
        assert_eq!(table.pulse_index(1, 1).unwrap(), 3);
        assert_eq!(table.pulse_index(0, 2).unwrap(), 0);
    }

    #[test]
    fn test_strided_visits_every_pulse_once_per_period() {
        let table = ModTable::strided(2, 63, 16).unwrap();
        for s in 0..2u32 {
            let visited: HashSet<usize> = (0..63).map(|t| table.pulse_index(s, t).unwrap()).collect();
            assert_eq!(visited.len(), 63);
            let base = s as usize * 63;
            assert!(visited.iter().all(|&p| (base..base + 63).contains(&p)));
            assert_eq!(table.pulse_index(s, 0).unwrap(), table.pulse_index(s, 63).unwrap());
        }
        assert_eq!(table.rows()[0][1], 16);
        assert_eq!(table.rows()[1][4], 63 + 1);
    }

    #[test]
    fn test_strided_rejects_non_coprime_pattern() {
        assert!(ModTable::strided(2, 16, 8).is_err());
        assert!(ModTable::strided(2, 16, 7).is_ok());
    }

    #[test]
    fn test_symbol_out_of_range() {
        let table = ModTable::blocked(4, 3).unwrap();
        assert_eq!(
            table.pulse_index(4, 0),
            Err(AudioModemError::SymbolOutOfRange {
                symbol: 4,
                mod_order: 4
            })
        );
    }

    #[test]
    fn test_custom_rows_validated() {
        let ok = ModTable::from_rows(vec![vec![1, 0], vec![3, 2]], 4).unwrap();
        assert_eq!(ok.pulse_index(0, 0).unwrap(), 1);

        assert!(ModTable::from_rows(vec![vec![0, 1], vec![2]], 4).is_err());
        assert!(ModTable::from_rows(vec![vec![0, 1], vec![2, 4]], 4).is_err());
        assert!(ModTable::from_rows(vec![vec![0, 1]], 4).is_err());
        assert!(ModTable::from_rows(Vec::new(), 0).is_err());
    }

    #[test]
    fn test_hopping_builds_tables() {
        let blocked = Hopping::Blocked.build(2, 2).unwrap();
        assert_eq!(blocked, ModTable::blocked(2, 2).unwrap());
        let strided = Hopping::Strided { pattern: 11 }.build(2, 32).unwrap();
        assert_eq!(strided.hop_factor(), 32);

        // Right pulse count, wrong shape
        let flat = Hopping::Custom {
            rows: vec![vec![0, 1, 2, 3]],
        };
        assert!(flat.build(2, 2).is_err());
    }
}

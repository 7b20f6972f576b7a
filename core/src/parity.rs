//! Quasi-cyclic irregular-repeat-accumulate (QC-IRA) parity-check structure.
//!
//! The parity-check matrix is `H = [Hu | Hp]`. `Hu` covers the information
//! columns and is assembled from Z×Z circulant permutations placed by a small
//! tap formula. `Hp` is dual-diagonal over the parity columns, which is what
//! makes linear-time systematic encoding possible.

use crate::error::{AudioModemError, Result};

/// Structural constants of a QC-IRA code family.
///
/// For block row `i` and tap `t`, the information block column is
/// `j = (i * tap_row_step + t * tap_step) mod (block_cols - block_rows)` and
/// the circulant shift is `(shift_row_coeff * i + shift_col_coeff * j + shift_offset) mod Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QcIraFamily {
    pub block_rows: usize,
    pub block_cols: usize,
    pub taps_per_row: usize,
    pub tap_row_step: usize,
    pub tap_step: usize,
    pub shift_row_coeff: usize,
    pub shift_col_coeff: usize,
    pub shift_offset: usize,
    /// One right-rotation amount per block row, applied during accumulation.
    pub rotations: &'static [usize],
}

impl QcIraFamily {
    /// Rate-1/2 family: 16 block rows, 32 block columns, row degree 6.
    pub const RATE_1_2: QcIraFamily = QcIraFamily {
        block_rows: 16,
        block_cols: 32,
        taps_per_row: 6,
        tap_row_step: 3,
        tap_step: 5,
        shift_row_coeff: 11,
        shift_col_coeff: 7,
        shift_offset: 3,
        rotations: &[1, 5, 9, 13, 3, 7, 11, 15, 2, 6, 10, 14, 4, 8, 12, 16],
    };

    /// Number of block columns holding information bits.
    pub fn info_block_cols(&self) -> usize {
        self.block_cols - self.block_rows
    }

    fn validate(&self) -> Result<()> {
        if self.block_rows == 0 || self.block_cols <= self.block_rows {
            return Err(AudioModemError::InvalidConfig(format!(
                "block columns ({}) must exceed block rows ({})",
                self.block_cols, self.block_rows
            )));
        }
        if self.rotations.len() != self.block_rows {
            return Err(AudioModemError::InvalidConfig(format!(
                "rotation schedule has {} entries, expected {}",
                self.rotations.len(),
                self.block_rows
            )));
        }
        if self.taps_per_row == 0 {
            return Err(AudioModemError::InvalidConfig(
                "code family needs at least one tap per block row".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for QcIraFamily {
    fn default() -> Self {
        Self::RATE_1_2
    }
}

/// A QC-IRA code instantiated for one circulant size.
///
/// Holds the information-part row structure (`Hu`). Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QcIraCode {
    family: QcIraFamily,
    z: usize,
    hu_rows: Vec<Vec<usize>>,
}

impl QcIraCode {
    pub fn new(family: QcIraFamily, circulant_size: usize) -> Result<Self> {
        family.validate()?;
        if circulant_size == 0 {
            return Err(AudioModemError::InvalidConfig(
                "circulant size must be positive".to_string(),
            ));
        }

        let hu_rows = build_hu(&family, circulant_size);
        let code = Self {
            family,
            z: circulant_size,
            hu_rows,
        };
        log::debug!(
            "Built QC-IRA parity structure: Z={}, N={}, K={}, M={}",
            code.z,
            code.codeword_len(),
            code.info_len(),
            code.check_count()
        );
        Ok(code)
    }

    pub fn family(&self) -> &QcIraFamily {
        &self.family
    }

    pub fn circulant_size(&self) -> usize {
        self.z
    }

    /// M: number of check rows, also the number of parity bits.
    pub fn check_count(&self) -> usize {
        self.family.block_rows * self.z
    }

    /// N: codeword length.
    pub fn codeword_len(&self) -> usize {
        self.family.block_cols * self.z
    }

    /// K: number of information bits.
    pub fn info_len(&self) -> usize {
        self.codeword_len() - self.check_count()
    }

    /// Information columns touched by each check row, sorted ascending.
    pub fn hu_rows(&self) -> &[Vec<usize>] {
        &self.hu_rows
    }

    /// Rows of the full matrix `[Hu | Hp]`, with parity columns offset by K.
    pub fn full_rows(&self) -> Vec<Vec<usize>> {
        let z = self.z;
        let k = self.info_len();
        let mut rows = self.hu_rows.clone();

        for (i, &rot) in self.family.rotations.iter().enumerate() {
            for zi in 0..z {
                let row = &mut rows[i * z + zi];
                row.push(k + i * z + (zi + rot) % z);
                if i > 0 {
                    row.push(k + (i - 1) * z + zi);
                }
                row.sort_unstable();
            }
        }
        rows
    }

    /// Evaluate `H · c` over GF(2). A valid codeword yields all zeros.
    pub fn syndrome(&self, codeword: &[u8]) -> Result<Vec<u8>> {
        if codeword.len() != self.codeword_len() {
            return Err(AudioModemError::InvalidInputSize {
                expected: self.codeword_len(),
                actual: codeword.len(),
            });
        }

        let syndrome = self
            .full_rows()
            .iter()
            .map(|cols| cols.iter().fold(0u8, |acc, &c| acc ^ (codeword[c] & 1)))
            .collect();
        Ok(syndrome)
    }

    pub fn is_codeword(&self, codeword: &[u8]) -> Result<bool> {
        Ok(self.syndrome(codeword)?.iter().all(|&s| s == 0))
    }
}

fn build_hu(family: &QcIraFamily, z: usize) -> Vec<Vec<usize>> {
    let info_bc = family.info_block_cols();
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); family.block_rows * z];

    for i in 0..family.block_rows {
        for t in 0..family.taps_per_row {
            let j = (i * family.tap_row_step + t * family.tap_step) % info_bc;
            let shift =
                (family.shift_row_coeff * i + family.shift_col_coeff * j + family.shift_offset) % z;
            for zi in 0..z {
                rows[i * z + zi].push(j * z + (zi + shift) % z);
            }
        }
    }

    for row in rows.iter_mut() {
        cancel_pairs(row);
    }
    rows
}

/// Sort a column list and drop entries that appear an even number of times.
fn cancel_pairs(row: &mut Vec<usize>) {
    row.sort_unstable();
    let mut kept = Vec::with_capacity(row.len());
    let mut idx = 0;
    while idx < row.len() {
        let col = row[idx];
        let run = row[idx..].iter().take_while(|&&c| c == col).count();
        if run % 2 == 1 {
            kept.push(col);
        }
        idx += run;
    }
    *row = kept;
}

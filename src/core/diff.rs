//! Line diff type.
//!
//! Represents the comparison between a template file on disk and its
//! rendered output, shown by dry runs.

use std::fmt::Write as _;

/// The state of a single line in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// Line is present in both versions.
    Same,
    /// Line exists only in the rendered output.
    Added,
    /// Line exists only in the original.
    Removed,
}

/// A single entry in a diff comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    text: String,
    status: LineStatus,
}

impl DiffLine {
    /// Create a new diff line.
    pub fn new(text: impl Into<String>, status: LineStatus) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }

    /// The line content, without its terminator.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The line status.
    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// Whether this line changed.
    pub fn is_change(&self) -> bool {
        !matches!(self.status, LineStatus::Same)
    }
}

/// Largest LCS table built before falling back to a coarse diff.
pub const MAX_TABLE_CELLS: usize = 4_000_000;

/// The full diff between two texts.
#[derive(Debug)]
pub struct Diff {
    lines: Vec<DiffLine>,
}

impl Diff {
    /// Compute a line diff from `before` to `after`.
    ///
    /// Common leading and trailing lines are matched directly; the rest goes
    /// through a longest-common-subsequence table. When that table would
    /// exceed [`MAX_TABLE_CELLS`], the differing region is listed as removed
    /// then added instead.
    pub fn compute(before: &str, after: &str) -> Self {
        let old: Vec<&str> = before.lines().collect();
        let new: Vec<&str> = after.lines().collect();

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let suffix = old[prefix..]
            .iter()
            .rev()
            .zip(new[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();

        let mut lines = Vec::with_capacity(old.len().max(new.len()));
        lines.extend(old[..prefix].iter().map(|l| DiffLine::new(*l, LineStatus::Same)));
        middle(
            &old[prefix..old.len() - suffix],
            &new[prefix..new.len() - suffix],
            &mut lines,
        );
        lines.extend(
            old[old.len() - suffix..]
                .iter()
                .map(|l| DiffLine::new(*l, LineStatus::Same)),
        );

        Self { lines }
    }

    /// All lines.
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    /// Only added lines.
    pub fn added(&self) -> Vec<&DiffLine> {
        self.lines
            .iter()
            .filter(|l| matches!(l.status, LineStatus::Added))
            .collect()
    }

    /// Only removed lines.
    pub fn removed(&self) -> Vec<&DiffLine> {
        self.lines
            .iter()
            .filter(|l| matches!(l.status, LineStatus::Removed))
            .collect()
    }

    /// Whether both texts have the same lines.
    pub fn is_unchanged(&self) -> bool {
        self.lines.iter().all(|l| !l.is_change())
    }

    /// Format as `-`/`+` lines with `context` unchanged lines around each
    /// change, headed by `--- before` and `+++ after` labels.
    pub fn to_text(&self, before: &str, after: &str, context: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--- {}", before);
        let _ = writeln!(out, "+++ {}", after);

        let changes: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_change())
            .map(|(i, _)| i)
            .collect();

        let mut shown = vec![false; self.lines.len()];
        for &c in &changes {
            let end = (c + context).min(self.lines.len() - 1);
            for flag in &mut shown[c.saturating_sub(context)..=end] {
                *flag = true;
            }
        }

        let mut skipped = false;
        for (idx, line) in self.lines.iter().enumerate() {
            if !shown[idx] {
                skipped = true;
                continue;
            }
            if skipped {
                out.push_str("@@\n");
                skipped = false;
            }
            let marker = match line.status {
                LineStatus::Same => ' ',
                LineStatus::Added => '+',
                LineStatus::Removed => '-',
            };
            let _ = writeln!(out, "{}{}", marker, line.text);
        }

        out
    }

    /// Total number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Diff the region between the common prefix and suffix.
fn middle(old: &[&str], new: &[&str], lines: &mut Vec<DiffLine>) {
    let (n, m) = (old.len(), new.len());
    if n.saturating_mul(m) > MAX_TABLE_CELLS {
        lines.extend(old.iter().map(|l| DiffLine::new(*l, LineStatus::Removed)));
        lines.extend(new.iter().map(|l| DiffLine::new(*l, LineStatus::Added)));
        return;
    }

    // lcs[i * width + j] = length of the LCS of old[i..] and new[j..]
    let width = m + 1;
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if old[i] == new[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            lines.push(DiffLine::new(old[i], LineStatus::Same));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            lines.push(DiffLine::new(old[i], LineStatus::Removed));
            i += 1;
        } else {
            lines.push(DiffLine::new(new[j], LineStatus::Added));
            j += 1;
        }
    }
    lines.extend(old[i..].iter().map(|l| DiffLine::new(*l, LineStatus::Removed)));
    lines.extend(new[j..].iter().map(|l| DiffLine::new(*l, LineStatus::Added)));
}

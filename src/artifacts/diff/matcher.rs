//! Best-common-blocks sequence alignment
//!
//! One generic matcher serves both the line differ (elements are lines) and
//! the inline differ (elements are tokens or characters). It follows the
//! classic Ratcliff/Obershelp approach: repeatedly find the longest matching
//! block, then recurse on the unmatched flanks via an explicit work queue.
//! No element is treated as junk, so blank lines and whitespace runs are as
//! significant as anything else, and identical inputs always produce
//! identical opcodes.

use derive_new::new;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

/// One alignment output describing a span as equal, insert, delete, or
/// replace between the two sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeTag {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// A tagged pair of half-open index ranges, one per sequence.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Opcode {
    pub tag: OpcodeTag,
    pub left: Range<usize>,
    pub right: Range<usize>,
}

/// A maximal run of equal elements starting at `left_start`/`right_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchingBlock {
    pub left_start: usize,
    pub right_start: usize,
    pub size: usize,
}

/// Aligner over two borrowed sequences of opaque elements.
///
/// Construction indexes the right-hand sequence once; every query after that
/// is read-only, so a matcher can be shared freely.
#[derive(Debug)]
pub struct BlockMatcher<'s, T: Eq + Hash> {
    a: &'s [T],
    b: &'s [T],
    b_index: HashMap<&'s T, Vec<usize>>,
}

impl<'s, T: Eq + Hash> BlockMatcher<'s, T> {
    pub fn new(a: &'s [T], b: &'s [T]) -> Self {
        let mut b_index: HashMap<&'s T, Vec<usize>> = HashMap::new();
        for (j, element) in b.iter().enumerate() {
            b_index.entry(element).or_default().push(j);
        }
        BlockMatcher { a, b, b_index }
    }

    /// Find the longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties break towards the earliest start in `a`, then the earliest start
    /// in `b`, which keeps the overall decomposition deterministic.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let mut best = MatchingBlock {
            left_start: alo,
            right_start: blo,
            size: 0,
        };
        // j2len[j] = length of the longest match ending at a[i], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let run = if j > blo {
                        j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                    } else {
                        1
                    };
                    next_j2len.insert(j, run);
                    if run > best.size {
                        best = MatchingBlock {
                            left_start: i + 1 - run,
                            right_start: j + 1 - run,
                            size: run,
                        };
                    }
                }
            }
            j2len = next_j2len;
        }

        best
    }

    /// All matching blocks in order, adjacent blocks merged, terminated by a
    /// zero-length sentinel at the end of both sequences.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0usize, la, 0usize, lb)];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            if alo < block.left_start && blo < block.right_start {
                queue.push((alo, block.left_start, blo, block.right_start));
            }
            if block.left_start + block.size < ahi && block.right_start + block.size < bhi {
                queue.push((
                    block.left_start + block.size,
                    ahi,
                    block.right_start + block.size,
                    bhi,
                ));
            }
            found.push(block);
        }
        found.sort_unstable();

        let mut blocks: Vec<MatchingBlock> = Vec::with_capacity(found.len() + 1);
        for block in found {
            if let Some(last) = blocks.last_mut()
                && last.left_start + last.size == block.left_start
                && last.right_start + last.size == block.right_start
            {
                last.size += block.size;
                continue;
            }
            blocks.push(block);
        }
        blocks.push(MatchingBlock {
            left_start: la,
            right_start: lb,
            size: 0,
        });
        blocks
    }

    /// Ordered edit script covering both sequences completely.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);

        for block in self.matching_blocks() {
            let tag = if i < block.left_start && j < block.right_start {
                Some(OpcodeTag::Replace)
            } else if i < block.left_start {
                Some(OpcodeTag::Delete)
            } else if j < block.right_start {
                Some(OpcodeTag::Insert)
            } else {
                None
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode::new(tag, i..block.left_start, j..block.right_start));
            }
            if block.size > 0 {
                opcodes.push(Opcode::new(
                    OpcodeTag::Equal,
                    block.left_start..block.left_start + block.size,
                    block.right_start..block.right_start + block.size,
                ));
            }
            i = block.left_start + block.size;
            j = block.right_start + block.size;
        }
        opcodes
    }

    /// Similarity in [0, 1]: twice the matched element count over the total
    /// length of both sequences.
    pub fn ratio(&self) -> f64 {
        let matches: usize = self.matching_blocks().iter().map(|block| block.size).sum();
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on `ratio()` from element frequencies alone; much cheaper
    /// than the full alignment.
    pub fn quick_ratio(&self) -> f64 {
        let mut full_b_count: HashMap<&T, isize> = HashMap::new();
        for element in self.b {
            *full_b_count.entry(element).or_insert(0) += 1;
        }

        // avail[e] = how many matches of e in b remain unclaimed
        let mut avail: HashMap<&T, isize> = HashMap::new();
        let mut matches = 0usize;
        for element in self.a {
            let remaining = match avail.get(element) {
                Some(&count) => count,
                None => full_b_count.get(element).copied().unwrap_or(0),
            };
            avail.insert(element, remaining - 1);
            if remaining > 0 {
                matches += 1;
            }
        }
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on `ratio()` from the sequence lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        calculate_ratio(
            self.a.len().min(self.b.len()),
            self.a.len() + self.b.len(),
        )
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        2.0 * matches as f64 / length as f64
    }
}

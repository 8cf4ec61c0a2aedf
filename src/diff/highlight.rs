use serde::Serialize;
use std::ops::Range;

/// Largest DP table (in cells) built for the changed middle of two texts.
/// Beyond this the middle is reported as a single replaced block.
const MAX_TABLE_CELLS: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// Changed character range `[start, end)` on one side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffSpan {
    pub side: Side,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpTag {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// One aligned block: `left` indexes the left text, `right` the right text,
/// both in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub left: Range<usize>,
    pub right: Range<usize>,
}

#[derive(Clone, Copy)]
enum Step {
    Equal,
    Delete,
    Insert,
}

/// Character-level alignment of `left` against `right` as a sequence of
/// blocks covering both texts end to end.
pub fn opcodes(left: &str, right: &str) -> Vec<Opcode> {
    let a: Vec<char> = left.chars().collect();
    let b: Vec<char> = right.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut ops = Vec::new();
    if prefix > 0 {
        ops.push(Opcode {
            tag: OpTag::Equal,
            left: 0..prefix,
            right: 0..prefix,
        });
    }

    let steps = if (mid_a.len() + 1).saturating_mul(mid_b.len() + 1) > MAX_TABLE_CELLS {
        tracing::debug!(
            left = mid_a.len(),
            right = mid_b.len(),
            "Diff input too large for alignment, reporting whole block"
        );
        mid_a
            .iter()
            .map(|_| Step::Delete)
            .chain(mid_b.iter().map(|_| Step::Insert))
            .collect()
    } else {
        lcs_steps(mid_a, mid_b)
    };
    group_steps(&steps, prefix, &mut ops);

    if suffix > 0 {
        ops.push(Opcode {
            tag: OpTag::Equal,
            left: a.len() - suffix..a.len(),
            right: b.len() - suffix..b.len(),
        });
    }

    ops
}

fn lcs_steps(a: &[char], b: &[char]) -> Vec<Step> {
    let n = a.len();
    let m = b.len();
    let w = m + 1;

    // dp[i * w + j] = LCS length of a[i..] and b[j..]
    let mut dp: Vec<u32> = vec![0; (n + 1) * w];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i * w + j] = if a[i] == b[j] {
                dp[(i + 1) * w + (j + 1)] + 1
            } else {
                dp[(i + 1) * w + j].max(dp[i * w + (j + 1)])
            };
        }
    }

    let mut steps = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            steps.push(Step::Equal);
            i += 1;
            j += 1;
        } else if dp[(i + 1) * w + j] >= dp[i * w + (j + 1)] {
            steps.push(Step::Delete);
            i += 1;
        } else {
            steps.push(Step::Insert);
            j += 1;
        }
    }
    steps.extend((i..n).map(|_| Step::Delete));
    steps.extend((j..m).map(|_| Step::Insert));
    steps
}

/// Folds per-character steps into blocks. Each maximal run of non-equal steps
/// becomes one delete, insert or replace block.
fn group_steps(steps: &[Step], offset: usize, ops: &mut Vec<Opcode>) {
    let (mut i, mut j) = (offset, offset);
    let mut k = 0;

    while k < steps.len() {
        let (i0, j0) = (i, j);
        if matches!(steps[k], Step::Equal) {
            while k < steps.len() && matches!(steps[k], Step::Equal) {
                i += 1;
                j += 1;
                k += 1;
            }
            ops.push(Opcode {
                tag: OpTag::Equal,
                left: i0..i,
                right: j0..j,
            });
            continue;
        }

        while k < steps.len() {
            match steps[k] {
                Step::Delete => i += 1,
                Step::Insert => j += 1,
                Step::Equal => break,
            }
            k += 1;
        }
        let tag = match (i > i0, j > j0) {
            (true, true) => OpTag::Replace,
            (true, false) => OpTag::Delete,
            _ => OpTag::Insert,
        };
        ops.push(Opcode {
            tag,
            left: i0..i,
            right: j0..j,
        });
    }
}

/// Highlight spans produced by one [`diff`] call. Consumed once.
pub struct DiffSpans {
    ops: std::vec::IntoIter<Opcode>,
    pending: Option<DiffSpan>,
}

impl Iterator for DiffSpans {
    type Item = DiffSpan;

    fn next(&mut self) -> Option<DiffSpan> {
        if let Some(span) = self.pending.take() {
            return Some(span);
        }

        for op in self.ops.by_ref() {
            let left = DiffSpan {
                side: Side::Left,
                start: op.left.start,
                end: op.left.end,
            };
            let right = DiffSpan {
                side: Side::Right,
                start: op.right.start,
                end: op.right.end,
            };
            match op.tag {
                OpTag::Equal => continue,
                OpTag::Delete => return Some(left),
                OpTag::Insert => return Some(right),
                OpTag::Replace => {
                    self.pending = Some(right);
                    return Some(left);
                }
            }
        }
        None
    }
}

/// Character ranges that differ between `left` and `right`.
///
/// Left spans mark text removed or replaced in `left`, right spans mark text
/// inserted or replacing it in `right`. Spans on one side never overlap and
/// come in ascending order. Nothing is cached between calls.
///
/// Alignment uses a quadratic LCS table over the part left after trimming the
/// common prefix and suffix. When that table would exceed 16M cells (for
/// example two unrelated texts of about 4,000 characters each) the whole
/// middle is reported as one replaced span per side, without finer alignment.
pub fn diff(left: &str, right: &str) -> DiffSpans {
    DiffSpans {
        ops: opcodes(left, right).into_iter(),
        pending: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(side: Side, start: usize, end: usize) -> DiffSpan {
        DiffSpan { side, start, end }
    }

    fn spans(left: &str, right: &str) -> Vec<DiffSpan> {
        diff(left, right).collect()
    }

    #[test]
    fn identical_texts_have_no_spans() {
        for s in ["", "a", "hello world", "반갑습니다", "aaaa"] {
            assert!(spans(s, s).is_empty(), "{s:?}");
        }
    }

    #[test]
    fn single_char_replace() {
        assert_eq!(
            spans("abc", "abd"),
            vec![span(Side::Left, 2, 3), span(Side::Right, 2, 3)]
        );
    }

    #[test]
    fn pure_insert_and_delete() {
        assert_eq!(spans("", "xyz"), vec![span(Side::Right, 0, 3)]);
        assert_eq!(spans("xyz", ""), vec![span(Side::Left, 0, 3)]);
        assert_eq!(spans("ac", "abc"), vec![span(Side::Right, 1, 2)]);
        assert_eq!(spans("abc", "ac"), vec![span(Side::Left, 1, 2)]);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        assert_eq!(
            spans("나는 학생", "나는 선생"),
            vec![span(Side::Left, 3, 4), span(Side::Right, 3, 4)]
        );
    }

    #[test]
    fn multiple_blocks_are_ordered() {
        let result = spans("the cat sat", "a cat sat down");
        let left: Vec<_> = result.iter().filter(|s| s.side == Side::Left).collect();
        let right: Vec<_> = result.iter().filter(|s| s.side == Side::Right).collect();

        for pair in left.windows(2).chain(right.windows(2)) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert_eq!(right.last(), Some(&&span(Side::Right, 9, 14)));
    }

    #[test]
    fn opcodes_cover_both_texts() {
        let ops = opcodes("kitten", "sitting");
        assert_eq!(ops.first().unwrap().left.start, 0);
        assert_eq!(ops.last().unwrap().left.end, 6);
        assert_eq!(ops.last().unwrap().right.end, 7);
        for pair in ops.windows(2) {
            assert_eq!(pair[0].left.end, pair[1].left.start);
            assert_eq!(pair[0].right.end, pair[1].right.start);
        }
        let equal: usize = ops
            .iter()
            .filter(|op| op.tag == OpTag::Equal)
            .map(|op| op.left.len())
            .sum();
        assert_eq!(equal, 4);
    }

    #[test]
    fn oversized_middle_is_one_replaced_block() {
        let left = format!("x{}y", "a".repeat(4100));
        let right = format!("x{}y", "b".repeat(4100));
        assert_eq!(
            spans(&left, &right),
            vec![span(Side::Left, 1, 4101), span(Side::Right, 1, 4101)]
        );
    }
}

use core::cmp;

/// Prefix sums over item heights.
///
/// Heights are non-negative, so prefix sums are non-decreasing and an offset can be mapped back
/// to an index by descending the tree in `O(log n)`.
#[derive(Clone, Debug)]
pub(crate) struct Fenwick {
    tree: Vec<f64>, // 1-indexed
    total: f64,
    max_bit: usize,
}

impl Fenwick {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            tree: vec![0.0; n + 1],
            total: 0.0,
            max_bit: highest_power_of_two_leq(n),
        }
    }

    pub(crate) fn from_heights(heights: &[f64]) -> Self {
        let n = heights.len();
        let mut tree = vec![0.0f64; n + 1];
        let mut total = 0.0f64;
        for i in 1..=n {
            let v = heights[i - 1];
            total += v;
            tree[i] += v;
            let j = i + lsb(i);
            if j <= n {
                tree[j] += tree[i];
            }
        }
        Self {
            tree,
            total,
            max_bit: highest_power_of_two_leq(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub(crate) fn total(&self) -> f64 {
        self.total
    }

    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }
        self.total = self.prefix_sum(new_len);
        self.tree.truncate(new_len + 1);
        self.max_bit = highest_power_of_two_leq(new_len);
    }

    /// Appends a value in `O(log n)`.
    pub(crate) fn push(&mut self, value: f64) {
        let new_len = self.len() + 1;
        self.tree.push(0.0);
        self.total += value;

        // tree[i] holds the sum of the lsb(i) values ending at i; the ones before the new slot
        // are already reachable through prefix sums.
        let start_exclusive = new_len - lsb(new_len);
        let before = self.prefix_sum(new_len - 1) - self.prefix_sum(start_exclusive);
        self.tree[new_len] = before + value;

        self.max_bit = highest_power_of_two_leq(new_len);
    }

    pub(crate) fn add(&mut self, index: usize, delta: f64) {
        let n = self.len();
        if index >= n || delta == 0.0 {
            return;
        }
        self.total += delta;
        let mut i = index + 1;
        while i <= n {
            self.tree[i] += delta;
            i += lsb(i);
        }
    }

    /// Sum of the first `count` values.
    pub(crate) fn prefix_sum(&self, count: usize) -> f64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0.0;
        while i > 0 {
            sum += self.tree[i];
            i &= i - 1;
        }
        sum
    }

    /// Returns the number of leading values whose prefix sum is `<= target`.
    ///
    /// Equivalently, the index of the first item whose end offset is `> target`.
    pub(crate) fn lower_bound(&self, target: f64) -> usize {
        self.descend(target, |node, remaining| node <= remaining)
    }

    /// Returns the number of leading values whose prefix sum is `< target`.
    pub(crate) fn strict_lower_bound(&self, target: f64) -> usize {
        self.descend(target, |node, remaining| node < remaining)
    }

    fn descend(&self, mut target: f64, take: impl Fn(f64, f64) -> bool) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.max_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && take(self.tree[next], target) {
                target -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn highest_power_of_two_leq(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut p = 1usize;
    while p <= n / 2 {
        p <<= 1;
    }
    p
}

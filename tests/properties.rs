use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use windowed_list::memory::MemoryHost;
use windowed_list::{Config, ItemPool, NodeId, ScrollMetrics, VisibleRange, WindowedScroller};

fn measured_scroller(
    heights: &[u32],
    viewport: u32,
    overscan: usize,
) -> WindowedScroller<MemoryHost<usize>> {
    let config = Config::default().with_overscan_count(overscan);
    let mut s = WindowedScroller::new(
        MemoryHost::new(viewport as f64),
        heights.len(),
        config,
        |i| i,
    );
    for (i, &h) in heights.iter().enumerate() {
        s.measure_item(i, h as f64);
    }
    let root = s.host_mut().create_root();
    s.mount(root);
    s
}

fn contains_range(outer: VisibleRange, inner: VisibleRange) -> bool {
    inner.is_empty() || (outer.start <= inner.start && inner.end <= outer.end)
}

#[derive(Clone, Debug)]
enum PoolOp {
    Acquire(usize),
    Release(usize),
    Measure(usize, u32),
    Clear,
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        (0usize..30).prop_map(PoolOp::Acquire),
        (0usize..30).prop_map(PoolOp::Release),
        (0usize..30, 0u32..500).prop_map(|(i, h)| PoolOp::Measure(i, h)),
        Just(PoolOp::Clear),
    ]
}

proptest! {
    #[test]
    fn viewport_range_covers_exactly_the_intersecting_items(
        heights in proptest::collection::vec(1u32..120, 1..60),
        viewport in 1u32..600,
        position_frac in 0.0f64..=1.0,
    ) {
        let mut s = measured_scroller(&heights, viewport, 0);
        let max = (s.total_height() - viewport as f64).max(0.0);
        let position = (max * position_frac).floor();
        s.scroll_to(position);
        let range = s.viewport_range();

        let lo = position;
        let hi = position + viewport as f64;
        for i in 0..heights.len() {
            let off = s.item_offset(i).unwrap_or(0.0);
            let end = off + heights[i] as f64;
            let intersects = off < hi && end > lo;
            prop_assert_eq!(
                range.contains(i),
                intersects,
                "index {} [{}, {}) vs viewport [{}, {}) range {:?}",
                i, off, end, lo, hi, range
            );
        }
        prop_assert_eq!(s.visible_range(), range);
    }

    #[test]
    fn more_overscan_never_shrinks_the_rendered_range(
        heights in proptest::collection::vec(1u32..120, 1..60),
        viewport in 1u32..600,
        position in 0u32..5_000,
        a in 0usize..6,
        extra in 0usize..6,
    ) {
        let mut small = measured_scroller(&heights, viewport, a);
        let mut large = measured_scroller(&heights, viewport, a + extra);
        small.scroll_to(position as f64);
        large.scroll_to(position as f64);
        prop_assert!(contains_range(large.visible_range(), small.visible_range()));
        prop_assert_eq!(small.viewport_range(), large.viewport_range());
        prop_assert!(contains_range(small.visible_range(), small.viewport_range()));
    }

    #[test]
    fn pool_conserves_entries_and_respects_capacity(
        capacity in 0usize..8,
        ops in proptest::collection::vec(pool_op(), 1..200),
    ) {
        let mut pool: ItemPool<usize> = ItemPool::new(capacity, 50.0);
        let mut next = 0u64;
        for (step, op) in ops.into_iter().enumerate() {
            let now = step as f64;
            match op {
                PoolOp::Acquire(i) => {
                    let item = pool.acquire(i, now, || i);
                    if item.node.is_none() {
                        next += 1;
                        item.node = Some(NodeId(next));
                    }
                }
                PoolOp::Release(i) => {
                    pool.release(i, now);
                }
                PoolOp::Measure(i, h) => pool.update_height(i, h as f64),
                PoolOp::Clear => {
                    pool.clear();
                }
            }

            prop_assert!(pool.inactive_count() <= capacity);
            prop_assert!(pool.active_count() <= 30);

            let mut nodes = HashSet::new();
            for i in pool.active_indices() {
                let node = pool.get(i).and_then(|it| it.node);
                prop_assert!(node.is_none_or(|n| nodes.insert(n)));
            }
            for spare in pool.spares() {
                prop_assert!(spare.node.is_none_or(|n| nodes.insert(n)));
            }
        }
    }

    #[test]
    fn measured_heights_read_back_exactly(
        ops in proptest::collection::vec((0usize..20, 0u32..1_000, any::<bool>()), 1..100),
    ) {
        let mut pool: ItemPool<()> = ItemPool::new(4, 50.0);
        let mut model: HashMap<usize, f64> = HashMap::new();
        for (i, h, recycle) in ops {
            pool.update_height(i, h as f64);
            model.insert(i, h as f64);
            if recycle {
                pool.acquire(i, 0.0, || ());
                pool.release(i, 0.0);
            }
            for (&j, &expected) in &model {
                prop_assert_eq!(pool.get_height(j), expected);
            }
        }
        pool.clear();
        for j in model.keys() {
            prop_assert_eq!(pool.get_height(*j), 50.0);
        }
    }

    #[test]
    fn increasing_samples_scroll_down(
        steps in proptest::collection::vec((1u32..200, 1u32..50), 2..40),
    ) {
        let mut m = ScrollMetrics::new();
        let mut position = 0.0;
        let mut time = 0.0;
        m.update(position, time);
        for (dp, dt_ms) in steps {
            position += dp as f64;
            time += dt_ms as f64 / 1000.0;
            m.update(position, time);
            prop_assert!(m.scrolling_down(), "velocity {}", m.velocity());
            prop_assert!(!m.scrolling_up());
        }
    }
}

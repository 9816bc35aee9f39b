use std::collections::HashMap;

use crate::NodeId;

/// The host runtime's size-measurement primitive.
pub trait SizeSource {
    /// Starts reporting size changes for `node`. Batches must carry `tag` back.
    fn observe_size(&mut self, node: NodeId, tag: usize);
    fn unobserve_size(&mut self, node: NodeId);
}

/// One entry of a size batch as delivered by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawSizeEntry {
    pub tag: Option<usize>,
    pub height: Option<f64>,
}

/// A resolved measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeEntry {
    pub index: usize,
    pub node: NodeId,
    pub height: f64,
}

/// Index-keyed bookkeeping for size observation (dynamic heights).
#[derive(Clone, Debug, Default)]
pub(crate) struct SizeObserver {
    targets: HashMap<usize, NodeId>,
}

impl SizeObserver {
    pub(crate) fn observe(&mut self, source: &mut impl SizeSource, index: usize, node: NodeId) {
        match self.targets.insert(index, node) {
            Some(prev) if prev == node => return,
            Some(prev) => source.unobserve_size(prev),
            None => {}
        }
        source.observe_size(node, index);
    }

    pub(crate) fn unobserve(&mut self, source: &mut impl SizeSource, index: usize) {
        if let Some(node) = self.targets.remove(&index) {
            source.unobserve_size(node);
        }
    }

    pub(crate) fn disconnect(&mut self, source: &mut impl SizeSource) {
        for (_, node) in self.targets.drain() {
            source.unobserve_size(node);
        }
    }

    /// Resolves a raw batch. Entries that carry no tag or name an index that is not observed are
    /// dropped; a missing or non-finite height reads as zero.
    pub(crate) fn parse_batch(&self, batch: &[RawSizeEntry]) -> Vec<SizeEntry> {
        batch
            .iter()
            .filter_map(|raw| {
                let index = raw.tag?;
                let Some(&node) = self.targets.get(&index) else {
                    vwarn!(index, "SizeObserver: entry for unobserved index");
                    return None;
                };
                let height = raw
                    .height
                    .filter(|h| h.is_finite())
                    .map(|h| h.max(0.0))
                    .unwrap_or(0.0);
                Some(SizeEntry {
                    index,
                    node,
                    height,
                })
            })
            .collect()
    }
}

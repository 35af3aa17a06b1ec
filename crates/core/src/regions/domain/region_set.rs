use crate::regions::domain::region::Region;

/// The ordered regions driving one run.
///
/// Order is the per-frame application order: config-file regions first
/// (file order), then CLI regions (flag order).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Appends `cli` after `config`; neither source replaces the other.
    pub fn merge(config: Vec<Region>, cli: Vec<Region>) -> Self {
        let mut regions = config;
        regions.extend(cli);
        Self { regions }
    }

    /// Regions whose window contains `t`, in set order.
    pub fn active_at(&self, t: f64) -> Vec<&Region> {
        self.regions.iter().filter(|r| r.is_active_at(t)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

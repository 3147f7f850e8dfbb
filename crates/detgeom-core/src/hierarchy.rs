//! Name lookup and parent/children grouping over a flat volume list.
//!
//! The index borrows the volume list and is cheap to rebuild; callers build a
//! fresh one after every edit instead of maintaining it incrementally.
//! Building never fails: a mother name that does not resolve groups the
//! volume under the root frame.

use std::collections::{HashMap, HashSet};

use crate::volume::{is_world_name, Volume};

/// Grouping key for [`HierarchyIndex::children`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKey {
    /// The implicit world frame.
    Root,
    /// The volume at this index.
    Volume(usize),
}

/// Name→index map and parent→children grouping for a slice of volumes.
#[derive(Debug, Clone)]
pub struct HierarchyIndex<'a> {
    volumes: &'a [Volume],
    name_to_index: HashMap<&'a str, usize>,
    children_of: HashMap<ParentKey, Vec<usize>>,
}

impl<'a> HierarchyIndex<'a> {
    /// Builds the index. Children keep the order of `volumes`.
    pub fn build(volumes: &'a [Volume]) -> Self {
        let mut name_to_index = HashMap::with_capacity(volumes.len());
        for (index, volume) in volumes.iter().enumerate() {
            // First record wins; later duplicates are reported by diagnostics.
            name_to_index.entry(volume.name.as_str()).or_insert(index);
        }

        let mut index = Self {
            volumes,
            name_to_index,
            children_of: HashMap::new(),
        };
        for (i, volume) in volumes.iter().enumerate() {
            let key = index.parent_key(volume);
            index.children_of.entry(key).or_default().push(i);
        }
        index
    }

    /// Returns the indexed volumes.
    #[must_use]
    pub fn volumes(&self) -> &'a [Volume] {
        self.volumes
    }

    /// Returns the number of indexed volumes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Returns true if there are no volumes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Looks up a volume index by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Looks up a volume by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Volume> {
        let volumes = self.volumes;
        self.lookup(name).map(|i| &volumes[i])
    }

    /// Returns the grouping key of `volume`'s mother.
    ///
    /// Root-placed volumes and volumes whose mother does not resolve both
    /// map to [`ParentKey::Root`].
    #[must_use]
    pub fn parent_key(&self, volume: &Volume) -> ParentKey {
        volume
            .mother_name()
            .and_then(|mother| self.lookup(mother))
            .map_or(ParentKey::Root, ParentKey::Volume)
    }

    /// Returns the index of the volume's resolved mother, if any.
    ///
    /// A self-referencing volume returns its own index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the indexed volumes.
    #[must_use]
    pub fn mother_index(&self, index: usize) -> Option<usize> {
        match self.parent_key(&self.volumes[index]) {
            ParentKey::Root => None,
            ParentKey::Volume(i) => Some(i),
        }
    }

    /// Returns true if the volume names a mother that does not exist.
    #[must_use]
    pub fn is_orphan(&self, index: usize) -> bool {
        self.volumes[index]
            .mother_name()
            .is_some_and(|mother| self.lookup(mother).is_none())
    }

    /// Returns the children grouped under `key`, in input order.
    pub fn children(&self, key: ParentKey) -> impl Iterator<Item = (usize, &'a Volume)> + '_ {
        let volumes = self.volumes;
        self.children_of
            .get(&key)
            .into_iter()
            .flatten()
            .map(move |&i| (i, &volumes[i]))
    }

    /// Returns the volumes grouped under the world frame.
    pub fn roots(&self) -> impl Iterator<Item = (usize, &'a Volume)> + '_ {
        self.children(ParentKey::Root)
    }

    /// Returns the number of volumes placed inside the volume at `index`.
    #[must_use]
    pub fn num_children(&self, index: usize) -> usize {
        self.children_of
            .get(&ParentKey::Volume(index))
            .map_or(0, Vec::len)
    }

    /// Returns true if any volume is placed inside the volume at `index`.
    #[must_use]
    pub fn has_children(&self, index: usize) -> bool {
        self.num_children(index) > 0
    }

    /// Returns true if the volume is both a mother and a daughter.
    #[must_use]
    pub fn is_intermediate(&self, index: usize) -> bool {
        self.has_children(index) && self.mother_index(index).is_some()
    }

    /// Returns every volume below `index`, breadth first.
    ///
    /// Each volume is reported at most once, so cyclic data terminates.
    #[must_use]
    pub fn descendants(&self, index: usize) -> Vec<usize> {
        let mut visited = HashSet::from([index]);
        let mut out = Vec::new();
        let mut cursor = 0;
        let mut frontier = vec![index];
        while cursor < frontier.len() {
            let current = frontier[cursor];
            cursor += 1;
            for (child, _) in self.children(ParentKey::Volume(current)) {
                if visited.insert(child) {
                    out.push(child);
                    frontier.push(child);
                }
            }
        }
        out
    }

    /// Returns true if placing the volume at `index` inside `new_mother`
    /// would close a loop.
    #[must_use]
    pub fn would_create_cycle(&self, index: usize, new_mother: &str) -> bool {
        if is_world_name(new_mother) {
            return false;
        }
        let Some(mut current) = self.lookup(new_mother) else {
            return false;
        };
        let mut visited = HashSet::new();
        loop {
            if current == index {
                return true;
            }
            if !visited.insert(current) {
                // An existing loop that does not pass through `index`.
                return false;
            }
            match self.mother_index(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }
}

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};

use crate::{
    buffers::MirroredBuffer,
    device::{BufferRole, GraphicsDevice},
};

/// Stable identifier of a material.
///
/// Keys are handed out in increasing order and never reused, even after
/// the material they named was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialKey(u64);

impl MaterialKey {
    pub fn id(self) -> u64 {
        self.0
    }

    /// Key of renderer-owned entities that never reach a material lookup.
    /// Tables hand out keys from zero upwards, so this one is never live.
    pub(crate) fn unassigned() -> MaterialKey {
        MaterialKey(u64::MAX)
    }
}

impl std::fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// How a material's dense index (its position in the device mirror) is
/// derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DenseIndexing {
    /// The index is the key's rank among live keys. Removing a material
    /// shifts the index of every material with a larger key down by one.
    Ranked,
    /// Every material owns a dense slot until it is removed. Freed slots
    /// are zeroed and handed to later additions, other materials keep
    /// their index.
    #[default]
    Stable,
}

/// Default material record: texture table indices.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialData {
    pub albedo: u32,
    pub normal: u32,
    pub specular: u32,
    pub _padding: u32,
}

impl MaterialData {
    pub fn new(albedo: u32, normal: u32, specular: u32) -> Self {
        Self {
            albedo,
            normal,
            specular,
            _padding: 0,
        }
    }
}

#[derive(Debug)]
struct Slot<R> {
    record: R,
    dense: u32,
}

/// Key-ordered material records mirrored into a device buffer.
pub struct MaterialTable<R: Pod, D: GraphicsDevice> {
    indexing: DenseIndexing,
    next_key: u64,
    records: BTreeMap<MaterialKey, Slot<R>>,
    // Stable indexing only: dense slot -> owning key, and the free slots.
    owners: Vec<Option<MaterialKey>>,
    free: Vec<u32>,
    mirror: MirroredBuffer<R, D>,
    dirty: bool,
}

impl<R: Pod, D: GraphicsDevice> MaterialTable<R, D> {
    pub fn new(device: D, indexing: DenseIndexing) -> Self {
        Self {
            indexing,
            next_key: 0,
            records: BTreeMap::new(),
            owners: Vec::new(),
            free: Vec::new(),
            mirror: MirroredBuffer::new(device, BufferRole::Storage, "material_table_buffer"),
            dirty: false,
        }
    }

    pub fn add(&mut self, record: R) -> MaterialKey {
        let key = MaterialKey(self.next_key);
        self.next_key += 1;

        let dense = match self.indexing {
            DenseIndexing::Ranked => 0,
            DenseIndexing::Stable => match self.free.pop() {
                Some(dense) => {
                    self.owners[dense as usize] = Some(key);
                    dense
                }
                None => {
                    self.owners.push(Some(key));
                    self.owners.len() as u32 - 1
                }
            },
        };
        self.records.insert(key, Slot { record, dense });
        self.dirty = true;
        key
    }

    /// Remove a material and return its record. Unknown keys are fatal.
    pub fn remove(&mut self, key: MaterialKey) -> R {
        let Some(slot) = self.records.remove(&key) else {
            crate::fatal::die(format_args!("cannot remove unknown {key}"));
        };
        if self.indexing == DenseIndexing::Stable {
            self.owners[slot.dense as usize] = None;
            self.free.push(slot.dense);
        }
        self.dirty = true;
        slot.record
    }

    pub fn get(&self, key: MaterialKey) -> Option<&R> {
        self.records.get(&key).map(|slot| &slot.record)
    }

    /// Mutable access to a record. The mirror is re-uploaded on the next
    /// [`MaterialTable::sync`].
    pub fn get_mut(&mut self, key: MaterialKey) -> Option<&mut R> {
        let slot = self.records.get_mut(&key)?;
        self.dirty = true;
        Some(&mut slot.record)
    }

    /// Dense index of `key` in the device mirror. Unknown keys are fatal.
    ///
    /// With [`DenseIndexing::Ranked`] this is recomputed on every call, a
    /// value cached before a removal may be stale.
    pub fn index(&self, key: MaterialKey) -> u32 {
        let Some(slot) = self.records.get(&key) else {
            crate::fatal::die(format_args!("no dense index for unknown {key}"));
        };
        match self.indexing {
            DenseIndexing::Ranked => self.records.range(..key).count() as u32,
            DenseIndexing::Stable => slot.dense,
        }
    }

    pub fn contains(&self, key: MaterialKey) -> bool {
        self.records.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = MaterialKey> + '_ {
        self.records.keys().copied()
    }

    pub fn indexing(&self) -> DenseIndexing {
        self.indexing
    }

    /// Records in dense index order, as the device sees them.
    pub fn dense_records(&self) -> Vec<R> {
        match self.indexing {
            DenseIndexing::Ranked => self.records.values().map(|slot| slot.record).collect(),
            DenseIndexing::Stable => self
                .owners
                .iter()
                .map(|owner| match owner {
                    Some(key) => self.records[key].record,
                    None => R::zeroed(),
                })
                .collect(),
        }
    }

    /// Upload the dense mirror if anything changed since the last sync.
    pub fn sync(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.mirror.replace(self.dense_records());
        self.dirty = false;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mirror(&self) -> &MirroredBuffer<R, D> {
        &self.mirror
    }

    pub fn buffer(&self) -> &D::Buffer {
        self.mirror.buffer().raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostDevice;

    fn table(indexing: DenseIndexing) -> MaterialTable<MaterialData, HostDevice> {
        MaterialTable::new(HostDevice::new(), indexing)
    }

    #[test]
    fn stable_indices_survive_removal() {
        let mut materials = table(DenseIndexing::Stable);
        let a = materials.add(MaterialData::new(1, 0, 0));
        let b = materials.add(MaterialData::new(2, 0, 0));
        let c = materials.add(MaterialData::new(3, 0, 0));
        materials.remove(a);
        assert_eq!(materials.index(b), 1);
        assert_eq!(materials.index(c), 2);

        // the freed slot is reused, holes read as zero until then
        assert_eq!(materials.dense_records()[0], MaterialData::default());
        let d = materials.add(MaterialData::new(4, 0, 0));
        assert_eq!(materials.index(d), 0);
        assert_eq!(materials.dense_records()[0].albedo, 4);
    }

    #[test]
    fn ranked_indices_follow_key_order() {
        let mut materials = table(DenseIndexing::Ranked);
        let keys: Vec<_> = (0..4).map(|i| materials.add(MaterialData::new(i, 0, 0))).collect();
        materials.remove(keys[1]);
        assert_eq!(materials.index(keys[0]), 0);
        assert_eq!(materials.index(keys[2]), 1);
        assert_eq!(materials.index(keys[3]), 2);
        let albedos: Vec<_> = materials.dense_records().iter().map(|m| m.albedo).collect();
        assert_eq!(albedos, vec![0, 2, 3]);
    }

    #[test]
    fn sync_uploads_only_when_dirty() {
        let mut materials = table(DenseIndexing::Stable);
        assert!(!materials.sync());
        let key = materials.add(MaterialData::new(7, 8, 9));
        assert!(materials.sync());
        assert!(!materials.sync());
        materials.get_mut(key).expect("live material").specular = 1;
        assert!(materials.sync());
        assert_eq!(materials.mirror().as_slice()[0].specular, 1);
    }

    #[test]
    #[should_panic(expected = "unknown material#0")]
    fn removing_twice_is_fatal() {
        let mut materials = table(DenseIndexing::Ranked);
        let key = materials.add(MaterialData::default());
        materials.remove(key);
        materials.remove(key);
    }
}

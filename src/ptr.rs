/// A handle to an object owned by a [`Collector`](crate::Collector).
///
/// `Gc` is the object's identity: the slot index it lives in plus the slot's
/// generation at allocation time. When the object is freed (explicitly or by
/// sweep) the slot's generation is bumped, so every outstanding copy of the
/// handle becomes *stale* and is rejected by lookups instead of aliasing
/// whatever object reuses the slot.
///
/// Handles are plain `Copy` values and do not keep their object alive on
/// their own; only roots, pins and reachability from them do.
///
/// 一个指向 [`Collector`](crate::Collector) 所拥有对象的句柄。
///
/// `Gc` 就是对象的身份：它所在的槽位索引加上分配时槽位的代数。
/// 当对象被释放（显式释放或被清扫）时，槽位的代数会递增，
/// 因此该句柄的所有副本都会变为*过期*，查找时被拒绝，
/// 而不会指向复用该槽位的新对象。
///
/// 句柄只是普通的 `Copy` 值，本身不会让对象存活；
/// 只有根、钉住以及从它们出发的可达性才会。
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gc {
    index: u32,
    generation: u32,
}

impl Gc {
    #[inline]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of the object.
    /// 对象的槽位索引。
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    /// 签发此句柄时槽位的代数。
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Debug for Gc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Gc")
            .field(&self.index)
            .field(&self.generation)
            .finish()
    }
}

impl std::fmt::Display for Gc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

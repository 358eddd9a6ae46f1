use crate::ptr::Gc;
use std::vec::Vec;

/// Default number of slots reserved by a new collector.
/// 新收集器默认预留的槽位数量。
pub(crate) const DEFAULT_CAPACITY: usize = 64;

/// Default automatic collection threshold (disabled).
/// 默认的自动回收阈值（禁用）。
pub(crate) const DEFAULT_AUTO_COLLECT_THRESHOLD: Option<usize> = None;

/// Largest number of slots the arena may hold; indices are stored as `u32`.
/// 槽位表可容纳的最大槽位数；索引以 `u32` 存储。
pub(crate) const MAX_SLOTS: usize = u32::MAX as usize;

/// One entry of the object arena.
///
/// `value` is `None` while the slot sits on the free list.
///
/// 对象槽位表中的一项。
/// 当槽位位于空闲列表中时，`value` 为 `None`。
#[derive(Debug)]
pub(crate) struct Slot<T> {
    /// Bumped every time the slot is released.
    /// 每次释放槽位时递增。
    pub(crate) generation: u32,
    /// Cycle-scoped mark bit.
    /// 周期内有效的标记位。
    pub(crate) marked: bool,
    pub(crate) value: Option<T>,
}

/// The heap set: every tracked object lives in exactly one occupied slot.
///
/// Released slots go onto `free` and are reused by later allocations with a
/// bumped generation, so handles to the old occupant stay invalid.
///
/// 堆集合：每个被跟踪的对象恰好位于一个被占用的槽位中。
/// 被释放的槽位进入 `free`，之后的分配会以递增后的代数复用它们，
/// 因此指向旧占用者的句柄保持无效。
#[derive(Debug)]
pub(crate) struct SlotArena<T> {
    pub(crate) slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> SlotArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Place `value` in a free slot (or a new one) and return its handle.
    pub(crate) fn insert(&mut self, value: T) -> Gc {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                assert!(
                    self.slots.len() < MAX_SLOTS,
                    "BUG: collector slot table exhausted ({} slots)",
                    MAX_SLOTS
                );
                self.slots.push(Slot {
                    generation: 0,
                    marked: false,
                    value: None,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.value.is_none(), "free list returned an occupied slot");
        slot.marked = false;
        slot.value = Some(value);
        self.live += 1;

        Gc::new(index, slot.generation)
    }

    /// Slot index for `gc` if it names a live object.
    #[inline]
    pub(crate) fn validate(&self, gc: Gc) -> Option<usize> {
        let index = gc.index();
        let slot = self.slots.get(index)?;
        if slot.generation != gc.generation() || slot.value.is_none() {
            return None;
        }
        Some(index)
    }

    #[inline]
    pub(crate) fn get(&self, gc: Gc) -> Option<&Slot<T>> {
        self.validate(gc).map(|index| &self.slots[index])
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, gc: Gc) -> Option<&mut Slot<T>> {
        self.validate(gc).map(move |index| &mut self.slots[index])
    }

    /// Take the value out of slot `index` and put the slot on the free list.
    ///
    /// A slot whose generation cannot be bumped again is retired instead, so
    /// an old handle can never match a later occupant.
    ///
    /// The caller must have checked that the slot is occupied.
    pub(crate) fn release(&mut self, index: usize) -> T {
        let slot = &mut self.slots[index];
        let value = slot.value.take();
        slot.marked = false;
        if let Some(generation) = slot.generation.checked_add(1) {
            slot.generation = generation;
            self.free.push(index as u32);
        }
        self.live -= 1;

        match value {
            Some(value) => value,
            None => unreachable!("released an empty slot"),
        }
    }

    /// Live objects with their handles, in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Gc, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Gc::new(index as u32, slot.generation), value))
        })
    }
}

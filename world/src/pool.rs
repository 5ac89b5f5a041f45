//! Fixed-capacity entity pools with generation-checked handles.

use cat_siege_core::{EntityHandle, EntityKind, Facing, PoolKind};
use glam::Vec2;

use crate::scale::{body_size, ScaleTween};

/// State of a single simulated sprite owned by a pool or the formation.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    /// Category of the entity.
    pub kind: EntityKind,
    /// Centre position in world pixels.
    pub position: Vec2,
    /// Velocity in pixels per second; used by projectiles.
    pub velocity: Vec2,
    /// Chase speed in pixels per second; used by enemies.
    pub speed: f32,
    /// Remaining health.
    pub health: u32,
    /// Visual scale.
    pub scale: f32,
    /// Unscaled texture size.
    pub texture_size: Vec2,
    /// Collision body size, re-derived when scale transitions settle.
    pub body: Vec2,
    /// Horizontal facing.
    pub facing: Facing,
    pub(crate) tween: Option<ScaleTween>,
}

impl EntityRecord {
    /// Creates a stationary record and derives its collision body from the scale.
    #[must_use]
    pub fn new(kind: EntityKind, position: Vec2, health: u32, scale: f32, texture_size: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            speed: 0.0,
            health,
            scale,
            texture_size,
            body: body_size(texture_size, scale),
            facing: Facing::Right,
            tween: None,
        }
    }

    /// Sets the facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Sets the velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the chase speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Reports whether a scale tween is in flight.
    #[must_use]
    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    pub(crate) fn begin_tween(&mut self, target: f32) {
        self.tween = Some(ScaleTween::new(self.scale, target));
    }

    pub(crate) fn advance_tween(&mut self, eased: f32) {
        if let Some(tween) = self.tween {
            self.scale = tween.sample(eased);
        }
    }

    pub(crate) fn settle(&mut self) {
        if let Some(tween) = self.tween.take() {
            self.scale = tween.target();
        }
        self.body = body_size(self.texture_size, self.scale);
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    record: Option<EntityRecord>,
}

/// Fixed-capacity store that recycles entity slots.
///
/// Slots are reused once released. Every release bumps the slot generation so
/// handles issued before the release no longer resolve.
#[derive(Clone, Debug)]
pub struct EntityPool {
    kind: PoolKind,
    capacity: usize,
    active: usize,
    slots: Vec<Slot>,
}

impl EntityPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(kind: PoolKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            active: 0,
            slots: Vec::new(),
        }
    }

    /// Pool identifier stamped into issued handles.
    #[must_use]
    pub const fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Maximum number of simultaneously active records.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active records.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active
    }

    /// Reports whether no record is active.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Changes the capacity without evicting active records.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Activates a slot holding `record`.
    ///
    /// Returns `None` once the active count has reached the capacity; the pool is left untouched.
    pub fn acquire(&mut self, record: EntityRecord) -> Option<EntityHandle> {
        if self.active >= self.capacity {
            return None;
        }

        let index = match self.slots.iter().position(|slot| slot.record.is_none()) {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let handle_index = u32::try_from(index).ok()?;
        let slot = &mut self.slots[index];
        slot.record = Some(record);
        self.active += 1;

        Some(EntityHandle::new(self.kind, handle_index, slot.generation))
    }

    /// Deactivates the referenced slot and returns its record.
    ///
    /// Stale, foreign or already released handles yield `None`.
    pub fn release(&mut self, handle: EntityHandle) -> Option<EntityRecord> {
        let slot = self.slot_mut(handle)?;
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.active -= 1;
        Some(record)
    }

    /// Releases every active record and returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.active;
        for slot in &mut self.slots {
            if slot.record.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.active = 0;
        released
    }

    /// Resolves a handle to its active record.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&EntityRecord> {
        if handle.pool() != self.kind {
            return None;
        }
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.record.as_ref()
    }

    /// Resolves a handle to its active record for mutation.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut EntityRecord> {
        self.slot_mut(handle)?.record.as_mut()
    }

    /// Iterator over active records and their handles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &EntityRecord)> + '_ {
        let kind = self.kind;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            let record = slot.record.as_ref()?;
            let index = u32::try_from(index).ok()?;
            Some((EntityHandle::new(kind, index, slot.generation), record))
        })
    }

    /// Iterator over active records for mutation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EntityRecord> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.record.as_mut())
    }

    fn slot_mut(&mut self, handle: EntityHandle) -> Option<&mut Slot> {
        if handle.pool() != self.kind {
            return None;
        }
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        Some(slot)
    }
}

/// Every pool the world owns.
#[derive(Clone, Debug)]
pub(crate) struct Pools {
    regular: EntityPool,
    boss_dog: EntityPool,
    boss_tank: EntityPool,
    boss: EntityPool,
    projectile: EntityPool,
}

/// Capacity of the tiered boss slot.
pub(crate) const BOSS_CAPACITY: usize = 1;

/// Capacity of the projectile pool.
pub(crate) const PROJECTILE_CAPACITY: usize = 100;

impl Pools {
    pub(crate) fn new() -> Self {
        Self {
            regular: EntityPool::new(PoolKind::Regular, 0),
            boss_dog: EntityPool::new(PoolKind::BossDog, 0),
            boss_tank: EntityPool::new(PoolKind::BossTank, 0),
            boss: EntityPool::new(PoolKind::Boss, BOSS_CAPACITY),
            projectile: EntityPool::new(PoolKind::Projectile, PROJECTILE_CAPACITY),
        }
    }

    pub(crate) const fn get(&self, kind: PoolKind) -> &EntityPool {
        match kind {
            PoolKind::Regular => &self.regular,
            PoolKind::BossDog => &self.boss_dog,
            PoolKind::BossTank => &self.boss_tank,
            PoolKind::Boss => &self.boss,
            PoolKind::Projectile => &self.projectile,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: PoolKind) -> &mut EntityPool {
        match kind {
            PoolKind::Regular => &mut self.regular,
            PoolKind::BossDog => &mut self.boss_dog,
            PoolKind::BossTank => &mut self.boss_tank,
            PoolKind::Boss => &mut self.boss,
            PoolKind::Projectile => &mut self.projectile,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EntityPool> {
        [
            &mut self.regular,
            &mut self.boss_dog,
            &mut self.boss_tank,
            &mut self.boss,
            &mut self.projectile,
        ]
        .into_iter()
    }
}

//! Rigid row of avatars anchored to one movable center.

use cat_siege_core::{Facing, PlayerSlot, Viewport, MAX_PLAYERS};
use glam::Vec2;

use crate::pool::EntityRecord;

/// Horizontal distance between neighbouring avatars.
pub(crate) const FORMATION_SPACING: f32 = 28.0;

/// Distance the row keeps from the viewport edges.
pub(crate) const FORMATION_MARGIN: f32 = 50.0;

/// Clamps a formation center so a row of `count` avatars stays inside the margins.
pub(crate) fn clamp_center(center: Vec2, count: usize, viewport: Viewport) -> Vec2 {
    let half_row = row_width(count) / 2.0;
    Vec2::new(
        clamp_axis(
            center.x,
            FORMATION_MARGIN + half_row,
            viewport.width() - FORMATION_MARGIN - half_row,
            viewport.width() / 2.0,
        ),
        clamp_axis(
            center.y,
            FORMATION_MARGIN,
            viewport.height() - FORMATION_MARGIN,
            viewport.height() / 2.0,
        ),
    )
}

fn clamp_axis(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if min > max {
        fallback
    } else {
        value.clamp(min, max)
    }
}

fn row_width(count: usize) -> f32 {
    count.saturating_sub(1) as f32 * FORMATION_SPACING
}

fn slot_offset(index: usize, count: usize) -> f32 {
    (index as f32 - count.saturating_sub(1) as f32 / 2.0) * FORMATION_SPACING
}

/// Avatars keyed by their stable slot, kept in slot order from left to right.
#[derive(Clone, Debug)]
pub(crate) struct Formation {
    center: Vec2,
    avatars: Vec<(PlayerSlot, EntityRecord)>,
}

impl Formation {
    pub(crate) fn new(center: Vec2) -> Self {
        Self {
            center,
            avatars: Vec::with_capacity(MAX_PLAYERS),
        }
    }

    pub(crate) const fn center(&self) -> Vec2 {
        self.center
    }

    pub(crate) fn len(&self) -> usize {
        self.avatars.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.avatars.len() >= MAX_PLAYERS
    }

    /// Leftmost avatar; enemies chase it.
    pub(crate) fn lead(&self) -> Option<&EntityRecord> {
        self.avatars.first().map(|(_, avatar)| avatar)
    }

    fn position(&self, slot: PlayerSlot) -> Result<usize, usize> {
        self.avatars.binary_search_by_key(&slot, |(held, _)| *held)
    }

    pub(crate) fn get(&self, slot: PlayerSlot) -> Option<&EntityRecord> {
        let index = self.position(slot).ok()?;
        Some(&self.avatars[index].1)
    }

    pub(crate) fn get_mut(&mut self, slot: PlayerSlot) -> Option<&mut EntityRecord> {
        let index = self.position(slot).ok()?;
        Some(&mut self.avatars[index].1)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (PlayerSlot, &EntityRecord)> + '_ {
        self.avatars.iter().map(|(slot, avatar)| (*slot, avatar))
    }

    pub(crate) fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (PlayerSlot, &mut EntityRecord)> + '_ {
        self.avatars.iter_mut().map(|(slot, avatar)| (*slot, avatar))
    }

    /// Places an avatar under `slot`; occupied slots and a full row reject it.
    pub(crate) fn insert(
        &mut self,
        slot: PlayerSlot,
        avatar: EntityRecord,
        viewport: Viewport,
    ) -> bool {
        if self.is_full() {
            return false;
        }
        let Err(index) = self.position(slot) else {
            return false;
        };
        self.avatars.insert(index, (slot, avatar));
        self.relayout(viewport);
        true
    }

    pub(crate) fn remove(&mut self, slot: PlayerSlot, viewport: Viewport) -> Option<EntityRecord> {
        let index = self.position(slot).ok()?;
        let (_, avatar) = self.avatars.remove(index);
        self.relayout(viewport);
        Some(avatar)
    }

    pub(crate) fn displace(&mut self, displacement: Vec2, facing: Option<Facing>, viewport: Viewport) {
        self.center += displacement;
        if let Some(facing) = facing {
            for (_, avatar) in &mut self.avatars {
                avatar.facing = facing;
            }
        }
        self.relayout(viewport);
    }

    fn relayout(&mut self, viewport: Viewport) {
        let count = self.avatars.len();
        self.center = clamp_center(self.center, count, viewport);
        for (index, (_, avatar)) in self.avatars.iter_mut().enumerate() {
            avatar.position = Vec2::new(self.center.x + slot_offset(index, count), self.center.y);
        }
    }
}

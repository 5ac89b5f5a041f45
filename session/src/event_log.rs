//! Shared event log with one read cursor per consumer.

use cat_siege_core::Event;

/// Consumers that read the log independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reader {
    Movement,
    Spawning,
    Firing,
    BossDirector,
    Observer,
}

impl Reader {
    const COUNT: usize = 5;

    const fn index(self) -> usize {
        match self {
            Self::Movement => 0,
            Self::Spawning => 1,
            Self::Firing => 2,
            Self::BossDirector => 3,
            Self::Observer => 4,
        }
    }
}

/// Append-only buffer; every reader sees every event once, in emission order.
#[derive(Debug, Default)]
pub(crate) struct EventLog {
    events: Vec<Event>,
    cursors: [usize; Reader::COUNT],
}

impl EventLog {
    /// Buffer the world appends newly emitted events to.
    pub(crate) fn sink(&mut self) -> &mut Vec<Event> {
        &mut self.events
    }

    pub(crate) fn unread(&self, reader: Reader) -> &[Event] {
        &self.events[self.cursors[reader.index()]..]
    }

    pub(crate) fn mark_read(&mut self, reader: Reader) {
        self.cursors[reader.index()] = self.events.len();
    }

    /// Drops the prefix every reader has consumed.
    pub(crate) fn compact(&mut self) {
        let consumed = self.cursors.iter().copied().min().unwrap_or(0);
        if consumed == 0 {
            return;
        }
        let _ = self.events.drain(..consumed);
        for cursor in &mut self.cursors {
            *cursor -= consumed;
        }
    }

    /// Drops observed events that no system will ever act on.
    ///
    /// Systems only read the log while the session runs, so controls issued
    /// in between would otherwise pile up behind their cursors. Everything
    /// before the latest observed reset is dropped, and after it only the
    /// kinds the systems react to survive.
    pub(crate) fn prune_idle(&mut self) {
        let observed = self.cursors[Reader::Observer.index()];
        let last_reset = self.events[..observed]
            .iter()
            .rposition(|event| matches!(event, Event::SessionReset));
        let before = self.cursors;
        let mut kept = Vec::with_capacity(self.events.len());
        for (index, event) in std::mem::take(&mut self.events).into_iter().enumerate() {
            let after_reset = last_reset.map_or(true, |reset| index >= reset);
            if index >= observed || (after_reset && drives_systems(&event)) {
                kept.push(event);
                continue;
            }
            for (cursor, old) in self.cursors.iter_mut().zip(before) {
                if index < old {
                    *cursor -= 1;
                }
            }
        }
        self.events = kept;
    }
}

fn drives_systems(event: &Event) -> bool {
    matches!(
        event,
        Event::SessionReset
            | Event::StageChanged { .. }
            | Event::BossSpawned { .. }
            | Event::BossDefeated { .. }
            | Event::TimeAdvanced { .. }
    )
}

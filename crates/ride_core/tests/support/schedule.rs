#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use ride_core::runner::{ride_schedule, run_tick, run_ticks};
use ride_core::test_helpers::FakeHost;

/// Owns a reusable schedule so tests can step the ride one tick at a time.
pub struct TickRunner {
    schedule: Schedule,
}

impl Default for TickRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TickRunner {
    pub fn new() -> Self {
        Self {
            schedule: ride_schedule::<FakeHost>(),
        }
    }

    /// Run one tick (returns `true` if the ride schedule ran).
    pub fn tick(&mut self, world: &mut World) -> bool {
        run_tick::<FakeHost>(world, &mut self.schedule)
    }

    pub fn ticks(&mut self, world: &mut World, ticks: usize) -> usize {
        run_ticks::<FakeHost>(world, &mut self.schedule, ticks)
    }

    /// Tick until `done` holds, returning the number of ticks taken.
    pub fn tick_until(
        &mut self,
        world: &mut World,
        max_ticks: usize,
        done: impl Fn(&World) -> bool,
    ) -> Option<usize> {
        for taken in 1..=max_ticks {
            self.tick(world);
            if done(world) {
                return Some(taken);
            }
        }
        None
    }
}

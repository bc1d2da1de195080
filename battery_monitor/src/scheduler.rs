use alloc::vec;
use alloc::vec::Vec;

use no_std_compat::cell::{Cell, RefCell};

/// Period and last fire time of one periodic task
#[derive(Debug)]
pub struct ScheduleState {
    period: u32,
    last_fire: Cell<u32>,
}

impl ScheduleState {
    pub fn new(period: u32) -> Self {
        ScheduleState {
            period,
            last_fire: Cell::new(0),
        }
    }

    pub fn last_fire(&self) -> u32 {
        self.last_fire.get()
    }

    /// Survives the clock wrapping around
    pub fn is_due(&self, now: u32) -> bool {
        now.wrapping_sub(self.last_fire.get()) >= self.period
    }

    /// Marks the task as fired at [now]. A late task restarts its period from here and does not
    /// catch up with the missed fires.
    pub fn fire(&self, now: u32) {
        self.last_fire.set(now);
    }
}

/// Cooperative multi-rate runner. Tasks are checked in the order they were added, which is also
/// their priority. A long running task delays the checks of the tasks after it.
pub struct Scheduler<T> {
    tasks: RefCell<Vec<(T, ScheduleState)>>,
}

impl<T: Copy> Scheduler<T> {
    pub fn create() -> Scheduler<T> {
        Scheduler {
            tasks: RefCell::new(vec![]),
        }
    }

    pub fn every(&self, period: u32, payload: T) {
        self.tasks
            .borrow_mut()
            .push((payload, ScheduleState::new(period)));
    }

    /// Restarts every period from [now]
    pub fn reset(&self, now: u32) {
        for (_, state) in self.tasks.borrow().iter() {
            state.fire(now);
        }
    }

    /// One loop iteration. All due checks see the same [now], each task fires at most once.
    /// Returns the number of tasks fired.
    pub fn run_once(&self, now: u32, handler: &dyn Fn(T)) -> usize {
        let len = self.tasks.borrow().len();
        let mut fired = 0;
        for i in 0..len {
            let due = {
                let tasks = self.tasks.borrow();
                let (payload, state) = &tasks[i];
                if state.is_due(now) {
                    state.fire(now);
                    Some(*payload)
                } else {
                    None
                }
            };
            if let Some(payload) = due {
                handler(payload);
                fired += 1;
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn last_fire(&self, payload: T) -> Option<u32>
    where
        T: PartialEq,
    {
        self.tasks
            .borrow()
            .iter()
            .find(|(it, _)| *it == payload)
            .map(|(_, state)| state.last_fire())
    }
}

#[cfg(test)]
mod test {
    use crate::scheduler::ScheduleState;

    #[test]
    fn due_check_survives_clock_wrap() {
        let state = ScheduleState::new(500);
        state.fire(u32::MAX - 100);
        assert!(!state.is_due(u32::MAX));
        assert!(!state.is_due(398));
        assert!(state.is_due(399));
    }

    #[test]
    fn firing_restarts_period_from_now() {
        let state = ScheduleState::new(1000);
        assert!(state.is_due(2500));
        state.fire(2500);
        assert!(!state.is_due(3000));
        assert!(state.is_due(3500));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use battery_monitor::scheduler::Scheduler;

    fn scheduler(periods: &[(u32, u32)]) -> Scheduler<u32> {
        let scheduler = Scheduler::create();
        for (period, payload) in periods {
            scheduler.every(*period, *payload);
        }
        scheduler
    }

    #[test]
    fn tasks_are_registered() {
        let scheduler = scheduler(&[(5000, 1), (5000, 2), (500, 9)]);
        assert_eq!(scheduler.len(), 3);
    }

    #[test]
    fn nothing_fires_before_the_first_period() {
        let scheduler = scheduler(&[(5000, 1), (500, 9)]);
        let fired = scheduler.run_once(499, &|_| panic!("nothing is due"));
        assert_eq!(fired, 0);
    }

    #[test]
    fn due_tasks_fire_in_declaration_order() {
        let scheduler = scheduler(&[(5000, 1), (5000, 2), (500, 9)]);
        let events: RefCell<Vec<u32>> = RefCell::new(vec![]);

        // when all three are due in the same iteration
        scheduler.run_once(5000, &|payload| events.borrow_mut().push(payload));

        // then they fire by priority and observe the same now
        assert_eq!(*events.borrow(), vec![1, 2, 9]);
        assert_eq!(scheduler.last_fire(1), Some(5000));
        assert_eq!(scheduler.last_fire(2), Some(5000));
        assert_eq!(scheduler.last_fire(9), Some(5000));
    }

    #[test]
    fn late_task_does_not_catch_up() {
        let scheduler = scheduler(&[(500, 9)]);
        let events: RefCell<Vec<u32>> = RefCell::new(vec![]);

        // when the loop was blocked for four periods
        scheduler.run_once(2000, &|payload| events.borrow_mut().push(payload));
        scheduler.run_once(2001, &|payload| events.borrow_mut().push(payload));

        // then the task fires once and restarts its period from the late fire
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(scheduler.last_fire(9), Some(2000));
        scheduler.run_once(2499, &|payload| events.borrow_mut().push(payload));
        assert_eq!(events.borrow().len(), 1);
        scheduler.run_once(2500, &|payload| events.borrow_mut().push(payload));
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn fire_count_matches_period_over_a_window() {
        let scheduler = scheduler(&[(5000, 1), (5000, 2), (500, 9)]);
        let fires: RefCell<Vec<(u32, u32)>> = RefCell::new(vec![]);
        let window = 60_000;

        for now in 0..=window {
            scheduler.run_once(now, &|payload| fires.borrow_mut().push((payload, now)));
        }

        for (payload, period) in [(1, 5000), (2, 5000), (9, 500)].iter() {
            let times: Vec<u32> = fires
                .borrow()
                .iter()
                .filter(|(it, _)| it == payload)
                .map(|(_, when)| *when)
                .collect();
            let expected = (window / period) as i64;
            assert!(
                (times.len() as i64 - expected).abs() <= 1,
                "task {} fired {} times, expected {}",
                payload,
                times.len(),
                expected
            );
            // never twice within one period
            assert!(times.windows(2).all(|pair| pair[1] - pair[0] >= *period));
        }
    }

    #[test]
    fn periods_survive_clock_wrap() {
        let scheduler = scheduler(&[(500, 9)]);
        let events: RefCell<Vec<u32>> = RefCell::new(vec![]);
        scheduler.reset(u32::MAX - 200);

        scheduler.run_once(u32::MAX, &|payload| events.borrow_mut().push(payload));
        assert!(events.borrow().is_empty());

        scheduler.run_once(299, &|payload| events.borrow_mut().push(payload));
        assert_eq!(*events.borrow(), vec![9]);
    }
}

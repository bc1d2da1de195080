use no_std_compat::cell::Cell;

/// Elapsed time since start, kept in 64 bits so it outlives the wrapping millisecond clock.
pub struct Uptime {
    last: Cell<u32>,
    elapsed: Cell<u64>,
}

impl Uptime {
    pub fn create(now: u32) -> Self {
        Uptime {
            last: Cell::new(now),
            elapsed: Cell::new(0),
        }
    }

    pub fn reset(&self, now: u32) {
        self.last.set(now);
        self.elapsed.set(0);
    }

    /// Must be called at least once per clock wrap (~49 days)
    pub fn update(&self, now: u32) -> u64 {
        let delta = now.wrapping_sub(self.last.get());
        self.last.set(now);
        self.elapsed.set(self.elapsed.get() + delta as u64);
        self.elapsed.get()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.get()
    }
}

#[cfg(test)]
mod test {
    use crate::uptime::Uptime;

    #[test]
    fn elapsed_time_accumulates_across_clock_wrap() {
        let uptime = Uptime::create(u32::MAX - 999);
        assert_eq!(uptime.update(u32::MAX), 999);
        assert_eq!(uptime.update(1000), 2000);
        assert_eq!(uptime.update(u32::MAX - 999), u32::MAX as u64 + 1);
    }
}

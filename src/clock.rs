use chrono::{DateTime, Duration, Utc};

/// Time source for the session. `Fixed` only moves when advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Move a fixed clock forward; the system clock ignores this.
    pub fn advance(&mut self, by: Duration) {
        if let Clock::Fixed(t) = self {
            *t += by;
        }
    }

    pub fn set(&mut self, to: DateTime<Utc>) {
        if let Clock::Fixed(t) = self {
            *t = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let start = Utc::now();
        let mut clock = Clock::Fixed(start);
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::System;
        let before = Utc::now();
        clock.advance(Duration::days(1));
        assert!(clock.now() < before + Duration::hours(1));
    }
}

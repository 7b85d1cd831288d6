//! ISO-8601 durations limited to days, hours, minutes and seconds.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::EditorError;

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
            .expect("static duration regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl DurationUnit {
    /// Largest first, in the order the ISO components appear.
    pub const ALL: [DurationUnit; 4] = [
        DurationUnit::Days,
        DurationUnit::Hours,
        DurationUnit::Minutes,
        DurationUnit::Seconds,
    ];

    pub fn seconds(self) -> u64 {
        match self {
            DurationUnit::Seconds => 1,
            DurationUnit::Minutes => 60,
            DurationUnit::Hours => 3_600,
            DurationUnit::Days => 86_400,
        }
    }
}

/// An amount of one unit, the editable form of a duration literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    pub amount: u64,
    pub unit: DurationUnit,
}

impl Default for Duration {
    fn default() -> Self {
        Self {
            amount: 0,
            unit: DurationUnit::Seconds,
        }
    }
}

impl Duration {
    pub fn new(amount: u64, unit: DurationUnit) -> Self {
        Self { amount, unit }
    }

    /// Express `total` seconds in the largest unit that divides it exactly.
    pub fn from_seconds(total: u64) -> Self {
        if total == 0 {
            return Self::default();
        }
        DurationUnit::ALL
            .into_iter()
            .find(|unit| total % unit.seconds() == 0)
            .map_or_else(Self::default, |unit| Self::new(total / unit.seconds(), unit))
    }

    pub fn total_seconds(&self) -> Option<u64> {
        self.amount.checked_mul(self.unit.seconds())
    }

    /// Largest amount of `unit` whose total still fits in a `u64` of seconds.
    pub fn max_amount(unit: DurationUnit) -> u64 {
        u64::MAX / unit.seconds()
    }

    /// Parse `P[nD]T[nH][nM][nS]`. A single component keeps its own unit so
    /// that literals written by [`to_iso`](Self::to_iso) read back unchanged;
    /// several components collapse to the largest exact unit.
    pub fn parse_iso(text: &str) -> Result<Self, EditorError> {
        let invalid = || EditorError::InvalidDuration(text.to_string());
        if text == "P" || text.ends_with('T') {
            return Err(invalid());
        }
        let caps = duration_re().captures(text).ok_or_else(invalid)?;
        let mut total: u64 = 0;
        let mut components = Vec::with_capacity(4);
        for (group, unit) in (1..=4).zip(DurationUnit::ALL) {
            let Some(m) = caps.get(group) else { continue };
            let amount: u64 = m.as_str().parse().map_err(|_| invalid())?;
            total = amount
                .checked_mul(unit.seconds())
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(invalid)?;
            components.push(Self::new(amount, unit));
        }
        match components.as_slice() {
            [single] => Ok(*single),
            _ => Ok(Self::from_seconds(total)),
        }
    }

    pub fn to_iso(&self) -> String {
        match self.unit {
            DurationUnit::Days => format!("P{}D", self.amount),
            DurationUnit::Hours => format!("PT{}H", self.amount),
            DurationUnit::Minutes => format!("PT{}M", self.amount),
            DurationUnit::Seconds => format!("PT{}S", self.amount),
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl FromStr for Duration {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Duration::parse_iso(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose() {
        let cases = [
            ("PT0S", 0, DurationUnit::Seconds),
            ("PT90S", 90, DurationUnit::Seconds),
            ("PT120S", 120, DurationUnit::Seconds),
            ("PT120M", 120, DurationUnit::Minutes),
            ("PT48H", 48, DurationUnit::Hours),
            ("P3D", 3, DurationUnit::Days),
            ("PT1H30M", 90, DurationUnit::Minutes),
            ("P1DT1H", 25, DurationUnit::Hours),
            ("P1DT24H", 2, DurationUnit::Days),
            ("P0D", 0, DurationUnit::Days),
        ];
        for (text, amount, unit) in cases {
            assert_eq!(
                Duration::parse_iso(text).unwrap(),
                Duration::new(amount, unit),
                "{text}"
            );
        }
    }

    #[test]
    fn test_encode() {
        assert_eq!(Duration::default().to_iso(), "PT0S");
        assert_eq!(Duration::new(5, DurationUnit::Days).to_iso(), "P5D");
        assert_eq!(Duration::new(90, DurationUnit::Minutes).to_string(), "PT90M");
        assert_eq!("PT90M".parse::<Duration>().unwrap().to_iso(), "PT90M");
    }

    #[test]
    fn test_rejects() {
        for text in ["", "P", "PT", "P1DT", "1D", "P1W", "PT1.5S", "P-1D", "PT1S1H"] {
            assert!(
                matches!(Duration::parse_iso(text), Err(EditorError::InvalidDuration(_))),
                "{text}"
            );
        }
        assert!(Duration::parse_iso("P999999999999999999D").is_err());
    }

    #[test]
    fn test_max_amount_reads_back() {
        for unit in DurationUnit::ALL {
            let longest = Duration::new(Duration::max_amount(unit), unit);
            assert_eq!(Duration::parse_iso(&longest.to_iso()).unwrap(), longest);
            if let Some(amount) = Duration::max_amount(unit).checked_add(1) {
                let over = Duration::new(amount, unit);
                assert!(Duration::parse_iso(&over.to_iso()).is_err(), "{unit:?}");
            }
        }
    }
}

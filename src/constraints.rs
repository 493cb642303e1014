//! Delivery constraints and the rule set that derives them from free text.
//!
//! Notes like "中午前不在" or "晚上再送" and product descriptions like
//! "冷凍水餃" are turned into avoid/preferred time slots and a priority.
//! Rules are applied in order and their effects accumulate.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::Destination;

pub(crate) fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(hour * 3600 + minute * 60, 0).unwrap_or_default()
}

/// Run-wide settings for the simulated delivery clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConstraints {
    /// Time the vehicle leaves the origin.
    pub departure: NaiveTime,
    /// Time spent at each stop before the next leg begins.
    pub service_minutes: u32,
}

impl Default for DeliveryConstraints {
    fn default() -> Self {
        Self {
            departure: clock(9, 0),
            service_minutes: 15,
        }
    }
}

impl DeliveryConstraints {
    pub fn service_time(&self) -> Duration {
        Duration::minutes(i64::from(self.service_minutes))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// Half-open time-of-day interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub reason: String,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime, reason: impl Into<String>) -> Self {
        Self {
            start,
            end,
            reason: reason.into(),
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Constraints derived for one destination during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConstraints {
    pub preferred: Vec<TimeSlot>,
    pub avoid: Vec<TimeSlot>,
    pub priority: Priority,
}

impl DestinationConstraints {
    pub fn is_constrained(&self) -> bool {
        !self.preferred.is_empty() || !self.avoid.is_empty() || self.priority >= Priority::High
    }

    /// Arrival must miss every avoid slot and, if any preferred slot exists,
    /// fall inside one of them.
    pub fn accepts(&self, arrival: NaiveTime) -> bool {
        if self.avoid.iter().any(|slot| slot.contains(arrival)) {
            return false;
        }
        self.preferred.is_empty() || self.preferred.iter().any(|slot| slot.contains(arrival))
    }

    /// [`accepts`](Self::accepts) for an arrival `day` midnights after
    /// departure. Slots belong to the delivery day, so a later arrival is
    /// inside none of them.
    pub fn accepts_on(&self, day: u32, arrival: NaiveTime) -> bool {
        if day == 0 {
            self.accepts(arrival)
        } else {
            self.preferred.is_empty()
        }
    }

    /// Raises the priority to at least `level`; never lowers it.
    pub fn raise_priority(&mut self, level: Priority) {
        self.priority = self.priority.max(level);
    }
}

/// Which text a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Note,
    Product,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Avoid(TimeSlot),
    Prefer(TimeSlot),
    Priority(Priority),
}

impl Effect {
    fn apply(&self, out: &mut DestinationConstraints) {
        match self {
            Effect::Avoid(slot) => out.avoid.push(slot.clone()),
            Effect::Prefer(slot) => out.preferred.push(slot.clone()),
            Effect::Priority(level) => out.raise_priority(*level),
        }
    }
}

/// A predicate over a destination's text with an effect on its constraints.
pub trait ConstraintRule: Send + Sync {
    fn name(&self) -> &str;

    /// `note` and `product` are already lowercased.
    fn apply(&self, note: &str, product: &str, out: &mut DestinationConstraints);
}

/// Fires its effect once when any keyword occurs in the chosen field.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    name: String,
    field: Field,
    keywords: Vec<String>,
    effect: Effect,
}

impl KeywordRule {
    pub fn new(name: impl Into<String>, field: Field, keywords: &[&str], effect: Effect) -> Self {
        Self {
            name: name.into(),
            field,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            effect,
        }
    }
}

impl ConstraintRule for KeywordRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, note: &str, product: &str, out: &mut DestinationConstraints) {
        let text = match self.field {
            Field::Note => note,
            Field::Product => product,
        };
        if self.keywords.iter().any(|keyword| text.contains(keyword.as_str())) {
            self.effect.apply(out);
        }
    }
}

/// Turns clock times written in the note (`14:30`, `14：30`, `9點`) into
/// preferred slots of fixed length.
#[derive(Debug, Clone)]
pub struct ClockTimeRule {
    pub earliest_hour: u32,
    pub latest_hour: u32,
    pub length_minutes: u32,
    pub reason: String,
}

impl Default for ClockTimeRule {
    fn default() -> Self {
        Self {
            earliest_hour: 8,
            latest_hour: 21,
            length_minutes: 60,
            reason: "customer requested time".to_string(),
        }
    }
}

const CLOCK_SEPARATORS: [char; 3] = [':', '：', '點'];

/// Every `H:MM`-style time in `text`, scanned left to right without overlap.
fn clock_times(text: &str) -> Vec<(u32, u32)> {
    let chars: Vec<char> = text.chars().collect();
    let mut found = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match clock_at(&chars, i) {
            Some((hour, minute, next)) => {
                found.push((hour, minute));
                i = next;
            }
            None => i += 1,
        }
    }
    found
}

fn clock_at(chars: &[char], start: usize) -> Option<(u32, u32, usize)> {
    for width in [2, 1] {
        let sep = start + width;
        if sep >= chars.len() {
            continue;
        }
        let Some(hour) = digits(&chars[start..sep]) else {
            continue;
        };
        if !CLOCK_SEPARATORS.contains(&chars[sep]) {
            continue;
        }

        let minute_end = chars[sep + 1..]
            .iter()
            .take(2)
            .take_while(|c| c.is_ascii_digit())
            .count()
            + sep
            + 1;
        let minute = digits(&chars[sep + 1..minute_end]).unwrap_or(0);
        return Some((hour, minute, minute_end));
    }
    None
}

fn digits(chars: &[char]) -> Option<u32> {
    if chars.is_empty() {
        return None;
    }
    chars
        .iter()
        .try_fold(0, |acc, c| c.to_digit(10).map(|d| acc * 10 + d))
}

impl ConstraintRule for ClockTimeRule {
    fn name(&self) -> &str {
        "clock-time"
    }

    fn apply(&self, note: &str, _product: &str, out: &mut DestinationConstraints) {
        for (hour, minute) in clock_times(note) {
            if hour < self.earliest_hour || hour > self.latest_hour {
                continue;
            }
            let start = clock(hour, minute);
            let end = start + Duration::minutes(i64::from(self.length_minutes));
            out.preferred.push(TimeSlot::new(start, end, self.reason.clone()));
        }
    }
}

/// Ordered rule list applied to every destination.
pub struct ConstraintRules {
    rules: Vec<Box<dyn ConstraintRule>>,
}

impl std::fmt::Debug for ConstraintRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name()))
            .finish()
    }
}

impl Default for ConstraintRules {
    fn default() -> Self {
        const NOT_HOME: &str = "customer not home";
        Self::empty()
            .with(KeywordRule::new(
                "away-until-noon",
                Field::Note,
                &["中午前不在", "上午不在", "not home before noon", "not home in the morning"],
                Effect::Avoid(TimeSlot::new(clock(8, 0), clock(12, 0), NOT_HOME)),
            ))
            .with(KeywordRule::new(
                "away-until-14",
                Field::Note,
                &["下午前不在", "14點前不在", "not home before 14", "not home before 2pm"],
                Effect::Avoid(TimeSlot::new(clock(8, 0), clock(14, 0), NOT_HOME)),
            ))
            .with(KeywordRule::new(
                "evening",
                Field::Note,
                &["晚上", "18點後", "evening", "after 18"],
                Effect::Prefer(TimeSlot::new(
                    clock(18, 0),
                    clock(21, 0),
                    "customer prefers evening",
                )),
            ))
            .with(KeywordRule::new(
                "urgent",
                Field::Note,
                &["緊急", "急件", "優先", "urgent", "priority"],
                Effect::Priority(Priority::High),
            ))
            .with(ClockTimeRule::default())
            .with(KeywordRule::new(
                "cold-chain",
                Field::Product,
                &["冷凍", "冷藏", "生鮮", "frozen", "chilled", "perishable"],
                Effect::Priority(Priority::High),
            ))
    }
}

impl ConstraintRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with(mut self, rule: impl ConstraintRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn extract(&self, destination: &Destination) -> DestinationConstraints {
        let note = destination.note.as_deref().unwrap_or_default().to_lowercase();
        let product = destination
            .product_info
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let mut out = DestinationConstraints::default();
        for rule in &self.rules {
            rule.apply(&note, &product, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(note: &str) -> Destination {
        Destination::new(1, "Lin", "高雄市三民區建國二路318號").with_note(note)
    }

    #[test]
    fn test_no_recognized_phrase_is_unconstrained() {
        let constraints = ConstraintRules::default().extract(&dest("放管理室"));
        assert_eq!(constraints, DestinationConstraints::default());
        assert!(!constraints.is_constrained());
    }

    #[test]
    fn test_missing_note_and_product() {
        let destination = Destination::new(1, "Lin", "somewhere");
        let constraints = ConstraintRules::default().extract(&destination);
        assert_eq!(constraints.priority, Priority::Normal);
        assert!(!constraints.is_constrained());
    }

    #[test]
    fn test_away_until_noon() {
        let constraints = ConstraintRules::default().extract(&dest("中午前不在家"));
        assert_eq!(constraints.avoid.len(), 1);
        assert_eq!(constraints.avoid[0].start, clock(8, 0));
        assert_eq!(constraints.avoid[0].end, clock(12, 0));
        assert!(!constraints.accepts(clock(11, 59)));
        assert!(constraints.accepts(clock(12, 0)));
    }

    #[test]
    fn test_evening_preference() {
        let constraints = ConstraintRules::default().extract(&dest("晚上再送"));
        assert_eq!(
            constraints.preferred,
            vec![TimeSlot::new(clock(18, 0), clock(21, 0), "customer prefers evening")]
        );
        assert!(!constraints.accepts(clock(9, 30)));
        assert!(constraints.accepts(clock(19, 0)));
    }

    #[test]
    fn test_effects_are_additive() {
        let constraints = ConstraintRules::default().extract(&dest("上午不在，急件，14:30 以後"));
        assert_eq!(constraints.avoid.len(), 1);
        assert_eq!(constraints.priority, Priority::High);
        assert_eq!(
            constraints.preferred,
            vec![TimeSlot::new(clock(14, 30), clock(15, 30), "customer requested time")]
        );
    }

    #[test]
    fn test_clock_time_variants() {
        assert_eq!(clock_times("10點送"), vec![(10, 0)]);
        assert_eq!(clock_times("請在9:05到"), vec![(9, 5)]);
        assert_eq!(clock_times("16：00前"), vec![(16, 0)]);
        assert_eq!(clock_times("8:00 或 17點30"), vec![(8, 0), (17, 30)]);
        assert_eq!(clock_times("門牌123號"), Vec::<(u32, u32)>::new());
    }

    #[test]
    fn test_clock_time_out_of_range_is_ignored() {
        let constraints = ConstraintRules::default().extract(&dest("7:30 or 22:00"));
        assert!(constraints.preferred.is_empty());
    }

    #[test]
    fn test_away_until_14_also_yields_clock_slot() {
        let constraints = ConstraintRules::default().extract(&dest("14點前不在"));
        assert_eq!(constraints.avoid[0].end, clock(14, 0));
        assert_eq!(constraints.preferred[0].start, clock(14, 0));
    }

    #[test]
    fn test_cold_chain_product_is_high_priority() {
        let destination = Destination::new(2, "Wu", "高雄市鼓山區").with_product("冷凍水餃 x3");
        assert_eq!(ConstraintRules::default().extract(&destination).priority, Priority::High);
    }

    #[test]
    fn test_priority_is_never_lowered() {
        let mut constraints = DestinationConstraints {
            priority: Priority::Urgent,
            ..DestinationConstraints::default()
        };
        constraints.raise_priority(Priority::High);
        assert_eq!(constraints.priority, Priority::Urgent);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let constraints = ConstraintRules::default().extract(&dest("URGENT please"));
        assert_eq!(constraints.priority, Priority::High);
    }

    #[test]
    fn test_custom_rule_set() {
        let rules = ConstraintRules::empty().with(KeywordRule::new(
            "lunch",
            Field::Note,
            &["lunch"],
            Effect::Avoid(TimeSlot::new(clock(12, 0), clock(13, 0), "lunch break")),
        ));
        assert_eq!(rules.len(), 1);

        let constraints = rules.extract(&dest("closed for lunch, 晚上"));
        assert_eq!(constraints.avoid.len(), 1);
        assert!(constraints.preferred.is_empty());
    }

    #[test]
    fn test_time_slot_is_half_open() {
        let slot = TimeSlot::new(clock(8, 0), clock(12, 0), "x");
        assert!(slot.contains(clock(8, 0)));
        assert!(!slot.contains(clock(12, 0)));
    }

    #[test]
    fn test_next_day_arrival_misses_every_slot() {
        let rules = ConstraintRules::default();
        let away = rules.extract(&dest("中午前不在"));
        let evening = rules.extract(&dest("晚上"));
        assert!(!away.accepts_on(0, clock(9, 30)));
        assert!(away.accepts_on(1, clock(9, 30)));
        assert!(evening.accepts_on(0, clock(19, 0)));
        assert!(!evening.accepts_on(1, clock(19, 0)));
    }
}

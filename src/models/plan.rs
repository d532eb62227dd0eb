//! Learning-plan input model
//!
//! Plans are produced by the curriculum service and consumed here read-only.
//! The aggregation pipeline never mutates a plan; it only derives queries
//! from it.

use serde::{Deserialize, Serialize};

/// Difficulty phase of a plan day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Beginner,
    Intermediate,
    Advanced,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Beginner => "beginner",
            Phase::Intermediate => "intermediate",
            Phase::Advanced => "advanced",
        }
    }

    /// Phase for a 1-based day position within a plan of the given duration,
    /// split into thirds (rounding the first boundary up).
    pub fn for_position(day_number: u32, duration_days: u32) -> Phase {
        let third = duration_days.div_ceil(3).max(1);
        if day_number <= third {
            Phase::Beginner
        } else if day_number <= third * 2 {
            Phase::Intermediate
        } else {
            Phase::Advanced
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDay {
    /// 1-based day number
    pub day_number: u32,
    /// Day title, e.g. "Intro to ownership"
    pub title: String,
    pub phase: Phase,
    /// Fine-grained subjects covered by this day
    #[serde(default)]
    pub micro_topics: Vec<String>,
}

/// A day-structured curriculum for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Overall subject, e.g. "rust ownership"
    pub topic: String,
    /// Total plan length in days
    pub duration_days: u32,
    pub days: Vec<PlanDay>,
}

impl Plan {
    /// Minimal plan derived from (topic, duration) alone: "Day n" titles,
    /// phases assigned by thirds, no micro-topics. Used when aggregation is
    /// triggered before the full curriculum is available.
    pub fn skeleton(topic: &str, duration_days: u32) -> Self {
        let days = (1..=duration_days)
            .map(|n| PlanDay {
                day_number: n,
                title: format!("Day {}", n),
                phase: Phase::for_position(n, duration_days),
                micro_topics: Vec::new(),
            })
            .collect();
        Self {
            topic: topic.to_string(),
            duration_days,
            days,
        }
    }

    /// Structural validation for plans arriving over the API.
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("plan topic must not be empty".to_string());
        }
        if self.duration_days == 0 {
            return Err("plan duration must be at least 1 day".to_string());
        }
        if self.days.is_empty() {
            return Err("plan must contain at least one day".to_string());
        }
        for day in &self.days {
            if day.day_number == 0 || day.day_number > self.duration_days {
                return Err(format!(
                    "day number {} outside plan duration {}",
                    day.day_number, self.duration_days
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_split_by_thirds() {
        assert_eq!(Phase::for_position(1, 30), Phase::Beginner);
        assert_eq!(Phase::for_position(10, 30), Phase::Beginner);
        assert_eq!(Phase::for_position(11, 30), Phase::Intermediate);
        assert_eq!(Phase::for_position(20, 30), Phase::Intermediate);
        assert_eq!(Phase::for_position(21, 30), Phase::Advanced);
        assert_eq!(Phase::for_position(30, 30), Phase::Advanced);
    }

    #[test]
    fn phase_split_short_plan() {
        assert_eq!(Phase::for_position(1, 1), Phase::Beginner);
        assert_eq!(Phase::for_position(1, 2), Phase::Beginner);
        assert_eq!(Phase::for_position(2, 2), Phase::Intermediate);
    }

    #[test]
    fn skeleton_covers_every_day() {
        let plan = Plan::skeleton("rust ownership", 7);
        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.days[0].day_number, 1);
        assert_eq!(plan.days[0].title, "Day 1");
        assert_eq!(plan.days[6].day_number, 7);
        assert_eq!(plan.days[6].phase, Phase::Advanced);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_topic_and_bad_day_numbers() {
        let mut plan = Plan::skeleton("  ", 3);
        assert!(plan.validate().is_err());

        plan.topic = "graphs".to_string();
        plan.days[1].day_number = 9;
        assert!(plan.validate().is_err());
    }

    #[test]
    fn phase_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Phase::Intermediate).unwrap(),
            "\"intermediate\""
        );
    }
}

//! Weekly progress check-ins.
//!
//! One check-in per learner per ISO week. The week is identified by its
//! Monday, which also forms the store key: `{user_id}/{YYYY-MM-DD}`.

use crate::error::{MakaamError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_WEEKLY_HOURS: f32 = 168.0;

/// Earliest date a check-in may refer to.
pub fn earliest_checkin_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkin {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start: NaiveDate,
    pub hours_spent: f32,
    /// Self-reported mood/confidence, 1 (struggling) to 5 (great).
    pub mood: u8,
    #[serde(default)]
    pub accomplishments: String,
    #[serde(default)]
    pub blockers: String,
    #[serde(default)]
    pub completed_milestones: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied fields for a new check-in.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCheckin {
    /// Any date inside the target week; defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub hours_spent: f32,
    pub mood: u8,
    #[serde(default)]
    pub accomplishments: String,
    #[serde(default)]
    pub blockers: String,
    #[serde(default)]
    pub completed_milestones: Vec<String>,
}

impl NewCheckin {
    /// `today` bounds the optional `date`: no future weeks, nothing before
    /// [`earliest_checkin_date`].
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(date) = self.date {
            if date > today {
                return Err(MakaamError::Validation(format!(
                    "date {date} is in the future"
                )));
            }
            if date < earliest_checkin_date() {
                return Err(MakaamError::Validation(format!(
                    "date {date} is before {}",
                    earliest_checkin_date()
                )));
            }
        }
        if !self.hours_spent.is_finite() || !(0.0..=MAX_WEEKLY_HOURS).contains(&self.hours_spent)
        {
            return Err(MakaamError::Validation(format!(
                "hours_spent must be between 0 and {MAX_WEEKLY_HOURS}"
            )));
        }
        if !(1..=5).contains(&self.mood) {
            return Err(MakaamError::Validation(
                "mood must be between 1 and 5".into(),
            ));
        }
        Ok(())
    }

    pub fn into_checkin(self, user_id: Uuid, today: NaiveDate) -> Result<Checkin> {
        self.validate(today)?;
        let mut milestones: Vec<String> = Vec::new();
        for id in self.completed_milestones {
            let id = id.trim().to_string();
            if !id.is_empty() && !milestones.contains(&id) {
                milestones.push(id);
            }
        }
        Ok(Checkin {
            id: Uuid::new_v4(),
            user_id,
            week_start: week_start_for(self.date.unwrap_or(today)),
            hours_spent: self.hours_spent,
            mood: self.mood,
            accomplishments: self.accomplishments.trim().to_string(),
            blockers: self.blockers.trim().to_string(),
            completed_milestones: milestones,
            created_at: Utc::now(),
        })
    }
}

impl Checkin {
    pub fn store_key(&self) -> String {
        store_key(self.user_id, self.week_start)
    }
}

pub fn store_key(user_id: Uuid, week_start: NaiveDate) -> String {
    format!("{}/{}", user_id, week_start.format("%Y-%m-%d"))
}

pub fn user_key_prefix(user_id: Uuid) -> String {
    format!("{user_id}/")
}

/// The Monday starting the ISO week that contains `date`.
///
/// Dates in the first partial week of chrono's range map to themselves.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_monday(),
    )))
    .unwrap_or(date)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckinSummary {
    pub total_checkins: usize,
    pub total_hours: f32,
    pub average_mood: Option<f32>,
    /// Consecutive weeks with a check-in, ending this week or last week.
    pub current_streak_weeks: u32,
    pub last_checkin: Option<NaiveDate>,
}

pub fn summarize(checkins: &[Checkin], today: NaiveDate) -> CheckinSummary {
    let total_checkins = checkins.len();
    let total_hours = checkins.iter().map(|c| c.hours_spent).sum();
    let average_mood = (total_checkins > 0).then(|| {
        let sum: u32 = checkins.iter().map(|c| u32::from(c.mood)).sum();
        ((sum as f32 / total_checkins as f32) * 10.0).round() / 10.0
    });

    let mut weeks: Vec<NaiveDate> = checkins.iter().map(|c| c.week_start).collect();
    weeks.sort_unstable_by(|a, b| b.cmp(a));
    weeks.dedup();

    let this_week = week_start_for(today);
    let mut streak = 0u32;
    if let Some(&latest) = weeks.first() {
        // A streak survives until the current week ends without a check-in.
        if latest == this_week || latest == this_week - Duration::weeks(1) {
            let mut expected = latest;
            for w in &weeks {
                if *w != expected {
                    break;
                }
                streak += 1;
                expected -= Duration::weeks(1);
            }
        }
    }

    CheckinSummary {
        total_checkins,
        total_hours,
        average_mood,
        current_streak_weeks: streak,
        last_checkin: weeks.first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checkin_on(user: Uuid, day: NaiveDate, hours: f32, mood: u8) -> Checkin {
        NewCheckin {
            date: Some(day),
            hours_spent: hours,
            mood,
            accomplishments: String::new(),
            blockers: String::new(),
            completed_milestones: Vec::new(),
        }
        .into_checkin(user, day)
        .unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-05-15 is a Wednesday.
        assert_eq!(week_start_for(date(2024, 5, 15)), date(2024, 5, 13));
        assert_eq!(week_start_for(date(2024, 5, 13)), date(2024, 5, 13));
        assert_eq!(week_start_for(date(2024, 5, 19)), date(2024, 5, 13));
    }

    #[test]
    fn store_key_is_prefixed_by_user() {
        let user = Uuid::new_v4();
        let c = checkin_on(user, date(2024, 5, 15), 3.0, 4);
        assert_eq!(c.store_key(), format!("{user}/2024-05-13"));
        assert!(c.store_key().starts_with(&user_key_prefix(user)));
    }

    #[test]
    fn validation_bounds() {
        let mut n = NewCheckin {
            date: None,
            hours_spent: 5.0,
            mood: 3,
            accomplishments: String::new(),
            blockers: String::new(),
            completed_milestones: vec![" p1-m1 ".into(), "p1-m1".into()],
        };
        assert!(n.validate(date(2024, 1, 3)).is_ok());
        let c = n.clone().into_checkin(Uuid::new_v4(), date(2024, 1, 3)).unwrap();
        assert_eq!(c.completed_milestones, vec!["p1-m1"]);
        assert_eq!(c.week_start, date(2024, 1, 1));

        let today = date(2024, 1, 3);
        n.mood = 0;
        assert!(n.validate(today).is_err());
        n.mood = 5;
        n.hours_spent = 200.0;
        assert!(n.validate(today).is_err());
        n.hours_spent = f32::NAN;
        assert!(n.validate(today).is_err());
    }

    #[test]
    fn out_of_range_dates_are_rejected() {
        let today = date(2024, 5, 15);
        let mut n: NewCheckin =
            serde_json::from_str(r#"{"date":"-262143-01-01","hours_spent":1,"mood":3}"#).unwrap();
        let err = n.clone().into_checkin(Uuid::new_v4(), today).unwrap_err();
        assert!(matches!(err, MakaamError::Validation(_)));

        n.date = Some(date(2024, 5, 20));
        assert!(n.validate(today).is_err());
        n.date = Some(date(1999, 12, 31));
        assert!(n.validate(today).is_err());
        n.date = Some(today);
        assert!(n.validate(today).is_ok());
    }

    #[test]
    fn week_start_near_range_floor_does_not_panic() {
        assert_eq!(week_start_for(NaiveDate::MIN), NaiveDate::MIN);
    }

    #[test]
    fn summary_of_nothing() {
        let s = summarize(&[], date(2024, 5, 15));
        assert_eq!(s.total_checkins, 0);
        assert_eq!(s.average_mood, None);
        assert_eq!(s.current_streak_weeks, 0);
        assert_eq!(s.last_checkin, None);
    }

    #[test]
    fn streak_counts_consecutive_weeks() {
        let user = Uuid::new_v4();
        let list = vec![
            checkin_on(user, date(2024, 5, 14), 4.0, 4),
            checkin_on(user, date(2024, 5, 8), 6.0, 3),
            checkin_on(user, date(2024, 5, 1), 2.0, 5),
            // gap: week of 2024-04-22 missing
            checkin_on(user, date(2024, 4, 16), 1.0, 2),
        ];
        let s = summarize(&list, date(2024, 5, 16));
        assert_eq!(s.total_checkins, 4);
        assert_eq!(s.total_hours, 13.0);
        assert_eq!(s.average_mood, Some(3.5));
        assert_eq!(s.current_streak_weeks, 3);
        assert_eq!(s.last_checkin, Some(date(2024, 5, 13)));
    }

    #[test]
    fn streak_survives_until_week_ends() {
        let user = Uuid::new_v4();
        let list = vec![checkin_on(user, date(2024, 5, 8), 4.0, 4)];
        // Checked in last week, nothing yet this week.
        assert_eq!(summarize(&list, date(2024, 5, 15)).current_streak_weeks, 1);
        // Two weeks later the streak is broken.
        assert_eq!(summarize(&list, date(2024, 5, 22)).current_streak_weeks, 0);
    }
}

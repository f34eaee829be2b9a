//! Quiz attempt gate: daily attempt cap, pass threshold, and the lock after a pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::SubItemProgress;

pub const PASS_THRESHOLD: u32 = 8;
pub const MAX_DAILY_ATTEMPTS: u32 = 3;
pub const TRAINING_MAX_ATTEMPTS: u32 = 3;

/// Attempt rules, overridable through the `[rules]` table of the config file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AttemptRules {
  /// Minimum quiz score that completes a test sub-item.
  pub pass_threshold: u32,
  /// Quiz attempts allowed per UTC calendar day.
  pub max_daily_attempts: u32,
  /// Lifetime attempts per content id for reading/listening/speaking training.
  pub training_max_attempts: u32,
}

impl Default for AttemptRules {
  fn default() -> Self {
    Self {
      pass_threshold: PASS_THRESHOLD,
      max_daily_attempts: MAX_DAILY_ATTEMPTS,
      training_max_attempts: TRAINING_MAX_ATTEMPTS,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
  Passed { score: u32 },
  Failed { remaining_attempts: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateRejection {
  AlreadyCompleted,
  AttemptsExhausted { attempts: u32 },
  ScoreOutOfRange { score: u32, question_count: u32 },
}

fn same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
  a.date_naive() == b.date_naive()
}

/// Evaluate one scored submission against a test sub-item.
///
/// On rejection the sub-item is left exactly as it was. On acceptance the
/// attempt is counted and stamped with `now`; a pass also locks the sub-item,
/// records the score and clears the counter.
pub fn evaluate_attempt(
  sub: &mut SubItemProgress,
  question_count: u32,
  score: u32,
  now: DateTime<Utc>,
  rules: &AttemptRules,
) -> Result<AttemptOutcome, GateRejection> {
  if sub.completed {
    return Err(GateRejection::AlreadyCompleted);
  }
  if score > question_count {
    return Err(GateRejection::ScoreOutOfRange { score, question_count });
  }

  let attempts_today = match sub.last_attempt_date {
    Some(last) if same_utc_day(last, now) => sub.attempts,
    _ => 0,
  };
  if attempts_today >= rules.max_daily_attempts {
    return Err(GateRejection::AttemptsExhausted { attempts: attempts_today });
  }

  sub.attempts = attempts_today + 1;
  sub.last_attempt_date = Some(now);

  if score >= rules.pass_threshold {
    sub.completed = true;
    sub.score = Some(score);
    sub.attempts = 0;
    Ok(AttemptOutcome::Passed { score })
  } else {
    Ok(AttemptOutcome::Failed { remaining_attempts: rules.max_daily_attempts - sub.attempts })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_matches::assert_matches;
  use chrono::{Duration, TimeZone};

  fn day(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
  }

  #[test]
  fn grammar_test_scenario() {
    let rules = AttemptRules::default();
    let mut sub = SubItemProgress::new("Grammar test");

    let first = evaluate_attempt(&mut sub, 10, 7, day(1, 9), &rules);
    assert_eq!(first, Ok(AttemptOutcome::Failed { remaining_attempts: 2 }));
    assert_eq!(sub.attempts, 1);
    assert!(!sub.completed);
    assert_eq!(sub.score, None);

    let second = evaluate_attempt(&mut sub, 10, 9, day(1, 10), &rules);
    assert_eq!(second, Ok(AttemptOutcome::Passed { score: 9 }));
    assert!(sub.completed);
    assert_eq!(sub.score, Some(9));
    assert_eq!(sub.attempts, 0);

    let before = sub.clone();
    assert_eq!(evaluate_attempt(&mut sub, 10, 10, day(1, 11), &rules), Err(GateRejection::AlreadyCompleted));
    assert_eq!(sub, before);
  }

  #[test]
  fn attempts_are_capped_within_a_day() {
    let rules = AttemptRules::default();
    let mut sub = SubItemProgress::new("t");
    let mut seen = vec![];
    for h in 0..3 {
      assert_matches!(evaluate_attempt(&mut sub, 10, 2, day(5, h), &rules), Ok(AttemptOutcome::Failed { .. }));
      seen.push(sub.attempts);
    }
    assert_eq!(seen, vec![1, 2, 3]);

    let before = sub.clone();
    assert_eq!(
      evaluate_attempt(&mut sub, 10, 9, day(5, 23), &rules),
      Err(GateRejection::AttemptsExhausted { attempts: 3 })
    );
    assert_eq!(sub, before);
  }

  #[test]
  fn counter_resets_on_the_next_utc_day() {
    let rules = AttemptRules::default();
    let mut sub = SubItemProgress::new("t");
    for m in 0..3 {
      evaluate_attempt(&mut sub, 10, 1, day(5, 20) + Duration::minutes(m), &rules).unwrap();
    }
    assert_eq!(sub.attempts, 3);

    let next = evaluate_attempt(&mut sub, 10, 1, day(6, 0) + Duration::minutes(1), &rules);
    assert_eq!(next, Ok(AttemptOutcome::Failed { remaining_attempts: 2 }));
    assert_eq!(sub.attempts, 1);
  }

  #[test]
  fn rejects_scores_above_question_count() {
    let rules = AttemptRules::default();
    let mut sub = SubItemProgress::new("t");
    assert_eq!(
      evaluate_attempt(&mut sub, 10, 11, day(1, 1), &rules),
      Err(GateRejection::ScoreOutOfRange { score: 11, question_count: 10 })
    );
    assert_eq!(sub.attempts, 0);
    assert!(sub.last_attempt_date.is_none());
  }

  #[test]
  fn custom_rules_are_honoured() {
    let rules = AttemptRules { pass_threshold: 5, max_daily_attempts: 1, training_max_attempts: 3 };
    let mut sub = SubItemProgress::new("t");
    assert_eq!(evaluate_attempt(&mut sub, 10, 4, day(1, 1), &rules), Ok(AttemptOutcome::Failed { remaining_attempts: 0 }));
    assert_matches!(evaluate_attempt(&mut sub, 10, 5, day(1, 2), &rules), Err(GateRejection::AttemptsExhausted { .. }));
    assert_eq!(evaluate_attempt(&mut sub, 10, 5, day(2, 2), &rules), Ok(AttemptOutcome::Passed { score: 5 }));
  }
}

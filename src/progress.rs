//! Per-user progress documents and the get-or-insert helpers used to mutate them.
//!
//! A `UserProgress` mirrors the catalog shape lazily: module, sub-item and topic
//! entries appear the first time the user interacts with them, in that order.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::Catalog;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
  pub topic_name: String,
  pub completed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubItemProgress {
  pub sub_item_name: String,
  pub completed: bool,
  /// Attempts used on `last_attempt_date`'s UTC day.
  pub attempts: u32,
  pub last_attempt_date: Option<DateTime<Utc>>,
  /// Only set by a passing attempt.
  pub score: Option<u32>,
  #[serde(default)]
  pub topics: IndexMap<String, TopicProgress>,
}

impl SubItemProgress {
  pub fn new(name: &str) -> Self {
    Self {
      sub_item_name: name.to_string(),
      completed: false,
      attempts: 0,
      last_attempt_date: None,
      score: None,
      topics: IndexMap::new(),
    }
  }

  pub fn topic_entry(&mut self, name: &str) -> &mut TopicProgress {
    self
      .topics
      .entry(name.to_string())
      .or_insert_with(|| TopicProgress { topic_name: name.to_string(), completed: false })
  }

  pub fn topic_completed(&self, name: &str) -> bool {
    self.topics.get(name).map_or(false, |t| t.completed)
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
  pub module_id: String,
  pub completed: bool,
  #[serde(default)]
  pub sub_items: IndexMap<String, SubItemProgress>,
}

impl ModuleProgress {
  pub fn new(module_id: &str) -> Self {
    Self { module_id: module_id.to_string(), completed: false, sub_items: IndexMap::new() }
  }

  pub fn sub_item_entry(&mut self, name: &str) -> &mut SubItemProgress {
    self
      .sub_items
      .entry(name.to_string())
      .or_insert_with(|| SubItemProgress::new(name))
  }

  pub fn sub_item_completed(&self, name: &str) -> bool {
    self.sub_items.get(name).map_or(false, |s| s.completed)
  }
}

/// One document per user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
  pub user_id: String,
  pub username: String,
  /// Sum of the scores of every passed sub-item.
  pub overall_score: u32,
  /// Percentage of completed catalog units, 0..=100.
  pub progress: u8,
  #[serde(default)]
  pub modules: IndexMap<String, ModuleProgress>,
}

impl UserProgress {
  pub fn new(user_id: &str, username: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      username: username.to_string(),
      overall_score: 0,
      progress: 0,
      modules: IndexMap::new(),
    }
  }

  pub fn module_entry(&mut self, module_id: &str) -> &mut ModuleProgress {
    self
      .modules
      .entry(module_id.to_string())
      .or_insert_with(|| ModuleProgress::new(module_id))
  }

  pub fn sub_item(&self, module_id: &str, sub_item: &str) -> Option<&SubItemProgress> {
    self.modules.get(module_id)?.sub_items.get(sub_item)
  }

  /// Mark a topic completed, creating the path on demand.
  /// Returns false when the topic was already completed.
  pub fn mark_topic_completed(&mut self, module_id: &str, sub_item: &str, topic: &str) -> bool {
    let entry = self.module_entry(module_id).sub_item_entry(sub_item).topic_entry(topic);
    if entry.completed {
      return false;
    }
    entry.completed = true;
    true
  }

  /// Re-derive completion flags for one sub-item and its module from the catalog.
  ///
  /// A sub-item with topics completes once every topic defined for it is
  /// completed; quiz sub-items are left to the attempt gate. A module completes
  /// once every sub-item it defines is completed, and a module without
  /// sub-items once the user has touched it. Completion is never revoked.
  pub fn refresh_completion(&mut self, catalog: &Catalog, module_id: &str, sub_item: &str) {
    let Some(def) = catalog.module(module_id) else { return };
    let Some(mp) = self.modules.get_mut(module_id) else { return };

    if let (Some(sub_def), Some(sp)) = (def.sub_item(sub_item), mp.sub_items.get_mut(sub_item)) {
      let by_topics = sub_def.quiz().is_none() && !sub_def.topics.is_empty();
      if by_topics && sub_def.topics.iter().all(|t| sp.topic_completed(&t.name)) {
        sp.completed = true;
      }
    }

    if !mp.completed {
      mp.completed = def.sub_items.iter().all(|s| mp.sub_item_completed(&s.name));
    }
  }

  /// Completed topics across every module; the leaderboard tie-breaker.
  pub fn topics_completed(&self) -> usize {
    self
      .modules
      .values()
      .flat_map(|m| m.sub_items.values())
      .flat_map(|s| s.topics.values())
      .filter(|t| t.completed)
      .count()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ModuleDefinition, QuizDefinition, SubItemContent, SubItemDefinition, TopicDefinition};

  fn catalog() -> Catalog {
    let topic = |n: &str| TopicDefinition { name: n.into(), content: String::new() };
    Catalog::new(vec![ModuleDefinition {
      id: 1,
      title: "Soft Skills".into(),
      description: String::new(),
      sub_items: vec![
        SubItemDefinition {
          name: "Grammar".into(),
          content: SubItemContent::Text(String::new()),
          topics: vec![topic("Parts of Speech"), topic("Tenses")],
        },
        SubItemDefinition { name: "Grammar test".into(), content: SubItemContent::default(), topics: vec![] },
      ],
    }])
    .unwrap()
  }

  #[test]
  fn marking_a_topic_creates_the_path_in_order() {
    let mut p = UserProgress::new("u1", "alice");
    assert!(p.mark_topic_completed("1", "Grammar", "Tenses"));
    assert!(p.mark_topic_completed("2", "Intro", "Roles"));

    let keys: Vec<&str> = p.modules.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["1", "2"]);
    let sub = p.sub_item("1", "Grammar").unwrap();
    assert!(sub.topic_completed("Tenses"));
    assert!(!sub.completed);
    assert_eq!(sub.attempts, 0);
    assert!(sub.score.is_none());
  }

  #[test]
  fn marking_twice_is_a_no_op() {
    let mut p = UserProgress::new("u1", "alice");
    assert!(p.mark_topic_completed("1", "Grammar", "Tenses"));
    let snapshot = p.clone();
    assert!(!p.mark_topic_completed("1", "Grammar", "Tenses"));
    assert_eq!(p, snapshot);
  }

  #[test]
  fn sub_item_completes_when_every_defined_topic_does() {
    let cat = catalog();
    let mut p = UserProgress::new("u1", "alice");
    p.mark_topic_completed("1", "Grammar", "Tenses");
    p.refresh_completion(&cat, "1", "Grammar");
    assert!(!p.sub_item("1", "Grammar").unwrap().completed);

    p.mark_topic_completed("1", "Grammar", "Parts of Speech");
    p.refresh_completion(&cat, "1", "Grammar");
    assert!(p.sub_item("1", "Grammar").unwrap().completed);
  }

  #[test]
  fn module_completes_only_when_every_defined_sub_item_does() {
    let cat = catalog();
    let mut p = UserProgress::new("u1", "alice");
    p.mark_topic_completed("1", "Grammar", "Tenses");
    p.mark_topic_completed("1", "Grammar", "Parts of Speech");
    p.refresh_completion(&cat, "1", "Grammar");
    assert!(!p.modules["1"].completed);

    p.module_entry("1").sub_item_entry("Grammar test").completed = true;
    p.refresh_completion(&cat, "1", "Grammar test");
    assert!(p.modules["1"].completed);
  }

  #[test]
  fn topics_never_complete_a_quiz_sub_item() {
    let quiz = QuizDefinition { questions: vec![] };
    let cat = Catalog::new(vec![ModuleDefinition {
      id: 1,
      title: "Onboarding".into(),
      description: String::new(),
      sub_items: vec![SubItemDefinition {
        name: "Quiz".into(),
        content: SubItemContent::Quiz(quiz),
        topics: vec![TopicDefinition { name: "t1".into(), content: String::new() }],
      }],
    }])
    .unwrap();
    let mut p = UserProgress::new("u1", "alice");
    p.mark_topic_completed("1", "Quiz", "t1");
    p.refresh_completion(&cat, "1", "Quiz");
    let sub = p.sub_item("1", "Quiz").unwrap();
    assert!(!sub.completed);
    assert!(sub.score.is_none());
    assert!(!p.modules["1"].completed);
  }

  #[test]
  fn counts_completed_topics_across_modules() {
    let mut p = UserProgress::new("u1", "alice");
    p.mark_topic_completed("1", "Grammar", "Tenses");
    p.mark_topic_completed("1", "Grammar", "Parts of Speech");
    p.module_entry("2").sub_item_entry("Intro").topic_entry("Roles");
    assert_eq!(p.topics_completed(), 2);
  }
}

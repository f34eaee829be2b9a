//! Catalog models: modules, sub-items (free text or quiz) and topics.
//!
//! The catalog is loaded once at startup and never mutated afterwards. Progress
//! documents refer to its entries by module id (as a string) and by name.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// How a quiz question is answered.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
  /// Multiple choice, graded against `correct_index`.
  Mcq,
  /// Free answer, compared against `expected_answer` by the client.
  OpenEnded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub prompt: String,
  pub kind: QuestionKind,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub options: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub correct_index: Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub expected_answer: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct QuizDefinition {
  pub questions: Vec<Question>,
}

impl QuizDefinition {
  /// Upper bound for a submitted score.
  pub fn question_count(&self) -> u32 {
    self.questions.len() as u32
  }
}

/// Body of a sub-item: reading material or a quiz.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubItemContent {
  Text(String),
  Quiz(QuizDefinition),
}

impl Default for SubItemContent {
  fn default() -> Self { SubItemContent::Text(String::new()) }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopicDefinition {
  pub name: String,
  #[serde(default)] pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemDefinition {
  pub name: String,
  #[serde(default)] pub content: SubItemContent,
  #[serde(default)] pub topics: Vec<TopicDefinition>,
}

impl SubItemDefinition {
  pub fn quiz(&self) -> Option<&QuizDefinition> {
    match &self.content {
      SubItemContent::Quiz(q) => Some(q),
      SubItemContent::Text(_) => None,
    }
  }

  pub fn topic(&self, name: &str) -> Option<&TopicDefinition> {
    self.topics.iter().find(|t| t.name == name)
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
  pub id: u32,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub sub_items: Vec<SubItemDefinition>,
}

impl ModuleDefinition {
  /// Key used for this module inside progress documents.
  pub fn key(&self) -> String {
    self.id.to_string()
  }

  pub fn sub_item(&self, name: &str) -> Option<&SubItemDefinition> {
    self.sub_items.iter().find(|s| s.name == name)
  }
}

/// The ordered, immutable module tree.
#[derive(Clone, Debug, Serialize)]
pub struct Catalog {
  modules: Vec<ModuleDefinition>,
}

impl Catalog {
  /// Build a catalog, rejecting duplicate module ids and duplicate names
  /// inside a module or sub-item. Modules are kept in ascending id order.
  pub fn new(mut modules: Vec<ModuleDefinition>) -> Result<Self, String> {
    let mut ids = HashSet::new();
    for m in &modules {
      if !ids.insert(m.id) {
        return Err(format!("duplicate module id {}", m.id));
      }
      let mut subs = HashSet::new();
      for s in &m.sub_items {
        if !subs.insert(s.name.as_str()) {
          return Err(format!("duplicate sub-item '{}' in module {}", s.name, m.id));
        }
        let mut topics = HashSet::new();
        for t in &s.topics {
          if !topics.insert(t.name.as_str()) {
            return Err(format!("duplicate topic '{}' in sub-item '{}'", t.name, s.name));
          }
        }
      }
    }
    modules.sort_by_key(|m| m.id);
    Ok(Self { modules })
  }

  pub fn empty() -> Self {
    Self { modules: Vec::new() }
  }

  pub fn modules(&self) -> &[ModuleDefinition] {
    &self.modules
  }

  /// Look a module up by the string key used in progress documents.
  pub fn module(&self, key: &str) -> Option<&ModuleDefinition> {
    let id: u32 = key.trim().parse().ok()?;
    self.modules.iter().find(|m| m.id == id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn module(id: u32, subs: Vec<SubItemDefinition>) -> ModuleDefinition {
    ModuleDefinition { id, title: format!("m{id}"), description: String::new(), sub_items: subs }
  }

  fn text_sub(name: &str) -> SubItemDefinition {
    SubItemDefinition { name: name.into(), content: SubItemContent::Text("x".into()), topics: vec![] }
  }

  #[test]
  fn rejects_duplicate_module_ids() {
    let err = Catalog::new(vec![module(1, vec![]), module(1, vec![])]).unwrap_err();
    assert!(err.contains("duplicate module id 1"));
  }

  #[test]
  fn rejects_duplicate_sub_item_names() {
    let err = Catalog::new(vec![module(1, vec![text_sub("a"), text_sub("a")])]).unwrap_err();
    assert!(err.contains("duplicate sub-item"));
  }

  #[test]
  fn orders_modules_by_id_and_looks_up_by_key() {
    let cat = Catalog::new(vec![module(2, vec![]), module(1, vec![text_sub("a")])]).unwrap();
    let ids: Vec<u32> = cat.modules().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(cat.module("1").and_then(|m| m.sub_item("a")).is_some());
    assert!(cat.module("x").is_none());
    assert!(cat.module("3").is_none());
  }

  #[test]
  fn content_deserializes_as_text_or_quiz() {
    let text: SubItemDefinition = serde_json::from_str(r#"{"name":"a","content":"read me"}"#).unwrap();
    assert!(text.quiz().is_none());

    let quiz: SubItemDefinition = serde_json::from_str(
      r#"{"name":"a test","content":{"questions":[{"prompt":"q","kind":"mcq","options":["x","y"],"correctIndex":1}]}}"#,
    )
    .unwrap();
    let q = quiz.quiz().unwrap();
    assert_eq!(q.question_count(), 1);
    assert_eq!(q.questions[0].kind, QuestionKind::Mcq);
    assert_eq!(q.questions[0].correct_index, Some(1));
  }
}

//! Overall progress percentage, always recomputed from scratch over the catalog.

use crate::domain::Catalog;
use crate::progress::UserProgress;

/// Completed and total progress units for a document.
///
/// A unit is a topic when the sub-item defines topics, otherwise the sub-item
/// itself, and the module itself when it defines no sub-items.
pub fn count_units(catalog: &Catalog, progress: &UserProgress) -> (u32, u32) {
  let mut completed = 0u32;
  let mut total = 0u32;

  for module in catalog.modules() {
    let mp = progress.modules.get(&module.key());
    if module.sub_items.is_empty() {
      total += 1;
      if mp.map_or(false, |m| m.completed) {
        completed += 1;
      }
      continue;
    }
    for sub in &module.sub_items {
      let sp = mp.and_then(|m| m.sub_items.get(&sub.name));
      if sub.topics.is_empty() {
        total += 1;
        if sp.map_or(false, |s| s.completed) {
          completed += 1;
        }
      } else {
        for topic in &sub.topics {
          total += 1;
          if sp.map_or(false, |s| s.topic_completed(&topic.name)) {
            completed += 1;
          }
        }
      }
    }
  }
  (completed, total)
}

/// floor(100 * completed / total), or 0 for an empty catalog.
pub fn recalc(catalog: &Catalog, progress: &UserProgress) -> u8 {
  let (completed, total) = count_units(catalog, progress);
  if total == 0 {
    return 0;
  }
  (u64::from(completed) * 100 / u64::from(total)) as u8
}

/*! Human-readable assertion log block. */

use crate::a11y::Value;
use crate::types::TestStatus;

const LABELS: [&str; 4] = ["ASSERTION:", "STATUS:", "ACTUAL VALUE:", "MESSAGES:"];
const WRAP_WIDTH: usize = 80;

/// Render the labelled block returned as a result's `log`.
///
/// Labels are right-aligned; values wrap at 80 columns with continuation lines
/// indented past the labels. List values put one item per line.
pub(crate) fn render(
  assertion: &str,
  status: TestStatus,
  actual: &Value,
  messages: &[String],
) -> String {
  let width = LABELS.iter().map(|label| label.len()).max().unwrap_or_default() + 2;
  let indent = " ".repeat(width + 1);
  let [assertion_label, status_label, actual_label, messages_label] = LABELS;

  let actual_items: Vec<String> = match actual {
    Value::List(items) => items.iter().map(ToString::to_string).collect(),
    other => vec![other.to_string()],
  };

  format!(
    "\n\n{assertion_label:>width$} {assertion}\
     \n{status_label:>width$} {status}\
     \n{actual_label:>width$} {}\
     \n{messages_label:>width$} {}\n",
    wrap_items(&actual_items, &indent),
    wrap_items(messages, &indent),
  )
}

fn wrap_items(items: &[String], indent: &str) -> String {
  let last = items.len().saturating_sub(1);
  let text: Vec<String> = items
    .iter()
    .enumerate()
    .map(|(i, item)| if i < last { format!("{item},") } else { item.clone() })
    .collect();

  let mut lines = Vec::new();
  for item in &text {
    let first = lines.is_empty();
    for (j, line) in wrap(item, WRAP_WIDTH, indent.len()).into_iter().enumerate() {
      if first && j == 0 {
        lines.push(line);
      } else {
        lines.push(format!("{indent}{line}"));
      }
    }
  }
  lines.join("\n")
}

/// Greedy word wrap. The first line may use the full width; later lines leave room
/// for the indent. Words longer than a line are never split.
fn wrap(text: &str, width: usize, indent: usize) -> Vec<String> {
  let mut lines = Vec::new();
  let mut current = String::new();

  for word in text.split_whitespace() {
    let limit = if lines.is_empty() { width } else { width.saturating_sub(indent) };
    if !current.is_empty() && current.len() + 1 + word.len() > limit {
      lines.push(std::mem::take(&mut current));
    }
    if !current.is_empty() {
      current.push(' ');
    }
    current.push_str(word);
  }

  if !current.is_empty() {
    lines.push(current);
  }
  lines
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_are_right_aligned() {
    let log = render(
      "property role is PUSH_BUTTON",
      TestStatus::Pass,
      &Value::from("PUSH_BUTTON"),
      &[],
    );
    assert_eq!(
      log,
      "\n\n     ASSERTION: property role is PUSH_BUTTON\
       \n        STATUS: PASS\
       \n  ACTUAL VALUE: PUSH_BUTTON\
       \n      MESSAGES: \n"
    );
  }

  #[test]
  fn list_values_one_per_line() {
    let log = render(
      "property states contains FOCUSED",
      TestStatus::Fail,
      &Value::from(vec!["FOCUSABLE".to_string(), "READONLY".to_string()]),
      &["https://bugs.example/1".to_string()],
    );
    assert!(log.contains("  ACTUAL VALUE: FOCUSABLE,\n                READONLY\n"));
    assert!(log.contains("      MESSAGES: https://bugs.example/1\n"));
  }

  #[test]
  fn long_values_wrap_at_eighty_columns() {
    let words = vec!["word"; 40].join(" ");
    let lines = wrap(&words, WRAP_WIDTH, 16);
    assert!(lines.len() > 1);
    assert!(lines[0].len() <= 80);
    for line in &lines[1..] {
      assert!(line.len() <= 64);
    }
    assert_eq!(lines.join(" "), words);
  }

  #[test]
  fn long_words_are_not_split() {
    let word = "x".repeat(100);
    assert_eq!(wrap(&word, WRAP_WIDTH, 16), vec![word]);
  }
}

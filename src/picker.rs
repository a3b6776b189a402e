use dialoguer::FuzzySelect;

use crate::error::{Error, Result};

/// A selectable target: the label the picker shows and the value ssh gets.
pub trait Choosable {
    fn label(&self) -> String;
    fn value(&self) -> String;
}

/// Fixed menu entry, used by the setup wizard.
pub struct Choice {
    label: String,
    value: String,
}

impl Choice {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

impl Choosable for Choice {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn value(&self) -> String {
        self.value.clone()
    }
}

impl Choosable for Box<dyn Choosable> {
    fn label(&self) -> String {
        self.as_ref().label()
    }

    fn value(&self) -> String {
        self.as_ref().value()
    }
}

/// Interactive selection backend. Returns the picked indices; empty means
/// the prompt was cancelled.
pub trait Picker {
    fn pick(&self, prompt: &str, initial_filter: &str, labels: &[String]) -> Result<Vec<usize>>;
}

/// Terminal fuzzy finder. Esc or q cancels, which surfaces as an empty pick.
pub struct FuzzyFinder;

impl Picker for FuzzyFinder {
    fn pick(&self, prompt: &str, initial_filter: &str, labels: &[String]) -> Result<Vec<usize>> {
        let picked = FuzzySelect::new()
            .with_prompt(prompt)
            .with_initial_text(initial_filter)
            .items(labels)
            .interact_opt()?;
        Ok(picked.into_iter().collect())
    }
}

/// Resolve a pick to a single item. A picker may report several indices;
/// the last one is authoritative and the earlier ones are dropped.
pub fn choose<'a, C: Choosable>(
    picker: &dyn Picker,
    prompt: &str,
    initial_filter: &str,
    items: &'a [C],
) -> Result<&'a C> {
    let labels: Vec<String> = items.iter().map(|c| c.label()).collect();
    let picked = picker.pick(prompt, initial_filter, &labels)?;
    let idx = picked.last().copied().ok_or(Error::NoSelection)?;
    items.get(idx).ok_or(Error::NoSelection)
}

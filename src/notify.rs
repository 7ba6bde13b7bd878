//! Sink for non-fatal extraction warnings.

use log::warn;
use std::cell::RefCell;

pub trait Notifier {
    fn warn(&self, title: &str, message: &str);
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn warn(&self, title: &str, message: &str) {
        warn!("{}: {}", title, message);
    }
}

/// Keeps warnings for later inspection, e.g. to print a summary.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    warnings: RefCell<Vec<(String, String)>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<(String, String)> {
        self.warnings.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }
}

impl Notifier for CollectingNotifier {
    fn warn(&self, title: &str, message: &str) {
        warn!("{}: {}", title, message);
        self.warnings
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier_records_in_order() {
        let notifier = CollectingNotifier::new();
        notifier.warn("Parse skipped", "A @see B");
        notifier.warn("Invalid mock rule", "[");
        assert_eq!(notifier.len(), 2);
        assert_eq!(notifier.warnings()[0].1, "A @see B");
    }
}

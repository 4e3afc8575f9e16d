//! Blocking "working…" indicator shown for the duration of an export

use std::io::{IsTerminal, Write};

/// Something that can show and hide a busy indicator
pub trait BusyIndicator {
    fn show(&self, message: &str);
    fn hide(&self);
}

/// Shows the indicator on creation and hides it when dropped
pub struct BusyGuard<'a, B: BusyIndicator + ?Sized> {
    indicator: &'a B,
}

impl<'a, B: BusyIndicator + ?Sized> BusyGuard<'a, B> {
    pub fn show(indicator: &'a B, message: &str) -> Self {
        indicator.show(message);
        Self { indicator }
    }
}

impl<B: BusyIndicator + ?Sized> Drop for BusyGuard<'_, B> {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}

/// Status line on stderr for the command line
#[derive(Debug, Default)]
pub struct StatusLine {
    quiet: bool,
    /// Redraw in place; off when stderr is redirected
    interactive: bool,
}

impl StatusLine {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            interactive: std::io::stderr().is_terminal(),
        }
    }

    fn show_text(&self, message: &str) -> Option<String> {
        match (self.quiet, self.interactive) {
            (true, _) => None,
            (false, true) => Some(message.to_string()),
            (false, false) => Some(format!("{message}\n")),
        }
    }

    fn hide_text(&self) -> Option<&'static str> {
        // Clear the status line
        (!self.quiet && self.interactive).then_some("\r\x1b[2K")
    }
}

fn write_stderr(text: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "{text}");
    let _ = stderr.flush();
}

impl BusyIndicator for StatusLine {
    fn show(&self, message: &str) {
        log::debug!("busy: {}", message);
        if let Some(text) = self.show_text(message) {
            write_stderr(&text);
        }
    }

    fn hide(&self) {
        log::debug!("busy: done");
        if let Some(text) = self.hide_text() {
            write_stderr(text);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records show/hide calls
    #[derive(Default)]
    pub(crate) struct RecordingIndicator {
        pub calls: RefCell<Vec<String>>,
    }

    impl RecordingIndicator {
        pub fn is_visible(&self) -> bool {
            self.calls.borrow().last().is_some_and(|c| c != "hide")
        }
    }

    impl BusyIndicator for RecordingIndicator {
        fn show(&self, message: &str) {
            self.calls.borrow_mut().push(format!("show:{message}"));
        }

        fn hide(&self) {
            self.calls.borrow_mut().push("hide".to_string());
        }
    }

    #[test]
    fn test_guard_hides_on_drop() {
        let indicator = RecordingIndicator::default();
        {
            let _guard = BusyGuard::show(&indicator, "working");
            assert!(indicator.is_visible());
        }
        assert!(!indicator.is_visible());
        assert_eq!(*indicator.calls.borrow(), vec!["show:working", "hide"]);
    }

    #[test]
    fn test_redirected_status_line_has_no_escapes() {
        let line = StatusLine {
            quiet: false,
            interactive: false,
        };
        assert_eq!(line.show_text("Exporting").as_deref(), Some("Exporting\n"));
        assert_eq!(line.hide_text(), None);

        let tty = StatusLine {
            quiet: false,
            interactive: true,
        };
        assert_eq!(tty.show_text("Exporting").as_deref(), Some("Exporting"));
        assert_eq!(tty.hide_text(), Some("\r\x1b[2K"));

        let quiet = StatusLine {
            quiet: true,
            interactive: true,
        };
        assert_eq!(quiet.show_text("Exporting"), None);
        assert_eq!(quiet.hide_text(), None);
    }

    #[test]
    fn test_guard_hides_on_early_return() {
        fn fails(indicator: &RecordingIndicator) -> Result<(), ()> {
            let _guard = BusyGuard::show(indicator, "x");
            Err(())
        }
        let indicator = RecordingIndicator::default();
        assert!(fails(&indicator).is_err());
        assert!(!indicator.is_visible());
    }
}

//! Audio-cue and toast notification sink.
//!
//! The core components only ever emit feedback through this trait; the
//! rendering layer (tones, toast stacking, timing) lives behind it.

/// Visual style of a toast notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Error,
    Info,
}

/// Side-effect sink for user-facing feedback.
///
/// Success and error notifications pair an audio cue with a toast; info
/// notifications are toast-only.
pub trait FeedbackChannel {
    fn play_success(&self);
    fn play_error(&self);
    fn show_toast(&self, message: &str, variant: ToastVariant);

    fn notify_success(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.play_success();
        self.show_toast(message, ToastVariant::Success);
    }

    fn notify_error(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.play_error();
        self.show_toast(message, ToastVariant::Error);
    }

    fn notify_info(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.show_toast(message, ToastVariant::Info);
    }
}

/// Feedback sink that discards everything. Used in tests and headless runs.
#[derive(Debug, Default)]
pub struct NullFeedback;

impl FeedbackChannel for NullFeedback {
    fn play_success(&self) {}
    fn play_error(&self) {}
    fn show_toast(&self, _message: &str, _variant: ToastVariant) {}
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct RecordingFeedback {
        log: RefCell<Vec<String>>,
    }

    impl FeedbackChannel for RecordingFeedback {
        fn play_success(&self) {
            self.log.borrow_mut().push("tone:success".to_string());
        }

        fn play_error(&self) {
            self.log.borrow_mut().push("tone:error".to_string());
        }

        fn show_toast(&self, message: &str, variant: ToastVariant) {
            self.log
                .borrow_mut()
                .push(format!("toast:{:?}:{}", variant, message));
        }
    }

    #[test]
    fn test_notify_success_plays_cue_and_toast() {
        let feedback = RecordingFeedback::default();
        feedback.notify_success("Guardado");
        assert_eq!(
            *feedback.log.borrow(),
            vec!["tone:success".to_string(), "toast:Success:Guardado".to_string()]
        );
    }

    #[test]
    fn test_notify_info_is_toast_only() {
        let feedback = RecordingFeedback::default();
        feedback.notify_info("Cargando");
        assert_eq!(*feedback.log.borrow(), vec!["toast:Info:Cargando".to_string()]);
    }

    #[test]
    fn test_empty_message_is_dropped() {
        let feedback = RecordingFeedback::default();
        feedback.notify_error("");
        assert!(feedback.log.borrow().is_empty());
    }
}

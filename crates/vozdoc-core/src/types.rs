//! Shared types for the speech recognition event boundary.
//!
//! The underlying engine is an opaque event source: it delivers windows of
//! recognized segments, some provisional (interim) and some settled (final),
//! plus lifecycle and error events. These types are the only contract the
//! core crates have with it.

use serde::{Deserialize, Serialize};

/// One recognized segment of speech.
///
/// An interim segment is provisional and subject to revision; a final
/// segment is the engine's settled transcription of an utterance part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSegment {
    pub transcript: String,
    pub is_final: bool,
}

impl SpeechSegment {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// A window of recognition results delivered by the engine.
///
/// `result_index` marks the first new or changed entry since the previous
/// event; entries before it were already delivered as final in earlier
/// events and must not be reprocessed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechResultEvent {
    pub result_index: usize,
    pub segments: Vec<SpeechSegment>,
}

impl SpeechResultEvent {
    /// Event carrying a single final segment, as produced by a
    /// non-continuous (single utterance) recognition session.
    pub fn single_final(transcript: impl Into<String>) -> Self {
        Self {
            result_index: 0,
            segments: vec![SpeechSegment::final_result(transcript)],
        }
    }

    /// The segments at or after `result_index`, i.e. the new window.
    pub fn new_segments(&self) -> &[SpeechSegment] {
        let start = self.result_index.min(self.segments.len());
        &self.segments[start..]
    }
}

/// Runtime error classes reported by the recognition engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorKind {
    /// No speech was detected before the engine's silence timeout.
    NoSpeech,
    /// Microphone permission denied; retrying would fail again.
    NotAllowed,
    /// The session was aborted by the host.
    Aborted,
    /// Transport failure between the host and the recognition service.
    Network,
    /// Any other engine-reported error string.
    Other(String),
}

/// An error event delivered through the recognizer's error slot.
///
/// The engine still emits an end event after an error, so consumers must
/// not treat this as a session terminator by itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionErrorEvent {
    pub kind: RecognitionErrorKind,
}

impl RecognitionErrorEvent {
    pub fn new(kind: RecognitionErrorKind) -> Self {
        Self { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_final_event() {
        let event = SpeechResultEvent::single_final("comenzar redacción");
        assert_eq!(event.result_index, 0);
        assert_eq!(event.segments.len(), 1);
        assert!(event.segments[0].is_final);
    }

    #[test]
    fn test_new_segments_window() {
        let event = SpeechResultEvent {
            result_index: 1,
            segments: vec![
                SpeechSegment::final_result("hola"),
                SpeechSegment::interim("mun"),
            ],
        };
        let window = event.new_segments();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].transcript, "mun");
    }

    #[test]
    fn test_new_segments_index_past_end() {
        let event = SpeechResultEvent {
            result_index: 5,
            segments: vec![SpeechSegment::final_result("hola")],
        };
        assert!(event.new_segments().is_empty());
    }
}

use crate::constants::{
    DEFAULT_SPEECH_LANGUAGE, DEFAULT_SPEECH_PITCH, DEFAULT_SPEECH_RATE, SPEECH_QUEUE_CAPACITY,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechOptions {
    pub language: String,
    pub pitch: f32,
    pub rate: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        SpeechOptions {
            language: DEFAULT_SPEECH_LANGUAGE.to_string(),
            pitch: DEFAULT_SPEECH_PITCH,
            rate: DEFAULT_SPEECH_RATE,
        }
    }
}

/// Text-to-speech output. Failures are reported but never fatal to the caller.
pub trait SpeechSink: Send {
    fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<()>;

    /// Cancel the current utterance and anything still queued.
    fn stop(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Utterance {
    pub text: String,
    #[serde(flatten)]
    pub options: SpeechOptions,
}

/// Utterances waiting for the host shell to voice them.
///
/// Cloning shares the queue; `stop` drops everything not yet drained. Holds at
/// most [`SPEECH_QUEUE_CAPACITY`] utterances, dropping the oldest.
#[derive(Debug, Clone, Default)]
pub struct SpeechQueue {
    pending: Arc<Mutex<VecDeque<Utterance>>>,
}

impl SpeechQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending utterance, oldest first.
    pub fn drain(&self) -> Vec<Utterance> {
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpeechSink for SpeechQueue {
    fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| AppError::Internal("Speech queue lock poisoned".to_string()))?;
        if pending.len() >= SPEECH_QUEUE_CAPACITY {
            if let Some(dropped) = pending.pop_front() {
                tracing::debug!(text = %dropped.text, "Speech queue full, dropping oldest");
            }
        }
        pending.push_back(Utterance {
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| AppError::Internal("Speech queue lock poisoned".to_string()))?;
        pending.clear();
        Ok(())
    }
}

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub at: DateTime<Local>,
    pub level: MessageLevel,
}

/// Last user-visible message. Overwritten wholesale, no history.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    current: Option<StatusMessage>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set(text.into(), MessageLevel::Info);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set(text.into(), MessageLevel::Error);
    }

    fn set(&mut self, text: String, level: MessageLevel) {
        self.current = Some(StatusMessage {
            text,
            at: Local::now(),
            level,
        });
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }
}

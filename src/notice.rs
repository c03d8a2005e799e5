//! Transient notices (toasts) raised by the views

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant: NoticeVariant::Default,
        }
    }

    /// A destructive notice titled "Error"
    pub fn error(description: &str) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.to_string(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

/// Notices a view has raised and nobody has consumed yet
#[derive(Debug, Clone, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        tracing::debug!(title = %notice.title, "notice: {}", notice.description);
        self.pending.push(notice);
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.pending.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.pending.iter()
    }

    /// Take every pending notice, oldest first
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue() {
        let mut notices = Notices::default();
        notices.push(Notice::new("Success", "Settings saved successfully"));
        notices.push(Notice::error("Failed to fetch settings"));

        assert!(notices.latest().unwrap().is_error());

        let drained = notices.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].title, "Success");
        assert!(notices.is_empty());
    }
}

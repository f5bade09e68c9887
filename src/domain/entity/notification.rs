use snafu::prelude::*;

const REMAINING: &str = "{remaining}";
const END: &str = "{end}";

/// Template of a desktop notification. Summary and body may refer to the
/// remaining time label as `{remaining}` and to the end time as `{end}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    summary: String,
    body: Option<String>,
}

impl NotificationMessage {
    /// Build a template from its parts. A body made only of whitespace is
    /// dropped.
    ///
    /// # Errors
    ///
    /// This function will return an error if the summary is blank.
    pub fn try_new(
        summary: String,
        body: Option<String>,
    ) -> Result<Self, TryNewNotificationMessageError> {
        ensure!(!summary.trim().is_empty(), EmptySummarySnafu);
        let body = body.filter(|body| !body.trim().is_empty());
        Ok(Self { summary, body })
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Substitute both placeholders.
    pub fn fill(&self, remaining: &str, end: &str) -> Self {
        let render = |template: &str| template.replace(REMAINING, remaining).replace(END, end);
        Self {
            summary: render(&self.summary),
            body: self.body.as_deref().map(render),
        }
    }

    pub fn into_parts(self) -> (String, Option<String>) {
        (self.summary, self.body)
    }
}

#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum TryNewNotificationMessageError {
    #[snafu(display("Notification summary is blank"))]
    #[non_exhaustive]
    EmptySummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_message_try_new() {
        let msg = NotificationMessage::try_new("Time is up".into(), Some(" ".into())).unwrap();
        assert_eq!(msg.into_parts(), ("Time is up".to_owned(), None));

        for summary in ["", " \t"] {
            assert_eq!(
                NotificationMessage::try_new(summary.into(), Some("body".into())),
                Err(TryNewNotificationMessageError::EmptySummary)
            );
        }
    }

    #[test]
    fn notification_message_fill() {
        let msg = NotificationMessage::try_new(
            "{remaining} left".into(),
            Some("{remaining} until {end}, ends at {end}".into()),
        )
        .unwrap();

        let filled = msg.fill("5 min", "14:00");
        assert_eq!(filled.summary(), "5 min left");
        assert_eq!(filled.body(), Some("5 min until 14:00, ends at 14:00"));
        assert_eq!(msg.summary(), "{remaining} left");
    }

    #[test]
    fn notification_message_fill_without_placeholders() {
        let msg = NotificationMessage::try_new("Done".into(), None).unwrap();
        assert_eq!(msg.fill("5 min", "14:00"), msg);
    }
}

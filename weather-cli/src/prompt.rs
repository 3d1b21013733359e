use anyhow::Context;
use async_trait::async_trait;
use inquire::Confirm;
use weather_now_core::ConsentPrompt;

/// Consent for the approximate-location fallback, asked on the terminal
/// unless a flag already answered it.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConsent {
    preset: Option<bool>,
}

impl TerminalConsent {
    pub fn ask() -> Self {
        Self { preset: None }
    }

    pub fn preset(answer: bool) -> Self {
        Self { preset: Some(answer) }
    }
}

#[async_trait]
impl ConsentPrompt for TerminalConsent {
    async fn allow_approximate(&self, question: &str) -> anyhow::Result<bool> {
        if let Some(answer) = self.preset {
            tracing::debug!(answer, "approximate location consent preset");
            return Ok(answer);
        }

        // inquire blocks on stdin.
        let question = question.to_string();
        tokio::task::spawn_blocking(move || Confirm::new(&question).with_default(false).prompt())
            .await
            .context("Consent prompt task failed")?
            .context("Failed to read consent answer")
    }
}

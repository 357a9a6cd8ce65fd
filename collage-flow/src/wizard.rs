//! The simulated generation wizard.
//!
//! There is no model behind this: generation is a timer and a placeholder
//! output URI. The wizard still enforces the point economy - a run costs
//! one profile point, charged only when the simulated work completes, so a
//! cancelled run changes nothing.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::notify::{Notice, NotifySink};
use crate::profile::ProfileStore;

/// How long a simulated generation takes, in milliseconds.
pub const SIMULATED_GENERATION_MS: u64 = 1600;

/// The placeholder output every simulated run resolves to.
pub const PLACEHOLDER_OUTPUT_URI: &str = "https://placehold.co/1024x1024.png";

/// Parameters of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Id of the chosen model card.
    pub model_id: String,
    /// Optional model variant.
    pub variant: Option<String>,
    /// Optional output preset.
    pub output: Option<String>,
}

/// Result of a completed generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// URI of the generated image.
    pub uri: String,
    /// The request that produced it.
    pub request: GenerationRequest,
}

/// Runs simulated generations against the user's point balance.
#[derive(Clone)]
pub struct Wizard {
    profile: ProfileStore,
    notify: Arc<dyn NotifySink>,
}

impl Wizard {
    /// Create a wizard backed by the given profile store.
    #[must_use]
    pub fn new(profile: ProfileStore, notify: Arc<dyn NotifySink>) -> Self {
        Self { profile, notify }
    }

    /// Run a simulated generation.
    ///
    /// Refused with an error notice when the point balance is empty. The
    /// point is charged at completion, so dropping the future mid-run
    /// leaves the balance untouched.
    pub async fn generate(&self, request: GenerationRequest) -> Option<GenerationResult> {
        if self.profile.get().points == 0 {
            self.notify
                .notify(Notice::error("No generation points left for today"));
            return None;
        }

        tracing::debug!("simulating generation for model {}", request.model_id);
        tokio::time::sleep(Duration::from_millis(SIMULATED_GENERATION_MS)).await;

        if !self.profile.spend_point() {
            // The balance drained while we were "generating".
            self.notify
                .notify(Notice::error("No generation points left for today"));
            return None;
        }

        tracing::info!("simulated generation complete for {}", request.model_id);
        Some(GenerationResult {
            uri: PLACEHOLDER_OUTPUT_URI.to_string(),
            request,
        })
    }
}

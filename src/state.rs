//! Typed state passed between pipeline steps.
//!
//! Earlier steps fill in the source image, security group and network
//! placement; the provisioning step publishes the instance it created.

use tracing::error;

use crate::ecs::{Image, Instance};
use crate::provision::StepError;
use crate::step::StepAction;

/// Network placement of the build instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstanceNetwork {
    /// Classic networking with a public bandwidth allocation.
    Classic,
    /// Private network placement.
    Vpc {
        /// VSwitch the instance attaches to.
        vswitch_id: String,
    },
}

/// State shared by the steps of one build.
#[derive(Debug, Default)]
pub struct BuildState {
    /// Image the build instance boots from.
    pub source_image: Option<Image>,
    /// Security group the build instance joins.
    pub security_group_id: Option<String>,
    /// Network placement of the build instance.
    pub network: Option<InstanceNetwork>,
    /// Descriptor of the instance created for the build.
    pub instance: Option<Instance>,
    /// Identifier of the instance created for the build. Provisioners read
    /// this generic key rather than the full descriptor.
    pub instance_id: Option<String>,
    /// Error that halted the build, if any.
    pub error: Option<StepError>,
    /// Set by the orchestrator when the build was cancelled.
    pub cancelled: bool,
    /// Set when a step halted the build.
    pub halted: bool,
}

impl BuildState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source image.
    #[must_use]
    pub fn with_source_image(mut self, image: Image) -> Self {
        self.source_image = Some(image);
        self
    }

    /// Sets the security group.
    #[must_use]
    pub fn with_security_group_id(mut self, id: impl Into<String>) -> Self {
        self.security_group_id = Some(id.into());
        self
    }

    /// Sets the network placement.
    #[must_use]
    pub fn with_network(mut self, network: InstanceNetwork) -> Self {
        self.network = Some(network);
        self
    }

    /// Returns the source image.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::MissingState`] when no earlier step selected one.
    pub fn source_image(&self) -> Result<&Image, StepError> {
        self.source_image
            .as_ref()
            .ok_or(StepError::MissingState("source_image"))
    }

    /// Returns the security group identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::MissingState`] when no earlier step set one.
    pub fn security_group_id(&self) -> Result<&str, StepError> {
        self.security_group_id
            .as_deref()
            .ok_or(StepError::MissingState("security_group_id"))
    }

    /// Returns the network placement.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::MissingState`] when no earlier step set one.
    pub fn network(&self) -> Result<&InstanceNetwork, StepError> {
        self.network
            .as_ref()
            .ok_or(StepError::MissingState("network"))
    }

    /// Whether cleanup runs because the build did not complete.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        self.cancelled || self.halted
    }

    /// Records `err`, marks the build halted and returns [`StepAction::Halt`].
    pub fn halt(&mut self, err: StepError) -> StepAction {
        error!(error = %err, "build halted");
        self.error = Some(err);
        self.halted = true;
        StepAction::Halt
    }
}

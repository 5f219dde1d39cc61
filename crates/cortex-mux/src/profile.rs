//! Profile reconciliation.
//!
//! Drives a headset toward a requested training profile through the
//! `queryProfile` / `getCurrentProfile` / `setupProfile` /
//! `loadGuestProfile` method family. The decision logic lives in the
//! pure [`ProfileReconciler`] state machine; [`reconcile_profile`] is
//! the async driver that executes its commands over the link.

use tracing::{debug, warn};

use crate::error::{MuxError, MuxResult};
use crate::link::SharedLink;
use crate::protocol::ProfileAction;

/// Marker name for the built-in guest profile.
pub const GUEST_PROFILE: &str = "guest";

/// Wire calls the reconciler asks the driver to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileCommand {
    /// List the profiles known to the service.
    QueryProfiles,
    /// Ask which profile is loaded on the headset, and by whom.
    GetCurrentProfile,
    /// Unload the target profile from the headset.
    Unload,
    /// Load the target profile onto the headset.
    Load,
    /// Fall back to the guest profile.
    LoadGuest,
}

/// Outcomes of a command, fed back into the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileEvent {
    ProfilesListed { names: Vec<String> },
    CurrentProfile {
        name: Option<String>,
        loaded_by_this_app: bool,
    },
    Unloaded,
    Loaded,
    GuestLoaded,
    /// The load was rejected because another app holds the profile.
    Conflict,
}

/// What the machine wants next.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileStep {
    Command(ReconcileCommand),
    /// Terminal: the named profile is loaded and usable.
    Resolved(String),
}

/// Pure profile reconciliation state machine. Emits one command at a
/// time; the driver reports each command's outcome as an event.
#[derive(Debug)]
pub struct ProfileReconciler {
    target: String,
}

impl ProfileReconciler {
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
        }
    }

    /// The machine always begins by listing profiles.
    #[must_use]
    pub fn initial_command(&self) -> ReconcileCommand {
        ReconcileCommand::QueryProfiles
    }

    /// Advance the machine with a command's outcome.
    #[must_use]
    pub fn on_event(&self, event: ReconcileEvent) -> ReconcileStep {
        match event {
            ReconcileEvent::ProfilesListed { names } => {
                if names.iter().any(|n| n == &self.target) {
                    ReconcileStep::Command(ReconcileCommand::GetCurrentProfile)
                } else {
                    // Unknown profile name: run on guest rather than fail.
                    ReconcileStep::Command(ReconcileCommand::LoadGuest)
                }
            }
            ReconcileEvent::CurrentProfile {
                name,
                loaded_by_this_app,
            } => {
                // A profile this app already holds must be reloaded to
                // pick up training changes; anything else loads fresh.
                if name.as_deref() == Some(self.target.as_str()) && loaded_by_this_app {
                    ReconcileStep::Command(ReconcileCommand::Unload)
                } else {
                    ReconcileStep::Command(ReconcileCommand::Load)
                }
            }
            ReconcileEvent::Unloaded => ReconcileStep::Command(ReconcileCommand::Load),
            ReconcileEvent::Loaded => ReconcileStep::Resolved(self.target.clone()),
            ReconcileEvent::Conflict => ReconcileStep::Command(ReconcileCommand::LoadGuest),
            ReconcileEvent::GuestLoaded => ReconcileStep::Resolved(GUEST_PROFILE.to_string()),
        }
    }
}

/// Result of a successful reconciliation: the auth token to stream
/// with, and the profile name that actually ended up loaded (which is
/// [`GUEST_PROFILE`] when the request fell back).
#[derive(Debug, Clone)]
pub struct ProfileOutcome {
    pub auth: String,
    pub profile: String,
}

/// Reconcile the headset onto `profile`, falling back to the guest
/// profile when the name is unknown or held by another app.
pub async fn reconcile_profile(link: &SharedLink, profile: &str) -> MuxResult<ProfileOutcome> {
    let machine = ProfileReconciler::new(profile);
    let mut step = ReconcileStep::Command(machine.initial_command());

    loop {
        let command = match step {
            ReconcileStep::Resolved(name) => {
                if name != profile {
                    warn!(requested = profile, loaded = %name, "using fallback profile");
                }
                let auth = link.cortex_token().await?;
                return Ok(ProfileOutcome {
                    auth,
                    profile: name,
                });
            }
            ReconcileStep::Command(command) => command,
        };

        debug!(?command, profile, "reconciling profile");
        let event = match command {
            ReconcileCommand::QueryProfiles => {
                let profiles = link.query_profile().await?;
                ReconcileEvent::ProfilesListed {
                    names: profiles.into_iter().map(|p| p.name).collect(),
                }
            }
            ReconcileCommand::GetCurrentProfile => {
                let current = link.get_current_profile().await?;
                ReconcileEvent::CurrentProfile {
                    name: current.name,
                    loaded_by_this_app: current.loaded_by_this_app,
                }
            }
            ReconcileCommand::Unload => {
                link.setup_profile(profile, ProfileAction::Unload).await?;
                ReconcileEvent::Unloaded
            }
            ReconcileCommand::Load => match link.setup_profile(profile, ProfileAction::Load).await
            {
                Ok(()) => ReconcileEvent::Loaded,
                Err(MuxError::ProfileConflict { reason }) => {
                    warn!(profile, reason, "profile held by another app");
                    ReconcileEvent::Conflict
                }
                Err(err) => return Err(err),
            },
            ReconcileCommand::LoadGuest => {
                link.load_guest_profile().await?;
                ReconcileEvent::GuestLoaded
            }
        };
        step = machine.on_event(event);
    }
}

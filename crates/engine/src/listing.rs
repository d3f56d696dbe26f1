//! Grouped, permission-filtered listing of commands for clients.

use consoleport_types::{CommandListing, GroupedListing, MissingCommand};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{CommandBridge, display_title, permissions::Gate, project};

impl CommandBridge {
    /// Projects every configured identifier the caller may see.
    ///
    /// Denied identifiers are dropped, unknown ones are reported as
    /// [`MissingCommand`] placeholders, and groups left empty are omitted.
    /// Group keys are title-cased; groups whose titles collide are merged.
    pub fn list_for_client(&self, groups: &IndexMap<String, Vec<String>>, gate: &dyn Gate) -> GroupedListing {
        let mut listing = GroupedListing::new();

        for (group, identifiers) in groups {
            let entries: Vec<CommandListing> = identifiers
                .iter()
                .filter(|identifier| {
                    let allowed = self.policy().allows(identifier, gate);
                    if !allowed {
                        debug!(group = %group, command = %identifier, "hidden by permission guard");
                    }
                    allowed
                })
                .map(|identifier| match self.registry().get(identifier) {
                    Some(command) => CommandListing::Command(project(&command)),
                    None => {
                        warn!(group = %group, command = %identifier, "configured command is not registered");
                        CommandListing::Missing(MissingCommand::new(identifier.as_str()))
                    }
                })
                .collect();

            if entries.is_empty() {
                continue;
            }
            listing.entry(display_title(group)).or_default().extend(entries);
        }

        listing
    }
}

use tracing::debug;
use crate::form::diff::DifferenceEntry;
use crate::form::path::build_path;
use crate::runtime::command::Command;

/// Turns one render pass's differences into property updates for `action_id`.
///
/// Every entry that adds or changes a value yields its own `SetProperty`, in
/// input order. Deletions, array shrinks and entries with an empty path yield nothing.
pub fn reconcile(action_id: &str, entries: &[DifferenceEntry]) -> Vec<Command> {
    let mut commands = Vec::new();

    for entry in entries {
        let Some((segments, value)) = entry.applicable_change() else {
            continue;
        };

        let property_name = build_path(&segments);
        if property_name.is_empty() {
            debug!(action_id, "Skipping difference with empty path");
            continue;
        }

        commands.push(Command::SetProperty {
            action_id: action_id.to_string(),
            property_name,
            value: value.clone(),
        });
    }

    commands
}

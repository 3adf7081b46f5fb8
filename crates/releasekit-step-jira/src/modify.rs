//! Ticket modification templates
//!
//! Declarative per-ticket mutations applied during a build. Each
//! modification validates its target against the cached field metadata
//! before appending operations to the update builder; the builder itself
//! never validates.

use releasekit_step_api::{
    StepError,
    StepResult,
    VariableResolver,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::fields::{
    find_field,
    FieldDescriptor,
    SUPPORTED_ELEMENT_TYPES,
};
use crate::update::IssueUpdateBuilder;

/// One declarative mutation of a ticket.
///
/// `field` names are human-readable; they are resolved against the remote
/// field metadata at apply time. All string values may contain `${var}`
/// references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TicketModification {
    /// Replace a scalar field's value
    SetField { field: String, value: String },
    /// Add one element to an array field
    AddValue { field: String, value: String },
    /// Remove one element from an array field
    RemoveValue { field: String, value: String },
    /// Replace an array field's entire contents
    ReplaceValues { field: String, values: Vec<String> },
    /// Add a comment
    AddComment { body: String },
    /// Add a version to the affected-versions list
    AddAffectedVersion { version: String },
    /// Remove a version from the affected-versions list
    RemoveAffectedVersion { version: String },
    /// Perform a workflow transition after the field update
    Transition { name: String },
}

impl TicketModification {
    /// Applies this modification to the builder, collecting transition names
    /// separately since transitions go through their own endpoint.
    pub fn apply(
        &self, fields: &[FieldDescriptor], vars: &VariableResolver,
        builder: &mut IssueUpdateBuilder, transitions: &mut Vec<String>,
    ) -> StepResult<()> {
        match self {
            TicketModification::SetField { field, value } => {
                let descriptor = resolve_target(fields, vars, field, false)?;
                builder.set_field_value(
                    &descriptor.id,
                    descriptor.element_type(),
                    &vars.resolve(value),
                );
            }
            TicketModification::AddValue { field, value } => {
                let descriptor = resolve_target(fields, vars, field, true)?;
                builder.add_field_value(
                    &descriptor.id,
                    descriptor.element_type(),
                    &vars.resolve(value),
                );
            }
            TicketModification::RemoveValue { field, value } => {
                let descriptor = resolve_target(fields, vars, field, true)?;
                builder.remove_field_value(
                    &descriptor.id,
                    descriptor.element_type(),
                    &vars.resolve(value),
                );
            }
            TicketModification::ReplaceValues { field, values } => {
                let descriptor = resolve_target(fields, vars, field, true)?;
                let resolved: Vec<String> = values.iter().map(|v| vars.resolve(v)).collect();
                let resolved: Vec<&str> = resolved.iter().map(String::as_str).collect();
                builder.set_array_field(&descriptor.id, descriptor.element_type(), &resolved);
            }
            TicketModification::AddComment { body } => {
                builder.add_comment(&vars.resolve(body));
            }
            TicketModification::AddAffectedVersion { version } => {
                builder.add_affected_version(&vars.resolve(version));
            }
            TicketModification::RemoveAffectedVersion { version } => {
                builder.remove_affected_version(&vars.resolve(version));
            }
            TicketModification::Transition { name } => {
                transitions.push(vars.resolve(name));
            }
        }
        Ok(())
    }
}

/// Looks the field up by human-readable name and checks every precondition
/// for a generic edit: the field exists, is modifiable, matches the
/// requested array-ness and carries a supported element type.
fn resolve_target<'a>(
    fields: &'a [FieldDescriptor], vars: &VariableResolver, name: &str, want_array: bool,
) -> StepResult<&'a FieldDescriptor> {
    let name = vars.resolve(name);
    let descriptor = find_field(fields, &name)?;

    if !descriptor.modifiable {
        return Err(StepError::Validation(format!(
            "Field \"{}\" is not modifiable",
            descriptor.name
        )));
    }
    if want_array && !descriptor.array {
        return Err(StepError::Validation(format!(
            "Field \"{}\" is not an array field, use a set modification",
            descriptor.name
        )));
    }
    if !want_array && descriptor.array {
        return Err(StepError::Validation(format!(
            "Field \"{}\" is an array field, use an array modification",
            descriptor.name
        )));
    }
    if !SUPPORTED_ELEMENT_TYPES.contains(&descriptor.element_type()) {
        return Err(StepError::Validation(format!(
            "Field \"{}\" has unsupported type \"{}\"",
            descriptor.name,
            descriptor.element_type()
        )));
    }
    Ok(descriptor)
}

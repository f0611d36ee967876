//! Error reporting for the `dash` binary.

use dash_persistence::PersistenceError;

/// Render a command failure for stderr.
///
/// The first line is the full context chain. When the failure comes from the
/// persistence layer, its plain-language message and remediation hint follow.
pub fn error_report(error: &anyhow::Error) -> String {
    let mut lines = vec![format!("error: {error:#}")];
    if let Some(persistence) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PersistenceError>())
    {
        lines.push(format!("  {}", persistence.user_message()));
        if let Some(suggestion) = persistence.suggestion() {
            lines.push(format!("  hint: {suggestion}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn plain_errors_are_a_single_line() {
        let error = anyhow!("no sheet with id 'sheet-9'");
        assert_eq!(error_report(&error), "error: no sheet with id 'sheet-9'");
    }
}

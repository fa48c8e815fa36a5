use crate::print_success;
use abt_core::{CurveConfig, LinearCurve};
use std::path::Path;

/// Write the active curve (canonical unless overridden) as TOML.
pub fn handle_init(
    output: &Path,
    force: bool,
    curve: &LinearCurve,
) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            output.display()
        )
        .into());
    }

    CurveConfig::from(*curve).save_to_file(output)?;
    print_success(&format!("Curve config written to {}", output.display()));
    Ok(())
}

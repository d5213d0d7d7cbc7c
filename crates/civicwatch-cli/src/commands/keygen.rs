//! Field encryption key generation.

use serde::Serialize;

use civicwatch_core::error::AppError;
use civicwatch_security::FieldKey;

use crate::output::{self, OutputFormat};

/// A freshly generated key in both accepted encodings.
#[derive(Debug, Serialize)]
struct GeneratedKey {
    hex: String,
    base64: String,
}

/// Execute the keygen command
pub fn execute(format: OutputFormat) -> Result<(), AppError> {
    let key = FieldKey::ephemeral();
    let generated = GeneratedKey {
        hex: key.to_hex(),
        base64: key.to_base64(),
    };

    match format {
        OutputFormat::Text => {
            output::print_success("Generated a new 32-byte field encryption key");
            output::print_kv("hex", &generated.hex);
            output::print_kv("base64", &generated.base64);
            println!();
            println!("Set one of these as [security].field_key (or CIVICWATCH__SECURITY__FIELD_KEY).");
        }
        OutputFormat::Json => {
            output::print_item(&generated, format);
        }
    }

    Ok(())
}

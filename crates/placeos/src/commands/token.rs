//! `placeos token`: authorize and describe the session token.

use chrono::DateTime;
use placeos_core::Provider;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// The token itself is never printed.
pub async fn handle(provider: &Provider, global: &GlobalOpts) -> Result<(), CliError> {
    let token = provider.token().await.ok_or_else(|| CliError::EmptyResult {
        what: "no access token held after authorization".into(),
    })?;

    let expires_at = token.expires_at().as_ref().map(DateTime::to_rfc3339);
    let summary = serde_json::json!({
        "token_type": token.token_type,
        "scope": token.scope,
        "expires_in": token.expires_in,
        "expires_at": expires_at,
        "refreshable": token.refresh_token.is_some(),
    });

    let out = match global.output {
        OutputFormat::Plain => expires_at.unwrap_or_else(|| "never".to_owned()),
        format => output::render_entity(format, &summary)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

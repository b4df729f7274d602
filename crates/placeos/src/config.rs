//! CLI configuration: `placeos_config` plus `GlobalOpts` flag overrides.

use placeos_config::{ConfigError, Profile, config_path, load_config, select_profile};
use placeos_core::ProviderConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Name used when the engine comes purely from flags and environment.
const FLAGS_PROFILE: &str = "command-line";

/// Resolve the provider config: profile from file/env, then flag overrides.
pub fn build_provider_config(global: &GlobalOpts) -> Result<ProviderConfig, CliError> {
    let cfg = load_config()?;

    let (name, mut profile) = match select_profile(&cfg, global.profile.as_deref()) {
        Ok((name, profile)) => (name, profile.clone()),
        Err(ConfigError::ProfileNotFound { name }) if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        Err(ConfigError::ProfileNotFound { .. }) => (FLAGS_PROFILE.to_owned(), Profile::default()),
        Err(e) => return Err(e.into()),
    };

    apply_overrides(&mut profile, global);

    if profile.host.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    tracing::debug!(profile = %name, host = %profile.host, "resolved engine profile");
    Ok(placeos_config::profile_to_provider_config(
        &profile,
        &name,
        &cfg.defaults,
    )?)
}

/// Flags win over profile values.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref client_id) = global.client_id {
        profile.client_id = Some(client_id.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

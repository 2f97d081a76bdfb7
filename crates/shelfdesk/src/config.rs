//! CLI-aware configuration: layers global flags over the shared
//! `shelfdesk-config` profiles to produce a `ClientConfig`.

use std::time::Duration;

use clap::ValueEnum;
use shelfdesk_config::{ConfigError, resolve_client_config};
use shelfdesk_core::ClientConfig;

pub use shelfdesk_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, parse_api_url,
    profile_to_client_config, save_config,
};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Output defaults ──────────────────────────────────────────────────

impl GlobalOpts {
    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

/// Fill `--output`/`--color` from `[defaults]` when neither flag nor env
/// var set them. Unrecognised config values are ignored.
pub fn apply_output_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&defaults.color, true).ok();
    }
}

// ── Client config ────────────────────────────────────────────────────

/// Resolve the active profile name from `--profile` or the config default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// `--api-url` wins over any profile and works without one. The result
/// never auto-refreshes or reloads after mutations.
pub fn build_client_config(global: &GlobalOpts, cfg: &Config) -> Result<ClientConfig, CliError> {
    let mut client = match resolve_client_config(cfg, global.profile.as_deref()) {
        Ok(client) => client,
        Err(ConfigError::ProfileNotFound { .. }) if global.api_url.is_some() => {
            profile_to_client_config(&Profile::default(), &cfg.defaults)?
        }
        Err(ConfigError::ProfileNotFound { name }) => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(cfg),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref raw) = global.api_url {
        client.url = parse_api_url(raw)?;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }
    client.refresh_interval_secs = 0;
    client.reload_after_mutation = false;

    tracing::debug!(
        url = %client.url,
        profile = %active_profile_name(global, cfg),
        "resolved API endpoint"
    );
    Ok(client)
}

pub fn available_profiles(cfg: &Config) -> String {
    let names = cfg.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["shelfdesk"];
        argv.extend_from_slice(args);
        argv.push("dashboard");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn defaults(output: &str, color: &str) -> Defaults {
        Defaults {
            output: output.into(),
            color: color.into(),
            ..Defaults::default()
        }
    }

    #[test]
    fn config_defaults_fill_unset_flags() {
        let mut opts = global(&[]);
        apply_output_defaults(&mut opts, &defaults("json-compact", "never"));
        assert_eq!(opts.output_format(), OutputFormat::JsonCompact);
        assert_eq!(opts.color_mode(), ColorMode::Never);
    }

    #[test]
    fn flags_win_over_config_defaults() {
        let mut opts = global(&["--output", "yaml", "--color", "always"]);
        apply_output_defaults(&mut opts, &defaults("json", "never"));
        assert_eq!(opts.output_format(), OutputFormat::Yaml);
        assert_eq!(opts.color_mode(), ColorMode::Always);
    }

    #[test]
    fn unknown_config_values_fall_back() {
        let mut opts = global(&[]);
        apply_output_defaults(&mut opts, &defaults("xml", "sometimes"));
        assert_eq!(opts.output_format(), OutputFormat::Table);
        assert_eq!(opts.color_mode(), ColorMode::Auto);
    }

    #[test]
    fn api_url_overrides_missing_profile() {
        let opts = global(&["--profile", "nope", "--api-url", "http://10.0.0.5:9000"]);
        let client = build_client_config(&opts, &Config::default()).unwrap();
        assert_eq!(client.url.as_str(), "http://10.0.0.5:9000/");
        assert!(!client.reload_after_mutation);
        assert_eq!(client.refresh_interval_secs, 0);
    }

    #[test]
    fn missing_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("branch".into(), Profile::default());
        let err = build_client_config(&global(&["--profile", "main"]), &cfg).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "main");
                assert_eq!(available, "branch");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn timeout_flag_overrides_profile() {
        let opts = global(&["--timeout", "7"]);
        let client = build_client_config(&opts, &Config::default()).unwrap();
        assert_eq!(client.timeout, Duration::from_secs(7));
    }
}

//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const OUTPUT_CHOICES: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];
const COLOR_CHOICES: &[&str] = &["auto", "always", "never"];

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config as TOML-like text for `config show`.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.refresh_interval {
            let _ = writeln!(out, "refresh_interval = {interval}");
        }
    }

    out
}

fn parse_seconds(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

fn one_of(field: &str, value: String, choices: &[&str]) -> Result<String, CliError> {
    if choices.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: field.into(),
            reason: format!("must be one of: {}", choices.join(", ")),
        })
    }
}

/// Apply one `config set` assignment. Keys without a `defaults.` prefix
/// address the active profile.
fn apply_setting(
    cfg: &mut Config,
    profile_name: &str,
    key: &str,
    value: String,
) -> Result<(), CliError> {
    match key {
        "defaults.output" => cfg.defaults.output = one_of(key, value, OUTPUT_CHOICES)?,
        "defaults.color" => cfg.defaults.color = one_of(key, value, COLOR_CHOICES)?,
        "defaults.timeout" => cfg.defaults.timeout = parse_seconds(key, &value)?,
        _ => {
            let profile = cfg.profiles.entry(profile_name.to_owned()).or_default();
            match key {
                "api_url" | "api-url" => {
                    config::parse_api_url(&value)?;
                    profile.api_url = value;
                }
                "timeout" => profile.timeout = Some(parse_seconds(key, &value)?),
                "refresh_interval" | "refresh-interval" => {
                    profile.refresh_interval = Some(parse_seconds(key, &value)?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: api_url, timeout, \
                             refresh_interval, defaults.output, defaults.color, defaults.timeout"
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("shelfdesk configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Library API URL")
                .default(Profile::default().api_url)
                .validate_with(|raw: &String| {
                    config::parse_api_url(raw)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let output_selection = Select::new()
                .with_prompt("Default output format")
                .items(OUTPUT_CHOICES)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut profiles = HashMap::new();
            profiles.insert(
                profile_name.clone(),
                Profile {
                    api_url,
                    ..Profile::default()
                },
            );

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults {
                    output: OUTPUT_CHOICES[output_selection].to_owned(),
                    ..Defaults::default()
                },
                profiles,
            };

            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: shelfdesk dashboard");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(global.output_format(), &cfg, format_config, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            apply_setting(&mut cfg, &profile_name, &key, value)?;

            config::save_config(&cfg)?;
            if key.starts_with("defaults.") {
                output::success(&format!("Set {key}"), global);
            } else {
                output::success(&format!("Set {key} on profile '{profile_name}'"), global);
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: shelfdesk config init");
            } else {
                for name in cfg.profile_names() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::success(&format!("Default profile set to '{name}'"), global);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_profile_keys_creates_the_profile() {
        let mut cfg = Config::default();
        apply_setting(&mut cfg, "lab", "api_url", "http://lab:9000".into()).unwrap();
        apply_setting(&mut cfg, "lab", "refresh-interval", "15".into()).unwrap();

        let lab = &cfg.profiles["lab"];
        assert_eq!(lab.api_url, "http://lab:9000");
        assert_eq!(lab.refresh_interval, Some(15));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut cfg = Config::default();
        assert!(apply_setting(&mut cfg, "default", "api_url", "ftp://x".into()).is_err());
        assert!(apply_setting(&mut cfg, "default", "timeout", "soon".into()).is_err());
        assert!(apply_setting(&mut cfg, "default", "defaults.color", "pink".into()).is_err());
        assert!(apply_setting(&mut cfg, "default", "site", "x".into()).is_err());
    }

    #[test]
    fn set_defaults_leaves_profiles_alone() {
        let mut cfg = Config::default();
        apply_setting(&mut cfg, "default", "defaults.output", "yaml".into()).unwrap();
        assert_eq!(cfg.defaults.output, "yaml");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn show_lists_profiles_in_order() {
        let mut cfg = Config::default();
        cfg.profiles.insert("zeta".into(), Profile::default());
        cfg.profiles.insert("alpha".into(), Profile::default());
        let text = format_config(&cfg);
        let alpha = text.find("[profiles.alpha]").unwrap();
        let zeta = text.find("[profiles.zeta]").unwrap();
        assert!(alpha < zeta);
        assert!(text.contains("api_url = \"http://localhost:8000\""));
    }
}

//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, Profile};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the profile command, saving changes to `path`.
pub fn execute_profile(
    args: ProfileArgs,
    config: &mut Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProfileAction::List => {
            print!("{}", list_profiles(config, formatter));
            Ok(())
        }
        ProfileAction::Show => {
            print!("{}", show_active_profile(config, formatter)?);
            Ok(())
        }
        ProfileAction::Switch { name } => {
            config.switch_profile(name.clone())?;
            config.save_to(path)?;
            println!("{}", formatter.success(&format!("Switched to profile '{}'", name)));
            Ok(())
        }
        ProfileAction::Set {
            name,
            bucket,
            prefix,
            region,
            max_age,
            max_files,
        } => {
            let profile = Profile {
                bucket: Some(bucket),
                region,
                prefix: Some(prefix),
                max_age,
                max_files,
                ..config.profiles.get(&name).cloned().unwrap_or_default()
            };
            let action = set_profile(config, name.clone(), profile);
            config.save_to(path)?;
            println!("{}", formatter.success(&format!("{} profile '{}'", action, name)));
            Ok(())
        }
        ProfileAction::Delete { name } => {
            if delete_profile(config, &name)? {
                config.save_to(path)?;
                println!("{}", formatter.success(&format!("Deleted profile '{}'", name)));
            } else {
                println!("{}", formatter.warning(&format!("Profile '{}' does not exist", name)));
            }
            Ok(())
        }
    }
}

/// Render all profiles, marking the active one.
fn list_profiles(config: &Config, formatter: &Formatter) -> String {
    if config.profiles.is_empty() {
        return format!("{}\n", formatter.info("No profiles configured"));
    }

    let mut out = String::from("Available profiles:\n");
    for (name, profile) in &config.profiles {
        let active = config.active_profile.as_deref() == Some(name.as_str());
        if active {
            out.push_str(&format!("* {}\n", formatter.success(name)));
        } else {
            out.push_str(&format!("  {}\n", name));
        }
        out.push_str(&describe(profile, "    "));
    }
    out
}

/// Render the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<String> {
    let Some(name) = config.active_profile.as_deref() else {
        return Ok(format!("{}\n", formatter.info("No active profile")));
    };
    let profile = config
        .resolve_profile(Some(name))?
        .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", name)))?;

    Ok(format!(
        "Active profile: {}\n{}",
        formatter.success(name),
        describe(profile, "  ")
    ))
}

fn describe(profile: &Profile, indent: &str) -> String {
    let mut out = String::new();
    let target = format!(
        "s3://{}/{}",
        profile.bucket.as_deref().unwrap_or("?"),
        profile.prefix.as_deref().unwrap_or("")
    );
    out.push_str(&format!("{}Target: {}\n", indent, target));
    if let Some(region) = &profile.region {
        out.push_str(&format!("{}Region: {}\n", indent, region));
    }
    if let Some(max_age) = profile.max_age {
        out.push_str(&format!("{}Max age: {}\n", indent, humantime::format_duration(max_age)));
    }
    if let Some(max_files) = profile.max_files {
        out.push_str(&format!("{}Max files: {}\n", indent, max_files));
    }
    out
}

/// Create or update a profile, returning the action taken.
fn set_profile(config: &mut Config, name: String, profile: Profile) -> &'static str {
    let action = if config.profiles.contains_key(&name) {
        "Updated"
    } else {
        "Created"
    };
    config.set_profile(name, profile);
    action
}

/// Delete a profile; the active profile cannot be deleted.
fn delete_profile(config: &mut Config, name: &str) -> Result<bool> {
    if config.active_profile.as_deref() == Some(name) {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }
    Ok(config.profiles.remove(name).is_some())
}

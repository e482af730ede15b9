//! Cluster role commands

use super::App;
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use lensadm_cli::output::{self, OutputFormat};
use lensadm_cli::roles::{RoleController, RoleViewer};
use lensadm_common::forms::RULES_TEMPLATE;
use lensadm_common::{ClusterRole, PolicyRule};
use std::path::{Path, PathBuf};
use tabled::Tabled;

#[derive(Subcommand)]
pub enum RoleCommands {
    /// List cluster roles
    List,
    /// Show a role and its rules
    Show { name: String },
    /// Print the starter rules document
    Template,
    /// Create a role
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        rules: RulesArgs,
    },
    /// Change a role's description or rules
    Update {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        rules: RulesArgs,
    },
    /// Delete a role
    Delete { name: String },
}

#[derive(Args)]
pub struct RulesArgs {
    /// YAML list of policy rules
    #[arg(short, long, value_name = "RULES.yaml")]
    file: Option<PathBuf>,
    /// Drop rule N as numbered by `role show` (repeatable)
    #[arg(long, value_name = "N")]
    remove_rule: Vec<usize>,
    /// Append an empty rule to fill in
    #[arg(long, requires = "edit")]
    add_rule: bool,
    /// Edit the rules in $EDITOR
    #[arg(long)]
    edit: bool,
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "MANAGED")]
    managed: String,
    #[tabled(rename = "RULES")]
    rules: usize,
    #[tabled(rename = "AGE")]
    age: String,
}

impl From<&ClusterRole> for RoleRow {
    fn from(role: &ClusterRole) -> Self {
        Self {
            name: role.name.clone(),
            description: output::truncate(role.description(), 40),
            managed: if role.is_managed() { "yes" } else { "no" }.to_string(),
            rules: role.rules.len(),
            age: output::format_age(role.created_at()),
        }
    }
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "API GROUPS")]
    api_groups: String,
    #[tabled(rename = "RESOURCES")]
    resources: String,
    #[tabled(rename = "VERBS")]
    verbs: String,
    #[tabled(rename = "RESOURCE NAMES")]
    resource_names: String,
}

impl RuleRow {
    fn new(number: usize, rule: &PolicyRule) -> Self {
        let join = |values: &[String]| {
            if values.is_empty() {
                "-".to_string()
            } else {
                values
                    .iter()
                    .map(|v| if v.is_empty() { "\"\"" } else { v.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        Self {
            number,
            api_groups: join(&rule.api_groups),
            resources: join(&rule.resources),
            verbs: join(&rule.verbs),
            resource_names: join(&rule.resource_names),
        }
    }
}

pub fn print_roles(roles: &[ClusterRole], format: OutputFormat) -> Result<()> {
    let rows: Vec<RoleRow> = roles.iter().map(RoleRow::from).collect();
    output::print_output(rows, &roles, format)
}

fn print_viewer(viewer: &RoleViewer, format: OutputFormat) -> Result<()> {
    let Some(role) = viewer.role.as_ref().filter(|_| viewer.visible) else {
        return Ok(());
    };
    if format != OutputFormat::Table {
        return output::print_single(role, format);
    }

    output::print_heading(&role.name);
    if !role.description().is_empty() {
        println!("  Description: {}", role.description());
    }
    println!("  Managed:     {}", if role.is_managed() { "yes" } else { "no" });
    println!("  Age:         {}", output::format_age(role.created_at()));
    println!();
    output::print_table(
        role.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| RuleRow::new(i + 1, rule))
            .collect(),
    );
    Ok(())
}

pub async fn handle_role_command(command: RoleCommands, app: &App) -> Result<()> {
    if let RoleCommands::Template = command {
        print!("{}", RULES_TEMPLATE);
        return Ok(());
    }

    app.require_login()?;
    let roles = app.dashboard.roles();

    match command {
        RoleCommands::Template => {}

        RoleCommands::List => {
            app.with_spinner("Loading roles", roles.load()).await?;
            print_roles(&roles.list(), app.format)?;
        }

        RoleCommands::Show { name } => {
            let role = roles.fetch(&name).await?;
            roles.view(&role);
            print_viewer(&roles.viewer().get(), app.format)?;
            roles.close_view();
        }

        RoleCommands::Create {
            name,
            description,
            rules,
        } => {
            roles.open_create();
            roles.edit_form(|form| {
                form.name = name;
                form.description = description.unwrap_or_default();
            });
            apply_rules(&roles, rules)?;
            app.with_spinner("Creating role", roles.save()).await?;
        }

        RoleCommands::Update {
            name,
            description,
            rules,
        } => {
            let role = roles.fetch(&name).await?;
            roles.open_edit(&role)?;
            if let Some(description) = description {
                roles.edit_form(|form| form.description = description);
            }
            apply_rules(&roles, rules)?;
            app.with_spinner("Updating role", roles.save()).await?;
        }

        RoleCommands::Delete { name } => {
            let role = roles.fetch(&name).await?;
            if !roles.delete(&role).await? {
                output::print_info("Cancelled");
            }
        }
    }

    Ok(())
}

/// Load, prune, extend, then hand-edit the editor's rules, in that order
fn apply_rules(roles: &RoleController, args: RulesArgs) -> Result<()> {
    if let Some(path) = args.file.as_deref() {
        let text = read_rules(path)?;
        roles.edit_form(|form| form.rules_yaml = text);
    }

    let mut numbers = args.remove_rule;
    numbers.sort_unstable_by(|a, b| b.cmp(a));
    numbers.dedup();
    for number in numbers {
        let removed = match number.checked_sub(1) {
            Some(index) => roles.remove_rule(index)?,
            None => false,
        };
        if !removed {
            anyhow::bail!("no rule #{}", number);
        }
    }

    if args.add_rule {
        roles.add_rule()?;
    }

    if args.edit {
        let current = roles.form().rules_yaml;
        match dialoguer::Editor::new().extension(".yaml").edit(&current)? {
            Some(text) => roles.edit_form(|form| form.rules_yaml = text),
            None => anyhow::bail!("editor closed without saving, nothing changed"),
        }
    }
    Ok(())
}

fn read_rules(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

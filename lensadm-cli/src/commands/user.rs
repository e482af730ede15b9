//! Lens user commands

use super::App;
use anyhow::Result;
use clap::Subcommand;
use lensadm_cli::output::{self, OutputFormat};
use lensadm_common::{LensUser, RoleRef, DEFAULT_NAMESPACE};
use std::path::PathBuf;
use tabled::Tabled;

#[derive(Subcommand)]
pub enum UserCommands {
    /// List lens users
    List {
        /// Only users in this namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Show a user's full resource
    Show {
        name: String,
        #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
    },
    /// Create a user
    Create {
        name: String,
        #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
        /// Role binding, repeatable (defaults to admin@kube-system)
        #[arg(short, long = "role", value_name = "ROLE@NS")]
        roles: Vec<RoleRef>,
    },
    /// Change a user's role bindings
    Update {
        name: String,
        #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
        #[arg(long = "add-role", value_name = "ROLE@NS")]
        add: Vec<RoleRef>,
        #[arg(long = "remove-role", value_name = "ROLE@NS")]
        remove: Vec<RoleRef>,
    },
    /// Delete a user
    Delete {
        name: String,
        #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
    },
    /// Print or save a user's kubeconfig
    Kubeconfig {
        name: String,
        #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
        /// Save to a file instead of printing
        #[arg(long)]
        download: bool,
        /// Directory the file is saved in
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "NAMESPACE")]
    namespace: String,
    #[tabled(rename = "ROLES")]
    roles: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "AGE")]
    age: String,
}

impl From<&LensUser> for UserRow {
    fn from(user: &LensUser) -> Self {
        let roles = user
            .spec
            .roles
            .iter()
            .map(RoleRef::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let status = match user.provisioning_failure() {
            Some(message) => format!("failed: {}", output::truncate(&message, 40)),
            None => "ok".to_string(),
        };

        Self {
            name: user.name().to_string(),
            namespace: user.namespace().to_string(),
            roles,
            status,
            age: output::format_age(user.created_at()),
        }
    }
}

/// Print users in the requested format
pub fn print_users(users: &[LensUser], format: OutputFormat) -> Result<()> {
    let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
    output::print_output(rows, &users, format)
}

pub async fn handle_user_command(command: UserCommands, app: &App) -> Result<()> {
    app.require_login()?;
    let users = app.dashboard.users();

    match command {
        UserCommands::List { namespace } => {
            app.with_spinner("Loading users", users.load_in(namespace.as_deref()))
                .await?;
            print_users(&users.list(), app.format)?;
        }

        UserCommands::Show { name, namespace } => {
            let user = users.fetch(&name, &namespace).await?;
            output::print_single(&user, app.format)?;
            if let Some(failure) = user.provisioning_failure() {
                output::print_warning(&format!("Provisioning failed: {}", failure));
            }
        }

        UserCommands::Create {
            name,
            namespace,
            roles,
        } => {
            app.with_spinner("Loading roles", app.dashboard.show_create_user_dialog())
                .await;
            users.edit_form(|form| {
                form.name = name;
                form.namespace = namespace;
                if !roles.is_empty() {
                    form.roles = roles;
                }
            });
            warn_unknown_roles(app, &users.form().roles);
            app.with_spinner("Creating user", users.save()).await?;
        }

        UserCommands::Update {
            name,
            namespace,
            add,
            remove,
        } => {
            let user = users.fetch(&name, &namespace).await?;
            app.dashboard.edit_user(&user).await;

            for binding in &remove {
                match users.form().roles.iter().position(|r| r == binding) {
                    Some(index) => {
                        app.dashboard.remove_role(index);
                    }
                    None => output::print_warning(&format!(
                        "{} has no binding {}, skipping",
                        name, binding
                    )),
                }
            }
            for binding in add {
                if users.form().roles.contains(&binding) {
                    continue;
                }
                app.dashboard.add_role();
                users.edit_form(|form| {
                    if let Some(last) = form.roles.last_mut() {
                        *last = binding;
                    }
                });
            }

            warn_unknown_roles(app, &users.form().roles);
            app.with_spinner("Updating user", users.save()).await?;
        }

        UserCommands::Delete { name, namespace } => {
            let user = users.fetch(&name, &namespace).await?;
            if !users.delete(&user).await? {
                output::print_info("Cancelled");
            }
        }

        UserCommands::Kubeconfig {
            name,
            namespace,
            download,
            dir,
        } => {
            let user = users.fetch(&name, &namespace).await?;
            let content = app
                .with_spinner("Fetching kubeconfig", users.preview_kubeconfig(&user))
                .await?;

            if download {
                users.download_kubeconfig(&dir)?;
            } else {
                print!("{}", content);
            }
            users.close_preview();
        }
    }

    Ok(())
}

/// Warn about bindings naming a role the server does not know
fn warn_unknown_roles(app: &App, bindings: &[RoleRef]) {
    let roles = app.dashboard.roles();
    if roles.is_empty() {
        return;
    }
    for binding in bindings {
        if !binding.name.is_empty() && roles.find(&binding.name).is_none() {
            output::print_warning(&format!("role {} does not exist", binding.name));
        }
    }
}

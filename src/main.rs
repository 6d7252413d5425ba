use anyhow::Context;
use clap::Parser;
use dept_admin::core::role_filter::available_roles;
use dept_admin::core::wizard::FieldErrors;
use dept_admin::utils::error::ErrorSeverity;
use dept_admin::utils::{logger, validation::Validate};
use dept_admin::{
    AdminConfig, AdminError, CliConfig, Command, CreateDepartmentWizard, DepartmentDetails,
    DepartmentList, DepartmentService, DetailsView, Field, InMemoryDepartmentService, ListView,
    Notification, RequestTracker, RoleFilter, RolesView, Transition,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match &cli.config {
        Some(path) => AdminConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => AdminConfig::default(),
    };

    // 初始化日誌
    if config.log_format() == "json" {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(config.log_level(), cli.verbose);
    }

    tracing::info!("Starting dept-admin CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let catalog = config.build_catalog()?;
    let service = Arc::new(InMemoryDepartmentService::new(catalog));

    if let Err(e) = run(&cli, &config, service).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::Medium => 2, // 可修正或可重試
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(
    cli: &CliConfig,
    config: &AdminConfig,
    service: Arc<InMemoryDepartmentService>,
) -> dept_admin::Result<()> {
    match &cli.command {
        Command::Roles { search, department } => {
            let tracker = RequestTracker::new("roles");
            let envelope = tracker.execute(|| service.list_roles()).await?;
            let filter = RoleFilter::new(search.clone(), department.clone());
            let roles = available_roles(&envelope.payload, &[], &filter);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&roles)?);
            } else {
                println!("{} Role(s)", roles.len());
                for role in roles {
                    println!("  {:<4} {:<24} {}", role.id, role.name, role.department);
                }
            }
        }

        Command::List { search, filter } => {
            let mut list = DepartmentList::new(service);
            list.refresh().await?;
            list.set_search(search.clone());
            list.set_filter(filter.clone());

            if let ListView::Ready { rows } = list.view() {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                } else if rows.is_empty() {
                    println!("{}", list.empty_message());
                } else {
                    println!("{}", list.count_label());
                    for row in rows {
                        println!(
                            "  {:<4} {:<16} roles={:<3} {}",
                            row.id, row.name, row.role_count, row.summary
                        );
                    }
                }
            }
        }

        Command::Show { id } => {
            let details = DepartmentDetails::new(service, id.clone());
            details.load().await?;
            if let DetailsView::Ready(department) = details.view() {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&department)?);
                } else {
                    println!("{} ({})", department.name, department.id);
                    println!("{}", department.description);
                    println!("Team Roles ({})", department.roles.len());
                    if department.roles.is_empty() {
                        println!("  No roles assigned to this department.");
                    }
                    for role in &department.roles {
                        println!("  {:<24} {}", role.name, role.department);
                    }
                }
            }
        }

        Command::Create {
            name,
            description,
            roles,
        } => {
            let mut wizard = CreateDepartmentWizard::new(Arc::clone(&service))
                .with_notification_auto_close(config.auto_close());
            wizard.change_field(Field::Name, name);
            wizard.change_field(Field::Description, description);
            expect_advance(wizard.next().await?)?;

            let catalog = match wizard.roles_view(&RoleFilter::default()) {
                RolesView::Ready { available, .. } => available,
                RolesView::Failed { message } => return Err(AdminError::service(message)),
                RolesView::Loading => return Err(AdminError::service("Role catalog is not loaded")),
            };
            for role_id in roles {
                let role = catalog
                    .iter()
                    .find(|role| &role.id == role_id)
                    .cloned()
                    .ok_or_else(|| {
                        AdminError::validation("roles", format!("Unknown role id '{}'", role_id))
                    })?;
                wizard.add_role(role);
            }
            expect_advance(wizard.next().await?)?;

            let notice = wizard.finish().await?;
            print_notification(&notice);
            if let Some(department) = wizard.created_department() {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(department)?);
                } else {
                    println!(
                        "  {} ({}) with {} role(s)",
                        department.name,
                        department.id,
                        department.roles.len()
                    );
                }
            }
            tracing::info!("📁 Departments now: {}", service.department_count().await);
        }

        Command::Update {
            id,
            name,
            description,
        } => {
            let mut details = DepartmentDetails::new(service, id.clone())
                .with_notification_auto_close(config.auto_close());
            details.load().await?;
            details.begin_edit();
            if let Some(name) = name {
                details.change_field(Field::Name, name);
            }
            if let Some(description) = description {
                details.change_field(Field::Description, description);
            }
            let notice = details.save().await?;
            print_notification(&notice);
        }

        Command::Delete { id } => {
            let mut details = DepartmentDetails::new(service, id.clone())
                .with_notification_auto_close(config.auto_close());
            details.request_delete();
            let notice = details.confirm_delete().await?;
            print_notification(&notice);
        }
    }

    Ok(())
}

fn expect_advance(transition: Transition) -> dept_admin::Result<()> {
    match transition {
        Transition::Blocked(errors) => Err(first_error(&errors)),
        Transition::Advanced(_) | Transition::Stayed(_) => Ok(()),
    }
}

fn first_error(errors: &FieldErrors) -> AdminError {
    errors
        .to_error()
        .unwrap_or_else(|| AdminError::validation("form", "Invalid input"))
}

fn print_notification(notice: &Notification) {
    println!("✅ {}", notice);
}

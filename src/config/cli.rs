use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the role catalog
    Roles {
        /// Case-insensitive match on role name
        #[arg(long, default_value = "")]
        search: String,

        /// Exact department label
        #[arg(long)]
        department: Option<String>,
    },

    /// List departments
    List {
        /// Case-insensitive match on name or description
        #[arg(long, default_value = "")]
        search: String,

        /// One of: product, engineering, accounting, marketing, support
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// Show a single department
    Show { id: String },

    /// Create a department through the wizard
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// Role id to assign (repeatable or comma separated)
        #[arg(long = "role", value_delimiter = ',')]
        roles: Vec<String>,
    },

    /// Edit a department's name and description
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a department
    Delete { id: String },
}

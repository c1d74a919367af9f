use clap::{Args, Parser, Subcommand};
use lettermerge::commands::filter::load_context;
use lettermerge::error::{MergeError, Result};
use lettermerge::filter::{
    CategorySelection, Condition, FilterContext, FilterGroup, OperatorKind, SearchColumns,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lettermerge", bin_name = "lettermerge", version)]
#[command(
    about = "Filter a contact directory and merge it into letters",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $LETTERMERGE_HOME, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

/// Logs go to stderr so stdout stays clean for piping. `RUST_LOG` wins over
/// `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Record(RecordCommands),

    #[command(flatten)]
    Data(DataCommands),

    #[command(flatten)]
    Merge(MergeCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// Add a record from field=value pairs
    #[command(alias = "n", display_order = 1)]
    Add {
        /// Fields, e.g. "Full Name=Asha Rao" "State=Kerala"
        #[arg(required = true, num_args = 1..)]
        fields: Vec<String>,

        /// Category id or name
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List records, newest first
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Search the whole record
        #[arg(short, long)]
        search: Option<String>,

        /// Category id
        #[arg(short, long, conflicts_with = "uncategorized")]
        category: Option<String>,

        /// Only records without a category
        #[arg(long)]
        uncategorized: bool,

        /// Column filter, e.g. "State=ker" (repeatable)
        #[arg(long = "where", value_name = "FIELD=TEXT")]
        column_filters: Vec<String>,

        /// Sort by a field, e.g. "Full Name" or "Year Established:desc"
        #[arg(long, value_name = "FIELD[:asc|desc]")]
        sort: Option<String>,
    },

    /// Show one or more records in full
    #[command(alias = "v", display_order = 3)]
    View {
        /// Indexes or id prefixes (e.g. 1 3 a1b2)
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,
    },

    /// Change fields or the category of records
    #[command(alias = "e", display_order = 4)]
    Update {
        /// Index or id prefix
        #[arg(required = true)]
        selector: String,

        /// Fields to overwrite, e.g. "Email=new@example.org"
        #[arg(num_args = 0..)]
        fields: Vec<String>,

        /// Move to this category (id or name)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete records by selector or by category
    #[command(alias = "rm", display_order = 5)]
    Delete {
        /// Indexes or id prefixes
        #[arg(num_args = 0.., required_unless_present_any = ["category", "uncategorized"])]
        selectors: Vec<String>,

        /// Delete every record with this category id
        #[arg(short, long, conflicts_with_all = ["selectors", "uncategorized"])]
        category: Option<String>,

        /// Delete every record without a category
        #[arg(long, conflicts_with = "selectors")]
        uncategorized: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Import records from a JSON file
    #[command(display_order = 10)]
    Import {
        /// JSON array of objects, or {"records": [...]}
        path: PathBuf,

        /// Put every imported row in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Export matching records to a JSON file
    #[command(display_order = 11)]
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output file
        #[arg(short, long, default_value = "records.json")]
        out: PathBuf,
    },

    /// List fields, or the distinct values of one field
    #[command(display_order = 12)]
    Fields {
        field: Option<String>,
    },

    /// Preview the records a filter selects
    #[command(display_order = 13)]
    Filter {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum MergeCommands {
    /// Render one document per matching record into a tar.gz archive
    #[command(alias = "g", display_order = 20)]
    Generate {
        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        template: TemplateArgs,

        /// html, text or mailto (default from config)
        #[arg(short, long)]
        format: Option<String>,

        /// email or letter (default from config)
        #[arg(short, long)]
        layout: Option<String>,

        /// Closing line of the letter layout (default from config)
        #[arg(long)]
        signature: Option<String>,

        /// Matching records to leave out (indexes or id prefixes)
        #[arg(short = 'x', long, num_args = 1..)]
        exclude: Vec<String>,

        /// Archive path
        #[arg(short, long, default_value = "letters.tar.gz")]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Manage categories
    #[command(alias = "cat", display_order = 30)]
    Category {
        #[command(subcommand)]
        action: Option<CategoryAction>,
    },

    /// Get or set configuration
    #[command(display_order = 31)]
    Config {
        /// Configuration key (format, layout, signature)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Initialize the data directory
    #[command(display_order = 32)]
    Init,
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// List categories with record counts
    #[command(alias = "ls")]
    List,

    /// Add a category
    Add {
        name: String,

        /// Free-form kind label
        #[arg(long = "type")]
        kind: Option<String>,
    },

    /// Rename a category
    Rename { category: String, new_name: String },

    /// Delete a category (records keep their stale reference)
    #[command(alias = "rm")]
    Delete { category: String },
}

/// Flags shared by every command that narrows records with a filter.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Read the whole filter from a JSON file
    #[arg(long, value_name = "FILE")]
    pub filter_file: Option<PathBuf>,

    /// Single category id
    #[arg(long, conflicts_with = "uncategorized")]
    pub category: Option<String>,

    /// Several category ids, comma separated
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Only records without a category
    #[arg(long)]
    pub uncategorized: bool,

    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Search the directory columns instead of the letter columns
    #[arg(long)]
    pub directory: bool,

    /// Condition "FIELD:OPERATOR:VALUE" (repeatable). Between takes
    /// "LOW,HIGH", inList takes "A,B,C".
    #[arg(short, long, value_name = "COND")]
    pub when: Vec<String>,

    /// Match any condition instead of all of them
    #[arg(long)]
    pub any: bool,
}

impl FilterArgs {
    /// Builds the filter. Flags given on the command line refine a filter
    /// file when both are present.
    pub fn to_context(&self) -> Result<FilterContext> {
        let mut ctx = match &self.filter_file {
            Some(path) => load_context(path)?,
            None => FilterContext::new(),
        };

        if self.uncategorized {
            ctx = ctx.with_category(CategorySelection::Uncategorized);
        } else if let Some(category) = &self.category {
            ctx = ctx.with_category(CategorySelection::parse(category));
        }
        if !self.categories.is_empty() {
            ctx = ctx.with_categories(self.categories.iter().map(|c| c.trim().to_string()));
        }
        if let Some(search) = &self.search {
            ctx = ctx.with_search(search.clone());
        }
        if self.directory {
            ctx = ctx.with_search_columns(SearchColumns::Directory);
        }

        if !self.when.is_empty() {
            let conditions = self
                .when
                .iter()
                .map(|w| parse_condition(w))
                .collect::<Result<Vec<_>>>()?;
            let group = if self.any {
                FilterGroup::or(conditions)
            } else {
                FilterGroup::and(conditions)
            };
            ctx = ctx.with_group(group);
        }
        Ok(ctx)
    }
}

/// Parses `FIELD:OPERATOR:VALUE`.
pub fn parse_condition(input: &str) -> Result<Condition> {
    let mut parts = input.splitn(3, ':');
    let (Some(field), Some(op), value) = (parts.next(), parts.next(), parts.next()) else {
        return Err(MergeError::Api(format!(
            "Invalid condition '{}' (expected FIELD:OPERATOR:VALUE)",
            input
        )));
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(MergeError::Api(format!("Condition '{}' has no field", input)));
    }
    let operator: OperatorKind = op.trim().parse().map_err(MergeError::Api)?;
    let value = value.unwrap_or("");

    Ok(match operator {
        OperatorKind::Between => match value.split_once(',') {
            Some((low, high)) => Condition::between(field, low.trim(), high.trim()),
            None => Condition::new(field, operator, value.trim()),
        },
        OperatorKind::InList => Condition::in_list(
            field,
            value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        ),
        _ => Condition::new(field, operator, value),
    })
}

/// Template source: a JSON file, or the parts given inline.
#[derive(Args, Debug, Default, Clone)]
pub struct TemplateArgs {
    /// JSON file with subject, to and body
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["body", "body_file"])]
    pub template: Option<PathBuf>,

    #[arg(long)]
    pub subject: Option<String>,

    /// Recipient, usually "{{Email}}"
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the body (markdown) from a file
    #[arg(long, value_name = "FILE")]
    pub body_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettermerge::filter::GroupLogic;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lettermerge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn global_data_dir_after_subcommand() {
        let cli = parse(&["list", "--data-dir", "/tmp/x"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn simple_condition() {
        let c = parse_condition("State:equals:Kerala").unwrap();
        assert_eq!(c, Condition::new("State", OperatorKind::Equals, "Kerala"));
    }

    #[test]
    fn value_may_contain_colons() {
        let c = parse_condition("Website:startsWith:https://").unwrap();
        assert_eq!(c.value, "https://");
    }

    #[test]
    fn between_and_in_list_split_on_commas() {
        let c = parse_condition("Year Established:between:1900, 2000").unwrap();
        assert_eq!(c, Condition::between("Year Established", "1900", "2000"));

        let c = parse_condition("State:inList:Kerala,Goa,").unwrap();
        assert_eq!(c.value_list, vec!["Kerala", "Goa"]);
    }

    #[test]
    fn bad_conditions_are_rejected() {
        assert!(parse_condition("State").is_err());
        assert!(parse_condition(":equals:x").is_err());
        assert!(parse_condition("State:like:x").is_err());
    }

    #[test]
    fn filter_flags_build_a_context() {
        let cli = parse(&[
            "filter",
            "--categories",
            "states,universities",
            "--search",
            "kerala",
            "--when",
            "State:contains:ker",
            "--when",
            "State:equals:Goa",
            "--any",
        ]);
        let Some(Commands::Data(DataCommands::Filter { filter })) = cli.command else {
            panic!("expected filter command");
        };
        let ctx = filter.to_context().unwrap();
        assert_eq!(ctx.selected_categories, vec!["states", "universities"]);
        assert_eq!(ctx.global_search, "kerala");
        assert_eq!(ctx.filter_groups.len(), 1);
        assert_eq!(ctx.filter_groups[0].logic, GroupLogic::Or);
        assert_eq!(ctx.filter_groups[0].conditions.len(), 2);
    }

    #[test]
    fn uncategorized_flag_selects_sentinel() {
        let args = FilterArgs {
            uncategorized: true,
            ..Default::default()
        };
        let ctx = args.to_context().unwrap();
        assert_eq!(ctx.selected_category, Some(CategorySelection::Uncategorized));
    }

    #[test]
    fn delete_needs_selectors_or_category() {
        assert!(Cli::try_parse_from(["lettermerge", "delete"]).is_err());
        assert!(Cli::try_parse_from(["lettermerge", "delete", "--uncategorized"]).is_ok());
        assert!(Cli::try_parse_from(["lettermerge", "delete", "1", "2"]).is_ok());
    }
}

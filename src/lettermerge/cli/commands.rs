//! # CLI Layer
//!
//! This module is one client of the lettermerge library. It is the only
//! place that:
//! - parses shell arguments
//! - prints to stdout (logs go to stderr through `tracing`)
//! - reads files the user names for templates and bodies
//!
//! Every handler follows the same shape: turn arguments into typed values,
//! call one `MergeApi` method, then print the `CmdResult` it returns. Business
//! rules stay in the library; the handlers only pick defaults (from
//! `config.json`) and format output.

use super::print::{
    print_full_records, print_messages, print_records, render_category_counts, render_config,
    render_fields, render_values,
};
use super::setup::{
    init_tracing, CategoryAction, Cli, Commands, DataCommands, FilterArgs, MergeCommands,
    MiscCommands, RecordCommands, TemplateArgs,
};
use chrono::Local;
use clap::Parser;
use lettermerge::api::{ConfigAction, GenerateRequest, ListQuery, MergeApi, SortSpec};
use lettermerge::commands::helpers::parse_selectors;
use lettermerge::config::MergeConfig;
use lettermerge::error::{MergeError, Result};
use lettermerge::filter::CategorySelection;
use lettermerge::init::{initialize, resolve_data_dir, HOME_ENV};
use lettermerge::model::{data_from_pairs, RecordData};
use lettermerge::store::fs::FileStore;
use lettermerge::template::render::{Layout, OutputFormat, RenderOptions};
use lettermerge::template::Template;
use std::path::PathBuf;

struct AppContext {
    api: MergeApi<FileStore>,
    config: MergeConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Record(cmd)) => match cmd {
            RecordCommands::Add { fields, category } => {
                handle_add(&mut ctx, fields, category)
            }
            RecordCommands::List {
                search,
                category,
                uncategorized,
                column_filters,
                sort,
            } => {
                let category = if uncategorized {
                    Some(CategorySelection::Uncategorized)
                } else {
                    category.as_deref().map(CategorySelection::parse)
                };
                let query = ListQuery {
                    search,
                    category,
                    column_filters: parse_column_filters(&column_filters)?,
                    sort: sort.as_deref().map(SortSpec::parse),
                };
                handle_list(&mut ctx, &query)
            }
            RecordCommands::View { selectors } => handle_view(&mut ctx, selectors),
            RecordCommands::Update {
                selector,
                fields,
                category,
            } => handle_update(&mut ctx, selector, fields, category),
            RecordCommands::Delete {
                selectors,
                category,
                uncategorized,
            } => {
                if uncategorized {
                    handle_delete_category(&mut ctx, CategorySelection::Uncategorized)
                } else if let Some(category) = category {
                    handle_delete_category(&mut ctx, CategorySelection::parse(&category))
                } else {
                    handle_delete(&mut ctx, selectors)
                }
            }
        },
        Some(Commands::Data(cmd)) => match cmd {
            DataCommands::Import { path, category } => handle_import(&mut ctx, path, category),
            DataCommands::Export { filter, out } => handle_export(&mut ctx, &filter, out),
            DataCommands::Fields { field } => handle_fields(&mut ctx, field),
            DataCommands::Filter { filter } => handle_filter(&mut ctx, &filter),
        },
        Some(Commands::Merge(cmd)) => match cmd {
            MergeCommands::Generate {
                filter,
                template,
                format,
                layout,
                signature,
                exclude,
                out,
            } => {
                let format = match format {
                    Some(f) => f.parse::<OutputFormat>().map_err(MergeError::Api)?,
                    None => ctx.config.format,
                };
                let layout = match layout {
                    Some(l) => l.parse::<Layout>().map_err(MergeError::Api)?,
                    None => ctx.config.layout,
                };
                let signature = signature.unwrap_or_else(|| ctx.config.signature.clone());
                let request = GenerateRequest {
                    ctx: filter.to_context()?,
                    exclude: parse_selectors(&exclude)?,
                    template: load_template(&template)?,
                    format,
                    options: RenderOptions::new(layout, signature, Local::now().date_naive()),
                    output: out,
                };
                handle_generate(&mut ctx, &request)
            }
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Category { action } => {
                handle_category(&mut ctx, action.unwrap_or(CategoryAction::List))
            }
            MiscCommands::Config { key, value } => handle_config(&mut ctx, key, value),
            MiscCommands::Init => handle_init(&mut ctx),
        },
        None => handle_list(&mut ctx, &ListQuery::default()),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let env_value = std::env::var(HOME_ENV).ok();
    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), env_value.as_deref())?;
    let ctx = initialize(data_dir)?;

    Ok(AppContext {
        api: ctx.api,
        config: ctx.config,
    })
}

fn parse_fields(fields: &[String]) -> Result<RecordData> {
    data_from_pairs(fields).map_err(MergeError::Api)
}

fn parse_column_filters(filters: &[String]) -> Result<Vec<(String, String)>> {
    filters
        .iter()
        .map(|f| {
            f.split_once('=')
                .map(|(field, text)| (field.trim().to_string(), text.to_string()))
                .ok_or_else(|| {
                    MergeError::Api(format!("Invalid column filter '{}' (expected FIELD=TEXT)", f))
                })
        })
        .collect()
}

/// A template file wins; otherwise the inline parts, with the body read
/// from `--body-file` when given.
fn load_template(args: &TemplateArgs) -> Result<Template> {
    if let Some(path) = &args.template {
        return Template::load(path);
    }
    let body = match (&args.body, &args.body_file) {
        (_, Some(path)) => std::fs::read_to_string(path)?,
        (Some(body), None) => body.clone(),
        (None, None) => String::new(),
    };
    Ok(Template::new(
        args.subject.clone().unwrap_or_default(),
        args.to.clone().unwrap_or_default(),
        body,
    ))
}

fn handle_add(ctx: &mut AppContext, fields: Vec<String>, category: Option<String>) -> Result<()> {
    let data = parse_fields(&fields)?;
    let result = ctx.api.add_record(data, category.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &mut AppContext, query: &ListQuery) -> Result<()> {
    let result = ctx.api.list_records(query)?;
    print_records(&result.listed_records);
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &mut AppContext, selectors: Vec<String>) -> Result<()> {
    let result = ctx.api.view_records(&selectors)?;
    print_full_records(&result.listed_records);
    print_messages(&result.messages);
    Ok(())
}

fn handle_update(
    ctx: &mut AppContext,
    selector: String,
    fields: Vec<String>,
    category: Option<String>,
) -> Result<()> {
    let data = parse_fields(&fields)?;
    let result = ctx
        .api
        .update_records(&[selector], data, category.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, selectors: Vec<String>) -> Result<()> {
    let result = ctx.api.delete_records(&selectors)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete_category(ctx: &mut AppContext, selection: CategorySelection) -> Result<()> {
    let result = ctx.api.delete_category_records(&selection)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, path: PathBuf, category: Option<String>) -> Result<()> {
    let result = ctx.api.import_records(&path, category.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &mut AppContext, filter: &FilterArgs, out: PathBuf) -> Result<()> {
    let filter = filter.to_context()?;
    let result = ctx.api.export_records(&filter, &out)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_fields(ctx: &mut AppContext, field: Option<String>) -> Result<()> {
    let result = ctx.api.fields(field.as_deref())?;
    if field.is_some() {
        print!("{}", render_values(&result.values));
    } else {
        print!("{}", render_fields(&result.fields));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_filter(ctx: &mut AppContext, filter: &FilterArgs) -> Result<()> {
    let filter = filter.to_context()?;
    let result = ctx.api.preview_filter(&filter)?;
    print_records(&result.listed_records);
    print_messages(&result.messages);
    Ok(())
}

fn handle_generate(ctx: &mut AppContext, request: &GenerateRequest) -> Result<()> {
    let result = ctx.api.generate(request)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_category(ctx: &mut AppContext, action: CategoryAction) -> Result<()> {
    let result = match action {
        CategoryAction::List => ctx.api.list_categories()?,
        CategoryAction::Add { name, kind } => ctx.api.add_category(&name, kind.as_deref())?,
        CategoryAction::Rename { category, new_name } => {
            ctx.api.rename_category(&category, &new_name)?
        }
        CategoryAction::Delete { category } => ctx.api.delete_category(&category)?,
    };
    if let Some(counts) = &result.category_counts {
        print!("{}", render_category_counts(counts));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key.clone(), value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action)?;
    if key.is_none() {
        if let Some(config) = &result.config {
            print!("{}", render_config(config));
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.init()?;
    print_messages(&result.messages);
    Ok(())
}

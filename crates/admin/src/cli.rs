use clap::{Args, Parser, Subcommand};

use catalog_core::types::DbId;

#[derive(Parser, Debug)]
#[command(name = "catalog-admin")]
#[command(about = "Administer catalog categories, attributes and products", long_about = None)]
pub struct Cli {
    /// Catalog service URL (overrides CATALOG_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Manage attributes
    #[command(subcommand)]
    Attributes(AttributeCommand),

    /// List the attributes bound to a category
    Assigned { category: DbId },

    /// Bind an attribute to a category
    Assign {
        category: DbId,
        attribute: DbId,
        /// Products in the category must set this attribute
        #[arg(long)]
        required: bool,
    },

    /// Remove a binding from a category
    Unassign { category: DbId, binding: DbId },

    /// Manage products
    #[command(subcommand)]
    Products(ProductCommand),
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    #[command(alias = "ls")]
    List,

    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },

    Update {
        id: DbId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    #[command(alias = "rm")]
    Delete { id: DbId },
}

#[derive(Subcommand, Debug)]
pub enum AttributeCommand {
    #[command(alias = "ls")]
    List,

    Create {
        name: String,
        /// text, int or enum
        #[arg(short = 't', long = "type", default_value = "text")]
        data_type: String,
        /// Comma-separated allowed values for enum attributes
        #[arg(short, long)]
        enum_values: Option<String>,
    },

    #[command(alias = "rm")]
    Delete { id: DbId },
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    #[command(alias = "ls")]
    List,

    Show { id: DbId },

    Create {
        #[arg(short, long)]
        category: DbId,
        #[command(flatten)]
        fields: ProductArgs,
    },

    Edit {
        id: DbId,
        #[command(flatten)]
        fields: ProductArgs,
    },
}

/// Product fields given on the command line. Unset fields keep their
/// current value when editing.
#[derive(Args, Debug, Default)]
pub struct ProductArgs {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub price: Option<String>,
    #[arg(short, long)]
    pub sku: Option<String>,
    /// Attribute value as NAME=VALUE or BINDING_ID=VALUE (repeatable)
    #[arg(short, long = "attr", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
}

/// Split a `KEY=VALUE` pair at the first `=`.
pub fn parse_attr(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing attribute name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

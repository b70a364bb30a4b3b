//! Command execution against a [`CatalogBackend`].
//!
//! Output goes to the supplied writer, one record per line with
//! tab-separated columns.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

use catalog_client::CatalogBackend;
use catalog_core::models::{AttributeInput, CategoryAttribute};
use catalog_core::types::DbId;
use catalog_ui::views::format_price;
use catalog_ui::{
    AttributeListView, CategoryListView, ProductField, ProductForm, ProductListView,
};

use crate::cli::{AttributeCommand, CategoryCommand, Command, ProductArgs, ProductCommand};

/// Run one parsed command.
pub async fn run(
    command: Command,
    backend: Arc<dyn CatalogBackend>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Categories(cmd) => categories(cmd, backend, out).await,
        Command::Attributes(cmd) => attributes(cmd, backend, out).await,
        Command::Assigned { category } => {
            let view = attribute_view(backend, category).await?;
            print_bindings(out, &view.assigned().await)
        }
        Command::Assign {
            category,
            attribute,
            required,
        } => {
            let view = attribute_view(backend, category).await?;
            let binding = view.assign(attribute, required).await?;
            print_bindings(out, std::slice::from_ref(&binding))
        }
        Command::Unassign { category, binding } => {
            let view = attribute_view(backend, category).await?;
            view.unassign(binding).await?;
            writeln!(out, "removed binding {binding}")?;
            Ok(())
        }
        Command::Products(cmd) => products(cmd, backend, out).await,
    }
}

/* --------------------------------------------------------------------------
   Categories
   -------------------------------------------------------------------------- */

async fn categories(
    cmd: CategoryCommand,
    backend: Arc<dyn CatalogBackend>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut view = CategoryListView::new(backend);
    match cmd {
        CategoryCommand::List => {
            for c in view.load().await? {
                writeln!(out, "{}\t{}\t{}", c.id, c.name, c.description.as_deref().unwrap_or(""))?;
            }
        }
        CategoryCommand::Create { name, description } => {
            let c = view.create(&name, &description).await?;
            writeln!(out, "created category {}\t{}", c.id, c.name)?;
        }
        CategoryCommand::Update {
            id,
            name,
            description,
        } => {
            view.load().await?;
            let draft = view.start_edit(id)?;
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            let c = view.save_edit().await?;
            writeln!(out, "updated category {}\t{}", c.id, c.name)?;
        }
        CategoryCommand::Delete { id } => {
            view.delete(id).await?;
            writeln!(out, "deleted category {id}")?;
        }
    }
    Ok(())
}

/* --------------------------------------------------------------------------
   Attributes
   -------------------------------------------------------------------------- */

async fn attributes(
    cmd: AttributeCommand,
    backend: Arc<dyn CatalogBackend>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match cmd {
        AttributeCommand::List => {
            for a in backend.list_attributes().await.context("Failed to fetch attributes")? {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    a.id,
                    a.name,
                    a.data_type,
                    a.enum_values.as_deref().unwrap_or("")
                )?;
            }
        }
        AttributeCommand::Create {
            name,
            data_type,
            enum_values,
        } => {
            let view = AttributeListView::new(backend, Duration::ZERO);
            let a = view
                .create_attribute(&AttributeInput {
                    name,
                    data_type,
                    enum_values,
                })
                .await?;
            writeln!(out, "created attribute {}\t{}\t{}", a.id, a.name, a.data_type)?;
        }
        AttributeCommand::Delete { id } => {
            backend
                .delete_attribute(id)
                .await
                .context("Failed to delete attribute")?;
            writeln!(out, "deleted attribute {id}")?;
        }
    }
    Ok(())
}

/// An attribute view with `category` selected.
async fn attribute_view(
    backend: Arc<dyn CatalogBackend>,
    category: DbId,
) -> anyhow::Result<AttributeListView> {
    let view = AttributeListView::new(backend, Duration::ZERO);
    view.load().await?;
    if !view.categories().await.iter().any(|c| c.id == category) {
        bail!("Category {category} not found");
    }
    view.select_category(Some(category)).await?;
    Ok(view)
}

fn print_bindings(out: &mut impl Write, bindings: &[CategoryAttribute]) -> anyhow::Result<()> {
    for b in bindings {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            b.id,
            b.attribute.name,
            b.attribute.data_type,
            if b.is_required { "required" } else { "optional" }
        )?;
    }
    Ok(())
}

/* --------------------------------------------------------------------------
   Products
   -------------------------------------------------------------------------- */

async fn products(
    cmd: ProductCommand,
    backend: Arc<dyn CatalogBackend>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match cmd {
        ProductCommand::List => {
            let mut view = ProductListView::new(backend);
            view.load().await?;
            for row in view.rows() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    row.id, row.sku, row.name, row.category, row.price
                )?;
            }
        }
        ProductCommand::Show { id } => {
            let product = backend.get_product(id).await.context("Failed to load product")?;
            let schema = backend
                .list_category_attributes(product.category_id)
                .await
                .context("Failed to fetch category attributes")?;
            writeln!(out, "name\t{}", product.name)?;
            writeln!(out, "sku\t{}", product.sku)?;
            writeln!(out, "price\t{}", format_price(product.price))?;
            writeln!(out, "category\t{}", product.category_id)?;
            if let Some(description) = &product.description {
                writeln!(out, "description\t{description}")?;
            }
            for binding in &schema {
                writeln!(
                    out,
                    "{}\t{}",
                    binding.attribute.name,
                    product.value_for(binding.id).unwrap_or("")
                )?;
            }
        }
        ProductCommand::Create { category, fields } => {
            // One selection per run; debouncing has nothing to coalesce.
            let form = ProductForm::new(backend, Duration::ZERO);
            form.set_category(Some(category)).await?;
            apply_args(&form, fields).await?;
            let p = form.submit().await?;
            writeln!(out, "created product {}\t{}", p.id, p.sku)?;
        }
        ProductCommand::Edit { id, fields } => {
            let form = ProductForm::new(backend, Duration::ZERO);
            form.enter_edit_mode(id).await?;
            apply_args(&form, fields).await?;
            let p = form.submit().await?;
            writeln!(out, "updated product {}\t{}", p.id, p.sku)?;
        }
    }
    Ok(())
}

/// Copy command-line fields and attribute values into the form.
async fn apply_args(form: &ProductForm, args: ProductArgs) -> anyhow::Result<()> {
    let fields = [
        (ProductField::Name, args.name),
        (ProductField::Description, args.description),
        (ProductField::Price, args.price),
        (ProductField::Sku, args.sku),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            form.set_field(field, value).await;
        }
    }

    let schema = form.schema().await;
    for (key, value) in args.attrs {
        let binding_id = resolve_attr(&schema, &key)?;
        form.update_value(binding_id, value).await?;
    }
    Ok(())
}

/// Resolve an `--attr` key to a binding of the current schema: a binding
/// id, or an attribute name compared case-insensitively.
pub fn resolve_attr(schema: &[CategoryAttribute], key: &str) -> anyhow::Result<DbId> {
    if let Ok(id) = key.parse::<DbId>() {
        if schema.iter().any(|b| b.id == id) {
            return Ok(id);
        }
    }
    schema
        .iter()
        .find(|b| b.attribute.name.eq_ignore_ascii_case(key))
        .map(|b| b.id)
        .ok_or_else(|| {
            let known: Vec<&str> = schema.iter().map(|b| b.attribute.name.as_str()).collect();
            anyhow!(
                "Unknown attribute '{key}' for this category (known: {})",
                known.join(", ")
            )
        })
}

//! Subcommand implementations

use domain_financial_products::dates::to_display;
use domain_financial_products::{
    FinancialProduct, FinancialProductRepository, ListProjectionEngine, MutationCoordinator,
    MutationMode, ProductField, ProductForm, ReloadOutcome,
};
use eyre::{bail, Result};
use tracing::info;

/// Values given on the command line; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub date_release: Option<String>,
    pub date_revision: Option<String>,
}

impl ProductInput {
    /// Apply onto `form`. A new release date proposes a revision date one
    /// year later unless one is given explicitly.
    pub fn apply(self, form: &mut ProductForm) {
        let fields = [
            (ProductField::Id, self.id),
            (ProductField::Name, self.name),
            (ProductField::Description, self.description),
            (ProductField::Logo, self.logo),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                form.set_value(field, value);
            }
        }
        if let Some(release) = self.date_release {
            form.on_release_date_change(release);
        }
        if let Some(revision) = self.date_revision {
            form.set_value(ProductField::DateRevision, revision);
        }
        form.touch_all();
    }
}

pub struct ListOptions {
    pub search: Option<String>,
    pub page: usize,
    pub per_page: usize,
    pub json: bool,
}

async fn load<R: FinancialProductRepository>(engine: &ListProjectionEngine<R>) -> Result<()> {
    if engine.reload().await == ReloadOutcome::Failed {
        bail!(engine.snapshot().error_message);
    }
    Ok(())
}

pub async fn list<R: FinancialProductRepository + 'static>(
    engine: &ListProjectionEngine<R>,
    options: ListOptions,
) -> Result<()> {
    let binding = engine.bind();
    load(engine).await?;

    engine.set_items_per_page(options.per_page);
    if let Some(term) = options.search {
        engine.search(term);
    }
    for _ in 1..options.page {
        engine.next_page();
    }

    let snapshot = engine.snapshot();
    if options.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.displayed)?);
    } else {
        let window = engine.pagination().current();
        println!("{}", render_table(&snapshot.displayed));
        println!(
            "{}  (página {} de {})",
            engine.results_text(),
            window.current_page,
            engine.total_pages().max(1)
        );
    }

    binding.release().await;
    Ok(())
}

pub async fn create<R: FinancialProductRepository>(
    coordinator: &MutationCoordinator<R>,
    input: ProductInput,
) -> Result<()> {
    let mut form = ProductForm::new();
    input.apply(&mut form);

    let saved = coordinator.submit(&form, MutationMode::Create).await?;
    info!(id = %saved.id, "Created financial product");
    println!("{}", render_table(std::slice::from_ref(&saved)));
    Ok(())
}

pub async fn update<R: FinancialProductRepository>(
    coordinator: &MutationCoordinator<R>,
    id: String,
    input: ProductInput,
) -> Result<()> {
    let current = find(coordinator.engine(), &id).await?;
    let mut form = ProductForm::from_product(&current);
    // The id is fixed once created
    ProductInput { id: None, ..input }.apply(&mut form);

    let saved = coordinator.submit(&form, MutationMode::Update(id)).await?;
    info!(id = %saved.id, "Updated financial product");
    println!("{}", render_table(std::slice::from_ref(&saved)));
    Ok(())
}

pub async fn delete<R: FinancialProductRepository>(
    coordinator: &MutationCoordinator<R>,
    id: String,
) -> Result<()> {
    let product = find(coordinator.engine(), &id).await?;
    coordinator.delete(&product).await?;
    info!(id = %id, "Deleted financial product");
    println!("Producto {} eliminado", id);
    Ok(())
}

async fn find<R: FinancialProductRepository>(
    engine: &ListProjectionEngine<R>,
    id: &str,
) -> Result<FinancialProduct> {
    load(engine).await?;
    match engine.raw_records().iter().find(|product| product.id == id) {
        Some(product) => Ok(product.clone()),
        None => bail!("Product {} not found", id),
    }
}

const HEADERS: [&str; 5] = [
    "ID",
    "Nombre del producto",
    "Descripción",
    "Fecha de liberación",
    "Fecha de reestructuración",
];

/// Plain-text table of `products`, dates in dd/mm/yyyy
pub fn render_table(products: &[FinancialProduct]) -> String {
    let rows: Vec<[String; 5]> = products
        .iter()
        .map(|product| {
            [
                product.id.clone(),
                product.name.clone(),
                product.description.clone(),
                to_display(product.date_release),
                to_display(product.date_revision),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&HEADERS.map(String::from))];
    out.extend(rows.iter().map(|row| line(row)));
    out.join("\n")
}

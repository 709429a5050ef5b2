//! `tenantry templates` - list and show workspace templates.

use std::io::Write;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use tenantry_workspace::TemplateCatalog;

/// Print every template as a table, or as a JSON array with `json`.
pub fn run_list(catalog: &TemplateCatalog, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        let templates: Vec<_> = catalog.iter().collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&templates)?)?;
        return Ok(());
    }

    if catalog.is_empty() {
        writeln!(out, "No templates found.")?;
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Name", "Industry", "Entity Types"]);
    for template in catalog.iter() {
        let entity_types: Vec<&str> = template
            .entity_types
            .iter()
            .map(|et| et.name.as_str())
            .collect();
        table.add_row(vec![
            template.id.clone(),
            template.name.clone(),
            template.industry.clone(),
            entity_types.join(", "),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Print one template as pretty JSON.
pub fn run_show(catalog: &TemplateCatalog, id: &str, out: &mut impl Write) -> Result<()> {
    let template = catalog
        .get(id)
        .with_context(|| format!("template not found: {id}"))?;
    writeln!(out, "{}", serde_json::to_string_pretty(template)?)?;
    Ok(())
}

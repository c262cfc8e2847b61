//! Terminal output for the countsheet commands

use anyhow::Result;
use colored::*;
use countsheet_core::{Field, ParseResult, PatchReport};
use std::path::Path;

/// Print records as an aligned table
pub fn print_human(file_path: &Path, parsed: &ParseResult) {
    println!("{}", format!("Template: {}", file_path.display()).bold());
    println!(
        "{} {} (column {})",
        "Worksheet:".bold(),
        parsed.worksheet_path.cyan(),
        parsed.quantity_column.to_string().yellow()
    );
    println!();

    let desc_width = parsed
        .records
        .iter()
        .map(|r| r.description().chars().count())
        .max()
        .unwrap_or(0)
        .max("Item Description".len());

    println!(
        "{:>5}  {:<desc_width$}  {:<10}  {:>8}  {:<6}  {}",
        "Row".bold(),
        "Item Description".bold(),
        "Dist #".bold(),
        "Quantity".bold(),
        "UOM".bold(),
        "Location".bold(),
    );
    for record in &parsed.records {
        let location = [record.location(), record.area(), record.place()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");
        println!(
            "{:>5}  {:<desc_width$}  {:<10}  {:>8}  {:<6}  {}",
            record.row_position().to_string().bright_black(),
            record.description(),
            record.distributor_id(),
            record.quantity,
            record.unit_of_measure(),
            location
        );
    }

    println!();
    let optional_missing: Vec<&str> = Field::ALL
        .iter()
        .filter(|f| !parsed.fields.contains(**f))
        .map(|f| f.canonical_name())
        .collect();
    println!("  {} {}", "Records:".green().bold(), parsed.records.len());
    if !optional_missing.is_empty() {
        println!(
            "  {} {}",
            "Absent columns:".yellow().bold(),
            optional_missing.join(", ")
        );
    }
}

pub fn print_json(file_path: &Path, parsed: &ParseResult) -> Result<()> {
    let records: Vec<serde_json::Value> = parsed
        .records
        .iter()
        .map(|r| {
            serde_json::json!({
                "row": r.row_position(),
                "description": r.description(),
                "distributor_id": r.distributor_id(),
                "customer_id": r.customer_id(),
                "quantity": r.quantity,
                "unit_of_measure": r.unit_of_measure(),
                "location": r.location(),
                "area": r.area(),
                "place": r.place(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "worksheet": parsed.worksheet_path,
        "quantity_column": parsed.quantity_column.to_string(),
        "columns": parsed.fields,
        "records": records,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// `changes` holds (row, current quantity, new quantity)
pub fn print_dry_run(file_path: &Path, changes: &[(u32, i64, i64)], output_dir: &Path) {
    println!("[DRY RUN] Counts for '{}':", file_path.display());
    for (row, before, after) in changes {
        println!("  row {:>5}: {} -> {}", row, before, after.to_string().green());
    }
    println!("\nOutput would be written to: {}", output_dir.display());
}

pub fn print_patch_report(report: &PatchReport) {
    println!(
        "{} {} replaced, {} inserted",
        "✓ Successfully wrote counts:".green().bold(),
        report.replaced,
        report.inserted
    );
    if !report.skipped_rows.is_empty() {
        let rows: Vec<String> = report.skipped_rows.iter().map(u32::to_string).collect();
        println!("  {} {}", "Skipped rows:".yellow().bold(), rows.join(", "));
    }
    println!("Output: {}", report.output_path.display());
}

pub fn print_written(action: &str, count: usize, path: &Path) {
    println!("{} {} {} records", "✓".green().bold(), action, count);
    println!("Output: {}", path.display());
}

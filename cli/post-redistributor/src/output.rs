// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Human-facing summaries printed to stdout

use comfy_table::{Table, presets::NOTHING};

use crate::distribute::DistributionPlan;
use crate::updater::UpdateReport;

fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(headers);
    table
}

/// Posts assigned per target category, in target order
pub fn distribution_table(plan: &DistributionPlan) -> Table {
    let mut tbl = create_table(&["CATEGORY", "POSTS"]);
    for (slug, count) in &plan.tally {
        tbl.add_row(vec![slug.clone(), count.to_string()]);
    }
    tbl
}

/// Every pending patch, for dry runs
pub fn plan_table(plan: &DistributionPlan) -> Table {
    let mut tbl = create_table(&["ID", "TITLE", "CATEGORY", "IMAGE"]);
    for instruction in &plan.instructions {
        let image = if instruction.patch.has_image() {
            "backfill"
        } else {
            "-"
        };
        tbl.add_row(vec![
            instruction.post_id.as_str(),
            instruction.title.as_str(),
            instruction.category.as_str(),
            image,
        ]);
    }
    tbl
}

pub fn print_distribution(plan: &DistributionPlan) {
    println!("\nDistribution:");
    println!("{}", distribution_table(plan));
    println!(
        "\n{} updates pending ({} with featured image backfill)",
        plan.instructions.len(),
        plan.image_backfills()
    );
    if !plan.skipped.is_empty() {
        println!(
            "{} posts skipped: target category not found",
            plan.skipped.len()
        );
    }
}

pub fn print_plan(plan: &DistributionPlan) {
    println!("\nPlan (dry run, nothing written):");
    println!("{}", plan_table(plan));
}

pub fn print_report(report: &UpdateReport) {
    println!("\nRedistribution complete");
    println!("  Updated:                {}", report.succeeded);
    println!("  Featured images added:  {}", report.images_added);
    println!("  Errors:                 {}", report.failed);
}

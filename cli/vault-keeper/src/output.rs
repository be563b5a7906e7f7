//! Table rendering for the simulate subcommand, in the style of the
//! `perps-deploy` reporting commands.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

pub struct EpochRow {
    pub epoch: u64,
    pub status: String,
    pub total_assets: String,
    pub total_contracts_sold: String,
    pub clearing_price: String,
    pub withdrawal_lock_released: bool,
}

pub fn render_epoch_table(rows: &[EpochRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Epoch"),
            Cell::new("Auction status"),
            Cell::new("Total assets"),
            Cell::new("Contracts sold"),
            Cell::new("Clearing price"),
            Cell::new("Lock released"),
        ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.epoch),
            Cell::new(&row.status),
            Cell::new(&row.total_assets),
            Cell::new(&row.total_contracts_sold),
            Cell::new(&row.clearing_price),
            Cell::new(if row.withdrawal_lock_released { "yes" } else { "no" }),
        ]);
    }

    table
}

//! `formsync inspect` — dump board structure for diagnostics.

use std::path::Path;

use crate::board_admin::resolve_board;
use crate::common;
use crate::CliError;

pub fn cmd_inspect(
    board: Option<String>,
    config_path: &Path,
    api_token: Option<String>,
    api_base: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let client = common::build_client(api_token, api_base)?;

    // No board argument: list everything the token can see.
    let Some(board) = board else {
        let boards = client.list_boards(200).map_err(common::api_error)?;
        for (id, name) in boards {
            println!("{id}\t{name}");
        }
        return Ok(());
    };

    let board_id = resolve_board(&board, config_path)?;
    let overview = client.board_overview(&board_id).map_err(common::api_error)?;

    if json {
        let payload = serde_json::json!({
            "id": overview.id,
            "name": overview.name,
            "items_count": overview.items_count,
            "columns": overview.columns.iter().map(|c| serde_json::json!({
                "id": c.id,
                "title": c.title,
                "type": c.column_type.to_string(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
        return Ok(());
    }

    println!("board {} '{}'", overview.id, overview.name);
    if let Some(count) = overview.items_count {
        println!("items: {count}");
    }
    println!("columns:");
    for column in &overview.columns {
        println!("  {}\t{}\t{}", column.id, column.column_type, column.title);
    }
    Ok(())
}

use crate::{Cell, Game, GameStatus, Position};
use itertools::Itertools;

fn symbol(game: &Game, pos: Position) -> String {
    let state = game.state();

    if state.is_flagged(pos) {
        return "F".to_string();
    }
    if !state.is_revealed(pos) {
        return "#".to_string();
    }

    match game.grid().cell(pos) {
        Some(Cell::Mine) if game.status() == GameStatus::Exploded(pos) => "X".to_string(),
        Some(Cell::Mine) => "*".to_string(),
        Some(Cell::Count(0)) => ".".to_string(),
        Some(Cell::Count(n)) => n.to_string(),
        None => " ".to_string(),
    }
}

/// Renders the board as the player sees it, with row and column labels.
///
/// `#` covered, `F` flagged, `.` empty, `*` mine, `X` the detonated mine.
pub fn render_board(game: &Game) -> String {
    let (rows, columns) = game.dimensions();

    let header = format!(
        "    {}",
        (0..columns).map(|c| format!("{:>2}", c)).join(" ")
    );
    let body = (0..rows).map(|r| {
        let cells = (0..columns)
            .map(|c| format!("{:>2}", symbol(game, Position::new(r as i32, c as i32))))
            .join(" ");
        format!("{:>3} {}", r, cells)
    });

    std::iter::once(header).chain(body).join("\n")
}

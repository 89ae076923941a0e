use crate::task::Column;

/// Legal column moves for drag-and-drop: todo -> inprogress, todo -> done,
/// inprogress -> done. Same-column moves are not legal.
pub fn is_legal(from: Column, to: Column) -> bool {
    matches!(
        (from, to),
        (Column::Todo, Column::InProgress) | (Column::Todo, Column::Done) | (Column::InProgress, Column::Done)
    )
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating adapter input into construction, upgrade and sale commands.

use realm_defence_core::{CellCoord, Command, Event, TowerId, TowerKind, UpgradeBranch};

/// Declarative placement preview describing a potential tower construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Cell that would hold the tower.
    pub cell: CellCoord,
    /// Indicates whether the preview represents a valid placement location.
    pub placeable: bool,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(kind: TowerKind, cell: CellCoord, placeable: bool) -> Self {
        Self {
            kind,
            cell,
            placeable,
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Tower kind hotkey or button pressed on this frame.
    pub select: Option<TowerKind>,
    /// Indicates whether the player cancelled building on this frame.
    pub cancel_action: bool,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player requested a sale on this frame.
    pub sell_action: bool,
    /// Upgrade branch requested on this frame.
    pub upgrade_action: Option<UpgradeBranch>,
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<CellCoord>,
}

/// System that tracks the build selection and emits player commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    selected: Option<TowerKind>,
    finished: bool,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: None,
            finished: false,
        }
    }

    /// Tower kind the world last confirmed as selected.
    #[must_use]
    pub const fn selected(&self) -> Option<TowerKind> {
        self.selected
    }

    /// Consumes world events and adapter-derived input to emit commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can identify the hovered tower.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        preview: Option<PlacementPreview>,
        input: BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<TowerId>,
    {
        for event in events {
            match event {
                Event::TowerKindSelected { kind } => self.selected = *kind,
                Event::Victory | Event::GameOver => self.finished = true,
                Event::GameRestarted => {
                    self.finished = false;
                    self.selected = None;
                }
                _ => {}
            }
        }

        if self.finished {
            return;
        }

        let mut selection = self.selected;
        if input.cancel_action && selection.is_some() {
            selection = None;
            out.push(Command::SelectTowerKind { kind: None });
        }
        if let Some(kind) = input.select {
            selection = if selection == Some(kind) {
                None
            } else {
                Some(kind)
            };
            out.push(Command::SelectTowerKind { kind: selection });
        }

        let hovered = input.cursor_cell.and_then(&mut tower_at);

        if input.confirm_action && hovered.is_none() {
            if let (Some(kind), Some(preview)) = (selection, preview) {
                if preview.placeable && preview.kind == kind {
                    out.push(Command::BuildTower { cell: preview.cell });
                }
            }
        }

        if let Some(tower) = hovered {
            if let Some(branch) = input.upgrade_action {
                out.push(Command::UpgradeTower { tower, branch });
            }
            if input.sell_action {
                out.push(Command::SellTower { tower });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_the_same_kind_twice_clears_selection() {
        let mut builder = Builder::new();
        let mut commands = Vec::new();
        builder.handle(
            &[Event::TowerKindSelected {
                kind: Some(TowerKind::Archer),
            }],
            None,
            BuilderInput {
                select: Some(TowerKind::Archer),
                ..BuilderInput::default()
            },
            |_| None,
            &mut commands,
        );

        assert_eq!(commands, vec![Command::SelectTowerKind { kind: None }]);
        assert_eq!(builder.selected(), Some(TowerKind::Archer));
    }
}

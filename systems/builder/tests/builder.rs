use realm_defence_core::{CellCoord, Command, Event, TowerId, TowerKind, UpgradeBranch};
use realm_defence_system_builder::{Builder, BuilderInput, PlacementPreview};

fn archer_preview_at(cell: CellCoord, placeable: bool) -> PlacementPreview {
    PlacementPreview::new(TowerKind::Archer, cell, placeable)
}

fn selected_archer() -> Vec<Event> {
    vec![Event::TowerKindSelected {
        kind: Some(TowerKind::Archer),
    }]
}

#[test]
fn confirm_emits_build_command_for_selected_kind() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &selected_archer(),
        Some(archer_preview_at(CellCoord::new(3, 4), true)),
        BuilderInput {
            confirm_action: true,
            cursor_cell: Some(CellCoord::new(3, 4)),
            ..BuilderInput::default()
        },
        |_| None,
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::BuildTower {
            cell: CellCoord::new(3, 4),
        }],
        "builder should emit a build command when confirming a valid preview",
    );
}

#[test]
fn confirm_ignored_when_preview_not_placeable() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &selected_archer(),
        Some(archer_preview_at(CellCoord::new(2, 10), false)),
        BuilderInput {
            confirm_action: true,
            ..BuilderInput::default()
        },
        |_| None,
        &mut commands,
    );

    assert!(
        commands.is_empty(),
        "builder must not emit build commands for invalid previews"
    );
}

#[test]
fn confirm_without_selection_is_ignored() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        Some(archer_preview_at(CellCoord::new(3, 4), true)),
        BuilderInput {
            confirm_action: true,
            ..BuilderInput::default()
        },
        |_| None,
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn select_and_confirm_in_one_frame_builds() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        Some(PlacementPreview::new(
            TowerKind::Crystal,
            CellCoord::new(6, 6),
            true,
        )),
        BuilderInput {
            select: Some(TowerKind::Crystal),
            confirm_action: true,
            ..BuilderInput::default()
        },
        |_| None,
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::SelectTowerKind {
                kind: Some(TowerKind::Crystal),
            },
            Command::BuildTower {
                cell: CellCoord::new(6, 6),
            },
        ]
    );
}

#[test]
fn hovered_tower_can_be_upgraded_and_sold() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    let tower = TowerId::new(7);

    builder.handle(
        &selected_archer(),
        Some(archer_preview_at(CellCoord::new(1, 1), true)),
        BuilderInput {
            confirm_action: true,
            upgrade_action: Some(UpgradeBranch::Second),
            sell_action: true,
            cursor_cell: Some(CellCoord::new(1, 1)),
            ..BuilderInput::default()
        },
        |cell| (cell == CellCoord::new(1, 1)).then_some(tower),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::UpgradeTower {
                tower,
                branch: UpgradeBranch::Second,
            },
            Command::SellTower { tower },
        ],
        "occupied cells never produce build commands",
    );
}

#[test]
fn cancel_clears_selection() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &selected_archer(),
        None,
        BuilderInput {
            cancel_action: true,
            ..BuilderInput::default()
        },
        |_| None,
        &mut commands,
    );

    assert_eq!(commands, vec![Command::SelectTowerKind { kind: None }]);
}

#[test]
fn finished_runs_ignore_input_until_restart() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    let input = BuilderInput {
        select: Some(TowerKind::Vault),
        ..BuilderInput::default()
    };

    builder.handle(&[Event::GameOver], None, input, |_| None, &mut commands);
    assert!(commands.is_empty(), "no commands after game over");

    builder.handle(&[Event::GameRestarted], None, input, |_| None, &mut commands);
    assert_eq!(
        commands,
        vec![Command::SelectTowerKind {
            kind: Some(TowerKind::Vault),
        }]
    );
}

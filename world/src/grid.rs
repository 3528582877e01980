//! Walkable grid, coordinate mapping and path search used by the world crate.

use std::{cmp::Ordering, collections::BinaryHeap};

use realm_defence_core::{BuildError, CellCoord, GridConfig, PathLayout, TowerId, WorldPoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GridCell {
    walkable: bool,
    is_path: bool,
    tower: Option<TowerId>,
}

impl Default for GridCell {
    fn default() -> Self {
        Self {
            walkable: true,
            is_path: false,
            tower: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutKind {
    Zigzag,
    Open,
}

/// Grid of buildable cells together with the routes enemies follow.
///
/// The zigzag layout carves a fixed route whose cells can never hold towers.
/// The open layout lets towers go anywhere and re-routes with A* after each
/// placement, refusing placements that would cut spawn off from the exit.
#[derive(Clone, Debug)]
pub(crate) struct PathGrid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    waypoint_spacing: f32,
    layout: LayoutKind,
    corners: Vec<CellCoord>,
    spawn: CellCoord,
    exit: CellCoord,
    cells: Vec<GridCell>,
    ground_path: Vec<WorldPoint>,
    enemy_blocked: Vec<CellCoord>,
}

impl PathGrid {
    /// Builds the grid described by a validated configuration.
    pub(crate) fn new(config: &GridConfig) -> Self {
        let cell_count = usize::try_from(config.columns)
            .ok()
            .zip(usize::try_from(config.rows).ok())
            .and_then(|(columns, rows)| columns.checked_mul(rows))
            .unwrap_or(0);

        let (layout, corners, spawn, exit) = match &config.layout {
            PathLayout::Zigzag { corners } => {
                let spawn = corners.first().copied().unwrap_or(CellCoord::new(0, 0));
                let exit = corners.last().copied().unwrap_or(spawn);
                (LayoutKind::Zigzag, corners.clone(), spawn, exit)
            }
            PathLayout::Open { spawn, exit } => (LayoutKind::Open, Vec::new(), *spawn, *exit),
        };

        let mut grid = Self {
            columns: config.columns,
            rows: config.rows,
            cell_size: config.cell_size,
            waypoint_spacing: config.waypoint_spacing,
            layout,
            corners,
            spawn,
            exit,
            cells: vec![GridCell::default(); cell_count],
            ground_path: Vec::new(),
            enemy_blocked: Vec::new(),
        };

        match grid.layout {
            LayoutKind::Zigzag => grid.carve_zigzag(),
            LayoutKind::Open => {
                let _ = grid.recompute_ground_path();
            }
        }
        grid
    }

    fn carve_zigzag(&mut self) {
        let corners = self.corners.clone();
        for pair in corners.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            for cell in straight_cells(from, to) {
                if let Some(index) = self.index(cell) {
                    self.cells[index].is_path = true;
                }
            }
        }

        let points: Vec<WorldPoint> = corners
            .iter()
            .map(|corner| self.grid_to_world(*corner))
            .collect();
        self.ground_path = interpolate(&points, self.waypoint_spacing);
    }

    fn recompute_ground_path(&mut self) -> bool {
        match self.compute_path(self.spawn, self.exit) {
            Some(cells) => {
                self.ground_path = cells
                    .into_iter()
                    .map(|cell| self.grid_to_world(cell))
                    .collect();
                true
            }
            None => false,
        }
    }

    /// Number of columns in the grid.
    pub(crate) fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    pub(crate) fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a cell in world units.
    pub(crate) fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Reports whether towers may be placed on the route.
    pub(crate) fn is_open_layout(&self) -> bool {
        self.layout == LayoutKind::Open
    }

    /// Waypoints walked by ground enemies.
    pub(crate) fn ground_path(&self) -> &[WorldPoint] {
        &self.ground_path
    }

    /// Two-point route flown by airborne enemies.
    pub(crate) fn flight_path(&self) -> Vec<WorldPoint> {
        vec![self.grid_to_world(self.spawn), self.grid_to_world(self.exit)]
    }

    /// Cell where enemies appear.
    pub(crate) fn spawn(&self) -> CellCoord {
        self.spawn
    }

    /// Cell enemies try to reach.
    pub(crate) fn exit(&self) -> CellCoord {
        self.exit
    }

    /// Maps a world position to the cell containing it, if it lies on the grid.
    pub(crate) fn world_to_grid(&self, point: WorldPoint) -> Option<CellCoord> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let column = (point.x() / self.cell_size).floor();
        let row = (point.y() / self.cell_size).floor();
        if column < 0.0 || row < 0.0 || column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Centre of a cell in world units.
    pub(crate) fn grid_to_world(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            (cell.column() as f32 + 0.5) * self.cell_size,
            (cell.row() as f32 + 0.5) * self.cell_size,
        )
    }

    /// Tower occupying the cell, if any.
    pub(crate) fn tower_at(&self, cell: CellCoord) -> Option<TowerId> {
        self.index(cell).and_then(|index| self.cells[index].tower)
    }

    /// Reports whether the cell belongs to the fixed route.
    pub(crate) fn is_path(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.cells[index].is_path)
    }

    /// Reports whether a tower could be placed on the cell right now.
    ///
    /// In the open layout this does not check connectivity; placement does.
    pub(crate) fn is_buildable(&self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let slot = self.cells[index];
        if !slot.walkable || slot.tower.is_some() {
            return false;
        }
        if self.enemy_blocked.contains(&cell) {
            return false;
        }
        match self.layout {
            LayoutKind::Zigzag => !slot.is_path,
            LayoutKind::Open => cell != self.spawn && cell != self.exit,
        }
    }

    /// Replaces the set of cells temporarily blocked by enemies.
    pub(crate) fn set_enemy_blocked(&mut self, cells: impl IntoIterator<Item = CellCoord>) {
        self.enemy_blocked.clear();
        self.enemy_blocked.extend(cells);
    }

    /// Places a tower atomically, re-routing in the open layout.
    pub(crate) fn place_tower(
        &mut self,
        cell: CellCoord,
        tower: TowerId,
    ) -> Result<(), BuildError> {
        if !self.is_buildable(cell) {
            return Err(BuildError::InvalidPlacement);
        }
        let Some(index) = self.index(cell) else {
            return Err(BuildError::InvalidPlacement);
        };

        self.cells[index].tower = Some(tower);
        if self.layout == LayoutKind::Open && !self.recompute_ground_path() {
            self.cells[index].tower = None;
            return Err(BuildError::PathWouldBeBlocked);
        }
        Ok(())
    }

    /// Clears a tower from the cell, re-routing in the open layout.
    pub(crate) fn remove_tower(&mut self, cell: CellCoord) -> Option<TowerId> {
        let index = self.index(cell)?;
        let removed = self.cells[index].tower.take();
        if removed.is_some() && self.layout == LayoutKind::Open {
            let _ = self.recompute_ground_path();
        }
        removed
    }

    /// Route from an arbitrary cell to the exit, expressed as waypoints.
    pub(crate) fn route_from(&self, cell: CellCoord) -> Option<Vec<WorldPoint>> {
        let cells = self.compute_path(cell, self.exit)?;
        Some(
            cells
                .into_iter()
                .map(|cell| self.grid_to_world(cell))
                .collect(),
        )
    }

    /// Finds a 4-connected route between two cells with A*.
    ///
    /// Open nodes are expanded by lowest estimated total cost, then lowest
    /// heuristic, then insertion order. The search gives up after visiting
    /// twice as many nodes as the grid holds.
    pub(crate) fn compute_path(&self, start: CellCoord, end: CellCoord) -> Option<Vec<CellCoord>> {
        let width = usize::try_from(self.columns).ok()?;
        let start_index = self.index(start)?;
        let end_index = self.index(end)?;
        if self.is_blocked(start_index) || self.is_blocked(end_index) {
            return None;
        }

        let cell_count = self.cells.len();
        let iteration_cap = cell_count.saturating_mul(2);
        let mut best_cost = vec![u32::MAX; cell_count];
        let mut parent: Vec<Option<usize>> = vec![None; cell_count];
        let mut closed = vec![false; cell_count];
        let mut open = BinaryHeap::new();
        let mut order = 0u32;

        best_cost[start_index] = 0;
        let heuristic = start.manhattan_distance(end);
        open.push(OpenNode {
            estimate: heuristic,
            heuristic,
            order,
            index: start_index,
        });

        let mut iterations = 0usize;
        while let Some(node) = open.pop() {
            iterations += 1;
            if iterations > iteration_cap {
                break;
            }
            if closed[node.index] {
                continue;
            }
            if node.index == end_index {
                return Some(self.reconstruct(&parent, end_index, width));
            }
            closed[node.index] = true;

            let cell = cell_at(node.index, width);
            for neighbor in neighbors(cell, self.columns, self.rows) {
                let Some(neighbor_index) = index(width, neighbor) else {
                    continue;
                };
                if closed[neighbor_index] || self.is_blocked(neighbor_index) {
                    continue;
                }
                let cost = best_cost[node.index].saturating_add(1);
                if cost >= best_cost[neighbor_index] {
                    continue;
                }
                best_cost[neighbor_index] = cost;
                parent[neighbor_index] = Some(node.index);
                order = order.wrapping_add(1);
                let heuristic = neighbor.manhattan_distance(end);
                open.push(OpenNode {
                    estimate: cost.saturating_add(heuristic),
                    heuristic,
                    order,
                    index: neighbor_index,
                });
            }
        }

        None
    }

    fn reconstruct(&self, parent: &[Option<usize>], end: usize, width: usize) -> Vec<CellCoord> {
        let mut route = vec![cell_at(end, width)];
        let mut cursor = end;
        while let Some(previous) = parent[cursor] {
            route.push(cell_at(previous, width));
            cursor = previous;
        }
        route.reverse();
        route
    }

    fn is_blocked(&self, index: usize) -> bool {
        self.cells
            .get(index)
            .map_or(true, |cell| !cell.walkable || cell.tower.is_some())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        index(width, cell)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    estimate: u32,
    heuristic: u32,
    order: u32,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn straight_cells(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    if from.column() == to.column() {
        let (low, high) = ordered(from.row(), to.row());
        (low..=high)
            .map(|row| CellCoord::new(from.column(), row))
            .collect()
    } else {
        let (low, high) = ordered(from.column(), to.column());
        (low..=high)
            .map(|column| CellCoord::new(column, from.row()))
            .collect()
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Resamples a polyline so consecutive waypoints are at most `spacing` apart.
fn interpolate(corners: &[WorldPoint], spacing: f32) -> Vec<WorldPoint> {
    let mut points = Vec::new();
    for pair in corners.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let length = from.distance(to);
        let steps = (length / spacing).ceil().max(1.0) as u32;
        for step in 0..steps {
            let t = step as f32 / steps as f32;
            points.push(WorldPoint::new(
                from.x() + (to.x() - from.x()) * t,
                from.y() + (to.y() - from.y()) * t,
            ));
        }
    }
    if let Some(last) = corners.last() {
        points.push(*last);
    }
    points
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn cell_at(index: usize, width: usize) -> CellCoord {
    let width = width.max(1);
    CellCoord::new((index % width) as u32, (index / width) as u32)
}

use std::{error::Error, fmt, str::FromStr};

use realm_defence_core::{CellCoord, TowerKind};

/// Delimiter between the tower kind and its cell.
const KIND_DELIMITER: char = '@';

/// Tower placement requested on the command line as `kind@column,row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BuildOrder {
    /// Kind of tower to build.
    pub(crate) kind: TowerKind,
    /// Cell that should hold the tower.
    pub(crate) cell: CellCoord,
}

impl FromStr for BuildOrder {
    type Err = BuildOrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BuildOrderError::Empty);
        }

        let (kind, cell) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| BuildOrderError::MissingCell(trimmed.to_owned()))?;
        Ok(Self {
            kind: parse_kind(kind)?,
            cell: parse_cell(cell)?,
        })
    }
}

/// Errors that can occur while parsing build orders.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BuildOrderError {
    /// The argument was empty or contained only whitespace.
    Empty,
    /// The argument had no `@column,row` suffix.
    MissingCell(String),
    /// The tower kind is not one of archer, crystal or vault.
    UnknownKind(String),
    /// The cell could not be parsed as `column,row`.
    InvalidCell(String),
}

impl fmt::Display for BuildOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "build order was empty"),
            Self::MissingCell(order) => {
                write!(f, "build order '{order}' is missing '@column,row'")
            }
            Self::UnknownKind(kind) => write!(f, "tower kind '{kind}' is not supported"),
            Self::InvalidCell(cell) => write!(f, "could not parse cell '{cell}'"),
        }
    }
}

impl Error for BuildOrderError {}

fn parse_kind(kind: &str) -> Result<TowerKind, BuildOrderError> {
    let normalised = kind.trim().to_ascii_lowercase();
    TowerKind::ALL
        .into_iter()
        .find(|candidate| format!("{candidate:?}").to_ascii_lowercase() == normalised)
        .ok_or_else(|| BuildOrderError::UnknownKind(kind.trim().to_owned()))
}

fn parse_cell(cell: &str) -> Result<CellCoord, BuildOrderError> {
    let invalid = || BuildOrderError::InvalidCell(cell.trim().to_owned());
    let (column, row) = cell.split_once(',').ok_or_else(invalid)?;
    let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
    let row = row.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(CellCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_cell() {
        let order: BuildOrder = " Archer@1, 9 ".parse().expect("order parses");
        assert_eq!(
            order,
            BuildOrder {
                kind: TowerKind::Archer,
                cell: CellCoord::new(1, 9),
            }
        );
        let vault: BuildOrder = "vault@0,0".parse().expect("order parses");
        assert_eq!(vault.kind, TowerKind::Vault);
    }

    #[test]
    fn reports_what_went_wrong() {
        assert_eq!("".parse::<BuildOrder>(), Err(BuildOrderError::Empty));
        assert_eq!(
            "archer".parse::<BuildOrder>(),
            Err(BuildOrderError::MissingCell("archer".to_owned()))
        );
        assert_eq!(
            "cannon@1,1".parse::<BuildOrder>(),
            Err(BuildOrderError::UnknownKind("cannon".to_owned()))
        );
        assert_eq!(
            "crystal@1;1".parse::<BuildOrder>(),
            Err(BuildOrderError::InvalidCell("1;1".to_owned()))
        );
        assert_eq!(
            "crystal@-1,1".parse::<BuildOrder>(),
            Err(BuildOrderError::InvalidCell("-1,1".to_owned()))
        );
    }
}

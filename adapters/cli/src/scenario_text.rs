//! Loader for the 31-line scenario text format.
//!
//! The format describes a 6x8 building: six lines of NESW wall quads, three
//! point-of-interest lines (`row column v|f`), ten fire lines (`row column`),
//! eight door lines (`row column row column`) and four entry lines
//! (`row column`). Coordinates are one-based, which coincides with the
//! padded grid once a perimeter ring is added.

use ember_rescue_core::{CellCoord, PoiKind, Scenario, WallMask};
use thiserror::Error;

const BUILDING_ROWS: u32 = 6;
const BUILDING_COLUMNS: u32 = 8;

const POI_LINES: usize = 3;
const FIRE_LINES: usize = 10;
const DOOR_LINES: usize = 8;
const ENTRY_LINES: usize = 4;
const TOTAL_LINES: usize =
    BUILDING_ROWS as usize + POI_LINES + FIRE_LINES + DOOR_LINES + ENTRY_LINES;

/// Reference scenario used when no file is provided.
pub(crate) const REFERENCE_SCENARIO: &str = "\
1001 1000 1000 1000 1100 0001 1000 1100
0001 0000 0110 0011 0010 0010 0010 0100
0000 0000 1000 1000 1000 1100 1001 0100
0011 0110 0011 0000 0010 0010 0010 0010
1001 1000 1000 0000 1100 1001 1100 1101
0011 0010 0000 0010 0010 0010 0010 0110
2 4 v
5 1 f
5 8 v
2 2
2 3
3 2
3 3
3 4
3 5
4 4
5 6
5 7
6 6
1 3 1 4
2 5 2 6
2 8 3 8
3 2 3 3
4 4 5 4
4 6 4 7
6 5 6 6
6 7 6 8
1 6
3 1
4 8
6 3
";

/// Failures raised while reading scenario text.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScenarioTextError {
    /// Fewer lines than the format requires.
    #[error("scenario has {found} lines, expected {expected}")]
    TooShort {
        /// Lines present.
        found: usize,
        /// Lines required.
        expected: usize,
    },
    /// A line carries the wrong number of fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// One-based line number.
        line: usize,
        /// Fields required.
        expected: usize,
        /// Fields present.
        found: usize,
    },
    /// A wall token is not four binary digits.
    #[error("line {line}: `{token}` is not a NESW wall mask")]
    WallMask {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A coordinate is not a number.
    #[error("line {line}: `{token}` is not a number")]
    Number {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A point-of-interest kind is neither `v` nor `f`.
    #[error("line {line}: unknown point-of-interest kind `{token}`")]
    PoiKind {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A coordinate lies outside the building.
    #[error("line {line}: row {row}, column {column} lies outside the building")]
    OutOfBounds {
        /// One-based line number.
        line: usize,
        /// Row as written.
        row: u32,
        /// Column as written.
        column: u32,
    },
}

/// Parses scenario text into a perimeter-padded scenario.
pub(crate) fn parse(text: &str) -> Result<Scenario, ScenarioTextError> {
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < TOTAL_LINES {
        return Err(ScenarioTextError::TooShort {
            found: lines.len(),
            expected: TOTAL_LINES,
        });
    }

    let columns = BUILDING_COLUMNS + 2;
    let rows = BUILDING_ROWS + 2;
    let mut walls = vec![WallMask::OPEN; (columns * rows) as usize];
    let mut sections = Sections::new(&lines);

    for (line, tokens) in sections.take(BUILDING_ROWS as usize, BUILDING_COLUMNS as usize)? {
        let row = line as u32;
        for (offset, token) in tokens.iter().enumerate() {
            let column = offset as u32 + 1;
            walls[(row * columns + column) as usize] = wall_mask(line, token)?;
        }
    }

    let pois = sections
        .take(POI_LINES, 3)?
        .into_iter()
        .map(|(line, tokens)| {
            let kind = match tokens[2] {
                "v" => PoiKind::Victim,
                "f" => PoiKind::FalseAlarm,
                other => {
                    return Err(ScenarioTextError::PoiKind {
                        line,
                        token: other.to_owned(),
                    })
                }
            };
            Ok((cell(line, tokens[0], tokens[1])?, kind))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fires = sections
        .take(FIRE_LINES, 2)?
        .into_iter()
        .map(|(line, tokens)| cell(line, tokens[0], tokens[1]))
        .collect::<Result<Vec<_>, _>>()?;

    let doors = sections
        .take(DOOR_LINES, 4)?
        .into_iter()
        .map(|(line, tokens)| {
            Ok((
                cell(line, tokens[0], tokens[1])?,
                cell(line, tokens[2], tokens[3])?,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let entries = sections
        .take(ENTRY_LINES, 2)?
        .into_iter()
        .map(|(line, tokens)| cell(line, tokens[0], tokens[1]))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scenario {
        columns,
        rows,
        walls,
        doors,
        pois,
        fires,
        entries,
        ambulance: None,
    })
}

/// Walks the fixed-size sections of the text in order.
struct Sections<'a> {
    lines: &'a [&'a str],
    next: usize,
}

impl<'a> Sections<'a> {
    fn new(lines: &'a [&'a str]) -> Self {
        Self { lines, next: 0 }
    }

    /// Splits the next `count` lines into exactly `fields` tokens each.
    fn take(
        &mut self,
        count: usize,
        fields: usize,
    ) -> Result<Vec<(usize, Vec<&'a str>)>, ScenarioTextError> {
        let lines = self.lines;
        let start = self.next;
        self.next += count;
        lines[start..self.next]
            .iter()
            .enumerate()
            .map(|(offset, text)| {
                let line = start + offset + 1;
                let tokens: Vec<&str> = text.split_whitespace().collect();
                if tokens.len() == fields {
                    Ok((line, tokens))
                } else {
                    Err(ScenarioTextError::FieldCount {
                        line,
                        expected: fields,
                        found: tokens.len(),
                    })
                }
            })
            .collect()
    }
}

fn wall_mask(line: usize, token: &str) -> Result<WallMask, ScenarioTextError> {
    let bits: Vec<bool> = token
        .chars()
        .map(|digit| match digit {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect::<Option<_>>()
        .filter(|bits: &Vec<bool>| bits.len() == 4)
        .ok_or_else(|| ScenarioTextError::WallMask {
            line,
            token: token.to_owned(),
        })?;
    Ok(WallMask::from_nesw(bits[0], bits[1], bits[2], bits[3]))
}

fn number(line: usize, token: &str) -> Result<u32, ScenarioTextError> {
    token.parse().map_err(|_| ScenarioTextError::Number {
        line,
        token: token.to_owned(),
    })
}

fn cell(line: usize, row: &str, column: &str) -> Result<CellCoord, ScenarioTextError> {
    let row = number(line, row)?;
    let column = number(line, column)?;
    if !(1..=BUILDING_ROWS).contains(&row) || !(1..=BUILDING_COLUMNS).contains(&column) {
        return Err(ScenarioTextError::OutOfBounds { line, row, column });
    }
    Ok(CellCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_rescue_core::Direction;

    #[test]
    fn reference_scenario_parses() {
        let scenario = parse(REFERENCE_SCENARIO).expect("reference scenario");

        assert_eq!((scenario.columns, scenario.rows), (10, 8));
        assert_eq!(scenario.walls.len(), 80);
        assert_eq!(
            scenario.pois,
            vec![
                (CellCoord::new(4, 2), PoiKind::Victim),
                (CellCoord::new(1, 5), PoiKind::FalseAlarm),
                (CellCoord::new(8, 5), PoiKind::Victim),
            ]
        );
        assert_eq!(scenario.fires.len(), 10);
        assert_eq!(scenario.doors.len(), 8);
        assert_eq!(
            scenario.doors[0],
            (CellCoord::new(3, 1), CellCoord::new(4, 1))
        );
        assert_eq!(
            scenario.entries,
            vec![
                CellCoord::new(6, 1),
                CellCoord::new(1, 3),
                CellCoord::new(8, 4),
                CellCoord::new(3, 6),
            ]
        );

        let top_left = scenario.walls[(scenario.columns + 1) as usize];
        assert!(top_left.has(Direction::North));
        assert!(top_left.has(Direction::West));
        assert!(!top_left.has(Direction::East));
        assert_eq!(scenario.walls[0], WallMask::OPEN);
    }

    #[test]
    fn short_text_is_rejected() {
        assert_eq!(
            parse("1001 1000"),
            Err(ScenarioTextError::TooShort {
                found: 1,
                expected: 31,
            })
        );
    }

    #[test]
    fn malformed_wall_mask_names_its_line() {
        let text = REFERENCE_SCENARIO.replacen("0110", "01x0", 1);
        assert_eq!(
            parse(&text),
            Err(ScenarioTextError::WallMask {
                line: 2,
                token: "01x0".to_owned(),
            })
        );
    }

    #[test]
    fn coordinates_outside_the_building_are_rejected() {
        let text = REFERENCE_SCENARIO.replacen("6 6\n", "7 6\n", 1);
        assert_eq!(
            parse(&text),
            Err(ScenarioTextError::OutOfBounds {
                line: 19,
                row: 7,
                column: 6,
            })
        );
    }

    #[test]
    fn unknown_poi_kind_is_rejected() {
        let text = REFERENCE_SCENARIO.replacen("5 1 f", "5 1 x", 1);
        assert!(matches!(
            parse(&text),
            Err(ScenarioTextError::PoiKind { line: 8, .. })
        ));
    }
}

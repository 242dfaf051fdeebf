//! The static description of a level: walls, colors, goal literals and
//! initial placements. A [`Level`] is parsed once, wrapped in an `Rc` and
//! shared read-only by every state derived from it, which keeps the dynamic
//! states small.

use crate::domain::{GoalDescription, Position, State};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("unexpected end of level file while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("expected section header {expected:?}, found {found:?}")]
    MissingSection { expected: &'static str, found: String },
    #[error("unsupported domain {0:?}, only \"hospital\" levels are supported")]
    UnsupportedDomain(String),
    #[error("malformed color line {0:?}")]
    MalformedColorLine(String),
    #[error("object {0:?} appears in the level but has no color")]
    MissingColor(char),
    #[error("initial and goal sections disagree on the number of rows")]
    MismatchedGoalRows,
}

/// A single goal literal. A positive literal is satisfied when an object
/// with the matching letter occupies the position, a negative literal when
/// no such object does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Goal {
    pub position: Position,
    pub letter: char,
    pub is_positive: bool,
}

#[derive(Debug)]
pub struct Level {
    pub name: String,
    /// Row-major wall matrix; `walls[row][col]` is true iff (row, col) is a
    /// wall. Cells outside the matrix count as walls.
    walls: Vec<Vec<bool>>,
    /// Color of each agent digit and box letter.
    colors: HashMap<char, String>,
    pub agent_goals: Vec<Goal>,
    pub box_goals: Vec<Goal>,
    pub initial_agent_positions: Vec<(Position, char)>,
    pub initial_box_positions: Vec<(Position, char)>,
}

impl Level {
    pub fn num_agents(&self) -> usize {
        self.initial_agent_positions.len()
    }

    pub fn num_boxes(&self) -> usize {
        self.initial_box_positions.len()
    }

    pub fn num_rows(&self) -> usize {
        self.walls.len()
    }

    pub fn num_cols(&self) -> usize {
        self.walls.first().map_or(0, |row| row.len())
    }

    pub fn wall_at(&self, position: Position) -> bool {
        if position.row < 0 || position.col < 0 {
            return true;
        }
        self.walls
            .get(position.row as usize)
            .and_then(|row| row.get(position.col as usize))
            .copied()
            .unwrap_or(true)
    }

    pub fn color_of(&self, object: char) -> Option<&str> {
        self.colors.get(&object).map(String::as_str)
    }

    /// Whether two objects share a color. Objects without a color never
    /// match anything.
    pub fn same_color(&self, a: char, b: char) -> bool {
        match (self.colors.get(&a), self.colors.get(&b)) {
            (Some(color_a), Some(color_b)) => color_a == color_b,
            _ => false,
        }
    }

    pub fn agent_goal_at(&self, position: Position) -> Option<char> {
        self.agent_goals
            .iter()
            .find(|goal| goal.position == position)
            .map(|goal| goal.letter)
    }

    pub fn box_goal_at(&self, position: Position) -> Option<char> {
        self.box_goals
            .iter()
            .find(|goal| goal.position == position)
            .map(|goal| goal.letter)
    }

    pub fn goal_at(&self, position: Position) -> Option<char> {
        self.agent_goal_at(position)
            .or_else(|| self.box_goal_at(position))
    }

    /// The initial state of the level. Box positions are sorted so that the
    /// initial state is already in canonical form.
    pub fn initial_state(self: &Rc<Self>) -> Rc<State> {
        let mut box_positions = self.initial_box_positions.clone();
        box_positions.sort();
        Rc::new(State::new(
            Rc::clone(self),
            self.initial_agent_positions.clone(),
            box_positions,
        ))
    }

    /// The conjunction of all agent and box goals of the level.
    pub fn goal_description(self: &Rc<Self>) -> Rc<GoalDescription> {
        let mut goals = self.agent_goals.clone();
        goals.extend(self.box_goals.iter().copied());
        Rc::new(GoalDescription::new(Rc::clone(self), goals))
    }

    pub fn from_str(text: &str) -> Result<Level, LevelError> {
        let lines: Vec<&str> = text.lines().map(|line| line.trim_end_matches('\r')).collect();
        Self::from_lines(&lines)
    }

    /// Parses the level file format: ordered sections `#domain`,
    /// `#levelname`, `#colors`, `#initial` and `#goal`, where the last two
    /// are rectangular character grids (`+` wall, digit agent, uppercase
    /// letter box).
    pub fn from_lines(lines: &[&str]) -> Result<Level, LevelError> {
        let mut cursor = Cursor { lines, index: 0 };

        cursor.expect_header("#domain")?;
        let domain = cursor.next_line("domain name")?;
        if domain != "hospital" {
            return Err(LevelError::UnsupportedDomain(domain.to_string()));
        }

        cursor.expect_header("#levelname")?;
        let name = cursor.next_line("level name")?.to_string();

        cursor.expect_header("#colors")?;
        let mut colors = HashMap::new();
        while !cursor.peek_is_header() {
            let line = cursor.next_line("color declaration")?;
            let (color, objects) = line
                .split_once(':')
                .ok_or_else(|| LevelError::MalformedColorLine(line.to_string()))?;
            let color = color.trim().to_string();
            for object in objects.split(',') {
                let object = object.trim();
                let char = object
                    .chars()
                    .next()
                    .ok_or_else(|| LevelError::MalformedColorLine(line.to_string()))?;
                if char.is_ascii_digit() || char.is_ascii_uppercase() {
                    colors.insert(char, color.clone());
                }
            }
        }

        cursor.expect_header("#initial")?;
        let initial_rows = cursor.take_grid_rows();
        let num_rows = initial_rows.len();
        let num_cols = initial_rows.iter().map(|row| row.len()).max().unwrap_or(0);

        // Cells beyond the end of a short line count as walls.
        let mut walls = vec![vec![true; num_cols]; num_rows];
        let mut initial_agent_positions = Vec::new();
        let mut initial_box_positions = Vec::new();
        for (row, line) in initial_rows.iter().enumerate() {
            for (col, char) in line.chars().enumerate() {
                let position = Position::new(row as i16, col as i16);
                walls[row][col] = char == '+';
                if char.is_ascii_digit() {
                    initial_agent_positions.push((position, char));
                } else if char.is_ascii_uppercase() {
                    initial_box_positions.push((position, char));
                }
            }
        }
        // Joint actions are indexed by agent order, so keep agents ordered
        // by their digit regardless of scan order.
        initial_agent_positions.sort_by_key(|&(_, char)| char);

        cursor.expect_header("#goal")?;
        let goal_rows = cursor.take_grid_rows();
        if goal_rows.len() != num_rows {
            return Err(LevelError::MismatchedGoalRows);
        }
        let mut agent_goals = Vec::new();
        let mut box_goals = Vec::new();
        for (row, line) in goal_rows.iter().enumerate() {
            for (col, char) in line.chars().enumerate() {
                let position = Position::new(row as i16, col as i16);
                let goal = Goal { position, letter: char, is_positive: true };
                if char.is_ascii_digit() {
                    agent_goals.push(goal);
                } else if char.is_ascii_uppercase() {
                    box_goals.push(goal);
                }
            }
        }

        for &(_, char) in initial_agent_positions.iter().chain(&initial_box_positions) {
            if !colors.contains_key(&char) {
                return Err(LevelError::MissingColor(char));
            }
        }

        Ok(Level {
            name,
            walls,
            colors,
            agent_goals,
            box_goals,
            initial_agent_positions,
            initial_box_positions,
        })
    }
}

struct Cursor<'a> {
    lines: &'a [&'a str],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn next_line(&mut self, what: &'static str) -> Result<&'a str, LevelError> {
        let line = self
            .lines
            .get(self.index)
            .ok_or(LevelError::UnexpectedEof(what))?;
        self.index += 1;
        Ok(line)
    }

    fn expect_header(&mut self, expected: &'static str) -> Result<(), LevelError> {
        let found = self.next_line(expected)?;
        if found != expected {
            return Err(LevelError::MissingSection { expected, found: found.to_string() });
        }
        Ok(())
    }

    fn peek_is_header(&self) -> bool {
        self.lines
            .get(self.index)
            .map_or(true, |line| line.starts_with('#'))
    }

    fn take_grid_rows(&mut self) -> Vec<&'a str> {
        let mut rows = Vec::new();
        while !self.peek_is_header() {
            rows.push(self.lines[self.index]);
            self.index += 1;
        }
        rows
    }
}

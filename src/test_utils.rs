//! Small hand-written levels shared across test modules, plus helpers
//! for building levels and states from them.

use crate::domain::{Level, Position, State};
use std::rc::Rc;

/// One red agent in a 3x5 corridor; the goal is the cell at (1,3).
pub const EMPTY_CORRIDOR: &str = "#domain
hospital
#levelname
empty corridor
#colors
red: 0
#initial
+++++
+0  +
+++++
#goal
+++++
+  0+
+++++
#end";

/// A red agent at (1,2) next to a red box at (1,3), with free cells on
/// either side so both pushing and pulling are possible.
pub const BOX_CORRIDOR: &str = "#domain
hospital
#levelname
box corridor
#colors
red: 0, A
#initial
++++++
+ 0A +
++++++
#goal
++++++
+   A+
++++++
#end";

/// Agents 0 and 1 facing each other across a single free cell.
pub const TWO_AGENT_HEAD_ON: &str = "#domain
hospital
#levelname
head on
#colors
red: 0
blue: 1
#initial
+++++
+0 1+
+++++
#goal
+++++
+   +
+++++
#end";

/// One agent with two interchangeable 'A' boxes.
pub const TWO_BOX_ROOM: &str = "#domain
hospital
#levelname
two box room
#colors
red: 0, A
#initial
+++++
+0A +
+ A +
+++++
#goal
+++++
+  A+
+  A+
+++++
#end";

/// A red agent/box pair and a blue agent/box pair, each with a goal.
pub const TWO_COLOR_LEVEL: &str = "#domain
hospital
#levelname
two colors
#colors
red: 0, A
blue: 1, B
#initial
++++++
+0A  +
+1B  +
++++++
#goal
++++++
+  A +
+  B +
++++++
#end";

pub fn pos(row: i16, col: i16) -> Position {
    Position::new(row, col)
}

pub fn rc_level(text: &str) -> Rc<Level> {
    Rc::new(Level::from_str(text).unwrap())
}

pub fn initial_state(text: &str) -> Rc<State> {
    rc_level(text).initial_state()
}

/// The level's initial state with agent 0 teleported to `(row, col)`.
pub fn state_with_agent_at(level: &Rc<Level>, row: i16, col: i16) -> Rc<State> {
    let mut state = State::new(
        Rc::clone(level),
        level.initial_agent_positions.clone(),
        level.initial_box_positions.clone(),
    );
    state.agent_positions[0].0 = pos(row, col);
    Rc::new(state)
}

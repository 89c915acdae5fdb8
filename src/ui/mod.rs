mod display;
mod scrollback;
mod terminal;

pub use display::{render, wrap, DisplayPosition, Frame, Viewport};
pub use scrollback::Scrollback;
pub use terminal::{StdTerminal, Terminal};

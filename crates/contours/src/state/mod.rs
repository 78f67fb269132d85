//! Controller state

pub mod contours;
pub mod selection;
pub mod settings;

pub use contours::{Contours, ContoursView, Interaction, InteractionKind, MeshSink, Mode, WidgetKind};
pub use selection::SelectionState;
pub use settings::ToolSettings;

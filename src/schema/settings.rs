use serde::{Deserialize, Serialize};

use crate::schema::resolved::Resolved;
use crate::schema::value::{BackgroundTransition, BoxTransition, Color, TextAlign};

/// Per-node presentation and pacing settings for a dialogue node.
///
/// The three plain flags are fixed at authoring time; every other field
/// is a [`Resolved`] value that only takes effect when active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueSettings {
    /// Stop after the text is revealed until an external continue signal.
    pub await_continue: bool,
    /// Wait for an explicit advance request once the text is revealed.
    pub advance_on_click: bool,
    /// Append this node's text to the previous node's instead of clearing.
    pub keep_previous_text: bool,

    /// Seconds between revealed characters.
    pub print_speed: Resolved<f64>,
    /// Seconds to wait before the node's content is shown.
    pub pre_delay: Resolved<f64>,
    /// Opaque string handed to the host when the node is shown.
    pub broadcast: Resolved<String>,

    pub bold: Resolved<bool>,
    pub italic: Resolved<bool>,
    pub underline: Resolved<bool>,
    pub color: Resolved<Color>,
    pub font: Resolved<String>,
    pub text_align: Resolved<TextAlign>,
    pub wrap_text: Resolved<bool>,

    pub music_queue: Resolved<Vec<String>>,
    pub music_loop: Resolved<bool>,
    pub music_shuffle: Resolved<bool>,
    pub sounds: Resolved<Vec<String>>,

    pub box_transition: Resolved<BoxTransition>,
    pub box_color: Resolved<Color>,
    pub box_image: Resolved<String>,
    pub name_plate_color: Resolved<Color>,
    pub name_plate_image: Resolved<String>,

    pub background: Resolved<String>,
    pub background_transition: Resolved<BackgroundTransition>,
}
